//! Statistical match engine.
//!
//! The score is two independent Poisson draws and is authoritative: events are
//! generated to explain it and never change it. Events are only produced when
//! both sides bring a roster.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use super::poisson::sample_poisson;
use super::weights::{pick_weighted, EventRole};
use crate::config::{MatchEngineConfig, ShootoutConfig, SimConfig};
use crate::models::events::REGULATION_MINUTES;
use crate::models::{
    EventMetadata, EventType, InjuryDetail, InjuryKind, MatchEvent, PlayerId, RosterEntry,
    ShootoutKick, ShootoutResult, TeamSheet, TieSide,
};

pub const EXTRA_TIME_FIRST_MINUTE: u8 = 91;
pub const EXTRA_TIME_LAST_MINUTE: u8 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Regulation,
    ExtraTime,
}

/// Slice of a match to simulate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimWindow {
    pub period: Period,
    pub first_minute: u8,
    pub last_minute: u8,
    pub last_injury_minute: u8,
    /// Fraction of the period's expected goals left to play
    pub goal_share: f64,
    /// Fraction of a full match's card and injury rates
    pub discipline_share: f64,
}

impl SimWindow {
    pub fn full_time(config: &MatchEngineConfig) -> Self {
        Self {
            period: Period::Regulation,
            first_minute: 1,
            last_minute: config.last_regulation_minute,
            last_injury_minute: config.last_injury_minute,
            goal_share: 1.0,
            discipline_share: 1.0,
        }
    }

    pub fn extra_time() -> Self {
        let length = EXTRA_TIME_LAST_MINUTE - EXTRA_TIME_FIRST_MINUTE + 1;
        Self {
            period: Period::ExtraTime,
            first_minute: EXTRA_TIME_FIRST_MINUTE,
            last_minute: EXTRA_TIME_LAST_MINUTE,
            last_injury_minute: EXTRA_TIME_LAST_MINUTE,
            goal_share: 1.0,
            discipline_share: f64::from(length) / f64::from(REGULATION_MINUTES),
        }
    }

    /// Regulation time left after `cutoff` (clamped to 90).
    pub fn remainder_after(cutoff: u8, config: &MatchEngineConfig) -> Self {
        let cutoff = cutoff.min(REGULATION_MINUTES);
        let first_minute = cutoff + 1;
        let share = f64::from(REGULATION_MINUTES - cutoff) / f64::from(REGULATION_MINUTES);
        let last_injury_minute = if first_minute <= config.last_injury_minute {
            config.last_injury_minute
        } else {
            config.last_regulation_minute
        };
        Self {
            period: Period::Regulation,
            first_minute,
            last_minute: config.last_regulation_minute,
            last_injury_minute,
            goal_share: share,
            discipline_share: share,
        }
    }
}

/// Players already booked or dismissed when a window starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discipline {
    pub booked: HashSet<PlayerId>,
    pub sent_off: HashSet<PlayerId>,
}

impl Discipline {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a MatchEvent>) -> Self {
        let mut discipline = Self::default();
        for event in events {
            let Some(player) = event.player_id else { continue };
            match event.event_type {
                EventType::YellowCard => {
                    discipline.booked.insert(player);
                }
                EventType::RedCard => {
                    discipline.sent_off.insert(player);
                }
                _ => {}
            }
        }
        discipline
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedMatch {
    pub home_goals: u8,
    pub away_goals: u8,
    pub expected_goals: (f64, f64),
    /// Minute-ordered
    pub events: Vec<MatchEvent>,
}

impl SimulatedMatch {
    pub fn score(&self) -> (u8, u8) {
        (self.home_goals, self.away_goals)
    }
}

/// Unique-minute picker for one event category.
struct MinuteSlots {
    first: u8,
    last: u8,
    attempts: u32,
    used: HashSet<u8>,
}

impl MinuteSlots {
    fn new(first: u8, last: u8, attempts: u32) -> Self {
        Self { first, last, attempts: attempts.max(1), used: HashSet::new() }
    }

    /// A fresh minute when one turns up within the retry bound, else the last draw.
    fn pick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<u8> {
        if self.first > self.last {
            return None;
        }
        let mut minute = self.first;
        for _ in 0..self.attempts {
            minute = rng.gen_range(self.first..=self.last);
            if self.used.insert(minute) {
                return Some(minute);
            }
        }
        Some(minute)
    }
}

fn chance(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

fn to_goals(sample: u32) -> u8 {
    sample.min(u32::from(u8::MAX)) as u8
}

#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: MatchEngineConfig,
    shootout: ShootoutConfig,
}

impl MatchEngine {
    pub fn new(config: &SimConfig) -> Self {
        Self { config: config.engine.clone(), shootout: config.shootout.clone() }
    }

    pub fn with_configs(config: MatchEngineConfig, shootout: ShootoutConfig) -> Self {
        Self { config, shootout }
    }

    pub fn config(&self) -> &MatchEngineConfig {
        &self.config
    }

    /// Baseline plus a share of the combined strength, per side.
    pub fn expected_goals(&self, home_strength: f64, away_strength: f64, period: Period) -> (f64, f64) {
        let home = home_strength.max(0.0);
        let away = away_strength.max(0.0);
        let total = home + away;
        let home_share = if total > 0.0 { home / total } else { 0.5 };

        let (home_base, away_base, weight) = match period {
            Period::Regulation => {
                (self.config.home_base_xg, self.config.away_base_xg, self.config.strength_xg_weight)
            }
            Period::ExtraTime => (
                self.config.extra_time_home_base_xg,
                self.config.extra_time_away_base_xg,
                self.config.extra_time_strength_xg_weight,
            ),
        };

        (home_base + weight * home_share, away_base + weight * (1.0 - home_share))
    }

    pub fn simulate<R: Rng + ?Sized>(&self, home: &TeamSheet, away: &TeamSheet, rng: &mut R) -> SimulatedMatch {
        let window = SimWindow::full_time(&self.config);
        self.simulate_window(home, away, &window, &Discipline::default(), rng)
    }

    /// Minutes 91-120 with the reduced extra-time baselines.
    pub fn simulate_extra_time<R: Rng + ?Sized>(
        &self,
        home: &TeamSheet,
        away: &TeamSheet,
        discipline: &Discipline,
        rng: &mut R,
    ) -> SimulatedMatch {
        self.simulate_window(home, away, &SimWindow::extra_time(), discipline, rng)
    }

    pub fn simulate_window<R: Rng + ?Sized>(
        &self,
        home: &TeamSheet,
        away: &TeamSheet,
        window: &SimWindow,
        discipline: &Discipline,
        rng: &mut R,
    ) -> SimulatedMatch {
        let (xg_home, xg_away) = self.expected_goals(home.strength, away.strength, window.period);
        let lambda_home = xg_home * window.goal_share.max(0.0);
        let lambda_away = xg_away * window.goal_share.max(0.0);

        let home_goals = to_goals(sample_poisson(lambda_home, rng));
        let away_goals = to_goals(sample_poisson(lambda_away, rng));

        let events = if home.roster.is_empty() || away.roster.is_empty() {
            Vec::new()
        } else {
            self.generate_events(home, away, home_goals, away_goals, window, discipline, rng)
        };

        SimulatedMatch { home_goals, away_goals, expected_goals: (lambda_home, lambda_away), events }
    }

    fn generate_events<R: Rng + ?Sized>(
        &self,
        home: &TeamSheet,
        away: &TeamSheet,
        home_goals: u8,
        away_goals: u8,
        window: &SimWindow,
        discipline: &Discipline,
        rng: &mut R,
    ) -> Vec<MatchEvent> {
        let available = |sheet: &TeamSheet| -> Vec<RosterEntry> {
            sheet.roster.iter().filter(|p| !discipline.sent_off.contains(&p.player_id)).copied().collect()
        };
        let home_players = available(home);
        let away_players = available(away);

        let mut events = Vec::new();
        let mut booked = discipline.booked.clone();
        // Dismissal minute per player sent off inside this window.
        let mut red_minute: HashMap<PlayerId, u8> = HashMap::new();

        let mut card_slots = MinuteSlots::new(window.first_minute, window.last_minute, self.config.minute_attempts);
        for (sheet, players) in [(home, &home_players), (away, &away_players)] {
            self.generate_cards(sheet, players, window, &mut booked, &mut red_minute, &mut card_slots, &mut events, rng);
        }

        let mut goal_slots = MinuteSlots::new(window.first_minute, window.last_minute, self.config.minute_attempts);
        self.generate_goals(home, &home_players, away, &away_players, home_goals, &red_minute, &mut goal_slots, &mut events, rng);
        self.generate_goals(away, &away_players, home, &home_players, away_goals, &red_minute, &mut goal_slots, &mut events, rng);

        for (sheet, players) in [(home, &home_players), (away, &away_players)] {
            self.generate_injury(sheet, players, window, &red_minute, &mut events, rng);
        }

        events.sort_by_key(|e| e.minute);
        events
    }

    fn generate_cards<R: Rng + ?Sized>(
        &self,
        sheet: &TeamSheet,
        players: &[RosterEntry],
        window: &SimWindow,
        booked: &mut HashSet<PlayerId>,
        red_minute: &mut HashMap<PlayerId, u8>,
        slots: &mut MinuteSlots,
        events: &mut Vec<MatchEvent>,
        rng: &mut R,
    ) {
        let count = sample_poisson(self.config.yellow_card_lambda * window.discipline_share.max(0.0), rng);
        let mut minutes: Vec<u8> = (0..count).filter_map(|_| slots.pick(rng)).collect();
        // Assign in match order so a second booking always follows the first.
        minutes.sort_unstable();

        for minute in minutes {
            let candidates: Vec<&RosterEntry> =
                players.iter().filter(|p| !red_minute.contains_key(&p.player_id)).collect();
            let Some(player) = pick_weighted(&candidates, EventRole::Booking, rng) else {
                break;
            };
            let id = player.player_id;
            if booked.contains(&id) {
                red_minute.insert(id, minute);
                events.push(
                    MatchEvent::new(minute, EventType::RedCard, sheet.team_id, Some(id)).with_metadata(EventMetadata {
                        second_yellow: Some(true),
                        ..Default::default()
                    }),
                );
            } else {
                booked.insert(id);
                events.push(MatchEvent::new(minute, EventType::YellowCard, sheet.team_id, Some(id)));
            }
        }

        if rng.gen_bool(chance(self.config.direct_red_chance * window.discipline_share)) {
            let candidates: Vec<&RosterEntry> = players
                .iter()
                .filter(|p| !booked.contains(&p.player_id) && !red_minute.contains_key(&p.player_id))
                .collect();
            if let Some(player) = pick_weighted(&candidates, EventRole::Booking, rng) {
                if let Some(minute) = slots.pick(rng) {
                    red_minute.insert(player.player_id, minute);
                    events.push(MatchEvent::new(minute, EventType::RedCard, sheet.team_id, Some(player.player_id)));
                }
            }
        }
    }

    fn generate_goals<R: Rng + ?Sized>(
        &self,
        scoring: &TeamSheet,
        scoring_players: &[RosterEntry],
        conceding: &TeamSheet,
        conceding_players: &[RosterEntry],
        goals: u8,
        red_minute: &HashMap<PlayerId, u8>,
        slots: &mut MinuteSlots,
        events: &mut Vec<MatchEvent>,
        rng: &mut R,
    ) {
        let on_pitch = |players: &[RosterEntry], minute: u8| -> Vec<RosterEntry> {
            players
                .iter()
                .filter(|p| red_minute.get(&p.player_id).map_or(true, |&sent| sent > minute))
                .copied()
                .collect()
        };

        for _ in 0..goals {
            let Some(minute) = slots.pick(rng) else { break };

            if rng.gen_bool(chance(self.config.own_goal_chance)) {
                let defenders = on_pitch(conceding_players, minute);
                let defenders: Vec<&RosterEntry> = defenders.iter().collect();
                if let Some(culprit) = pick_weighted(&defenders, EventRole::OwnGoal, rng) {
                    events.push(MatchEvent::new(minute, EventType::OwnGoal, conceding.team_id, Some(culprit.player_id)));
                    continue;
                }
            }

            let shooters = on_pitch(scoring_players, minute);
            let shooters: Vec<&RosterEntry> = shooters.iter().collect();
            let scorer = pick_weighted(&shooters, EventRole::Scorer, rng).map(|p| p.player_id);
            events.push(MatchEvent::new(minute, EventType::Goal, scoring.team_id, scorer));

            if let Some(scorer) = scorer {
                if rng.gen_bool(chance(self.config.assist_chance)) {
                    let mates: Vec<&RosterEntry> = shooters.iter().copied().filter(|p| p.player_id != scorer).collect();
                    if let Some(assister) = pick_weighted(&mates, EventRole::Assister, rng) {
                        events.push(MatchEvent::new(minute, EventType::Assist, scoring.team_id, Some(assister.player_id)));
                    }
                }
            }
        }
    }

    fn generate_injury<R: Rng + ?Sized>(
        &self,
        sheet: &TeamSheet,
        players: &[RosterEntry],
        window: &SimWindow,
        red_minute: &HashMap<PlayerId, u8>,
        events: &mut Vec<MatchEvent>,
        rng: &mut R,
    ) {
        if window.first_minute > window.last_injury_minute {
            return;
        }
        if !rng.gen_bool(chance(self.config.injury_chance * window.discipline_share)) {
            return;
        }

        let minute = rng.gen_range(window.first_minute..=window.last_injury_minute);
        let candidates: Vec<&RosterEntry> = players
            .iter()
            .filter(|p| red_minute.get(&p.player_id).map_or(true, |&sent| sent > minute))
            .collect();
        let Some(player) = pick_weighted(&candidates, EventRole::Injury, rng) else {
            return;
        };
        let Some(&kind) = InjuryKind::ALL.choose(rng) else {
            return;
        };
        let (min_weeks, max_weeks) = kind.week_range();
        let weeks = rng.gen_range(min_weeks..=max_weeks);

        events.push(
            MatchEvent::new(minute, EventType::Injury, sheet.team_id, Some(player.player_id)).with_metadata(
                EventMetadata { injury: Some(InjuryDetail { kind, weeks }), ..Default::default() },
            ),
        );
    }

    /// Alternating kicks, home first. Stops as soon as one side cannot be
    /// caught, then goes to sudden-death pairs if still level.
    pub fn penalty_shootout<R: Rng + ?Sized>(&self, home: &TeamSheet, away: &TeamSheet, rng: &mut R) -> ShootoutResult {
        let conversion = self.shootout.conversion.clamp(0.01, 0.99);
        let base_rounds = self.shootout.base_rounds.max(1);

        let mut tally = ShootoutTally::new(home, away);

        'base: for round in 1..=base_rounds {
            for side in [TieSide::Home, TieSide::Away] {
                tally.kick(side, round, conversion, rng);
                if tally.out_of_reach(base_rounds) {
                    break 'base;
                }
            }
        }

        let mut round = base_rounds;
        while tally.result.home_goals == tally.result.away_goals {
            round = round.saturating_add(1);
            tally.kick(TieSide::Home, round, conversion, rng);
            tally.kick(TieSide::Away, round, conversion, rng);
        }

        log::debug!(
            "shootout {}-{} after {} kicks",
            tally.result.home_goals,
            tally.result.away_goals,
            tally.result.kicks.len()
        );
        tally.result
    }
}

/// Outfield players first, keepers last.
fn kick_order(sheet: &TeamSheet) -> Vec<PlayerId> {
    let mut order: Vec<PlayerId> =
        sheet.roster.iter().filter(|p| !p.position.is_goalkeeper()).map(|p| p.player_id).collect();
    order.extend(sheet.goalkeepers().map(|p| p.player_id));
    order
}

struct ShootoutTally {
    takers: [Vec<PlayerId>; 2],
    taken: [u8; 2],
    result: ShootoutResult,
}

impl ShootoutTally {
    fn new(home: &TeamSheet, away: &TeamSheet) -> Self {
        Self {
            takers: [kick_order(home), kick_order(away)],
            taken: [0, 0],
            result: ShootoutResult {
                home_team: home.team_id,
                away_team: away.team_id,
                home_goals: 0,
                away_goals: 0,
                kicks: Vec::new(),
            },
        }
    }

    fn kick<R: Rng + ?Sized>(&mut self, side: TieSide, round: u8, conversion: f64, rng: &mut R) {
        let (slot, team_id) = match side {
            TieSide::Home => (0, self.result.home_team),
            TieSide::Away => (1, self.result.away_team),
        };
        let takers = &self.takers[slot];
        let player_id = if takers.is_empty() {
            None
        } else {
            Some(takers[self.taken[slot] as usize % takers.len()])
        };
        let scored = rng.gen_bool(conversion);

        self.taken[slot] = self.taken[slot].saturating_add(1);
        if scored {
            match side {
                TieSide::Home => self.result.home_goals += 1,
                TieSide::Away => self.result.away_goals += 1,
            }
        }
        self.result.kicks.push(ShootoutKick { round, team_id, player_id, scored });
    }

    /// One side leads by more than the other has kicks left.
    fn out_of_reach(&self, base_rounds: u8) -> bool {
        let home_left = base_rounds.saturating_sub(self.taken[0]);
        let away_left = base_rounds.saturating_sub(self.taken[1]);
        let (home, away) = (self.result.home_goals, self.result.away_goals);
        home + home_left < away || away + away_left < home
    }
}
