//! Knockout tie resolution.
//!
//! Single leg: regulation, then extra time, then penalties.
//! Two legs: aggregate, away goals, extra time in the second leg, then
//! penalties in the second leg. A resolved tie always has exactly one winner.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{Discipline, MatchEngine};
use crate::error::{Result, SeasonError};
use crate::models::{
    LegScore, MatchEvent, MatchRecord, ResolutionMethod, ScoreHistory, ShootoutResult, TeamId, TeamSheet, Tie,
    TieResolution, TieSide, TieState,
};

/// Result of a resolve attempt. Unplayed legs are not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolveOutcome {
    Pending { state: TieState },
    Resolved(TieResolution),
}

impl ResolveOutcome {
    pub fn resolution(&self) -> Option<&TieResolution> {
        match self {
            ResolveOutcome::Resolved(resolution) => Some(resolution),
            ResolveOutcome::Pending { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KnockoutResolver {
    engine: MatchEngine,
}

fn leg_score(leg: &MatchRecord) -> LegScore {
    LegScore {
        match_id: leg.id,
        home_team: leg.home_team(),
        away_team: leg.away_team(),
        home_goals: leg.home_score,
        away_goals: leg.away_score,
    }
}

/// Side ahead on an unequal score given in the tie's orientation.
fn leader(tie: &Tie, score: (u8, u8)) -> TeamId {
    tie.team(if score.0 > score.1 { TieSide::Home } else { TieSide::Away })
}

fn add(a: (u8, u8), b: (u8, u8)) -> (u8, u8) {
    (a.0.saturating_add(b.0), a.1.saturating_add(b.1))
}

/// Sheet of players still on the pitch.
fn on_pitch(sheet: TeamSheet, discipline: &Discipline) -> TeamSheet {
    let roster = sheet.roster.into_iter().filter(|p| !discipline.sent_off.contains(&p.player_id)).collect();
    TeamSheet { roster, ..sheet }
}

impl KnockoutResolver {
    pub fn new(engine: MatchEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Resolve `tie` if its legs are played, writing winner, completed flag and
    /// resolution onto it. A completed tie returns its stored resolution.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        tie: &mut Tie,
        first_leg: &MatchRecord,
        second_leg: Option<&MatchRecord>,
        rng: &mut R,
    ) -> Result<ResolveOutcome> {
        if tie.completed {
            if let Some(resolution) = &tie.resolution {
                return Ok(ResolveOutcome::Resolved(resolution.clone()));
            }
        }

        self.check_leg(tie, first_leg, false)?;
        if !first_leg.played {
            return Ok(ResolveOutcome::Pending { state: TieState::AwaitingFirstLeg });
        }

        let resolution = match tie.second_leg {
            None => self.resolve_single(tie, first_leg, rng),
            Some(_) => {
                let Some(second_leg) = second_leg else {
                    return Ok(ResolveOutcome::Pending { state: TieState::AwaitingSecondLeg });
                };
                self.check_leg(tie, second_leg, true)?;
                if !second_leg.played {
                    return Ok(ResolveOutcome::Pending { state: TieState::AwaitingSecondLeg });
                }
                self.resolve_two_legged(tie, first_leg, second_leg, rng)
            }
        };

        log::info!(
            "tie {} resolved: winner {} by {:?} (aggregate {}-{})",
            tie.id,
            resolution.winner_id,
            resolution.method,
            resolution.score_history.aggregate.0,
            resolution.score_history.aggregate.1
        );

        tie.winner = Some(resolution.winner_id);
        tie.completed = true;
        tie.resolution = Some(resolution.clone());
        Ok(ResolveOutcome::Resolved(resolution))
    }

    /// The leg must be the tie's and oriented as the tie expects: the second
    /// leg is hosted by the tie's away side.
    fn check_leg(&self, tie: &Tie, leg: &MatchRecord, second: bool) -> Result<()> {
        let (expected_id, host, visitor) = if second {
            (tie.second_leg, tie.away_team, tie.home_team)
        } else {
            (Some(tie.first_leg), tie.home_team, tie.away_team)
        };
        if expected_id != Some(leg.id) || leg.home_team() != host || leg.away_team() != visitor {
            return Err(SeasonError::TieLegMismatch { tie: tie.id, match_id: leg.id });
        }
        Ok(())
    }

    fn resolve_single<R: Rng + ?Sized>(&self, tie: &Tie, leg: &MatchRecord, rng: &mut R) -> TieResolution {
        let score = leg.score();
        let mut history = ScoreHistory { legs: vec![leg_score(leg)], aggregate: score, ..Default::default() };

        if score.0 != score.1 {
            let winner = leader(tie, score);
            return finished(winner, ResolutionMethod::Normal, history);
        }

        // Played in the leg's own orientation, which is the tie's.
        match self.play_on(leg, rng) {
            PlayOn::Decided { score: et_score, events } => {
                history.extra_time = Some(et_score);
                let winner = leader(tie, et_score);
                TieResolution { extra_time_events: events, ..finished(winner, ResolutionMethod::ExtraTime, history) }
            }
            PlayOn::Penalties { score: et_score, events, shootout } => {
                history.extra_time = Some(et_score);
                history.penalties = Some((shootout.home_goals, shootout.away_goals));
                TieResolution {
                    winner_id: shootout.winner_id(),
                    method: ResolutionMethod::Penalties,
                    score_history: history,
                    extra_time_events: events,
                    shootout: Some(shootout),
                }
            }
        }
    }

    fn resolve_two_legged<R: Rng + ?Sized>(
        &self,
        tie: &Tie,
        first: &MatchRecord,
        second: &MatchRecord,
        rng: &mut R,
    ) -> TieResolution {
        // Second leg flipped into the tie's orientation.
        let aggregate = add(first.score(), (second.away_score, second.home_score));
        let mut history =
            ScoreHistory { legs: vec![leg_score(first), leg_score(second)], aggregate, ..Default::default() };

        if aggregate.0 != aggregate.1 {
            let winner = leader(tie, aggregate);
            return finished(winner, ResolutionMethod::Aggregate, history);
        }

        let away_goals = (second.away_score, first.away_score);
        history.away_goals = Some(away_goals);
        if away_goals.0 != away_goals.1 {
            let winner = leader(tie, away_goals);
            return finished(winner, ResolutionMethod::AwayGoals, history);
        }

        match self.play_on(second, rng) {
            PlayOn::Decided { score, events } => {
                let et_score = (score.1, score.0);
                history.extra_time = Some(et_score);
                let winner = leader(tie, et_score);
                TieResolution { extra_time_events: events, ..finished(winner, ResolutionMethod::ExtraTime, history) }
            }
            PlayOn::Penalties { score, events, shootout } => {
                history.extra_time = Some((score.1, score.0));
                // Shootout home side is the second leg's host, the tie's away side.
                history.penalties = Some((shootout.away_goals, shootout.home_goals));
                TieResolution {
                    winner_id: shootout.winner_id(),
                    method: ResolutionMethod::Penalties,
                    score_history: history,
                    extra_time_events: events,
                    shootout: Some(shootout),
                }
            }
        }
    }

    /// Extra time in `leg`, then penalties if it ends level. Scores are in
    /// the leg's orientation.
    fn play_on<R: Rng + ?Sized>(&self, leg: &MatchRecord, rng: &mut R) -> PlayOn {
        let mut home = leg.home.sheet();
        let mut away = leg.away.sheet();
        home.apply_substitutions(&leg.events);
        away.apply_substitutions(&leg.events);
        let discipline = Discipline::from_events(&leg.events);
        let extra_time = self.engine.simulate_extra_time(&home, &away, &discipline, rng);
        let score = extra_time.score();
        log::debug!("match {} extra time {}-{}", leg.id, score.0, score.1);

        if score.0 != score.1 {
            return PlayOn::Decided { score, events: extra_time.events };
        }

        let discipline = Discipline::from_events(leg.events.iter().chain(&extra_time.events));
        let shootout = self.engine.penalty_shootout(&on_pitch(home, &discipline), &on_pitch(away, &discipline), rng);
        PlayOn::Penalties { score, events: extra_time.events, shootout }
    }
}

/// How a level leg was settled after regulation.
enum PlayOn {
    Decided { score: (u8, u8), events: Vec<MatchEvent> },
    Penalties { score: (u8, u8), events: Vec<MatchEvent>, shootout: ShootoutResult },
}

fn finished(winner_id: TeamId, method: ResolutionMethod, score_history: ScoreHistory) -> TieResolution {
    TieResolution { winner_id, method, score_history, extra_time_events: Vec::new(), shootout: None }
}
