//! # Resimulation
//!
//! Replays a played match from a cutoff minute with updated rosters and
//! tactics. Everything after the cutoff is erased along with its effect on
//! player records, the remainder is simulated again and the new events,
//! score, league table and goalkeeper stats are written back. The whole
//! operation runs inside one store transaction.
//!
//! ```rust
//! use season_core::resim::{MemoryStore, ResimRequest, ResimulationEngine};
//! use season_core::models::TeamSheet;
//! use rand::SeedableRng;
//!
//! let mut store = MemoryStore::new();
//! let engine = ResimulationEngine::default();
//! let request = ResimRequest::new(1, 60, TeamSheet::bare(1, 50.0), TeamSheet::bare(2, 50.0));
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
//! // no such match
//! assert!(engine.resimulate(&mut store, &request, &mut rng).is_err());
//! ```

pub mod effects;
pub mod store;

pub use effects::{affected_player, apply_event, revert_event};
pub use store::{MemoryStore, SeasonStore};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{DisciplineConfig, SimConfig};
use crate::engine::{Discipline, MatchEngine, SimWindow};
use crate::error::{Result, SeasonError};
use crate::models::events::{score_from_events, REGULATION_MINUTES};
use crate::models::{
    MatchEvent, MatchId, MatchRecord, PlayerId, PlayerRecord, RosterEntry, SideSetup, Tactics, TeamId, TeamSheet,
};
use crate::standings::LeagueResult;

/// Player change made at the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub team_id: TeamId,
    pub player_off: PlayerId,
    pub player_on: RosterEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResimRequest {
    pub match_id: MatchId,
    /// 0..=90; events at or before it survive
    pub cutoff: u8,
    /// Updated strength and roster per side
    pub home: TeamSheet,
    pub away: TeamSheet,
    #[serde(default)]
    pub home_tactics: Option<Tactics>,
    #[serde(default)]
    pub away_tactics: Option<Tactics>,
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
}

impl ResimRequest {
    pub fn new(match_id: MatchId, cutoff: u8, home: TeamSheet, away: TeamSheet) -> Self {
        Self { match_id, cutoff, home, away, home_tactics: None, away_tactics: None, substitutions: Vec::new() }
    }

    /// Request that keeps the match's own lineups and strengths. Substitutions
    /// already made by the cutoff stand.
    pub fn unchanged(record: &MatchRecord, cutoff: u8) -> Self {
        Self::new(record.id, cutoff, record.home.sheet(), record.away.sheet())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResimOutcome {
    pub match_id: MatchId,
    pub previous_score: (u8, u8),
    pub score_at_cutoff: (u8, u8),
    pub remainder_score: (u8, u8),
    pub final_score: (u8, u8),
    pub removed_events: Vec<MatchEvent>,
    pub new_events: Vec<MatchEvent>,
    pub standings_updated: bool,
    /// Referenced players with no record in the store
    pub skipped_players: Vec<PlayerId>,
}

#[derive(Debug, Clone, Default)]
pub struct ResimulationEngine {
    engine: MatchEngine,
    discipline: DisciplineConfig,
}

impl ResimulationEngine {
    pub fn new(config: &SimConfig) -> Self {
        Self { engine: MatchEngine::new(config), discipline: config.discipline.clone() }
    }

    pub fn with_engine(engine: MatchEngine, discipline: DisciplineConfig) -> Self {
        Self { engine, discipline }
    }

    pub fn resimulate<S: SeasonStore, R: Rng + ?Sized>(
        &self,
        store: &mut S,
        request: &ResimRequest,
        rng: &mut R,
    ) -> Result<ResimOutcome> {
        if request.cutoff > REGULATION_MINUTES {
            return Err(SeasonError::InvalidCutoff { minute: request.cutoff, max: REGULATION_MINUTES });
        }
        let outcome = store.transaction(|tx| self.run(tx, request, rng))?;
        log::info!(
            "match {} resimulated from minute {}: {}-{} -> {}-{} ({} events replaced by {})",
            outcome.match_id,
            request.cutoff,
            outcome.previous_score.0,
            outcome.previous_score.1,
            outcome.final_score.0,
            outcome.final_score.1,
            outcome.removed_events.len(),
            outcome.new_events.len()
        );
        Ok(outcome)
    }

    fn run<S: SeasonStore, R: Rng + ?Sized>(&self, tx: &mut S, request: &ResimRequest, rng: &mut R) -> Result<ResimOutcome> {
        let mut record = tx.load_match(request.match_id)?.ok_or(SeasonError::MatchNotFound(request.match_id))?;
        if !record.played {
            return Err(SeasonError::MatchNotPlayed(record.id));
        }
        for (sheet, team) in [(&request.home, record.home_team()), (&request.away, record.away_team())] {
            if sheet.team_id != team {
                return Err(SeasonError::TeamNotInMatch { match_id: record.id, team: sheet.team_id });
            }
        }

        let (home_team, away_team) = (record.home_team(), record.away_team());
        let previous_score = record.score();
        if score_from_events(&record.events, home_team, away_team) != previous_score {
            return Err(SeasonError::ScoreEventMismatch { match_id: record.id });
        }

        let mut skipped_players = Vec::new();

        // 1. erase everything after the cutoff
        let (kept, removed): (Vec<MatchEvent>, Vec<MatchEvent>) =
            std::mem::take(&mut record.events).into_iter().partition(|e| !e.is_after(request.cutoff));
        for event in &removed {
            self.update_player(tx, event, &mut skipped_players, |player| revert_event(player, event, record.id))?;
        }

        // 2. score standing at the cutoff
        let score_at_cutoff = score_from_events(&kept, home_team, away_team);

        // 3. remainder with the updated sides; dismissed and replaced players stay off
        let discipline = Discipline::from_events(&kept);
        let mut home = request.home.clone();
        let mut away = request.away.clone();
        home.apply_substitutions(&kept);
        away.apply_substitutions(&kept);
        let mut new_events = Vec::new();
        for sub in &request.substitutions {
            let sheet = if sub.team_id == home.team_id {
                &mut home
            } else if sub.team_id == away.team_id {
                &mut away
            } else {
                return Err(SeasonError::TeamNotInMatch { match_id: record.id, team: sub.team_id });
            };
            sheet.substitute(sub.player_off, sub.player_on);
            new_events.push(MatchEvent::substitution(request.cutoff.max(1), sub.team_id, sub.player_off, sub.player_on));
        }

        let window = SimWindow::remainder_after(request.cutoff, self.engine.config());
        let remainder = self.engine.simulate_window(&home, &away, &window, &discipline, rng);
        new_events.extend(remainder.events);

        // 4. new events and their effects
        for event in &new_events {
            let discipline_config = &self.discipline;
            self.update_player(tx, event, &mut skipped_players, |player| {
                apply_event(player, event, record.id, discipline_config)
            })?;
        }

        // 5. final score
        let remainder_score = (remainder.home_goals, remainder.away_goals);
        let final_score = (
            score_at_cutoff.0.saturating_add(remainder_score.0),
            score_at_cutoff.1.saturating_add(remainder_score.1),
        );
        let mut events = kept;
        events.extend(new_events.iter().cloned());
        record.record_result(final_score.0, final_score.1, events);
        apply_side(&mut record.home, &home, request.home_tactics.as_ref());
        apply_side(&mut record.away, &away, request.away_tactics.as_ref());

        // 6. league table
        let mut standings_updated = false;
        if let Some(competition) = record.league_id() {
            if final_score != previous_score {
                let old = LeagueResult::new(home_team, away_team, previous_score.0, previous_score.1);
                let new = LeagueResult::new(home_team, away_team, final_score.0, final_score.1);
                match tx.load_standings(competition)? {
                    Some(mut table) => {
                        if table.row(home_team).is_none() || table.row(away_team).is_none() {
                            log::warn!("competition {competition}: table lacks a side of match {}, skipped", record.id);
                        } else {
                            table.correct(&old, &new)?;
                            tx.save_standings(table)?;
                            standings_updated = true;
                        }
                    }
                    None => log::warn!("competition {competition}: no standings table, skipped"),
                }
            }
        }

        // 7. starting goalkeepers
        for (team, conceded_before) in [(home_team, previous_score.1), (away_team, previous_score.0)] {
            let (Some(side), Some(conceded_after)) = (record.side_of(team), record.conceded_by(team)) else {
                continue;
            };
            if conceded_before == conceded_after {
                continue;
            }
            for keeper in side.lineup.iter().filter(|p| p.position.is_goalkeeper()) {
                match tx.load_player(keeper.player_id)? {
                    Some(mut player) => {
                        regoal_keeper(&mut player.goals_conceded, &mut player.clean_sheets, conceded_before, conceded_after);
                        tx.save_player(player)?;
                    }
                    None => {
                        log::warn!("goalkeeper {} has no record, skipped", keeper.player_id);
                        skipped_players.push(keeper.player_id);
                    }
                }
            }
        }

        let match_id = record.id;
        tx.save_match(record)?;

        Ok(ResimOutcome {
            match_id,
            previous_score,
            score_at_cutoff,
            remainder_score,
            final_score,
            removed_events: removed,
            new_events,
            standings_updated,
            skipped_players,
        })
    }

    /// Load, change and save the player an event touches. Missing records are
    /// skipped.
    fn update_player<S: SeasonStore>(
        &self,
        tx: &mut S,
        event: &MatchEvent,
        skipped: &mut Vec<PlayerId>,
        change: impl FnOnce(&mut PlayerRecord),
    ) -> Result<()> {
        let Some(player_id) = affected_player(event) else {
            return Ok(());
        };
        match tx.load_player(player_id)? {
            Some(mut player) => {
                change(&mut player);
                tx.save_player(player)
            }
            None => {
                log::warn!("player {player_id} has no record, {:?} at {}' skipped", event.event_type, event.minute);
                skipped.push(player_id);
                Ok(())
            }
        }
    }
}

fn apply_side(side: &mut SideSetup, sheet: &TeamSheet, tactics: Option<&Tactics>) {
    side.strength = sheet.strength;
    if let Some(tactics) = tactics {
        side.tactics = tactics.clone();
    }
}

fn regoal_keeper(goals_conceded: &mut u32, clean_sheets: &mut u32, before: u8, after: u8) {
    *goals_conceded = goals_conceded.saturating_sub(u32::from(before)).saturating_add(u32::from(after));
    if before == 0 && after > 0 {
        *clean_sheets = clean_sheets.saturating_sub(1);
    } else if before > 0 && after == 0 {
        *clean_sheets += 1;
    }
}

#[cfg(test)]
mod tests;
