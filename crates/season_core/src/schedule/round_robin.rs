//! Double round robin via the circle method.
//!
//! One team stays fixed while the other N-1 rotate one slot per round. The
//! fixed team's venue alternates by round parity and the remaining pairs
//! alternate by slot parity, which keeps same-venue runs at the N-2 minimum.
//! The second half replays the first with venues swapped.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::error::{Result, SeasonError};
use crate::models::{Fixture, TeamId};

pub const MIN_TEAMS: usize = 4;

/// Number of matchdays a double round robin over `teams` needs.
pub fn matchday_count(teams: usize) -> usize {
    2 * teams.saturating_sub(1)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobinScheduler;

impl RoundRobinScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Build both halves. `dates[r]` is the date of round `r + 1`.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        teams: &[TeamId],
        dates: &[NaiveDate],
        rng: &mut R,
    ) -> Result<Vec<Fixture>> {
        validate(teams, dates)?;

        let mut order = teams.to_vec();
        order.shuffle(rng);

        let first_half = first_half_pairings(&order);
        let half_rounds = first_half.len();

        let mut fixtures = Vec::with_capacity(2 * half_rounds * teams.len() / 2);
        for (r, pairs) in first_half.iter().enumerate() {
            let round = r + 1;
            for &(home, away) in pairs {
                fixtures.push(Fixture {
                    round: round as u32,
                    date: dates[r],
                    home_team_id: home,
                    away_team_id: away,
                });
            }
        }
        for (r, pairs) in first_half.iter().enumerate() {
            let index = half_rounds + r;
            for &(home, away) in pairs {
                fixtures.push(Fixture {
                    round: (index + 1) as u32,
                    date: dates[index],
                    home_team_id: away,
                    away_team_id: home,
                });
            }
        }

        log::debug!("round robin: {} teams, {} fixtures", teams.len(), fixtures.len());
        Ok(fixtures)
    }
}

fn validate(teams: &[TeamId], dates: &[NaiveDate]) -> Result<()> {
    if teams.len() < MIN_TEAMS {
        return Err(SeasonError::TooFewTeams { min: MIN_TEAMS, found: teams.len() });
    }
    if teams.len() % 2 != 0 {
        return Err(SeasonError::OddTeamCount { found: teams.len() });
    }
    let mut seen = HashSet::with_capacity(teams.len());
    for &team in teams {
        if !seen.insert(team) {
            return Err(SeasonError::DuplicateTeam { team });
        }
    }
    let expected = matchday_count(teams.len());
    if dates.len() != expected {
        return Err(SeasonError::CalendarMismatch { expected, found: dates.len() });
    }
    Ok(())
}

/// N-1 rounds of N/2 (home, away) pairs.
fn first_half_pairings(order: &[TeamId]) -> Vec<Vec<(TeamId, TeamId)>> {
    let fixed = order[0];
    let mut rotating: Vec<TeamId> = order[1..].to_vec();
    let m = rotating.len();
    let mut rounds = Vec::with_capacity(m);

    for r in 0..m {
        let mut pairs = Vec::with_capacity(order.len() / 2);

        if r % 2 == 0 {
            pairs.push((fixed, rotating[0]));
        } else {
            pairs.push((rotating[0], fixed));
        }

        for i in 1..=(m - 1) / 2 {
            let a = rotating[i];
            let b = rotating[m - i];
            if i % 2 == 1 {
                pairs.push((b, a));
            } else {
                pairs.push((a, b));
            }
        }

        rounds.push(pairs);
        rotating.rotate_right(1);
    }

    rounds
}
