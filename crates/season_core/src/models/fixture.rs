use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TeamId;

/// A scheduled pairing. Immutable once produced by a scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Fixture {
    /// 1-based round / matchday
    pub round: u32,
    pub date: NaiveDate,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
}

impl Fixture {
    pub fn involves(&self, team: TeamId) -> bool {
        self.home_team_id == team || self.away_team_id == team
    }

    pub fn opponent_of(&self, team: TeamId) -> Option<TeamId> {
        if self.home_team_id == team {
            Some(self.away_team_id)
        } else if self.away_team_id == team {
            Some(self.home_team_id)
        } else {
            None
        }
    }
}
