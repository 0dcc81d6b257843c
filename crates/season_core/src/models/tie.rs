use serde::{Deserialize, Serialize};

use super::{MatchEvent, MatchId, PlayerId, TeamId, TieId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TieState {
    AwaitingFirstLeg,
    AwaitingSecondLeg,
    Resolved,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieSide {
    Home,
    Away,
}

/// Stage that separated the teams.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    Normal,
    Aggregate,
    AwayGoals,
    ExtraTime,
    Penalties,
}

/// Knockout pairing. Canonical orientation is the first leg's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tie {
    pub id: TieId,
    pub round: u32,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub first_leg: MatchId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_leg: Option<MatchId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<TeamId>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<TieResolution>,
}

impl Tie {
    pub fn single_leg(id: TieId, round: u32, home_team: TeamId, away_team: TeamId, leg: MatchId) -> Self {
        Self {
            id,
            round,
            home_team,
            away_team,
            first_leg: leg,
            second_leg: None,
            winner: None,
            completed: false,
            resolution: None,
        }
    }

    pub fn two_legged(
        id: TieId,
        round: u32,
        home_team: TeamId,
        away_team: TeamId,
        first_leg: MatchId,
        second_leg: MatchId,
    ) -> Self {
        Self { second_leg: Some(second_leg), ..Self::single_leg(id, round, home_team, away_team, first_leg) }
    }

    pub fn is_two_legged(&self) -> bool {
        self.second_leg.is_some()
    }

    /// Stage the tie is in. It stays on its last leg until a resolution
    /// has been written to it.
    pub fn state(&self, first_leg_played: bool) -> TieState {
        if self.completed {
            TieState::Resolved
        } else if first_leg_played && self.is_two_legged() {
            TieState::AwaitingSecondLeg
        } else {
            TieState::AwaitingFirstLeg
        }
    }

    pub fn team(&self, side: TieSide) -> TeamId {
        match side {
            TieSide::Home => self.home_team,
            TieSide::Away => self.away_team,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegScore {
    pub match_id: MatchId,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_goals: u8,
    pub away_goals: u8,
}

/// Scores behind a resolution, all pairs in the tie's (home, away) orientation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreHistory {
    pub legs: Vec<LegScore>,
    /// Regulation total (equals the single leg's score for one-leg ties)
    pub aggregate: (u8, u8),
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_goals: Option<(u8, u8)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_time: Option<(u8, u8)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalties: Option<(u8, u8)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TieResolution {
    pub winner_id: TeamId,
    #[serde(rename = "resolution_type")]
    pub method: ResolutionMethod,
    pub score_history: ScoreHistory,
    /// Events of the extra-time period (minutes 91-120), if one was played
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_time_events: Vec<MatchEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shootout: Option<ShootoutResult>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShootoutKick {
    /// 1-based; rounds past the base count are sudden death
    pub round: u8,
    pub team_id: TeamId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    pub scored: bool,
}

/// Shootout between the sides of the match it was taken in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShootoutResult {
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_goals: u8,
    pub away_goals: u8,
    pub kicks: Vec<ShootoutKick>,
}

impl ShootoutResult {
    pub fn winner_side(&self) -> TieSide {
        if self.home_goals > self.away_goals {
            TieSide::Home
        } else {
            TieSide::Away
        }
    }

    pub fn winner_id(&self) -> TeamId {
        match self.winner_side() {
            TieSide::Home => self.home_team,
            TieSide::Away => self.away_team,
        }
    }
}
