use serde::{Deserialize, Serialize};

use super::{InjuryKind, MatchId, PlayerId, Position, TeamId};

/// Ban caused by a red card. Tied to the card that produced it so it can be
/// lifted if that card is erased.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suspension {
    pub match_id: MatchId,
    pub minute: u8,
    pub matches_remaining: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InjuryRecord {
    pub match_id: MatchId,
    pub minute: u8,
    pub kind: InjuryKind,
    pub weeks: u8,
}

/// Per-player season counters held by the data layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub position: Position,
    #[serde(default)]
    pub appearances: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub own_goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub yellow_cards: u32,
    #[serde(default)]
    pub red_cards: u32,
    #[serde(default)]
    pub suspensions: Vec<Suspension>,
    #[serde(default)]
    pub injury: Option<InjuryRecord>,
    #[serde(default)]
    pub goals_conceded: u32,
    #[serde(default)]
    pub clean_sheets: u32,
}

impl PlayerRecord {
    pub fn new(player_id: PlayerId, team_id: TeamId, position: Position) -> Self {
        Self {
            player_id,
            team_id,
            position,
            appearances: 0,
            goals: 0,
            own_goals: 0,
            assists: 0,
            yellow_cards: 0,
            red_cards: 0,
            suspensions: Vec::new(),
            injury: None,
            goals_conceded: 0,
            clean_sheets: 0,
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspensions.iter().any(|s| s.matches_remaining > 0)
    }

    pub fn is_injured(&self) -> bool {
        self.injury.is_some()
    }
}
