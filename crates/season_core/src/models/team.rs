use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{EventType, MatchEvent, PlayerId, TeamId};
use crate::error::SeasonError;

/// Team identity as seen by the Swiss draw: pot and association only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwissTeam {
    pub id: TeamId,
    /// 1-based pot number
    pub pot: u8,
    pub country: String,
}

impl SwissTeam {
    pub fn new(id: TeamId, pot: u8, country: impl Into<String>) -> Self {
        Self { id, pot, country: country.into() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    GK,
    LB,
    CB,
    RB,
    LWB,
    RWB,
    CDM,
    CM,
    CAM,
    LM,
    RM,
    LW,
    RW,
    CF,
    ST,
    // Generic positions
    DF,
    MF,
    FW,
}

/// Coarse position bucket the weight tables are keyed on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PositionGroup {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub fn group(&self) -> PositionGroup {
        match self {
            Position::GK => PositionGroup::Goalkeeper,
            Position::LB
            | Position::CB
            | Position::RB
            | Position::LWB
            | Position::RWB
            | Position::DF => PositionGroup::Defender,
            Position::CDM
            | Position::CM
            | Position::CAM
            | Position::LM
            | Position::RM
            | Position::MF => PositionGroup::Midfielder,
            Position::LW | Position::RW | Position::CF | Position::ST | Position::FW => {
                PositionGroup::Forward
            }
        }
    }

    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, Position::GK)
    }
}

impl FromStr for Position {
    type Err = SeasonError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let position = match label.trim().to_ascii_uppercase().as_str() {
            "GK" | "G" | "GOALKEEPER" => Position::GK,
            "LB" => Position::LB,
            "CB" => Position::CB,
            "RB" => Position::RB,
            "LWB" => Position::LWB,
            "RWB" => Position::RWB,
            "CDM" | "DM" => Position::CDM,
            "CM" => Position::CM,
            "CAM" | "AM" => Position::CAM,
            "LM" => Position::LM,
            "RM" => Position::RM,
            "LW" => Position::LW,
            "RW" => Position::RW,
            "CF" => Position::CF,
            "ST" => Position::ST,
            "D" | "DF" | "DEF" | "DEFENDER" => Position::DF,
            "M" | "MF" | "MID" | "MIDFIELDER" => Position::MF,
            "F" | "FW" | "FWD" | "FORWARD" | "ATTACKER" => Position::FW,
            _ => return Err(SeasonError::InvalidPosition(label.to_string())),
        };
        Ok(position)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub position: Position,
}

impl RosterEntry {
    pub fn new(player_id: PlayerId, position: Position) -> Self {
        Self { player_id, position }
    }
}

/// What the match engine needs to know about one side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamSheet {
    pub team_id: TeamId,
    /// Caller-derived strength proxy; only its share of the combined strength matters.
    pub strength: f64,
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
}

impl TeamSheet {
    pub fn new(team_id: TeamId, strength: f64, roster: Vec<RosterEntry>) -> Self {
        Self { team_id, strength, roster }
    }

    /// Sheet without players: score-only simulation.
    pub fn bare(team_id: TeamId, strength: f64) -> Self {
        Self { team_id, strength, roster: Vec::new() }
    }

    pub fn goalkeepers(&self) -> impl Iterator<Item = &RosterEntry> {
        self.roster.iter().filter(|p| p.position.is_goalkeeper())
    }

    /// Take `player_off` out and bring `player_on` in. Repeating a change
    /// leaves the roster as it is.
    pub fn substitute(&mut self, player_off: PlayerId, player_on: RosterEntry) {
        self.roster.retain(|p| p.player_id != player_off);
        if !self.roster.iter().any(|p| p.player_id == player_on.player_id) {
            self.roster.push(player_on);
        }
    }

    /// Replay this side's substitution events, in order.
    pub fn apply_substitutions<'a>(&mut self, events: impl IntoIterator<Item = &'a MatchEvent>) {
        for event in events {
            if event.event_type != EventType::Substitution || event.team_id != self.team_id {
                continue;
            }
            if let (Some(player_off), Some(detail)) = (event.player_id, event.substitution_detail()) {
                self.substitute(player_off, RosterEntry::new(detail.player_in, detail.position));
            }
        }
    }
}
