use serde::{Deserialize, Serialize};

use super::{PlayerId, Position, RosterEntry, TeamId};

/// Length of regulation time. Stoppage minutes (91-93) belong to the 90th minute
/// when compared against a resimulation cutoff.
pub const REGULATION_MINUTES: u8 = 90;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEvent {
    /// 1..=120
    pub minute: u8,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Team of the acting player. For an own goal this is the conceding side.
    pub team_id: TeamId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Goal,
    /// Scored into own team's net
    OwnGoal,
    Assist,
    YellowCard,
    RedCard,
    Injury,
    Substitution,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub injury: Option<InjuryDetail>,
    /// Set on a red card produced by a second booking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_yellow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution: Option<SubstitutionDetail>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InjuryDetail {
    pub kind: InjuryKind,
    pub weeks: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubstitutionDetail {
    pub player_in: PlayerId,
    /// Where the incoming player lines up
    pub position: Position,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InjuryKind {
    MuscleStrain,
    Hamstring,
    AnkleSprain,
    Groin,
    Concussion,
    KneeLigament,
    BrokenBone,
}

impl InjuryKind {
    pub const ALL: [InjuryKind; 7] = [
        InjuryKind::MuscleStrain,
        InjuryKind::Hamstring,
        InjuryKind::AnkleSprain,
        InjuryKind::Groin,
        InjuryKind::Concussion,
        InjuryKind::KneeLigament,
        InjuryKind::BrokenBone,
    ];

    /// Inclusive (min, max) weeks out
    pub fn week_range(&self) -> (u8, u8) {
        match self {
            InjuryKind::MuscleStrain => (1, 3),
            InjuryKind::Hamstring => (2, 6),
            InjuryKind::AnkleSprain => (1, 4),
            InjuryKind::Groin => (1, 3),
            InjuryKind::Concussion => (1, 2),
            InjuryKind::KneeLigament => (6, 16),
            InjuryKind::BrokenBone => (6, 12),
        }
    }
}

impl MatchEvent {
    pub fn new(minute: u8, event_type: EventType, team_id: TeamId, player_id: Option<PlayerId>) -> Self {
        Self { minute, event_type, team_id, player_id, metadata: None }
    }

    /// `player_off` leaves and `player_on` comes on for `team_id`.
    pub fn substitution(minute: u8, team_id: TeamId, player_off: PlayerId, player_on: RosterEntry) -> Self {
        Self::new(minute, EventType::Substitution, team_id, Some(player_off)).with_metadata(EventMetadata {
            substitution: Some(SubstitutionDetail { player_in: player_on.player_id, position: player_on.position }),
            ..Default::default()
        })
    }

    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Minute used for cutoff comparisons (stoppage time folds into 90).
    pub fn regulation_minute(&self) -> u8 {
        self.minute.min(REGULATION_MINUTES)
    }

    pub fn is_after(&self, cutoff: u8) -> bool {
        self.regulation_minute() > cutoff
    }

    /// Team credited with the goal, if this event is one.
    pub fn scoring_team(&self, home_team: TeamId, away_team: TeamId) -> Option<TeamId> {
        match self.event_type {
            EventType::Goal => Some(self.team_id),
            EventType::OwnGoal => {
                if self.team_id == home_team {
                    Some(away_team)
                } else {
                    Some(home_team)
                }
            }
            _ => None,
        }
    }

    pub fn is_second_yellow(&self) -> bool {
        self.metadata.as_ref().and_then(|m| m.second_yellow).unwrap_or(false)
    }

    pub fn injury(&self) -> Option<InjuryDetail> {
        self.metadata.as_ref().and_then(|m| m.injury)
    }

    pub fn substitution_detail(&self) -> Option<SubstitutionDetail> {
        self.metadata.as_ref().and_then(|m| m.substitution)
    }

    pub fn player_in(&self) -> Option<PlayerId> {
        self.substitution_detail().map(|s| s.player_in)
    }
}

/// Score implied by a set of events, in (home, away) order.
pub fn score_from_events<'a>(
    events: impl IntoIterator<Item = &'a MatchEvent>,
    home_team: TeamId,
    away_team: TeamId,
) -> (u8, u8) {
    let mut score = (0u8, 0u8);
    for event in events {
        match event.scoring_team(home_team, away_team) {
            Some(team) if team == home_team => score.0 = score.0.saturating_add(1),
            Some(_) => score.1 = score.1.saturating_add(1),
            None => {}
        }
    }
    score
}
