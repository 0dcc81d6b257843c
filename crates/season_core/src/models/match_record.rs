use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CompetitionId, Fixture, MatchEvent, MatchId, RosterEntry, TeamId, TeamSheet};

/// Which table (if any) a match result feeds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CompetitionKind {
    League(CompetitionId),
    Cup(CompetitionId),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mentality {
    VeryDefensive,
    Defensive,
    #[default]
    Balanced,
    Attacking,
    VeryAttacking,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tactics {
    pub formation: String,
    #[serde(default)]
    pub mentality: Mentality,
}

impl Default for Tactics {
    fn default() -> Self {
        Self { formation: "4-4-2".to_string(), mentality: Mentality::Balanced }
    }
}

/// One side of a match as it was set up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SideSetup {
    pub team_id: TeamId,
    pub strength: f64,
    #[serde(default)]
    pub tactics: Tactics,
    /// Starting lineup
    #[serde(default)]
    pub lineup: Vec<RosterEntry>,
}

impl SideSetup {
    pub fn new(team_id: TeamId, strength: f64, lineup: Vec<RosterEntry>) -> Self {
        Self { team_id, strength, tactics: Tactics::default(), lineup }
    }

    pub fn sheet(&self) -> TeamSheet {
        TeamSheet::new(self.team_id, self.strength, self.lineup.clone())
    }
}

/// Match as held by the caller's data layer. The core only touches the score,
/// the played flag, tactics and the event list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub id: MatchId,
    pub competition: CompetitionKind,
    pub round: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub home: SideSetup,
    pub away: SideSetup,
    pub home_score: u8,
    pub away_score: u8,
    pub played: bool,
    /// Minute-ordered
    #[serde(default)]
    pub events: Vec<MatchEvent>,
}

impl MatchRecord {
    pub fn new(id: MatchId, competition: CompetitionKind, round: u32, home: SideSetup, away: SideSetup) -> Self {
        Self {
            id,
            competition,
            round,
            date: None,
            home,
            away,
            home_score: 0,
            away_score: 0,
            played: false,
            events: Vec::new(),
        }
    }

    /// Unplayed match for a scheduled fixture.
    pub fn from_fixture(id: MatchId, competition: CompetitionKind, fixture: &Fixture, home: SideSetup, away: SideSetup) -> Self {
        let mut record = Self::new(id, competition, fixture.round, home, away);
        record.date = Some(fixture.date);
        record
    }

    pub fn home_team(&self) -> TeamId {
        self.home.team_id
    }

    pub fn away_team(&self) -> TeamId {
        self.away.team_id
    }

    pub fn score(&self) -> (u8, u8) {
        (self.home_score, self.away_score)
    }

    pub fn league_id(&self) -> Option<CompetitionId> {
        match self.competition {
            CompetitionKind::League(id) => Some(id),
            CompetitionKind::Cup(_) => None,
        }
    }

    /// Store a simulated outcome and mark the match played.
    pub fn record_result(&mut self, home_score: u8, away_score: u8, mut events: Vec<MatchEvent>) {
        events.sort_by_key(|e| e.minute);
        self.home_score = home_score;
        self.away_score = away_score;
        self.events = events;
        self.played = true;
    }

    /// Sheet for `team` as it stood at `minute`: the starting lineup with
    /// every substitution made by then.
    pub fn sheet_at(&self, team: TeamId, minute: u8) -> Option<TeamSheet> {
        let mut sheet = self.side_of(team)?.sheet();
        sheet.apply_substitutions(self.events.iter().filter(|e| !e.is_after(minute)));
        Some(sheet)
    }

    pub fn side_of(&self, team: TeamId) -> Option<&SideSetup> {
        if self.home.team_id == team {
            Some(&self.home)
        } else if self.away.team_id == team {
            Some(&self.away)
        } else {
            None
        }
    }

    /// Goals conceded by `team` under the current score.
    pub fn conceded_by(&self, team: TeamId) -> Option<u8> {
        if self.home.team_id == team {
            Some(self.away_score)
        } else if self.away.team_id == team {
            Some(self.home_score)
        } else {
            None
        }
    }
}
