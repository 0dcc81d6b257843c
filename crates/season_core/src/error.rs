use thiserror::Error;

use crate::models::{CompetitionId, MatchId, TeamId, TieId};

#[derive(Error, Debug)]
pub enum SeasonError {
    #[error("Round robin needs an even number of teams, found {found}")]
    OddTeamCount { found: usize },

    #[error("Too few teams: need at least {min}, found {found}")]
    TooFewTeams { min: usize, found: usize },

    #[error("Calendar length mismatch: expected {expected} dates, found {found}")]
    CalendarMismatch { expected: usize, found: usize },

    #[error("Team {team} appears more than once")]
    DuplicateTeam { team: TeamId },

    #[error("Pot {pot} must hold {expected} teams, found {found}")]
    InvalidPotSize { pot: u8, expected: usize, found: usize },

    #[error("Team {team} has unknown pot {pot}")]
    UnknownPot { team: TeamId, pot: u8 },

    #[error("Unknown position label: {0}")]
    InvalidPosition(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not generate a valid draw after {attempts} attempts")]
    DrawExhausted { attempts: u32 },

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Match {0} has not been played")]
    MatchNotPlayed(MatchId),

    #[error("Match {match_id} does not belong to tie {tie}")]
    TieLegMismatch { tie: TieId, match_id: MatchId },

    #[error("Invalid cutoff minute {minute} (must be 0..={max})")]
    InvalidCutoff { minute: u8, max: u8 },

    #[error("Team {team} does not play in match {match_id}")]
    TeamNotInMatch { match_id: MatchId, team: TeamId },

    #[error("Events of match {match_id} do not add up to its score")]
    ScoreEventMismatch { match_id: MatchId },

    #[error("Team {team} is not in the table of competition {competition}")]
    UnknownTeam { competition: CompetitionId, team: TeamId },

    #[error("Reverting a result would make team {team}'s record negative")]
    StandingsUnderflow { team: TeamId },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config parse error: {0}")]
    ConfigParse(String),
}

impl SeasonError {
    /// Whether calling again with fresh randomness can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SeasonError::DrawExhausted { .. } => true,
            SeasonError::Store(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for SeasonError {
    fn from(err: serde_json::Error) -> Self {
        SeasonError::ConfigParse(err.to_string())
    }
}

impl From<serde_yaml::Error> for SeasonError {
    fn from(err: serde_yaml::Error) -> Self {
        SeasonError::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SeasonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SeasonError::DrawExhausted { attempts: 200 }.is_retryable());
        assert!(!SeasonError::OddTeamCount { found: 5 }.is_retryable());
        assert!(!SeasonError::InvalidPotSize { pot: 2, expected: 9, found: 8 }.is_retryable());
    }

    #[test]
    fn test_messages_name_the_problem() {
        let err = SeasonError::CalendarMismatch { expected: 6, found: 5 };
        assert_eq!(err.to_string(), "Calendar length mismatch: expected 6 dates, found 5");
    }
}
