//! League tables.
//!
//! Rows are updated incrementally per result and fully re-ranked after every
//! change: points, goal difference, goals for, then team id ascending.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{Result, SeasonError};
use crate::models::{CompetitionId, MatchRecord, TeamId};

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandingRow {
    pub team_id: TeamId,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    /// 1-based rank
    pub position: u32,
    /// Rank before the latest re-rank
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_position: Option<u32>,
}

impl StandingRow {
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
            position: 0,
            previous_position: None,
        }
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .points
            .cmp(&self.points)
            .then_with(|| other.goal_difference().cmp(&self.goal_difference()))
            .then_with(|| other.goals_for.cmp(&self.goals_for))
            .then_with(|| self.team_id.cmp(&other.team_id))
    }
}

/// A league result as the table sees it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeagueResult {
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_goals: u8,
    pub away_goals: u8,
}

impl LeagueResult {
    pub fn new(home_team: TeamId, away_team: TeamId, home_goals: u8, away_goals: u8) -> Self {
        Self { home_team, away_team, home_goals, away_goals }
    }

    pub fn from_match(record: &MatchRecord) -> Self {
        Self::new(record.home_team(), record.away_team(), record.home_score, record.away_score)
    }
}

/// One side's contribution of a result.
#[derive(Debug, Clone, Copy)]
struct RowDelta {
    won: u32,
    drawn: u32,
    lost: u32,
    goals_for: u32,
    goals_against: u32,
    points: u32,
}

impl RowDelta {
    fn new(scored: u8, conceded: u8) -> Self {
        let (won, drawn, lost) = match scored.cmp(&conceded) {
            Ordering::Greater => (1, 0, 0),
            Ordering::Equal => (0, 1, 0),
            Ordering::Less => (0, 0, 1),
        };
        Self {
            won,
            drawn,
            lost,
            goals_for: u32::from(scored),
            goals_against: u32::from(conceded),
            points: won * POINTS_FOR_WIN + drawn * POINTS_FOR_DRAW,
        }
    }

    fn added_to(&self, row: &StandingRow) -> StandingRow {
        StandingRow {
            played: row.played + 1,
            won: row.won + self.won,
            drawn: row.drawn + self.drawn,
            lost: row.lost + self.lost,
            goals_for: row.goals_for + self.goals_for,
            goals_against: row.goals_against + self.goals_against,
            points: row.points + self.points,
            ..row.clone()
        }
    }

    fn removed_from(&self, row: &StandingRow) -> Option<StandingRow> {
        Some(StandingRow {
            played: row.played.checked_sub(1)?,
            won: row.won.checked_sub(self.won)?,
            drawn: row.drawn.checked_sub(self.drawn)?,
            lost: row.lost.checked_sub(self.lost)?,
            goals_for: row.goals_for.checked_sub(self.goals_for)?,
            goals_against: row.goals_against.checked_sub(self.goals_against)?,
            points: row.points.checked_sub(self.points)?,
            ..row.clone()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandingsTable {
    pub competition_id: CompetitionId,
    /// Kept in rank order
    pub rows: Vec<StandingRow>,
}

impl StandingsTable {
    pub fn new(competition_id: CompetitionId, teams: &[TeamId]) -> Result<Self> {
        let mut rows: Vec<StandingRow> = Vec::with_capacity(teams.len());
        for &team in teams {
            if rows.iter().any(|r| r.team_id == team) {
                return Err(SeasonError::DuplicateTeam { team });
            }
            rows.push(StandingRow::new(team));
        }
        let mut table = Self { competition_id, rows };
        table.assign_positions();
        for row in &mut table.rows {
            row.previous_position = None;
        }
        Ok(table)
    }

    /// Table built by applying `results` in order.
    pub fn from_results(competition_id: CompetitionId, teams: &[TeamId], results: &[LeagueResult]) -> Result<Self> {
        let mut table = Self::new(competition_id, teams)?;
        for result in results {
            table.apply(result)?;
        }
        Ok(table)
    }

    pub fn row(&self, team: TeamId) -> Option<&StandingRow> {
        self.rows.iter().find(|r| r.team_id == team)
    }

    /// Rows in rank order.
    pub fn ranked(&self) -> &[StandingRow] {
        &self.rows
    }

    pub fn apply(&mut self, result: &LeagueResult) -> Result<()> {
        self.apply_unranked(result)?;
        self.rerank();
        Ok(())
    }

    /// Exact inverse of `apply` for the same result.
    pub fn revert(&mut self, result: &LeagueResult) -> Result<()> {
        self.revert_unranked(result)?;
        self.rerank();
        Ok(())
    }

    /// Swap a recorded result for a corrected one. Nothing changes on error.
    pub fn correct(&mut self, old: &LeagueResult, new: &LeagueResult) -> Result<()> {
        let mut next = self.clone();
        next.revert_unranked(old)?;
        next.apply_unranked(new)?;
        next.rerank();
        log::debug!(
            "competition {}: corrected {}-{} {}-{} to {}-{}",
            self.competition_id,
            old.home_team,
            old.away_team,
            old.home_goals,
            old.away_goals,
            new.home_goals,
            new.away_goals
        );
        *self = next;
        Ok(())
    }

    /// Re-sort every row, remembering each row's rank before the sort.
    pub fn rerank(&mut self) {
        for row in &mut self.rows {
            row.previous_position = Some(row.position);
        }
        self.assign_positions();
    }

    fn assign_positions(&mut self) {
        self.rows.sort_by(StandingRow::rank_cmp);
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.position = i as u32 + 1;
        }
    }

    fn index_pair(&self, result: &LeagueResult) -> Result<(usize, usize)> {
        if result.home_team == result.away_team {
            return Err(SeasonError::DuplicateTeam { team: result.home_team });
        }
        let find = |team: TeamId| {
            self.rows
                .iter()
                .position(|r| r.team_id == team)
                .ok_or(SeasonError::UnknownTeam { competition: self.competition_id, team })
        };
        Ok((find(result.home_team)?, find(result.away_team)?))
    }

    fn apply_unranked(&mut self, result: &LeagueResult) -> Result<()> {
        let (home, away) = self.index_pair(result)?;
        self.rows[home] = RowDelta::new(result.home_goals, result.away_goals).added_to(&self.rows[home]);
        self.rows[away] = RowDelta::new(result.away_goals, result.home_goals).added_to(&self.rows[away]);
        Ok(())
    }

    fn revert_unranked(&mut self, result: &LeagueResult) -> Result<()> {
        let (home, away) = self.index_pair(result)?;
        let home_row = RowDelta::new(result.home_goals, result.away_goals)
            .removed_from(&self.rows[home])
            .ok_or(SeasonError::StandingsUnderflow { team: result.home_team })?;
        let away_row = RowDelta::new(result.away_goals, result.home_goals)
            .removed_from(&self.rows[away])
            .ok_or(SeasonError::StandingsUnderflow { team: result.away_team })?;
        self.rows[home] = home_row;
        self.rows[away] = away_row;
        Ok(())
    }
}
