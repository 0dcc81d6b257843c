//! Storage seam for the records resimulation touches.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{CompetitionId, MatchId, MatchRecord, PlayerId, PlayerRecord};
use crate::standings::StandingsTable;

/// Match, player and standings records held by the caller's data layer.
pub trait SeasonStore {
    fn load_match(&self, id: MatchId) -> Result<Option<MatchRecord>>;

    fn save_match(&mut self, record: MatchRecord) -> Result<()>;

    fn load_player(&self, id: PlayerId) -> Result<Option<PlayerRecord>>;

    fn save_player(&mut self, record: PlayerRecord) -> Result<()>;

    fn load_standings(&self, competition: CompetitionId) -> Result<Option<StandingsTable>>;

    fn save_standings(&mut self, table: StandingsTable) -> Result<()>;

    /// Run `f` as one unit of work: either every write it makes lands, or
    /// none do.
    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>;
}

/// In-process store. Transactions snapshot the whole store and restore it
/// when the closure fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    matches: HashMap<MatchId, MatchRecord>,
    players: HashMap<PlayerId, PlayerRecord>,
    standings: HashMap<CompetitionId, StandingsTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_match(&mut self, record: MatchRecord) {
        self.matches.insert(record.id, record);
    }

    pub fn insert_player(&mut self, record: PlayerRecord) {
        self.players.insert(record.player_id, record);
    }

    pub fn insert_standings(&mut self, table: StandingsTable) {
        self.standings.insert(table.competition_id, table);
    }

    pub fn match_record(&self, id: MatchId) -> Option<&MatchRecord> {
        self.matches.get(&id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    pub fn standings(&self, competition: CompetitionId) -> Option<&StandingsTable> {
        self.standings.get(&competition)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.players.values()
    }
}

impl SeasonStore for MemoryStore {
    fn load_match(&self, id: MatchId) -> Result<Option<MatchRecord>> {
        Ok(self.matches.get(&id).cloned())
    }

    fn save_match(&mut self, record: MatchRecord) -> Result<()> {
        self.insert_match(record);
        Ok(())
    }

    fn load_player(&self, id: PlayerId) -> Result<Option<PlayerRecord>> {
        Ok(self.players.get(&id).cloned())
    }

    fn save_player(&mut self, record: PlayerRecord) -> Result<()> {
        self.insert_player(record);
        Ok(())
    }

    fn load_standings(&self, competition: CompetitionId) -> Result<Option<StandingsTable>> {
        Ok(self.standings.get(&competition).cloned())
    }

    fn save_standings(&mut self, table: StandingsTable) -> Result<()> {
        self.insert_standings(table);
        Ok(())
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let snapshot = self.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                log::warn!("transaction rolled back: {err}");
                *self = snapshot;
                Err(err)
            }
        }
    }
}
