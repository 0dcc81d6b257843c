pub mod events;
pub mod fixture;
pub mod match_record;
pub mod player;
pub mod team;
pub mod tie;

pub type TeamId = u32;
pub type PlayerId = u32;
pub type MatchId = u32;
pub type CompetitionId = u32;
pub type TieId = u32;

pub use events::{EventMetadata, EventType, InjuryDetail, InjuryKind, MatchEvent, SubstitutionDetail};
pub use fixture::Fixture;
pub use match_record::{CompetitionKind, MatchRecord, Mentality, SideSetup, Tactics};
pub use player::{InjuryRecord, PlayerRecord, Suspension};
pub use team::{Position, PositionGroup, RosterEntry, SwissTeam, TeamSheet};
pub use tie::{
    LegScore, ResolutionMethod, ScoreHistory, ShootoutKick, ShootoutResult, Tie, TieResolution,
    TieSide, TieState,
};
