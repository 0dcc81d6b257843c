//! # season_core - Football Season Simulation Core
//!
//! Fixture scheduling, statistical match simulation, knockout resolution,
//! league tables and event-replay resimulation for a football season.
//!
//! ## Features
//! - Double round robin by the circle method (N-2 venue breaks)
//! - Pot-seeded Swiss league-phase draw (opponents, Euler orientation, rounds)
//! - Poisson match engine with position-weighted events, extra time and shootouts
//! - Single- and two-legged ties that always produce one winner
//! - Reversible league tables
//! - Transactional resimulation from any minute
//!
//! Every randomized routine takes an explicit `&mut impl Rng`; seed a
//! `ChaCha8Rng` for reproducible output.

// Event generators take the window, both rosters, discipline state and minute slots
#![allow(clippy::too_many_arguments)]
// Circle-method rotation and matching search index parallel per-team arrays
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod engine;
pub mod error;
pub mod knockout;
pub mod models;
pub mod resim;
pub mod schedule;
pub mod standings;

pub use config::{DisciplineConfig, MatchEngineConfig, ShootoutConfig, SimConfig, SwissConfig};
pub use engine::{Discipline, MatchEngine, Period, SimWindow, SimulatedMatch};
pub use error::{Result, SeasonError};
pub use knockout::{KnockoutResolver, ResolveOutcome};
pub use resim::{MemoryStore, ResimOutcome, ResimRequest, ResimulationEngine, SeasonStore, Substitution};
pub use schedule::{matchday_count, DrawField, RoundRobinScheduler, SwissDraw};
pub use standings::{LeagueResult, StandingRow, StandingsTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
