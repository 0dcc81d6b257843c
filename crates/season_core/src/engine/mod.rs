//! Match simulation: Poisson scores, position-weighted event attribution,
//! extra time and penalty shootouts.

pub mod match_engine;
pub mod poisson;
pub mod weights;

pub use match_engine::{Discipline, MatchEngine, Period, SimWindow, SimulatedMatch};
pub use poisson::sample_poisson;
pub use weights::{pick_weighted, EventRole};
