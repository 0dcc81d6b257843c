//! Fixture generation: double round robin for leagues, Swiss draw for a
//! pot-seeded league phase.

pub mod round_robin;
pub mod swiss;

pub use round_robin::{matchday_count, RoundRobinScheduler};
pub use swiss::{DrawField, SwissDraw};
