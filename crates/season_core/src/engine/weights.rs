//! Position weight tables for picking the player behind an event.

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{PositionGroup, RosterEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRole {
    Scorer,
    Assister,
    /// Player putting the ball into their own net
    OwnGoal,
    Booking,
    Injury,
}

pub fn position_weight(role: EventRole, group: PositionGroup) -> f64 {
    use PositionGroup::*;
    match (role, group) {
        (EventRole::Scorer, Forward) => 6.0,
        (EventRole::Scorer, Midfielder) => 3.0,
        (EventRole::Scorer, Defender) => 1.0,
        (EventRole::Scorer, Goalkeeper) => 0.0,

        (EventRole::Assister, Midfielder) => 5.0,
        (EventRole::Assister, Forward) => 3.0,
        (EventRole::Assister, Defender) => 2.0,
        (EventRole::Assister, Goalkeeper) => 0.2,

        (EventRole::OwnGoal, Defender) => 6.0,
        (EventRole::OwnGoal, Midfielder) => 2.0,
        (EventRole::OwnGoal, Goalkeeper) => 1.0,
        (EventRole::OwnGoal, Forward) => 0.5,

        (EventRole::Booking, Defender) => 4.0,
        (EventRole::Booking, Midfielder) => 4.0,
        (EventRole::Booking, Forward) => 2.0,
        (EventRole::Booking, Goalkeeper) => 0.5,

        (EventRole::Injury, Goalkeeper) => 1.0,
        (EventRole::Injury, _) => 3.0,
    }
}

/// Weighted pick; falls back to a uniform pick when every weight is zero.
pub fn pick_weighted<'a, R: Rng + ?Sized>(
    candidates: &[&'a RosterEntry],
    role: EventRole,
    rng: &mut R,
) -> Option<&'a RosterEntry> {
    if candidates.is_empty() {
        return None;
    }
    let weights = candidates.iter().map(|p| position_weight(role, p.position.group()));
    match WeightedIndex::new(weights) {
        Ok(dist) => Some(candidates[dist.sample(rng)]),
        Err(_) => candidates.choose(rng).copied(),
    }
}
