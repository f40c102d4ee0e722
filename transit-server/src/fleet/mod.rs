//! Fleet management: the bus roster and its arrival and priority views.

mod roster;
mod stats;
pub mod views;

pub use roster::FleetRoster;
pub use stats::FleetStats;

use crate::domain::TimeOfDay;

/// Tunables for roster ordering and allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetPolicy {
    /// Arrival time assumed when a bus's `next_arrival` does not parse.
    pub fallback_arrival: TimeOfDay,
    /// Route demand given to a bus when it is allocated to a route.
    pub allocation_demand: u32,
}

impl Default for FleetPolicy {
    fn default() -> Self {
        Self {
            fallback_arrival: TimeOfDay::from_hm(8, 0),
            allocation_demand: 50,
        }
    }
}
