//! Fleet statistics, computed on demand.

use serde::Serialize;

use super::roster::FleetRoster;
use crate::domain::BusStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetStats {
    pub total_buses: usize,
    pub active_buses: usize,
    pub inactive_buses: usize,
    pub maintenance_buses: usize,
    pub total_capacity: u64,
    /// Mean load across buses as a percentage, one decimal place.
    pub average_load: f64,
    /// Arrival time of the soonest bus.
    pub next_arrival: Option<String>,
    /// Bus number of the highest-priority bus.
    pub priority_bus: Option<String>,
}

impl FleetStats {
    pub fn compute(roster: &FleetRoster) -> Self {
        let buses = roster.buses();
        let count = |status| roster.by_status(status).len();

        let average_load = if buses.is_empty() {
            0.0
        } else {
            let total: f64 = buses.iter().map(|b| b.load_factor() * 100.0).sum();
            (total / buses.len() as f64 * 10.0).round() / 10.0
        };

        FleetStats {
            total_buses: buses.len(),
            active_buses: count(BusStatus::Active),
            inactive_buses: count(BusStatus::Inactive),
            maintenance_buses: count(BusStatus::Maintenance),
            total_capacity: buses.iter().map(|b| b.capacity as u64).sum(),
            average_load,
            next_arrival: roster.next_arrival().map(|b| b.next_arrival.clone()),
            priority_bus: roster.top_priority().map(|b| b.bus_number.clone()),
        }
    }
}
