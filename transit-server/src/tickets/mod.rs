//! Ticket issuing and lookup.

mod index;

pub use index::{TicketDraft, TicketIndex, TicketStats, compute_fare};

/// Fare rates per distance unit and the minimum charge.
#[derive(Debug, Clone, PartialEq)]
pub struct FareConfig {
    pub regular_rate: f64,
    pub air_conditioned_rate: f64,
    pub minimum_fare: f64,
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            regular_rate: 2.5,
            air_conditioned_rate: 3.5,
            minimum_fare: 10.0,
        }
    }
}
