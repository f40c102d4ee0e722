//! The transit engine: every store behind one service object.

mod reports;
mod service;

#[cfg(test)]
mod tests;

pub use reports::{
    BookingRequest, BusFilter, EdgeTraffic, HistoryOutcome, JourneyRequest, JourneyStatusReport,
    NetworkSnapshot, Overview, PrioritizedBus, TrafficLevel, TripPlan,
};
pub use service::TransitEngine;
