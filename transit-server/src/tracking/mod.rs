//! Journey tracking: stored journeys and the time-based progress simulator.

mod registry;
mod simulator;

pub use registry::JourneyRegistry;
pub use simulator::{JourneyProgress, Position, advance};
