//! Domain types for the transit operations engine.
//!
//! This module contains the validated records shared by every store:
//! stops, routes, buses, tickets and journeys, plus the error taxonomy.
//! Types that carry invariants enforce them at construction time.

mod bus;
mod error;
mod journey;
mod route;
mod stop;
mod ticket;
mod time;
mod timestamp;

pub use bus::{
    Bus, BusId, BusStatus, BusType, BusUpdate, DEFAULT_NEXT_ARRIVAL, NewBus, Timing,
};
pub use error::{HistoryStack, NotFound, StateError, TransitError, ValidationError};
pub use journey::{Journey, JourneyStatus, Segment};
pub use route::{
    DEFAULT_WAIT_MINUTES, NewStop, RouteId, RouteStopEntry, StopUpdate, validate_distance,
};
pub use stop::{InvalidStopName, StopName};
pub use ticket::{Ticket, TicketStatus};
pub use time::{TimeError, TimeOfDay};
