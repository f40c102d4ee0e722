//! Error taxonomy for transit operations.
//!
//! Every engine operation returns a [`TransitError`] on failure. The four
//! variants map onto how a caller should react: look something else up,
//! fix the request, retry after the state changes, or report a fault.

use crate::storage::StorageError;

use super::BusId;

/// The top-level error for transit operations.
#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] StorageError),
}

/// A referenced entity does not exist.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotFound {
    #[error("route not found: {0}")]
    Route(String),

    #[error("bus not found: {0}")]
    Bus(BusId),

    #[error("no available bus with number {0}")]
    BusNumber(String),

    #[error("ticket not found: {0}")]
    Ticket(String),

    #[error("journey not found: {0}")]
    Journey(String),

    #[error("stop not found: {0}")]
    Stop(String),
}

/// The request was malformed or violates a constraint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("distance must be a finite non-negative number, got {0}")]
    InvalidDistance(f64),

    #[error("a route named {0:?} already exists")]
    DuplicateRouteName(String),

    #[error("route name cannot be empty")]
    EmptyRouteName,

    #[error("stop name cannot be empty")]
    EmptyStopName,

    #[error("position {position} out of range for route with {len} stops")]
    IndexOutOfRange { position: usize, len: usize },

    #[error("reorder must list exactly {expected} positions, got {actual}")]
    ReorderLength { expected: usize, actual: usize },

    #[error("reorder is not a permutation: index {0} is repeated or out of range")]
    ReorderNotPermutation(usize),

    #[error("missing required field: {0}")]
    MissingBusField(&'static str),

    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    #[error("a bus number is required")]
    BusSelectionRequired,

    #[error("invalid arrival time {0:?}, expected HH:MM")]
    InvalidArrivalTime(String),

    #[error("route needs at least 2 stops, has {0}")]
    RouteTooShort(usize),

    #[error("expected {expected} distances, got {actual}")]
    DistanceCount { expected: usize, actual: usize },
}

/// Which stack of the action log an operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStack {
    Undo,
    Redo,
}

impl std::fmt::Display for HistoryStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryStack::Undo => f.write_str("undo"),
            HistoryStack::Redo => f.write_str("redo"),
        }
    }
}

/// The operation is valid but not possible in the current state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("no path between {from} and {to}")]
    NoPath { from: String, to: String },

    #[error("bus {bus_number} is full ({capacity} passengers)")]
    BusFull { bus_number: String, capacity: u32 },

    #[error("nothing to {0}")]
    EmptyStack(HistoryStack),

    #[error("ticket {0} is already cancelled")]
    TicketAlreadyCancelled(String),
}
