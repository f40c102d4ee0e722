//! HTTP adapter over the transit engine.
//!
//! Plain JSON endpoints; every handler delegates to [`TransitEngine`](crate::engine::TransitEngine).

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
