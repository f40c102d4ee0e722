//! Application state for the web layer.

use std::sync::Arc;

use crate::engine::TransitEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TransitEngine>,
}

impl AppState {
    pub fn new(engine: TransitEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
