//! Request bodies, query strings and small responses for the HTTP adapter.

use serde::{Deserialize, Serialize};

use crate::domain::NewStop;

#[derive(Debug, Deserialize)]
pub struct CreateRouteRequest {
    pub route_name: String,
}

/// Route listing query; `q` switches to a search.
#[derive(Debug, Default, Deserialize)]
pub struct RouteQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddStopRequest {
    #[serde(flatten)]
    pub stop: NewStop,

    /// 1-based target position; appended when absent.
    pub position: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub new_order: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DistancesRequest {
    pub distances: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    pub route_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArrivalRequest {
    /// `HH:MM`; projected from the bus timings when absent.
    pub next_arrival: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
