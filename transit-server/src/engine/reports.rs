//! Request and result shapes for engine operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Bus, BusStatus, RouteId, StopName};
use crate::fleet::FleetStats;
use crate::network::{Edge, RouteSegment};
use crate::routes::RouteStats;
use crate::tickets::TicketStats;
use crate::tracking::JourneyProgress;

/// Congestion on an edge, from how many buses serve its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLevel {
    Low,
    Medium,
    High,
}

impl TrafficLevel {
    pub fn from_bus_count(count: usize) -> Self {
        match count {
            0 => TrafficLevel::Low,
            1 => TrafficLevel::Medium,
            _ => TrafficLevel::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeTraffic {
    #[serde(flatten)]
    pub edge: Edge,
    pub bus_count: usize,
    pub traffic: TrafficLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub stops: Vec<StopName>,
    pub edges: Vec<EdgeTraffic>,
}

/// A shortest path annotated with the routes it rides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlan {
    pub path: Vec<StopName>,
    pub distance: f64,
    /// Number of hops.
    pub stops: usize,
    pub route_id: Option<RouteId>,
    pub route_name: Option<String>,
    pub bus_count: usize,
    pub traffic: TrafficLevel,
    pub segments: Vec<RouteSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrioritizedBus {
    #[serde(flatten)]
    pub bus: Bus,
    pub priority_score: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusFilter {
    pub status: Option<BusStatus>,
    pub route_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub passenger_id: String,
    #[serde(default)]
    pub passenger_name: String,
    pub from_stop: String,
    pub to_stop: String,
    #[serde(default)]
    pub bus_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JourneyRequest {
    pub passenger_id: String,
    pub start_stop: String,
    pub end_stop: String,
    #[serde(default)]
    pub bus_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyStatusReport {
    pub journey_id: String,
    #[serde(flatten)]
    pub progress: JourneyProgress,
}

/// Result of an undo or redo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryOutcome {
    pub message: String,
    pub store: &'static str,
}

/// Whole-system summary for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub fleet: FleetStats,
    pub routes: RouteStats,
    /// Distinct stop names across all routes.
    pub unique_stops: usize,
    /// Sum of all inter-stop distances, two decimals.
    pub total_distance: f64,
    pub tickets: TicketStats,
    pub bus_types: BTreeMap<String, usize>,
    pub route_bus_counts: BTreeMap<String, usize>,
}
