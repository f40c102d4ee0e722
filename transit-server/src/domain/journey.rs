//! Journey types.
//!
//! A `Journey` is a passenger trip along a shortest path computed when the
//! journey started. Progress along it is derived from elapsed time by the
//! tracking simulator; the stored record only caches the last result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StopName;

/// One traversed edge of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Stop the segment leaves from
    pub from: StopName,
    /// Stop the segment arrives at
    pub to: StopName,
    /// Edge weight in distance units
    pub distance: f64,
}

impl Segment {
    pub fn new(from: StopName, to: StopName, distance: f64) -> Self {
        Self { from, to, distance }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    #[default]
    InTransit,
    ApproachingDestination,
}

/// A journey in progress.
///
/// # Invariants
///
/// - `segments` follow `path` from start to end
/// - `distance` is the sum of segment distances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub journey_id: String,
    pub passenger_id: String,
    pub start_stop: StopName,
    pub end_stop: StopName,
    /// Bus the passenger is riding, if one was chosen
    #[serde(default)]
    pub bus_number: Option<String>,
    /// Cruising speed used to convert elapsed time into distance
    pub speed_kph: f64,
    pub path: Vec<StopName>,
    pub segments: Vec<Segment>,
    /// Total path distance
    pub distance: f64,
    #[serde(default)]
    pub status: JourneyStatus,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub start_time: DateTime<Utc>,
    /// Distance covered as of `last_updated`
    #[serde(default)]
    pub distance_covered: f64,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub last_updated: DateTime<Utc>,
}
