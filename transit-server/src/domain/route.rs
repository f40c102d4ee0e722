//! Route identifiers and the stop entries that make up a route.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{StopName, ValidationError};

/// Default dwell time at a stop, in minutes.
pub const DEFAULT_WAIT_MINUTES: u32 = 5;

/// Identifier of a route (a UUID v4 string for routes created here).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        RouteId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RouteId {
    fn from(value: &str) -> Self {
        RouteId(value.to_string())
    }
}

impl From<String> for RouteId {
    fn from(value: String) -> Self {
        RouteId(value)
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stop on a route.
///
/// `distance_from_previous` is measured from the entry before this one in
/// the route's sequence. The owning sequence keeps it at zero for the first
/// entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStopEntry {
    pub stop_name: StopName,
    #[serde(default = "default_wait")]
    pub wait_time: u32,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub distance_from_previous: f64,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub added_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "super::timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_wait() -> u32 {
    DEFAULT_WAIT_MINUTES
}

/// Caller-supplied fields for a new stop entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStop {
    pub stop_name: String,
    pub wait_time: Option<u32>,
    pub location: Option<String>,
    pub distance_from_previous: Option<f64>,
}

impl NewStop {
    pub fn named(stop_name: impl Into<String>) -> Self {
        Self {
            stop_name: stop_name.into(),
            ..Self::default()
        }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance_from_previous = Some(distance);
        self
    }
}

/// Replacement fields for an existing stop entry.
///
/// A missing distance keeps the stored one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopUpdate {
    pub stop_name: String,
    pub wait_time: Option<u32>,
    pub location: Option<String>,
    pub distance_from_previous: Option<f64>,
}

impl RouteStopEntry {
    /// Validate caller input into an entry stamped with `now`.
    pub fn from_new(new: NewStop, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let stop_name =
            StopName::parse(&new.stop_name).map_err(|_| ValidationError::EmptyStopName)?;
        let distance = validate_distance(new.distance_from_previous.unwrap_or(0.0))?;
        Ok(Self {
            stop_name,
            wait_time: new.wait_time.unwrap_or(DEFAULT_WAIT_MINUTES),
            location: new.location.unwrap_or_default(),
            distance_from_previous: distance,
            added_at: now,
            updated_at: None,
        })
    }

    /// Apply an update, keeping `added_at` and, unless supplied, the distance.
    pub fn apply(&mut self, update: StopUpdate, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let stop_name =
            StopName::parse(&update.stop_name).map_err(|_| ValidationError::EmptyStopName)?;
        let distance = match update.distance_from_previous {
            Some(d) => validate_distance(d)?,
            None => self.distance_from_previous,
        };
        self.stop_name = stop_name;
        self.wait_time = update.wait_time.unwrap_or(DEFAULT_WAIT_MINUTES);
        self.location = update.location.unwrap_or_default();
        self.distance_from_previous = distance;
        self.updated_at = Some(now);
        Ok(())
    }
}

/// Distances must be finite and non-negative.
pub fn validate_distance(distance: f64) -> Result<f64, ValidationError> {
    if distance.is_finite() && distance >= 0.0 {
        Ok(distance)
    } else {
        Err(ValidationError::InvalidDistance(distance))
    }
}
