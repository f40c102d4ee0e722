//! Bus records owned by the fleet roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RouteId, ValidationError};

/// Numeric bus identifier, assigned as `max + 1` on insert.
pub type BusId = u32;

/// Default next-arrival time for new buses.
pub const DEFAULT_NEXT_ARRIVAL: &str = "08:00";

/// Operational status of a bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

impl BusStatus {
    pub const ALL: [BusStatus; 3] = [BusStatus::Active, BusStatus::Inactive, BusStatus::Maintenance];
}

/// Vehicle class; only air-conditioned buses change the fare rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusType {
    #[default]
    Regular,
    AirConditioned,
    #[serde(other)]
    Other,
}

/// A timing rule attached to a bus.
///
/// Only `frequency` is interpreted; any other fields are carried through
/// storage untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Timing {
    /// Headway in minutes: `"<n>min"`, `"<n>hour"`, otherwise 30.
    pub fn frequency_minutes(&self) -> u32 {
        const DEFAULT: u32 = 30;
        let Some(freq) = self.frequency.as_deref().map(str::trim) else {
            return DEFAULT;
        };
        if let Some(n) = freq.strip_suffix("min") {
            n.trim().parse().unwrap_or(DEFAULT)
        } else if let Some(n) = freq.strip_suffix("hour") {
            n.trim()
                .parse::<u32>()
                .ok()
                .and_then(|h| h.checked_mul(60))
                .unwrap_or(DEFAULT)
        } else {
            DEFAULT
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    pub bus_number: String,
    pub plate_number: String,
    pub driver_name: String,
    #[serde(default)]
    pub driver_contact: String,
    pub capacity: u32,
    #[serde(default)]
    pub current_passengers: u32,
    #[serde(default)]
    pub status: BusStatus,
    #[serde(default, rename = "type")]
    pub bus_type: BusType,
    #[serde(default = "default_next_arrival")]
    pub next_arrival: String,
    #[serde(default)]
    pub route_id: Option<RouteId>,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub route_demand: u32,
    #[serde(default)]
    pub timings: Vec<Timing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kph: Option<f64>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub last_updated: DateTime<Utc>,
}

fn default_next_arrival() -> String {
    DEFAULT_NEXT_ARRIVAL.to_string()
}

impl Bus {
    /// Current load as a fraction of capacity.
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.current_passengers as f64 / self.capacity as f64
        }
    }

    pub fn is_full(&self) -> bool {
        self.current_passengers >= self.capacity
    }

    pub fn is_available(&self) -> bool {
        self.status != BusStatus::Inactive
    }
}

/// Caller-supplied fields for a new bus. Required fields are validated by
/// [`NewBus::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBus {
    pub bus_number: Option<String>,
    pub plate_number: Option<String>,
    pub driver_name: Option<String>,
    pub driver_contact: Option<String>,
    pub capacity: Option<u32>,
    pub status: Option<BusStatus>,
    #[serde(rename = "type")]
    pub bus_type: Option<BusType>,
    pub next_arrival: Option<String>,
    pub timings: Option<Vec<Timing>>,
    pub speed_kph: Option<f64>,
}

impl NewBus {
    /// Check required fields and build a bus with the given id.
    pub fn validate(self, id: BusId, now: DateTime<Utc>) -> Result<Bus, ValidationError> {
        let bus_number = required(self.bus_number, "bus_number")?;
        let plate_number = required(self.plate_number, "plate_number")?;
        let driver_name = required(self.driver_name, "driver_name")?;
        let capacity = self
            .capacity
            .ok_or(ValidationError::MissingBusField("capacity"))?;
        if capacity == 0 {
            return Err(ValidationError::ZeroCapacity);
        }

        Ok(Bus {
            id,
            bus_number,
            plate_number,
            driver_name,
            driver_contact: self.driver_contact.unwrap_or_default(),
            capacity,
            current_passengers: 0,
            status: self.status.unwrap_or_default(),
            bus_type: self.bus_type.unwrap_or_default(),
            next_arrival: self.next_arrival.unwrap_or_else(default_next_arrival),
            route_id: None,
            route_name: None,
            route_demand: 0,
            timings: self.timings.unwrap_or_default(),
            speed_kph: self.speed_kph,
            created_at: now,
            last_updated: now,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingBusField(field)),
    }
}

/// A partial update to a bus. `id` and `created_at` cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusUpdate {
    pub bus_number: Option<String>,
    pub plate_number: Option<String>,
    pub driver_name: Option<String>,
    pub driver_contact: Option<String>,
    pub capacity: Option<u32>,
    pub current_passengers: Option<u32>,
    pub status: Option<BusStatus>,
    #[serde(rename = "type")]
    pub bus_type: Option<BusType>,
    pub next_arrival: Option<String>,
    pub route_demand: Option<u32>,
    pub timings: Option<Vec<Timing>>,
    pub speed_kph: Option<f64>,
}

impl BusUpdate {
    pub fn apply_to(self, bus: &mut Bus, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return Err(ValidationError::ZeroCapacity);
            }
        }
        let bus_number = self
            .bus_number
            .map(|v| required(Some(v), "bus_number"))
            .transpose()?;
        let plate_number = self
            .plate_number
            .map(|v| required(Some(v), "plate_number"))
            .transpose()?;
        let driver_name = self
            .driver_name
            .map(|v| required(Some(v), "driver_name"))
            .transpose()?;

        if let Some(v) = bus_number {
            bus.bus_number = v;
        }
        if let Some(v) = plate_number {
            bus.plate_number = v;
        }
        if let Some(v) = driver_name {
            bus.driver_name = v;
        }
        if let Some(v) = self.driver_contact {
            bus.driver_contact = v;
        }
        if let Some(v) = self.capacity {
            bus.capacity = v;
        }
        if let Some(v) = self.current_passengers {
            bus.current_passengers = v;
        }
        if let Some(v) = self.status {
            bus.status = v;
        }
        if let Some(v) = self.bus_type {
            bus.bus_type = v;
        }
        if let Some(v) = self.next_arrival {
            bus.next_arrival = v;
        }
        if let Some(v) = self.route_demand {
            bus.route_demand = v;
        }
        if let Some(v) = self.timings {
            bus.timings = v;
        }
        if self.speed_kph.is_some() {
            bus.speed_kph = self.speed_kph;
        }
        bus.last_updated = now;
        Ok(())
    }
}
