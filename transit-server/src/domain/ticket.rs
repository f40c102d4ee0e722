//! Issued tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StopName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Cancelled,
}

/// A ticket issued for one journey between two stops.
///
/// Everything except `status` is fixed at booking time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub passenger_id: String,
    pub passenger_name: String,
    pub from_stop: StopName,
    pub to_stop: StopName,
    pub path: Vec<StopName>,
    pub bus_number: String,
    pub fare: f64,
    pub distance: f64,
    /// Bus arrival at booking time, if it had one
    #[serde(default)]
    pub eta: Option<String>,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }
}
