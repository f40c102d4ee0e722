//! Ticket storage keyed by ticket id, with newest-first ordering.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::FareConfig;
use crate::domain::{BusType, NotFound, StateError, StopName, Ticket, TicketStatus, TransitError};
use crate::routes::round2;

/// Fare for a trip: distance times the per-unit rate, rounded to cents and
/// never below the floor.
pub fn compute_fare(distance: f64, bus_type: BusType, fares: &FareConfig) -> f64 {
    let rate = match bus_type {
        BusType::AirConditioned => fares.air_conditioned_rate,
        BusType::Regular | BusType::Other => fares.regular_rate,
    };
    round2(distance * rate).max(fares.minimum_fare)
}

/// Everything a ticket needs except the fields the index assigns.
#[derive(Debug, Clone)]
pub struct TicketDraft {
    pub passenger_id: String,
    pub passenger_name: String,
    pub from_stop: StopName,
    pub to_stop: StopName,
    pub path: Vec<StopName>,
    pub bus_number: String,
    pub distance: f64,
    pub eta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketStats {
    pub total_tickets: usize,
    pub open_tickets: usize,
    pub cancelled_tickets: usize,
    /// Sum of fares over open tickets.
    pub revenue: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TicketIndex {
    tickets: HashMap<String, Ticket>,
    /// Ticket ids, newest first.
    order: VecDeque<String>,
}

impl TicketIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored tickets, which are kept newest first.
    pub fn from_tickets(tickets: Vec<Ticket>) -> Self {
        let mut index = Self::new();
        for ticket in tickets {
            if index.tickets.contains_key(&ticket.ticket_id) {
                continue;
            }
            index.order.push_back(ticket.ticket_id.clone());
            index.tickets.insert(ticket.ticket_id.clone(), ticket);
        }
        index
    }

    /// All tickets, newest first.
    pub fn to_tickets(&self) -> Vec<Ticket> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticket> {
        self.order.iter().filter_map(|id| self.tickets.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Issue a ticket with id `T-<yyyymmddHHMMSS>-<n>` and a computed fare.
    pub fn issue(
        &mut self,
        draft: TicketDraft,
        bus_type: BusType,
        fares: &FareConfig,
        now: DateTime<Utc>,
    ) -> &Ticket {
        let stamp = now.format("%Y%m%d%H%M%S");
        let mut sequence = self.len() + 1;
        let mut ticket_id = format!("T-{stamp}-{sequence}");
        while self.tickets.contains_key(&ticket_id) {
            sequence += 1;
            ticket_id = format!("T-{stamp}-{sequence}");
        }

        let ticket = Ticket {
            ticket_id: ticket_id.clone(),
            passenger_id: draft.passenger_id,
            passenger_name: draft.passenger_name,
            from_stop: draft.from_stop,
            to_stop: draft.to_stop,
            path: draft.path,
            bus_number: draft.bus_number,
            fare: compute_fare(draft.distance, bus_type, fares),
            distance: draft.distance,
            eta: draft.eta,
            status: TicketStatus::Open,
            created_at: now,
        };
        self.order.push_front(ticket_id.clone());
        self.tickets.entry(ticket_id).or_insert(ticket)
    }

    pub fn get(&self, ticket_id: &str) -> Result<&Ticket, NotFound> {
        self.tickets
            .get(ticket_id)
            .ok_or_else(|| NotFound::Ticket(ticket_id.to_string()))
    }

    /// A passenger's tickets, newest first.
    pub fn for_passenger(&self, passenger_id: &str) -> Vec<&Ticket> {
        self.iter()
            .filter(|t| t.passenger_id == passenger_id)
            .collect()
    }

    pub fn cancel(&mut self, ticket_id: &str) -> Result<&Ticket, TransitError> {
        let ticket = self
            .tickets
            .get_mut(ticket_id)
            .ok_or_else(|| NotFound::Ticket(ticket_id.to_string()))?;
        if ticket.status == TicketStatus::Cancelled {
            return Err(StateError::TicketAlreadyCancelled(ticket_id.to_string()).into());
        }
        ticket.status = TicketStatus::Cancelled;
        Ok(&*ticket)
    }

    pub fn stats(&self) -> TicketStats {
        let open: Vec<&Ticket> = self.iter().filter(|t| t.is_open()).collect();
        TicketStats {
            total_tickets: self.len(),
            open_tickets: open.len(),
            cancelled_tickets: self.len() - open.len(),
            revenue: round2(open.iter().map(|t| t.fare).sum()),
        }
    }
}
