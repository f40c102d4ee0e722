//! The bus roster: an ordered list of buses with an id index and two
//! derived priority views.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::FleetPolicy;
use super::stats::FleetStats;
use super::views::{ArrivalView, PriorityView, priority_score};
use crate::domain::{
    Bus, BusId, BusStatus, BusUpdate, NewBus, NotFound, RouteId, TimeOfDay, TransitError,
};

/// Buses in insertion order.
///
/// Every mutation rebuilds the position index and both views, so reads
/// never observe a view that disagrees with the bus list.
#[derive(Debug, Clone, Default)]
pub struct FleetRoster {
    buses: Vec<Bus>,
    positions: HashMap<BusId, usize>,
    arrivals: ArrivalView,
    priorities: PriorityView,
    policy: FleetPolicy,
}

impl FleetRoster {
    pub fn new(buses: Vec<Bus>, policy: FleetPolicy) -> Self {
        let mut roster = FleetRoster {
            buses,
            policy,
            ..FleetRoster::default()
        };
        roster.rebuild();
        roster
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn to_buses(&self) -> Vec<Bus> {
        self.buses.clone()
    }

    pub fn len(&self) -> usize {
        self.buses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buses.is_empty()
    }

    pub fn policy(&self) -> &FleetPolicy {
        &self.policy
    }

    pub fn get(&self, id: BusId) -> Result<&Bus, NotFound> {
        self.positions
            .get(&id)
            .map(|&pos| &self.buses[pos])
            .ok_or(NotFound::Bus(id))
    }

    fn get_mut(&mut self, id: BusId) -> Result<&mut Bus, NotFound> {
        let pos = *self.positions.get(&id).ok_or(NotFound::Bus(id))?;
        Ok(&mut self.buses[pos])
    }

    pub fn find_by_number(&self, bus_number: &str) -> Option<&Bus> {
        self.buses.iter().find(|b| b.bus_number == bus_number)
    }

    /// A bus with this number that is not inactive.
    pub fn find_available(&self, bus_number: &str) -> Result<&Bus, NotFound> {
        self.buses
            .iter()
            .find(|b| b.bus_number == bus_number && b.is_available())
            .ok_or_else(|| NotFound::BusNumber(bus_number.to_string()))
    }

    fn next_id(&self) -> BusId {
        self.buses.iter().map(|b| b.id).max().unwrap_or(0) + 1
    }

    pub fn add(&mut self, new: NewBus, now: DateTime<Utc>) -> Result<&Bus, TransitError> {
        let bus = new.validate(self.next_id(), now)?;
        let id = bus.id;
        self.buses.push(bus);
        self.rebuild();
        Ok(self.get(id)?)
    }

    pub fn update(
        &mut self,
        id: BusId,
        update: BusUpdate,
        now: DateTime<Utc>,
    ) -> Result<&Bus, TransitError> {
        update.apply_to(self.get_mut(id)?, now)?;
        self.rebuild();
        Ok(self.get(id)?)
    }

    pub fn delete(&mut self, id: BusId) -> Result<Bus, NotFound> {
        let pos = *self.positions.get(&id).ok_or(NotFound::Bus(id))?;
        let removed = self.buses.remove(pos);
        self.rebuild();
        Ok(removed)
    }

    /// Assign a bus to a route and raise its route demand.
    pub fn allocate_to_route(
        &mut self,
        id: BusId,
        route_id: RouteId,
        route_name: String,
        now: DateTime<Utc>,
    ) -> Result<&Bus, NotFound> {
        let demand = self.policy.allocation_demand;
        let bus = self.get_mut(id)?;
        bus.route_id = Some(route_id);
        bus.route_name = Some(route_name);
        bus.route_demand = demand;
        bus.last_updated = now;
        self.rebuild();
        self.get(id)
    }

    pub fn update_arrival(
        &mut self,
        id: BusId,
        next_arrival: TimeOfDay,
        now: DateTime<Utc>,
    ) -> Result<&Bus, NotFound> {
        let bus = self.get_mut(id)?;
        bus.next_arrival = next_arrival.to_string();
        bus.last_updated = now;
        self.rebuild();
        self.get(id)
    }

    /// Change the passenger count of the first bus with this number,
    /// clamping at zero.
    pub fn adjust_passengers(
        &mut self,
        bus_number: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<&Bus, NotFound> {
        let pos = self
            .buses
            .iter()
            .position(|b| b.bus_number == bus_number)
            .ok_or_else(|| NotFound::BusNumber(bus_number.to_string()))?;
        let bus = &mut self.buses[pos];
        let updated = (bus.current_passengers as i64 + delta).clamp(0, u32::MAX as i64);
        bus.current_passengers = updated as u32;
        bus.last_updated = now;
        self.rebuild();
        Ok(&self.buses[pos])
    }

    /// Arrival projected from `from` using the bus's last timing rule.
    pub fn projected_arrival(&self, id: BusId, from: TimeOfDay) -> Result<TimeOfDay, NotFound> {
        let bus = self.get(id)?;
        let minutes = bus
            .timings
            .last()
            .map(|t| t.frequency_minutes())
            .unwrap_or(30);
        Ok(from.add_minutes(minutes))
    }

    pub fn by_status(&self, status: BusStatus) -> Vec<&Bus> {
        self.buses.iter().filter(|b| b.status == status).collect()
    }

    pub fn by_route(&self, route_id: &str) -> Vec<&Bus> {
        self.buses
            .iter()
            .filter(|b| b.route_id.as_ref().is_some_and(|r| r.as_str() == route_id))
            .collect()
    }

    /// Buses that are not inactive.
    pub fn available(&self) -> Vec<&Bus> {
        self.buses.iter().filter(|b| b.is_available()).collect()
    }

    /// The bus arriving soonest.
    pub fn next_arrival(&self) -> Option<&Bus> {
        self.arrivals.peek().and_then(|id| self.get(id).ok())
    }

    /// The bus with the highest operational priority.
    pub fn top_priority(&self) -> Option<&Bus> {
        self.priorities.peek().and_then(|id| self.get(id).ok())
    }

    pub fn by_arrival(&self) -> Vec<&Bus> {
        self.arrivals
            .ordered()
            .into_iter()
            .filter_map(|id| self.get(id).ok())
            .collect()
    }

    pub fn by_priority(&self) -> Vec<(&Bus, f64)> {
        self.priorities
            .ordered()
            .into_iter()
            .filter_map(|(id, score)| self.get(id).ok().map(|b| (b, score)))
            .collect()
    }

    pub fn score(&self, bus: &Bus) -> f64 {
        priority_score(bus, self.policy.fallback_arrival)
    }

    pub fn statistics(&self) -> FleetStats {
        FleetStats::compute(self)
    }

    fn rebuild(&mut self) {
        self.positions = self
            .buses
            .iter()
            .enumerate()
            .map(|(pos, b)| (b.id, pos))
            .collect();
        self.arrivals = ArrivalView::rebuild(&self.buses, self.policy.fallback_arrival);
        self.priorities = PriorityView::rebuild(&self.buses, self.policy.fallback_arrival);
    }
}
