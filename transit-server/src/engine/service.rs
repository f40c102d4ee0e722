use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::domain::{
    Bus, BusId, BusStatus, BusUpdate, Journey, JourneyStatus, NewBus, NewStop, NotFound,
    RouteStopEntry, StateError, StopName, StopUpdate, Ticket, TimeOfDay, TransitError,
    ValidationError,
};
use crate::fleet::{FleetRoster, FleetStats};
use crate::history::{ActionLog, ActionRecord, HistorySummary, StoreSnapshot};
use crate::network::{ShortestPath, StopGraph, dominant_route, shortest_path};
use crate::routes::{Route, RouteCatalog, RouteStats, round2};
use crate::storage::{Collection, RecordStore, load_records, save_records};
use crate::tickets::{TicketDraft, TicketIndex, TicketStats};
use crate::tracking::JourneyRegistry;

use super::reports::{
    BookingRequest, BusFilter, EdgeTraffic, HistoryOutcome, JourneyRequest, JourneyStatusReport,
    NetworkSnapshot, Overview, PrioritizedBus, TrafficLevel, TripPlan,
};

/// The transit operations service.
///
/// Owns every store behind its own lock and writes through to a
/// [`RecordStore`] before any change becomes visible. Locks are always
/// taken in the order history, fleet, tickets, routes, journeys, graph.
pub struct TransitEngine {
    store: Arc<dyn RecordStore>,
    config: EngineConfig,
    history: Mutex<ActionLog<StoreSnapshot>>,
    fleet: RwLock<FleetRoster>,
    tickets: RwLock<TicketIndex>,
    routes: RwLock<RouteCatalog>,
    journeys: RwLock<JourneyRegistry>,
    graph: RwLock<Option<Arc<StopGraph>>>,
}

impl TransitEngine {
    /// Load every collection from `store`.
    pub fn load(store: Arc<dyn RecordStore>, config: EngineConfig) -> Result<Self, TransitError> {
        let routes: Vec<Route> = load_records(store.as_ref(), Collection::Routes)?;
        let buses: Vec<Bus> = load_records(store.as_ref(), Collection::Buses)?;
        let tickets: Vec<Ticket> = load_records(store.as_ref(), Collection::Tickets)?;
        let journeys: Vec<Journey> = load_records(store.as_ref(), Collection::Journeys)?;
        info!(
            routes = routes.len(),
            buses = buses.len(),
            tickets = tickets.len(),
            journeys = journeys.len(),
            "loaded transit data"
        );

        Ok(Self {
            history: Mutex::new(ActionLog::new()),
            fleet: RwLock::new(FleetRoster::new(buses, config.fleet.clone())),
            tickets: RwLock::new(TicketIndex::from_tickets(tickets)),
            routes: RwLock::new(RouteCatalog::from_routes(routes)),
            journeys: RwLock::new(JourneyRegistry::new(journeys)),
            graph: RwLock::new(None),
            store,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- write-through plumbing ----

    async fn mutate_routes<T, F>(&self, op: F) -> Result<T, TransitError>
    where
        F: FnOnce(&mut RouteCatalog, DateTime<Utc>) -> Result<(T, String), TransitError>,
    {
        let mut history = self.history.lock().await;
        let mut routes = self.routes.write().await;

        let now = Utc::now();
        let mut next = routes.clone();
        let (out, description) = op(&mut next, now)?;
        let before = routes.to_routes();
        let after = next.to_routes();
        save_records(&self.store, Collection::Routes, &after).await?;

        *routes = next;
        self.invalidate_graph().await;
        history.record(ActionRecord::new(
            description.as_str(),
            StoreSnapshot::Routes(before),
            StoreSnapshot::Routes(after),
            now,
        ));
        info!(action = %description, "routes changed");
        Ok(out)
    }

    async fn mutate_fleet<T, F>(&self, op: F) -> Result<T, TransitError>
    where
        F: FnOnce(&mut FleetRoster, DateTime<Utc>) -> Result<(T, String), TransitError>,
    {
        let mut history = self.history.lock().await;
        let mut fleet = self.fleet.write().await;
        self.commit_fleet(&mut history, &mut fleet, op).await
    }

    async fn commit_fleet<T, F>(
        &self,
        history: &mut ActionLog<StoreSnapshot>,
        fleet: &mut FleetRoster,
        op: F,
    ) -> Result<T, TransitError>
    where
        F: FnOnce(&mut FleetRoster, DateTime<Utc>) -> Result<(T, String), TransitError>,
    {
        let now = Utc::now();
        let mut next = fleet.clone();
        let (out, description) = op(&mut next, now)?;
        let before = fleet.to_buses();
        let after = next.to_buses();
        save_records(&self.store, Collection::Buses, &after).await?;

        *fleet = next;
        history.record(ActionRecord::new(
            description.as_str(),
            StoreSnapshot::Buses(before),
            StoreSnapshot::Buses(after),
            now,
        ));
        info!(action = %description, "fleet changed");
        Ok(out)
    }

    async fn invalidate_graph(&self) {
        *self.graph.write().await = None;
    }

    /// The stop graph for the current routes, rebuilt on first use after a change.
    pub async fn graph(&self) -> Arc<StopGraph> {
        if let Some(graph) = self.graph.read().await.as_ref() {
            return Arc::clone(graph);
        }
        let routes = self.routes.read().await;
        let mut cache = self.graph.write().await;
        if let Some(graph) = cache.as_ref() {
            return Arc::clone(graph);
        }
        let graph = Arc::new(StopGraph::build(routes.routes(), self.config.default_edge_weight));
        debug!(
            stops = graph.stop_count(),
            edges = graph.edge_count(),
            "rebuilt stop graph"
        );
        *cache = Some(Arc::clone(&graph));
        graph
    }

    // ---- routes ----

    pub async fn list_routes(&self) -> Vec<Route> {
        self.routes.read().await.to_routes()
    }

    pub async fn get_route(&self, route_id: &str) -> Result<Route, TransitError> {
        Ok(self.routes.read().await.get(route_id)?.clone())
    }

    pub async fn search_routes(&self, query: &str) -> Vec<Route> {
        self.routes
            .read()
            .await
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn route_stats(&self) -> RouteStats {
        self.routes.read().await.stats()
    }

    pub async fn create_route(&self, route_name: &str) -> Result<Route, TransitError> {
        self.mutate_routes(|catalog, _now| {
            let route = catalog.create(route_name)?.clone();
            let description = format!("Created route '{}'", route.route_name);
            Ok((route, description))
        })
        .await
    }

    pub async fn delete_route(&self, route_id: &str) -> Result<Route, TransitError> {
        self.mutate_routes(|catalog, _now| {
            let route = catalog.delete(route_id)?;
            let description = format!("Deleted route '{}'", route.route_name);
            Ok((route, description))
        })
        .await
    }

    /// Add a stop at `position` (1-based), or at the end when `None`.
    pub async fn add_stop(
        &self,
        route_id: &str,
        stop: NewStop,
        position: Option<usize>,
    ) -> Result<Route, TransitError> {
        self.mutate_routes(move |catalog, now| {
            let route = catalog.get_mut(route_id)?;
            let entry = RouteStopEntry::from_new(stop, now)?;
            let description = format!(
                "Added stop '{}' to route '{}'",
                entry.stop_name, route.route_name
            );
            match position {
                Some(position) => route.stops.insert_at(position, entry)?,
                None => route.stops.add_last(entry),
            }
            Ok((route.clone(), description))
        })
        .await
    }

    pub async fn get_stop(
        &self,
        route_id: &str,
        position: usize,
    ) -> Result<RouteStopEntry, TransitError> {
        let routes = self.routes.read().await;
        Ok(routes.get(route_id)?.stops.get_at(position)?.clone())
    }

    pub async fn update_stop(
        &self,
        route_id: &str,
        position: usize,
        update: StopUpdate,
    ) -> Result<RouteStopEntry, TransitError> {
        self.mutate_routes(move |catalog, now| {
            let route = catalog.get_mut(route_id)?;
            let route_name = route.route_name.clone();
            let entry = route.stops.update_at(position, update, now)?.clone();
            let description = format!(
                "Updated stop {position} ('{}') on route '{route_name}'",
                entry.stop_name
            );
            Ok((entry, description))
        })
        .await
    }

    pub async fn remove_stop(
        &self,
        route_id: &str,
        position: usize,
    ) -> Result<RouteStopEntry, TransitError> {
        self.mutate_routes(move |catalog, _now| {
            let route = catalog.get_mut(route_id)?;
            let removed = route.stops.remove_at(position)?;
            let description = format!(
                "Removed stop '{}' from route '{}'",
                removed.stop_name, route.route_name
            );
            Ok((removed, description))
        })
        .await
    }

    /// Reorder stops; `new_order[i]` is the 0-based old index of the stop now at `i`.
    pub async fn reorder_stops(
        &self,
        route_id: &str,
        new_order: &[usize],
    ) -> Result<Route, TransitError> {
        self.mutate_routes(move |catalog, _now| {
            let route = catalog.get_mut(route_id)?;
            route.stops.reorder(new_order)?;
            let description = format!("Reordered stops on route '{}'", route.route_name);
            Ok((route.clone(), description))
        })
        .await
    }

    pub async fn set_route_distances(
        &self,
        route_id: &str,
        distances: &[f64],
    ) -> Result<Route, TransitError> {
        self.mutate_routes(move |catalog, now| {
            let route = catalog.get_mut(route_id)?;
            route.stops.set_distances(distances, now)?;
            let description = format!("Set distances on route '{}'", route.route_name);
            Ok((route.clone(), description))
        })
        .await
    }

    // ---- network ----

    pub async fn stops(&self) -> Vec<StopName> {
        self.graph().await.stops().to_vec()
    }

    /// Every stop and edge, with traffic derived from buses on each edge's route.
    pub async fn network(&self) -> NetworkSnapshot {
        let graph = self.graph().await;
        let fleet = self.fleet.read().await;
        let edges = graph
            .edges()
            .iter()
            .map(|edge| {
                let bus_count = fleet.by_route(edge.route_id.as_str()).len();
                EdgeTraffic {
                    edge: edge.clone(),
                    bus_count,
                    traffic: TrafficLevel::from_bus_count(bus_count),
                }
            })
            .collect();
        NetworkSnapshot {
            stops: graph.stops().to_vec(),
            edges,
        }
    }

    /// Shortest path between two stops. Unknown stops or no connection
    /// yield an empty path with no distance.
    pub async fn shortest_path(&self, start: &str, end: &str) -> ShortestPath {
        shortest_path(&*self.graph().await, start.trim(), end.trim())
    }

    async fn resolve_path(
        &self,
        start: &str,
        end: &str,
    ) -> Result<(Arc<StopGraph>, ShortestPath), TransitError> {
        let graph = self.graph().await;
        for stop in [start, end] {
            if !graph.has_stop(stop) {
                return Err(NotFound::Stop(stop.to_string()).into());
            }
        }
        let path = shortest_path(&graph, start, end);
        if !path.is_found() {
            return Err(StateError::NoPath {
                from: start.to_string(),
                to: end.to_string(),
            }
            .into());
        }
        Ok((graph, path))
    }

    pub async fn plan_trip(&self, start: &str, end: &str) -> Result<TripPlan, TransitError> {
        let start = parse_stop(start)?;
        let end = parse_stop(end)?;
        let (graph, path) = self.resolve_path(start.as_str(), end.as_str()).await?;
        let segments = path.route_segments(&graph);
        let dominant = dominant_route(&segments);
        let bus_count = match &dominant {
            Some((route_id, _)) => self.fleet.read().await.by_route(route_id.as_str()).len(),
            None => 0,
        };
        let (route_id, route_name) = dominant.unzip();

        Ok(TripPlan {
            stops: path.path.len().saturating_sub(1),
            distance: path.distance.unwrap_or(0.0),
            path: path.path,
            route_id,
            route_name,
            bus_count,
            traffic: TrafficLevel::from_bus_count(bus_count),
            segments,
        })
    }

    // ---- fleet ----

    pub async fn list_buses(&self, filter: &BusFilter) -> Vec<Bus> {
        let fleet = self.fleet.read().await;
        fleet
            .buses()
            .iter()
            .filter(|b| filter.status.is_none_or(|s| b.status == s))
            .filter(|b| {
                filter.route_id.as_deref().is_none_or(|r| {
                    b.route_id.as_ref().is_some_and(|id| id.as_str() == r)
                })
            })
            .cloned()
            .collect()
    }

    pub async fn get_bus(&self, id: BusId) -> Result<Bus, TransitError> {
        Ok(self.fleet.read().await.get(id)?.clone())
    }

    pub async fn available_buses(&self) -> Vec<Bus> {
        self.fleet
            .read()
            .await
            .available()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn buses_by_status(&self, status: BusStatus) -> Vec<Bus> {
        self.fleet
            .read()
            .await
            .by_status(status)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn buses_on_route(&self, route_id: &str) -> Vec<Bus> {
        self.fleet
            .read()
            .await
            .by_route(route_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn next_arrival(&self) -> Option<Bus> {
        self.fleet.read().await.next_arrival().cloned()
    }

    pub async fn buses_by_arrival(&self) -> Vec<Bus> {
        self.fleet
            .read()
            .await
            .by_arrival()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn top_priority(&self) -> Option<PrioritizedBus> {
        let fleet = self.fleet.read().await;
        fleet.top_priority().map(|bus| PrioritizedBus {
            priority_score: fleet.score(bus),
            bus: bus.clone(),
        })
    }

    pub async fn buses_by_priority(&self) -> Vec<PrioritizedBus> {
        self.fleet
            .read()
            .await
            .by_priority()
            .into_iter()
            .map(|(bus, priority_score)| PrioritizedBus {
                bus: bus.clone(),
                priority_score,
            })
            .collect()
    }

    pub async fn fleet_stats(&self) -> FleetStats {
        self.fleet.read().await.statistics()
    }

    pub async fn add_bus(&self, new: NewBus) -> Result<Bus, TransitError> {
        self.mutate_fleet(|fleet, now| {
            let bus = fleet.add(new, now)?.clone();
            let description = format!("Added bus {}", bus.bus_number);
            Ok((bus, description))
        })
        .await
    }

    pub async fn update_bus(&self, id: BusId, update: BusUpdate) -> Result<Bus, TransitError> {
        self.mutate_fleet(move |fleet, now| {
            let bus = fleet.update(id, update, now)?.clone();
            let description = format!("Updated bus {}", bus.bus_number);
            Ok((bus, description))
        })
        .await
    }

    pub async fn delete_bus(&self, id: BusId) -> Result<Bus, TransitError> {
        self.mutate_fleet(move |fleet, _now| {
            let bus = fleet.delete(id)?;
            let description = format!("Deleted bus {}", bus.bus_number);
            Ok((bus, description))
        })
        .await
    }

    /// Assign a bus to an existing route.
    pub async fn allocate_bus(&self, id: BusId, route_id: &str) -> Result<Bus, TransitError> {
        let mut history = self.history.lock().await;
        let mut fleet = self.fleet.write().await;
        let (route_id, route_name) = {
            let routes = self.routes.read().await;
            let route = routes.get(route_id)?;
            (route.route_id.clone(), route.route_name.clone())
        };
        self.commit_fleet(
            &mut history,
            &mut fleet,
            move |fleet, now| {
                let description = format!("Allocated bus {id} to route '{route_name}'");
                let bus = fleet.allocate_to_route(id, route_id, route_name, now)?.clone();
                Ok((bus, description))
            },
        )
        .await
    }

    /// Set a bus's next arrival. Without an explicit `HH:MM` the arrival is
    /// projected from the current time using the bus's timing frequency.
    pub async fn update_arrival(
        &self,
        id: BusId,
        next_arrival: Option<&str>,
    ) -> Result<Bus, TransitError> {
        let explicit = match next_arrival.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                TimeOfDay::parse_hhmm(raw)
                    .map_err(|_| ValidationError::InvalidArrivalTime(raw.to_string()))?,
            ),
            None => None,
        };
        let current = TimeOfDay::from(Utc::now().time());

        self.mutate_fleet(move |fleet, now| {
            let arrival = match explicit {
                Some(arrival) => arrival,
                None => fleet.projected_arrival(id, current)?,
            };
            let bus = fleet.update_arrival(id, arrival, now)?.clone();
            let description = format!("Set next arrival of bus {} to {arrival}", bus.bus_number);
            Ok((bus, description))
        })
        .await
    }

    // ---- tickets ----

    pub async fn list_tickets(&self) -> Vec<Ticket> {
        self.tickets.read().await.to_tickets()
    }

    pub async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, TransitError> {
        Ok(self.tickets.read().await.get(ticket_id)?.clone())
    }

    pub async fn passenger_tickets(&self, passenger_id: &str) -> Vec<Ticket> {
        self.tickets
            .read()
            .await
            .for_passenger(passenger_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn ticket_stats(&self) -> TicketStats {
        self.tickets.read().await.stats()
    }

    /// Book a seat on a named bus along the shortest path between two stops.
    pub async fn book_ticket(&self, request: BookingRequest) -> Result<Ticket, TransitError> {
        let from = parse_stop(&request.from_stop)?;
        let to = parse_stop(&request.to_stop)?;
        let bus_number = request
            .bus_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ValidationError::BusSelectionRequired)?
            .to_string();
        let (_, path) = self.resolve_path(from.as_str(), to.as_str()).await?;

        let mut fleet = self.fleet.write().await;
        let mut tickets = self.tickets.write().await;

        let bus = fleet.find_available(&bus_number)?;
        if bus.is_full() {
            return Err(StateError::BusFull {
                bus_number,
                capacity: bus.capacity,
            }
            .into());
        }
        let bus_type = bus.bus_type;
        let eta = Some(bus.next_arrival.clone());

        let now = Utc::now();
        let draft = TicketDraft {
            passenger_id: request.passenger_id,
            passenger_name: request.passenger_name,
            from_stop: from,
            to_stop: to,
            distance: path.distance.unwrap_or(0.0),
            path: path.path,
            bus_number: bus_number.clone(),
            eta,
        };
        let mut next_tickets = tickets.clone();
        let ticket = next_tickets
            .issue(draft, bus_type, &self.config.fares, now)
            .clone();
        let mut next_fleet = fleet.clone();
        next_fleet.adjust_passengers(&bus_number, 1, now)?;

        self.save_pair(&tickets, &next_tickets, &next_fleet).await?;
        *tickets = next_tickets;
        *fleet = next_fleet;
        info!(ticket = %ticket.ticket_id, bus = %bus_number, fare = ticket.fare, "ticket booked");
        Ok(ticket)
    }

    /// Cancel an open ticket and release its seat.
    pub async fn cancel_ticket(&self, ticket_id: &str) -> Result<Ticket, TransitError> {
        let mut fleet = self.fleet.write().await;
        let mut tickets = self.tickets.write().await;

        let now = Utc::now();
        let mut next_tickets = tickets.clone();
        let ticket = next_tickets.cancel(ticket_id)?.clone();
        let mut next_fleet = fleet.clone();
        if next_fleet
            .adjust_passengers(&ticket.bus_number, -1, now)
            .is_err()
        {
            debug!(bus = %ticket.bus_number, "cancelled ticket's bus no longer exists");
        }

        self.save_pair(&tickets, &next_tickets, &next_fleet).await?;
        *tickets = next_tickets;
        *fleet = next_fleet;
        info!(ticket = %ticket.ticket_id, "ticket cancelled");
        Ok(ticket)
    }

    /// Persist tickets then buses. If the bus save fails the old tickets
    /// are written back so both collections stay as they were.
    async fn save_pair(
        &self,
        old_tickets: &TicketIndex,
        tickets: &TicketIndex,
        fleet: &FleetRoster,
    ) -> Result<(), TransitError> {
        save_records(&self.store, Collection::Tickets, &tickets.to_tickets()).await?;
        if let Err(err) = save_records(&self.store, Collection::Buses, fleet.buses()).await {
            if let Err(rollback) =
                save_records(&self.store, Collection::Tickets, &old_tickets.to_tickets()).await
            {
                warn!(error = %rollback, "could not restore tickets after failed bus save");
            }
            return Err(err.into());
        }
        Ok(())
    }

    // ---- journeys ----

    pub async fn start_journey(&self, request: JourneyRequest) -> Result<Journey, TransitError> {
        let start = parse_stop(&request.start_stop)?;
        let end = parse_stop(&request.end_stop)?;
        let bus_number = request
            .bus_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let (graph, path) = self.resolve_path(start.as_str(), end.as_str()).await?;

        let speed_kph = match &bus_number {
            Some(number) => self
                .fleet
                .read()
                .await
                .find_available(number)?
                .speed_kph
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(self.config.default_speed_kph),
            None => self.config.default_speed_kph,
        };

        let now = Utc::now();
        let journey = Journey {
            journey_id: Uuid::new_v4().to_string(),
            passenger_id: request.passenger_id,
            start_stop: start,
            end_stop: end,
            bus_number,
            speed_kph,
            segments: path.segments(&graph),
            distance: path.distance.unwrap_or(0.0),
            path: path.path,
            status: JourneyStatus::InTransit,
            start_time: now,
            distance_covered: 0.0,
            last_updated: now,
        };

        let mut journeys = self.journeys.write().await;
        let mut next = journeys.clone();
        next.insert(journey.clone());
        save_records(&self.store, Collection::Journeys, next.journeys()).await?;
        *journeys = next;
        info!(journey = %journey.journey_id, distance = journey.distance, "journey started");
        Ok(journey)
    }

    pub async fn get_journey(&self, journey_id: &str) -> Result<Journey, TransitError> {
        Ok(self.journeys.read().await.get(journey_id)?.clone())
    }

    pub async fn passenger_journeys(&self, passenger_id: &str) -> Vec<Journey> {
        self.journeys
            .read()
            .await
            .for_passenger(passenger_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Advance a journey to now and persist its progress.
    pub async fn journey_status(
        &self,
        journey_id: &str,
    ) -> Result<JourneyStatusReport, TransitError> {
        let mut journeys = self.journeys.write().await;
        let mut next = journeys.clone();
        let progress = next.refresh(journey_id, Utc::now(), self.config.approach_threshold)?;
        save_records(&self.store, Collection::Journeys, next.journeys()).await?;
        *journeys = next;
        Ok(JourneyStatusReport {
            journey_id: journey_id.to_string(),
            progress,
        })
    }

    // ---- history ----

    pub async fn history(&self) -> HistorySummary {
        HistorySummary::of(&*self.history.lock().await, self.config.history_listing)
    }

    /// Restore the store touched by the most recent action.
    pub async fn undo(&self) -> Result<HistoryOutcome, TransitError> {
        let mut history = self.history.lock().await;
        let record = history.peek_undo()?;
        let description = record.description.clone();
        let snapshot = record.before.clone();
        let store = snapshot.store_name();

        self.restore(snapshot).await?;
        history.undo()?;
        info!(action = %description, "undone");
        Ok(HistoryOutcome {
            message: format!("Undid: {description}"),
            store,
        })
    }

    /// Re-apply the most recently undone action.
    pub async fn redo(&self) -> Result<HistoryOutcome, TransitError> {
        let mut history = self.history.lock().await;
        let record = history.peek_redo()?;
        let description = record.description.clone();
        let snapshot = record.after.clone();
        let store = snapshot.store_name();

        self.restore(snapshot).await?;
        history.redo()?;
        info!(action = %description, "redone");
        Ok(HistoryOutcome {
            message: format!("Redid: {description}"),
            store,
        })
    }

    async fn restore(&self, snapshot: StoreSnapshot) -> Result<(), TransitError> {
        match snapshot {
            StoreSnapshot::Routes(records) => {
                let mut routes = self.routes.write().await;
                save_records(&self.store, Collection::Routes, &records).await?;
                *routes = RouteCatalog::from_routes(records);
                self.invalidate_graph().await;
            }
            StoreSnapshot::Buses(records) => {
                let mut fleet = self.fleet.write().await;
                save_records(&self.store, Collection::Buses, &records).await?;
                *fleet = FleetRoster::new(records, self.config.fleet.clone());
            }
        }
        Ok(())
    }

    // ---- overview ----

    pub async fn overview(&self) -> Overview {
        let fleet = self.fleet.read().await;
        let tickets = self.tickets.read().await;
        let routes = self.routes.read().await;

        let unique_stops: HashSet<&str> = routes
            .routes()
            .iter()
            .flat_map(|r| r.stops.iter().map(|s| s.stop_name.as_str()))
            .collect();
        let total_distance = round2(routes.routes().iter().map(|r| r.stops.total_distance()).sum());

        let mut bus_types = BTreeMap::new();
        let mut route_bus_counts = BTreeMap::new();
        for bus in fleet.buses() {
            *bus_types.entry(bus_type_name(bus)).or_insert(0) += 1;
            if let Some(name) = &bus.route_name {
                *route_bus_counts.entry(name.clone()).or_insert(0) += 1;
            }
        }

        Overview {
            fleet: fleet.statistics(),
            routes: routes.stats(),
            unique_stops: unique_stops.len(),
            total_distance,
            tickets: tickets.stats(),
            bus_types,
            route_bus_counts,
        }
    }
}

fn parse_stop(raw: &str) -> Result<StopName, ValidationError> {
    StopName::parse(raw).map_err(|_| ValidationError::EmptyStopName)
}

fn bus_type_name(bus: &Bus) -> String {
    serde_json::to_value(bus.bus_type)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "other".to_string())
}
