use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::config::EngineConfig;
use crate::domain::{
    BusStatus, HistoryStack, JourneyStatus, NewBus, NewStop, NotFound, StateError, TransitError,
    ValidationError,
};
use crate::storage::{Collection, MemoryStore, RecordStore};

async fn engine() -> (Arc<MemoryStore>, TransitEngine) {
    let store = Arc::new(MemoryStore::new());
    let engine = TransitEngine::load(store.clone(), EngineConfig::default()).unwrap();
    (store, engine)
}

/// Route "Red": A -(1)- B -(2)- C.
async fn red_line(engine: &TransitEngine) -> String {
    let route = engine.create_route("Red").await.unwrap();
    let id = route.route_id.to_string();
    engine.add_stop(&id, NewStop::named("A"), None).await.unwrap();
    engine
        .add_stop(&id, NewStop::named("B").with_distance(1.0), None)
        .await
        .unwrap();
    engine
        .add_stop(&id, NewStop::named("C").with_distance(2.0), None)
        .await
        .unwrap();
    id
}

fn new_bus(number: &str, capacity: u32) -> NewBus {
    NewBus {
        bus_number: Some(number.to_string()),
        plate_number: Some(format!("PL-{number}")),
        driver_name: Some("Dana".to_string()),
        capacity: Some(capacity),
        ..NewBus::default()
    }
}

fn booking(from: &str, to: &str, bus: Option<&str>) -> BookingRequest {
    BookingRequest {
        passenger_id: "p1".to_string(),
        passenger_name: "Pat".to_string(),
        from_stop: from.to_string(),
        to_stop: to.to_string(),
        bus_number: bus.map(str::to_string),
    }
}

#[tokio::test]
async fn undo_and_redo_route_deletion() {
    let (_, engine) = engine().await;
    let id = red_line(&engine).await;

    engine.delete_route(&id).await.unwrap();
    assert!(engine.list_routes().await.is_empty());

    let outcome = engine.undo().await.unwrap();
    assert_eq!(outcome.store, "routes");
    assert!(outcome.message.contains("Deleted route 'Red'"));
    let restored = engine.get_route(&id).await.unwrap();
    assert_eq!(restored.stops.len(), 3);

    engine.redo().await.unwrap();
    assert!(engine.list_routes().await.is_empty());

    engine.undo().await.unwrap();
    engine.create_route("Blue").await.unwrap();
    assert!(matches!(
        engine.redo().await,
        Err(TransitError::State(StateError::EmptyStack(HistoryStack::Redo)))
    ));
    assert!(!engine.history().await.can_redo);
}

#[tokio::test]
async fn undo_on_fresh_engine_fails() {
    let (_, engine) = engine().await;
    assert!(matches!(
        engine.undo().await,
        Err(TransitError::State(StateError::EmptyStack(HistoryStack::Undo)))
    ));
}

#[tokio::test]
async fn history_lists_newest_first() {
    let (_, engine) = engine().await;
    engine.create_route("Red").await.unwrap();
    engine.add_bus(new_bus("B1", 40)).await.unwrap();

    let history = engine.history().await;
    assert!(history.can_undo);
    assert_eq!(history.recent.len(), 2);
    assert_eq!(history.recent[0].store, "buses");
    assert_eq!(history.recent[1].description, "Created route 'Red'");
}

#[tokio::test]
async fn failed_save_leaves_state_unchanged() {
    let (store, engine) = engine().await;
    let id = red_line(&engine).await;
    store.fail_saves(true);

    let err = engine.delete_route(&id).await.unwrap_err();
    assert!(matches!(err, TransitError::Persistence(_)));
    assert_eq!(engine.list_routes().await.len(), 1);
    assert_eq!(engine.history().await.recent.len(), 4);

    assert!(engine.add_bus(new_bus("B1", 40)).await.is_err());
    assert!(engine.list_buses(&BusFilter::default()).await.is_empty());

    store.fail_saves(false);
    engine.delete_route(&id).await.unwrap();
    assert!(engine.list_routes().await.is_empty());
}

#[tokio::test]
async fn failed_undo_save_keeps_the_record() {
    let (store, engine) = engine().await;
    engine.create_route("Red").await.unwrap();
    store.fail_saves(true);

    let err = engine.undo().await.unwrap_err();
    assert!(matches!(err, TransitError::Persistence(_)));
    assert_eq!(engine.route_stats().await.total_routes, 1);
    let history = engine.history().await;
    assert!(history.can_undo);
    assert!(!history.can_redo);

    store.fail_saves(false);
    let outcome = engine.undo().await.unwrap();
    assert!(outcome.message.contains("Red"));
    assert_eq!(engine.route_stats().await.total_routes, 0);
}

#[tokio::test]
async fn failed_redo_save_keeps_the_record() {
    let (store, engine) = engine().await;
    engine.add_bus(new_bus("B1", 40)).await.unwrap();
    engine.undo().await.unwrap();
    assert!(engine.list_buses(&BusFilter::default()).await.is_empty());
    store.fail_saves(true);

    let err = engine.redo().await.unwrap_err();
    assert!(matches!(err, TransitError::Persistence(_)));
    assert!(engine.list_buses(&BusFilter::default()).await.is_empty());
    let history = engine.history().await;
    assert!(history.can_redo);
    assert!(!history.can_undo);

    store.fail_saves(false);
    let outcome = engine.redo().await.unwrap();
    assert_eq!(outcome.store, "buses");
    assert_eq!(engine.list_buses(&BusFilter::default()).await.len(), 1);
}

#[tokio::test]
async fn every_action_stays_undoable() {
    let (_, engine) = engine().await;
    for n in 0..101 {
        engine.create_route(&format!("Line {n}")).await.unwrap();
    }

    let mut undone = 0;
    while engine.undo().await.is_ok() {
        undone += 1;
    }
    assert_eq!(undone, 101);
    assert!(engine.list_routes().await.is_empty());
}

#[tokio::test]
async fn loads_records_with_naive_timestamps() {
    let store = Arc::new(MemoryStore::new());
    store
        .seed(
            Collection::Routes,
            json!({"routes": [{
                "route_id": "R1",
                "route_name": "Red",
                "stops": [
                    {"stop_name": "A", "added_at": "2024-03-01 08:00:00"},
                    {"stop_name": "B", "distance_from_previous": 2.5,
                     "added_at": "2024-03-01T08:05:00.123456", "updated_at": null}
                ]
            }]}),
        )
        .unwrap();
    store
        .seed(
            Collection::Buses,
            json!([{
                "id": 1, "bus_number": "B1", "plate_number": "PL-1", "driver_name": "Dana",
                "capacity": 40, "current_passengers": 1,
                "created_at": "2024-03-01 07:00:00", "last_updated": "2024-03-01T07:30:00"
            }]),
        )
        .unwrap();
    store
        .seed(
            Collection::Tickets,
            json!([{
                "ticket_id": "T-1", "passenger_id": "p1", "passenger_name": "Pat",
                "from_stop": "A", "to_stop": "B", "path": ["A", "B"], "bus_number": "B1",
                "fare": 25.0, "distance": 2.5, "eta": null, "status": "open",
                "created_at": "2024-03-01 09:00:00"
            }]),
        )
        .unwrap();
    store
        .seed(
            Collection::Journeys,
            json!([{
                "journey_id": "J-1", "passenger_id": "p1", "start_stop": "A", "end_stop": "B",
                "speed_kph": 30.0, "path": ["A", "B"],
                "segments": [{"from": "A", "to": "B", "distance": 2.5}], "distance": 2.5,
                "start_time": "2024-03-01T09:00:00", "last_updated": "2024-03-01T09:00:00"
            }]),
        )
        .unwrap();

    let engine = TransitEngine::load(store, EngineConfig::default()).unwrap();
    let route = engine.get_route("R1").await.unwrap();
    assert_eq!(route.stops.len(), 2);
    let bus = engine.get_bus(1).await.unwrap();
    assert_eq!(bus.created_at.to_rfc3339(), "2024-03-01T07:00:00+00:00");
    let ticket = engine.get_ticket("T-1").await.unwrap();
    assert_eq!(ticket.eta, None);
    let journey = engine.get_journey("J-1").await.unwrap();
    assert_eq!(journey.start_time.to_rfc3339(), "2024-03-01T09:00:00+00:00");
}

#[tokio::test]
async fn mutations_are_written_through() {
    let (store, engine) = engine().await;
    red_line(&engine).await;
    engine.add_bus(new_bus("B1", 40)).await.unwrap();

    let reloaded = TransitEngine::load(store.clone(), EngineConfig::default()).unwrap();
    let routes = reloaded.list_routes().await;
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].stops.len(), 3);
    assert_eq!(reloaded.list_buses(&BusFilter::default()).await.len(), 1);
    assert!(store.load(Collection::Tickets).unwrap().is_none());
}

#[tokio::test]
async fn graph_follows_route_changes() {
    let (_, engine) = engine().await;
    let id = red_line(&engine).await;
    assert_eq!(engine.shortest_path("A", "C").await.distance, Some(3.0));

    let other = engine.create_route("Shortcut").await.unwrap();
    let other = other.route_id.to_string();
    engine.add_stop(&other, NewStop::named("A"), None).await.unwrap();
    engine
        .add_stop(&other, NewStop::named("C").with_distance(1.5), None)
        .await
        .unwrap();
    let path = engine.shortest_path("A", "C").await;
    assert_eq!(path.distance, Some(1.5));
    assert_eq!(path.path.len(), 2);

    engine.remove_stop(&id, 2).await.unwrap();
    assert_eq!(engine.stops().await.len(), 2);

    let missing = engine.shortest_path("A", "Nowhere").await;
    assert!(!missing.is_found());
    assert!(missing.path.is_empty());
}

#[tokio::test]
async fn set_distances_replaces_weights() {
    let (_, engine) = engine().await;
    let id = red_line(&engine).await;
    let route = engine.set_route_distances(&id, &[4.0, 5.0]).await.unwrap();
    assert_eq!(route.stops.total_distance(), 9.0);
    assert_eq!(engine.shortest_path("A", "C").await.distance, Some(9.0));

    assert!(matches!(
        engine.set_route_distances(&id, &[4.0]).await,
        Err(TransitError::Validation(ValidationError::DistanceCount { expected: 2, actual: 1 }))
    ));
}

#[tokio::test]
async fn booking_and_cancelling_tickets() {
    let (_, engine) = engine().await;
    red_line(&engine).await;
    engine.add_bus(new_bus("B1", 1)).await.unwrap();

    let ticket = engine.book_ticket(booking("A", "C", Some("B1"))).await.unwrap();
    assert_eq!(ticket.fare, 10.0);
    assert_eq!(ticket.distance, 3.0);
    assert_eq!(ticket.path.len(), 3);
    assert_eq!(ticket.eta.as_deref(), Some("08:00"));
    assert_eq!(engine.get_bus(1).await.unwrap().current_passengers, 1);

    assert!(matches!(
        engine.book_ticket(booking("A", "B", Some("B1"))).await,
        Err(TransitError::State(StateError::BusFull { capacity: 1, .. }))
    ));

    let cancelled = engine.cancel_ticket(&ticket.ticket_id).await.unwrap();
    assert!(!cancelled.is_open());
    assert_eq!(engine.get_bus(1).await.unwrap().current_passengers, 0);
    assert!(matches!(
        engine.cancel_ticket(&ticket.ticket_id).await,
        Err(TransitError::State(StateError::TicketAlreadyCancelled(_)))
    ));

    let stats = engine.ticket_stats().await;
    assert_eq!(stats.total_tickets, 1);
    assert_eq!(stats.cancelled_tickets, 1);
    assert_eq!(engine.passenger_tickets("p1").await.len(), 1);
}

#[tokio::test]
async fn booking_rejects_bad_requests() {
    let (_, engine) = engine().await;
    red_line(&engine).await;
    engine.add_bus(new_bus("B1", 10)).await.unwrap();

    assert!(matches!(
        engine.book_ticket(booking("A", "C", None)).await,
        Err(TransitError::Validation(ValidationError::BusSelectionRequired))
    ));
    assert!(matches!(
        engine.book_ticket(booking("A", "Z", Some("B1"))).await,
        Err(TransitError::NotFound(NotFound::Stop(stop))) if stop == "Z"
    ));
    assert!(matches!(
        engine.book_ticket(booking("A", "C", Some("B9"))).await,
        Err(TransitError::NotFound(NotFound::BusNumber(_)))
    ));
    assert!(engine.list_tickets().await.is_empty());
}

#[tokio::test]
async fn booking_fails_cleanly_when_saves_fail() {
    let (store, engine) = engine().await;
    red_line(&engine).await;
    engine.add_bus(new_bus("B1", 10)).await.unwrap();
    store.fail_saves(true);

    assert!(engine.book_ticket(booking("A", "C", Some("B1"))).await.is_err());
    assert!(engine.list_tickets().await.is_empty());
    assert_eq!(engine.get_bus(1).await.unwrap().current_passengers, 0);
}

#[tokio::test]
async fn journeys_start_and_report_progress() {
    let (_, engine) = engine().await;
    red_line(&engine).await;

    let journey = engine
        .start_journey(JourneyRequest {
            passenger_id: "p1".to_string(),
            start_stop: "A".to_string(),
            end_stop: "C".to_string(),
            bus_number: None,
        })
        .await
        .unwrap();
    assert_eq!(journey.distance, 3.0);
    assert_eq!(journey.speed_kph, 30.0);
    assert_eq!(journey.segments.len(), 2);

    let report = engine.journey_status(&journey.journey_id).await.unwrap();
    assert_eq!(report.progress.status, JourneyStatus::InTransit);
    assert_eq!(report.progress.total_distance, 3.0);
    assert_eq!(engine.passenger_journeys("p1").await.len(), 1);

    assert!(matches!(
        engine.journey_status("missing").await,
        Err(TransitError::NotFound(NotFound::Journey(_)))
    ));
}

#[tokio::test]
async fn journey_uses_bus_speed() {
    let (_, engine) = engine().await;
    red_line(&engine).await;
    engine
        .add_bus(NewBus {
            speed_kph: Some(45.0),
            ..new_bus("B1", 10)
        })
        .await
        .unwrap();

    let journey = engine
        .start_journey(JourneyRequest {
            passenger_id: "p1".to_string(),
            start_stop: "A".to_string(),
            end_stop: "B".to_string(),
            bus_number: Some("B1".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(journey.speed_kph, 45.0);
    assert_eq!(journey.bus_number.as_deref(), Some("B1"));
}

#[tokio::test]
async fn allocation_drives_trip_traffic() {
    let (_, engine) = engine().await;
    let id = red_line(&engine).await;
    let bus = engine.add_bus(new_bus("B1", 40)).await.unwrap();

    let plan = engine.plan_trip("A", "C").await.unwrap();
    assert_eq!(plan.bus_count, 0);
    assert_eq!(plan.traffic, TrafficLevel::Low);

    let allocated = engine.allocate_bus(bus.id, &id).await.unwrap();
    assert_eq!(allocated.route_name.as_deref(), Some("Red"));
    assert_eq!(allocated.route_demand, 50);

    let plan = engine.plan_trip("A", "C").await.unwrap();
    assert_eq!(plan.stops, 2);
    assert_eq!(plan.route_name.as_deref(), Some("Red"));
    assert_eq!(plan.bus_count, 1);
    assert_eq!(plan.traffic, TrafficLevel::Medium);
    assert!(engine.network().await.edges.iter().all(|e| e.bus_count == 1));
    assert_eq!(engine.buses_on_route(&id).await.len(), 1);

    assert!(matches!(
        engine.allocate_bus(bus.id, "no-such-route").await,
        Err(TransitError::NotFound(NotFound::Route(_)))
    ));
}

#[tokio::test]
async fn arrivals_and_priorities() {
    let (_, engine) = engine().await;
    engine.add_bus(new_bus("B1", 40)).await.unwrap();
    engine.add_bus(new_bus("B2", 40)).await.unwrap();

    let bus = engine.update_arrival(2, Some("06:30")).await.unwrap();
    assert_eq!(bus.next_arrival, "06:30");
    assert_eq!(engine.next_arrival().await.map(|b| b.id), Some(2));
    assert_eq!(engine.buses_by_arrival().await[0].id, 2);

    assert!(matches!(
        engine.update_arrival(1, Some("25:99")).await,
        Err(TransitError::Validation(ValidationError::InvalidArrivalTime(_)))
    ));
    engine.update_arrival(1, None).await.unwrap();

    let top = engine.top_priority().await.unwrap();
    let ranked = engine.buses_by_priority().await;
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].bus.id, top.bus.id);
    assert_eq!(ranked[0].priority_score, top.priority_score);
}

#[tokio::test]
async fn bus_filters_and_stats() {
    let (_, engine) = engine().await;
    engine.add_bus(new_bus("B1", 40)).await.unwrap();
    engine
        .add_bus(NewBus {
            status: Some(BusStatus::Inactive),
            ..new_bus("B2", 60)
        })
        .await
        .unwrap();

    let inactive = BusFilter {
        status: Some(BusStatus::Inactive),
        route_id: None,
    };
    assert_eq!(engine.list_buses(&inactive).await.len(), 1);
    assert_eq!(engine.available_buses().await.len(), 1);
    assert_eq!(engine.buses_by_status(BusStatus::Active).await.len(), 1);

    let stats = engine.fleet_stats().await;
    assert_eq!(stats.total_buses, 2);
    assert_eq!(stats.total_capacity, 100);

    engine.delete_bus(1).await.unwrap();
    assert!(matches!(
        engine.get_bus(1).await,
        Err(TransitError::NotFound(NotFound::Bus(1)))
    ));
    engine.undo().await.unwrap();
    assert!(engine.get_bus(1).await.is_ok());
}

#[tokio::test]
async fn overview_summarises_everything() {
    let (_, engine) = engine().await;
    let id = red_line(&engine).await;
    let bus = engine.add_bus(new_bus("B1", 40)).await.unwrap();
    engine.allocate_bus(bus.id, &id).await.unwrap();
    engine.book_ticket(booking("A", "B", Some("B1"))).await.unwrap();

    let overview = engine.overview().await;
    assert_eq!(overview.unique_stops, 3);
    assert_eq!(overview.total_distance, 3.0);
    assert_eq!(overview.routes.total_routes, 1);
    assert_eq!(overview.tickets.open_tickets, 1);
    assert_eq!(overview.bus_types.get("regular"), Some(&1));
    assert_eq!(overview.route_bus_counts.get("Red"), Some(&1));
}
