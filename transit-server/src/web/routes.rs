//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domain::{
    Bus, BusId, BusStatus, BusUpdate, Journey, NewBus, RouteStopEntry, StopName, StopUpdate,
    Ticket, TransitError,
};
use crate::engine::{
    BookingRequest, BusFilter, EdgeTraffic, HistoryOutcome, JourneyRequest, JourneyStatusReport,
    Overview, PrioritizedBus, TripPlan,
};
use crate::fleet::FleetStats;
use crate::history::HistorySummary;
use crate::network::ShortestPath;
use crate::routes::{Route, RouteStats};
use crate::tickets::TicketStats;

use super::dto::*;
use super::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/overview", get(overview))
        .route("/routes", get(list_routes).post(create_route))
        .route("/routes/stats", get(route_stats))
        .route("/routes/:route_id", get(get_route).delete(delete_route))
        .route("/routes/:route_id/stops", post(add_stop))
        .route("/routes/:route_id/stops/order", put(reorder_stops))
        .route(
            "/routes/:route_id/stops/:position",
            get(get_stop).put(update_stop).delete(remove_stop),
        )
        .route("/routes/:route_id/distances", put(set_distances))
        .route("/network/stops", get(network_stops))
        .route("/network/edges", get(network_edges))
        .route("/network/shortest-path", get(network_shortest_path))
        .route("/network/trip", get(network_trip))
        .route("/buses", get(list_buses).post(add_bus))
        .route("/buses/available", get(available_buses))
        .route("/buses/stats", get(fleet_stats))
        .route("/buses/next-arrival", get(next_arrival))
        .route("/buses/top-priority", get(top_priority))
        .route("/buses/by-arrival", get(buses_by_arrival))
        .route("/buses/by-priority", get(buses_by_priority))
        .route("/buses/status/:status", get(buses_by_status))
        .route(
            "/buses/:bus_id",
            get(get_bus).put(update_bus).delete(delete_bus),
        )
        .route("/buses/:bus_id/allocate", post(allocate_bus))
        .route("/buses/:bus_id/arrival", put(update_arrival))
        .route("/journeys", post(start_journey))
        .route("/journeys/:journey_id", get(get_journey))
        .route("/journeys/:journey_id/status", get(journey_status))
        .route("/tickets", get(list_tickets).post(book_ticket))
        .route("/tickets/stats", get(ticket_stats))
        .route("/tickets/:ticket_id", get(get_ticket))
        .route("/tickets/:ticket_id/cancel", post(cancel_ticket))
        .route("/passengers/:passenger_id/tickets", get(passenger_tickets))
        .route("/passengers/:passenger_id/journeys", get(passenger_journeys))
        .route("/history", get(history))
        .route("/history/undo", post(undo))
        .route("/history/redo", post(redo))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn overview(State(state): State<AppState>) -> Json<Overview> {
    Json(state.engine.overview().await)
}

// ---- routes ----

async fn list_routes(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Json<Vec<Route>> {
    let routes = match query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        Some(q) => state.engine.search_routes(q).await,
        None => state.engine.list_routes().await,
    };
    Json(routes)
}

async fn create_route(
    State(state): State<AppState>,
    Json(req): Json<CreateRouteRequest>,
) -> Result<(StatusCode, Json<Route>), AppError> {
    let route = state.engine.create_route(&req.route_name).await?;
    Ok((StatusCode::CREATED, Json(route)))
}

async fn route_stats(State(state): State<AppState>) -> Json<RouteStats> {
    Json(state.engine.route_stats().await)
}

async fn get_route(State(state): State<AppState>, Path(route_id): Path<String>) -> ApiResult<Route> {
    Ok(Json(state.engine.get_route(&route_id).await?))
}

async fn delete_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> ApiResult<Route> {
    Ok(Json(state.engine.delete_route(&route_id).await?))
}

async fn add_stop(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    Json(req): Json<AddStopRequest>,
) -> Result<(StatusCode, Json<Route>), AppError> {
    let route = state
        .engine
        .add_stop(&route_id, req.stop, req.position)
        .await?;
    Ok((StatusCode::CREATED, Json(route)))
}

async fn get_stop(
    State(state): State<AppState>,
    Path((route_id, position)): Path<(String, usize)>,
) -> ApiResult<RouteStopEntry> {
    Ok(Json(state.engine.get_stop(&route_id, position).await?))
}

async fn update_stop(
    State(state): State<AppState>,
    Path((route_id, position)): Path<(String, usize)>,
    Json(update): Json<StopUpdate>,
) -> ApiResult<RouteStopEntry> {
    Ok(Json(
        state.engine.update_stop(&route_id, position, update).await?,
    ))
}

async fn remove_stop(
    State(state): State<AppState>,
    Path((route_id, position)): Path<(String, usize)>,
) -> ApiResult<RouteStopEntry> {
    Ok(Json(state.engine.remove_stop(&route_id, position).await?))
}

async fn reorder_stops(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Route> {
    Ok(Json(
        state.engine.reorder_stops(&route_id, &req.new_order).await?,
    ))
}

async fn set_distances(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    Json(req): Json<DistancesRequest>,
) -> ApiResult<Route> {
    Ok(Json(
        state
            .engine
            .set_route_distances(&route_id, &req.distances)
            .await?,
    ))
}

// ---- network ----

async fn network_stops(State(state): State<AppState>) -> Json<Vec<StopName>> {
    Json(state.engine.stops().await)
}

async fn network_edges(State(state): State<AppState>) -> Json<Vec<EdgeTraffic>> {
    Json(state.engine.network().await.edges)
}

async fn network_shortest_path(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Json<ShortestPath> {
    Json(state.engine.shortest_path(&query.start, &query.end).await)
}

async fn network_trip(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> ApiResult<TripPlan> {
    Ok(Json(state.engine.plan_trip(&query.start, &query.end).await?))
}

// ---- buses ----

async fn list_buses(
    State(state): State<AppState>,
    Query(filter): Query<BusFilter>,
) -> Json<Vec<Bus>> {
    Json(state.engine.list_buses(&filter).await)
}

async fn add_bus(
    State(state): State<AppState>,
    Json(new): Json<NewBus>,
) -> Result<(StatusCode, Json<Bus>), AppError> {
    let bus = state.engine.add_bus(new).await?;
    Ok((StatusCode::CREATED, Json(bus)))
}

async fn available_buses(State(state): State<AppState>) -> Json<Vec<Bus>> {
    Json(state.engine.available_buses().await)
}

async fn fleet_stats(State(state): State<AppState>) -> Json<FleetStats> {
    Json(state.engine.fleet_stats().await)
}

async fn next_arrival(State(state): State<AppState>) -> Json<Option<Bus>> {
    Json(state.engine.next_arrival().await)
}

async fn top_priority(State(state): State<AppState>) -> Json<Option<PrioritizedBus>> {
    Json(state.engine.top_priority().await)
}

async fn buses_by_arrival(State(state): State<AppState>) -> Json<Vec<Bus>> {
    Json(state.engine.buses_by_arrival().await)
}

async fn buses_by_priority(State(state): State<AppState>) -> Json<Vec<PrioritizedBus>> {
    Json(state.engine.buses_by_priority().await)
}

async fn buses_by_status(
    State(state): State<AppState>,
    Path(status): Path<BusStatus>,
) -> Json<Vec<Bus>> {
    Json(state.engine.buses_by_status(status).await)
}

async fn get_bus(State(state): State<AppState>, Path(bus_id): Path<BusId>) -> ApiResult<Bus> {
    Ok(Json(state.engine.get_bus(bus_id).await?))
}

async fn update_bus(
    State(state): State<AppState>,
    Path(bus_id): Path<BusId>,
    Json(update): Json<BusUpdate>,
) -> ApiResult<Bus> {
    Ok(Json(state.engine.update_bus(bus_id, update).await?))
}

async fn delete_bus(State(state): State<AppState>, Path(bus_id): Path<BusId>) -> ApiResult<Bus> {
    Ok(Json(state.engine.delete_bus(bus_id).await?))
}

async fn allocate_bus(
    State(state): State<AppState>,
    Path(bus_id): Path<BusId>,
    Json(req): Json<AllocateRequest>,
) -> ApiResult<Bus> {
    Ok(Json(state.engine.allocate_bus(bus_id, &req.route_id).await?))
}

async fn update_arrival(
    State(state): State<AppState>,
    Path(bus_id): Path<BusId>,
    Json(req): Json<ArrivalRequest>,
) -> ApiResult<Bus> {
    Ok(Json(
        state
            .engine
            .update_arrival(bus_id, req.next_arrival.as_deref())
            .await?,
    ))
}

// ---- journeys ----

async fn start_journey(
    State(state): State<AppState>,
    Json(req): Json<JourneyRequest>,
) -> Result<(StatusCode, Json<Journey>), AppError> {
    let journey = state.engine.start_journey(req).await?;
    Ok((StatusCode::CREATED, Json(journey)))
}

async fn get_journey(
    State(state): State<AppState>,
    Path(journey_id): Path<String>,
) -> ApiResult<Journey> {
    Ok(Json(state.engine.get_journey(&journey_id).await?))
}

async fn journey_status(
    State(state): State<AppState>,
    Path(journey_id): Path<String>,
) -> ApiResult<JourneyStatusReport> {
    Ok(Json(state.engine.journey_status(&journey_id).await?))
}

async fn passenger_journeys(
    State(state): State<AppState>,
    Path(passenger_id): Path<String>,
) -> Json<Vec<Journey>> {
    Json(state.engine.passenger_journeys(&passenger_id).await)
}

// ---- tickets ----

async fn list_tickets(State(state): State<AppState>) -> Json<Vec<Ticket>> {
    Json(state.engine.list_tickets().await)
}

async fn book_ticket(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let ticket = state.engine.book_ticket(req).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn ticket_stats(State(state): State<AppState>) -> Json<TicketStats> {
    Json(state.engine.ticket_stats().await)
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> ApiResult<Ticket> {
    Ok(Json(state.engine.get_ticket(&ticket_id).await?))
}

async fn cancel_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> ApiResult<Ticket> {
    Ok(Json(state.engine.cancel_ticket(&ticket_id).await?))
}

async fn passenger_tickets(
    State(state): State<AppState>,
    Path(passenger_id): Path<String>,
) -> Json<Vec<Ticket>> {
    Json(state.engine.passenger_tickets(&passenger_id).await)
}

// ---- history ----

async fn history(State(state): State<AppState>) -> Json<HistorySummary> {
    Json(state.engine.history().await)
}

async fn undo(State(state): State<AppState>) -> ApiResult<HistoryOutcome> {
    Ok(Json(state.engine.undo().await?))
}

async fn redo(State(state): State<AppState>) -> ApiResult<HistoryOutcome> {
    Ok(Json(state.engine.redo().await?))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<TransitError> for AppError {
    fn from(e: TransitError) -> Self {
        let message = e.to_string();
        match e {
            TransitError::NotFound(_) => AppError::NotFound { message },
            TransitError::Validation(_) => AppError::BadRequest { message },
            TransitError::State(_) => AppError::Conflict { message },
            TransitError::Persistence(_) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, error = %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::{NotFound, StateError, ValidationError};
    use crate::engine::TransitEngine;
    use crate::storage::{MemoryStore, StorageError};

    fn app() -> Router {
        let engine = TransitEngine::load(Arc::new(MemoryStore::new()), EngineConfig::default())
            .unwrap();
        create_router(AppState::new(engine))
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn status_of(err: impl Into<TransitError>) -> StatusCode {
        AppError::from(err.into()).into_response().status()
    }

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(status_of(NotFound::Bus(3)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ValidationError::EmptyRouteName),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StateError::TicketAlreadyCancelled("T-1".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(StorageError::Unavailable("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_message_survives_mapping() {
        let err = AppError::from(TransitError::from(NotFound::Ticket("T-9".into())));
        assert!(matches!(
            err,
            AppError::NotFound { ref message } if message == "ticket not found: T-9"
        ));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (status, body) = send(app(), "GET", "/routes/no-such-route").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("no-such-route"));
    }

    #[tokio::test]
    async fn undo_with_empty_history_conflicts() {
        let (status, body) = send(app(), "POST", "/history/undo").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let (status, _) = send(app(), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
    }
}
