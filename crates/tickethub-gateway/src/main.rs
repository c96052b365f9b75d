use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result as AnyResult;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
};
use tracing::info;

use tickethub_audit::{AuditLogger, FileSink};
use tickethub_bus::NotificationBus;
use tickethub_core::{BookingError, DomainEventKind, EntityStore, Event, Role, User};
use tickethub_dispatch::{BackgroundDispatcher, DispatchListener, LogNotifier};
use tickethub_engine::BookingEngine;
use tickethub_platform::{
    BookEventResponse, BookingCancelledResponse, CreateEventRequest, EventUpdatedResponse,
    HealthResponse, ServiceConfig, UpdateEventRequest,
};
use tickethub_store::InMemoryStore;

// Stand-in for the auth collaborator: callers are resolved against this
// seeded user table via the user-id header.
const DEMO_USERS: [User; 3] = [
    User {
        id: 1,
        role: Role::Organizer,
    },
    User {
        id: 2,
        role: Role::Customer,
    },
    User {
        id: 3,
        role: Role::Customer,
    },
];

#[derive(Clone)]
struct AppState {
    engine: Arc<BookingEngine>,
    store: Arc<InMemoryStore>,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tickethub_gateway=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;

    let store = Arc::new(InMemoryStore::new());
    for user in DEMO_USERS {
        store.upsert_user(user).await;
    }

    let bus = Arc::new(NotificationBus::new());

    let sink = Arc::new(FileSink::open(&config.audit_log_path)?);
    bus.subscribe_all(Arc::new(AuditLogger::new(sink)));

    let dispatcher = BackgroundDispatcher::spawn(store.clone(), Arc::new(LogNotifier));
    let dispatch_listener = Arc::new(DispatchListener::new(dispatcher));
    bus.subscribe(DomainEventKind::BookingCreated, dispatch_listener.clone());
    bus.subscribe(DomainEventKind::EventUpdated, dispatch_listener);

    let engine = Arc::new(BookingEngine::new(store.clone(), bus));

    let state = AppState { engine, store };
    let router = Router::new()
        .route("/", get(health))
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/{id}", put(update_event))
        .route("/api/events/{id}/book", post(book_event))
        .route("/api/bookings/{id}", delete(cancel_booking))
        .with_state(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("booking gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Event Booking API running".to_string(),
    })
}

async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), (StatusCode, String)> {
    require_role(&state, &headers, Role::Organizer).await?;

    let event = state
        .engine
        .create_event(&payload.title, payload.date, payload.available_tickets)
        .await
        .map_err(booking_error)?;

    Ok((StatusCode::CREATED, Json(event)))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<EventUpdatedResponse>, (StatusCode, String)> {
    require_role(&state, &headers, Role::Organizer).await?;

    let event = state
        .engine
        .update_event(id, payload.into_patch())
        .await
        .map_err(booking_error)?;

    Ok(Json(EventUpdatedResponse {
        message: "Event updated".to_string(),
        event,
    }))
}

async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Event>>, (StatusCode, String)> {
    require_role(&state, &headers, Role::Customer).await?;
    Ok(Json(state.engine.list_events().await))
}

async fn book_event(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<BookEventResponse>), (StatusCode, String)> {
    let user = require_role(&state, &headers, Role::Customer).await?;

    let booking = state
        .engine
        .book_event(id, user.id)
        .await
        .map_err(booking_error)?;

    Ok((
        StatusCode::CREATED,
        Json(BookEventResponse {
            message: "Booking successful".to_string(),
            booking,
        }),
    ))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<BookingCancelledResponse>, (StatusCode, String)> {
    require_role(&state, &headers, Role::Customer).await?;

    state
        .engine
        .cancel_booking(id)
        .await
        .map_err(booking_error)?;

    Ok(Json(BookingCancelledResponse {
        message: "Booking cancelled".to_string(),
    }))
}

async fn require_role(
    state: &AppState,
    headers: &HeaderMap,
    role: Role,
) -> Result<User, (StatusCode, String)> {
    let user = authenticate(state, headers).await?;
    if user.role != role {
        return Err((StatusCode::FORBIDDEN, "Forbidden".to_string()));
    }

    Ok(user)
}

async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<User, (StatusCode, String)> {
    let user_id = headers
        .get("user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .ok_or_else(unauthorized)?;

    state.store.user(user_id).await.ok_or_else(unauthorized)
}

fn unauthorized() -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
}

fn booking_error(err: BookingError) -> (StatusCode, String) {
    let status = match &err {
        BookingError::Validation(_) | BookingError::SoldOut { .. } => StatusCode::BAD_REQUEST,
        BookingError::NotFound { .. } => StatusCode::NOT_FOUND,
    };

    (status, err.to_string())
}
