use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use seatline_catalog::{SeatAllocator, SeatStatus};
use seatline_order::{BookingSession, FlowState, NextStep, SessionDraft, TripRequest};
use seatline_shared::{Booking, BusId, Platform, SeatNumber};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::{AppState, SessionRegistry};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub state: FlowState,
    pub awaiting_login: bool,
    pub draft: SessionDraft,
    /// "Selected: n / k (…)" once seat picking has started.
    pub selection_summary: Option<String>,
    /// Buses that can seat the whole party, once a platform is chosen.
    pub eligible_buses: Vec<BusId>,
    pub booking: Option<Booking>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub next: NextStep,
    pub session: SessionResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatResponse {
    pub seat: SeatNumber,
    pub status: SeatStatus,
    pub session: SessionResponse,
}

#[derive(Debug, Deserialize)]
pub struct PlatformRequest {
    pub platform: Platform,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusRequest {
    pub bus_id: BusId,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(close_session))
        .route("/sessions/{id}/trip", post(choose_trip))
        .route("/sessions/{id}/resume", post(resume))
        .route("/sessions/{id}/platform", post(choose_platform))
        .route("/sessions/{id}/bus", post(choose_bus))
        .route("/sessions/{id}/seats/{seat}", post(toggle_seat))
        .route("/sessions/{id}/confirm", post(confirm))
        .route("/sessions/{id}/restart", post(restart))
}

fn session_mut(sessions: &mut SessionRegistry, id: Uuid) -> Result<&mut BookingSession, AppError> {
    sessions
        .get_mut(&id, Instant::now())
        .ok_or_else(|| AppError::NotFoundError(format!("Session {} not found", id)))
}

fn view(state: &AppState, id: Uuid, session: &BookingSession) -> Result<SessionResponse, AppError> {
    let draft = session.draft().clone();
    let picking = matches!(
        session.state(),
        FlowState::PlatformChosen | FlowState::SeatsChosen
    );

    let eligible_buses = if picking {
        let ledger = state.ledger.lock()?;
        session
            .eligible_buses(ledger.list_buses())
            .into_iter()
            .map(|bus| bus.id)
            .collect()
    } else {
        Vec::new()
    };
    let selection_summary = (picking && draft.bus_id.is_some())
        .then(|| SeatAllocator::summary(&draft.chosen_seats, draft.seat_count as usize));

    Ok(SessionResponse {
        id,
        state: session.state(),
        awaiting_login: session.awaiting_login(),
        draft,
        selection_summary,
        eligible_buses,
        booking: session.booking().cloned(),
    })
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let id = Uuid::new_v4();
    let session = state.new_session();
    let response = view(&state, id, &session)?;

    let mut sessions = state.sessions.lock()?;
    sessions.insert(id, session, Instant::now());
    info!("Booking session {} started, {} open", id, sessions.open_count());
    Ok((StatusCode::CREATED, Json(response)))
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .lock()?
        .remove(&id)
        .ok_or_else(|| AppError::NotFoundError(format!("Session {} not found", id)))?;
    info!("Booking session {} closed", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut sessions = state.sessions.lock()?;
    let session = session_mut(&mut sessions, id)?;
    Ok(Json(view(&state, id, session)?))
}

async fn choose_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TripRequest>,
) -> Result<Json<StepResponse>, AppError> {
    let mut sessions = state.sessions.lock()?;
    let session = session_mut(&mut sessions, id)?;
    let next = session.choose_trip(&req)?;
    Ok(Json(StepResponse {
        next,
        session: view(&state, id, session)?,
    }))
}

async fn resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StepResponse>, AppError> {
    let mut sessions = state.sessions.lock()?;
    let session = session_mut(&mut sessions, id)?;
    let next = session.resume()?;
    Ok(Json(StepResponse {
        next,
        session: view(&state, id, session)?,
    }))
}

async fn choose_platform(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PlatformRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut sessions = state.sessions.lock()?;
    let session = session_mut(&mut sessions, id)?;
    session.choose_platform(&state.catalog, req.platform)?;
    Ok(Json(view(&state, id, session)?))
}

async fn choose_bus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<BusRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut sessions = state.sessions.lock()?;
    let session = session_mut(&mut sessions, id)?;
    {
        let ledger = state.ledger.lock()?;
        session.choose_bus(&ledger, req.bus_id)?;
    }
    Ok(Json(view(&state, id, session)?))
}

async fn toggle_seat(
    State(state): State<AppState>,
    Path((id, seat)): Path<(Uuid, SeatNumber)>,
) -> Result<Json<SeatResponse>, AppError> {
    let mut sessions = state.sessions.lock()?;
    let session = session_mut(&mut sessions, id)?;
    let status = {
        let ledger = state.ledger.lock()?;
        session.toggle_seat(&ledger, seat)?
    };
    Ok(Json(SeatResponse {
        seat,
        status,
        session: view(&state, id, session)?,
    }))
}

async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let mut sessions = state.sessions.lock()?;
    let session = session_mut(&mut sessions, id)?;
    let booking = {
        let mut ledger = state.ledger.lock()?;
        session.confirm(&mut ledger)?
    };
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn restart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut sessions = state.sessions.lock()?;
    let session = session_mut(&mut sessions, id)?;
    session.restart();
    Ok(Json(view(&state, id, session)?))
}
