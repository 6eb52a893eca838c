use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use seatline_catalog::{PriceQuote, SeatMapRow, Selection};
use seatline_shared::{BusId, Destination, Platform, SeatNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PricingQuery {
    pub destination: String,
    #[serde(default = "default_seats")]
    pub seats: u32,
}

fn default_seats() -> u32 {
    1
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResponse {
    pub destination: Destination,
    pub seat_count: u32,
    pub quotes: Vec<PriceQuote>,
    /// Lowest fare per seat; ties go to the earlier platform.
    pub cheapest: Platform,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusResponse {
    pub id: BusId,
    pub name: String,
    pub total_seats: u32,
    pub booked_seats: BTreeSet<SeatNumber>,
    pub available_seats: u32,
}

#[derive(Debug, Deserialize)]
pub struct SeatMapQuery {
    pub session: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapResponse {
    pub bus_id: BusId,
    pub rows: Vec<SeatMapRow>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/destinations", get(list_destinations))
        .route("/pricing", get(get_pricing))
        .route("/buses", get(list_buses))
        .route("/buses/{id}/seat-map", get(seat_map))
}

async fn list_destinations(State(state): State<AppState>) -> Json<Vec<Destination>> {
    Json(state.catalog.list_destinations())
}

async fn get_pricing(
    State(state): State<AppState>,
    Query(query): Query<PricingQuery>,
) -> Result<Json<PricingResponse>, AppError> {
    let destination = Destination::new(query.destination);
    let entry = state
        .catalog
        .get_pricing(&destination)
        .map_err(seatline_core::CoreError::from)?;

    let (cheapest, _) = entry.prices.cheapest();
    Ok(Json(PricingResponse {
        quotes: entry.quotes(query.seats),
        cheapest,
        destination,
        seat_count: query.seats,
    }))
}

async fn list_buses(State(state): State<AppState>) -> Result<Json<Vec<BusResponse>>, AppError> {
    let ledger = state.ledger.lock()?;
    let buses = ledger
        .list_buses()
        .iter()
        .map(|bus| BusResponse {
            id: bus.id,
            name: bus.name.clone(),
            total_seats: bus.total_seats,
            booked_seats: bus.booked_seats().clone(),
            available_seats: bus.available_seats(),
        })
        .collect();
    Ok(Json(buses))
}

/// With `?session=` the session's picks on this bus show as selected.
async fn seat_map(
    State(state): State<AppState>,
    Path(bus_id): Path<BusId>,
    Query(query): Query<SeatMapQuery>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let selection = match query.session {
        Some(id) => {
            let sessions = state.sessions.lock()?;
            let session = sessions
                .get(&id, Instant::now())
                .ok_or_else(|| AppError::NotFoundError(format!("Session {} not found", id)))?;
            if session.draft().bus_id == Some(bus_id) {
                session.draft().chosen_seats.clone()
            } else {
                Selection::new()
            }
        }
        None => Selection::new(),
    };

    let ledger = state.ledger.lock()?;
    let bus = ledger
        .bus(bus_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Bus {} not found", bus_id)))?;

    Ok(Json(SeatMapResponse {
        bus_id,
        rows: state.layout.seat_map(bus, &selection),
    }))
}
