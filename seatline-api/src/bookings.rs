use axum::{extract::State, routing::get, Json, Router};
use seatline_shared::Booking;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/bookings", get(list_bookings))
}

/// The whole ledger, oldest first.
async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    let ledger = state.ledger.lock()?;
    Ok(Json(ledger.list_bookings().to_vec()))
}
