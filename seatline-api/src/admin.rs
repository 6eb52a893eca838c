use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use seatline_order::AdminSummary;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/summary", get(summary))
}

async fn summary(State(state): State<AppState>) -> Result<Json<AdminSummary>, AppError> {
    let admin = state.auth.require_admin()?;
    tracing::debug!("Admin summary requested by {}", admin.name);

    let ledger = state.ledger.lock()?;
    Ok(Json(AdminSummary::compute(
        ledger.list_bookings(),
        ledger.list_buses(),
        Utc::now().date_naive(),
    )))
}
