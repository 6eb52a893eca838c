use axum::{http::StatusCode, routing::post, Json, Router};
use seatline_core::checkout::ContactDetails;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/checkout/validate", post(validate_contact))
}

async fn validate_contact(Json(details): Json<ContactDetails>) -> Result<StatusCode, AppError> {
    details.validate().map_err(AppError::ValidationError)?;
    Ok(StatusCode::NO_CONTENT)
}
