use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use seatline_core::identity::LoginRequest;
use seatline_shared::User;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let user = state.auth.login(req)?;
    info!("User {} logged in as {:?}", user.name, user.user_type);
    Ok(Json(user))
}

async fn logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.auth.logout()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(state): State<AppState>) -> Result<Json<User>, AppError> {
    state
        .auth
        .current_user()?
        .map(Json)
        .ok_or_else(|| AppError::AuthenticationError("Not logged in".to_string()))
}
