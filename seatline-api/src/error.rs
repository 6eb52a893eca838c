use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use seatline_core::{CoreError, FieldErrors};
use serde_json::json;
use std::sync::PoisonError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(FieldErrors),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::ValidationError(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "fields": fields }),
            ),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(fields) => AppError::ValidationError(fields),
            CoreError::NotFound(what) => AppError::NotFoundError(format!("Not found: {}", what)),
            e @ CoreError::InvalidSeatSelection(_) => AppError::ConflictError(e.to_string()),
            e @ CoreError::InvalidTransition(_) => AppError::ConflictError(e.to_string()),
            CoreError::LoginRequired => AppError::AuthenticationError("Login required".to_string()),
            CoreError::Forbidden => AppError::AuthorizationError("Admin access required".to_string()),
            e @ (CoreError::StorageError(_) | CoreError::InternalError(_)) => {
                AppError::InternalServerError(e.to_string())
            }
        }
    }
}

impl<T> From<PoisonError<T>> for AppError {
    fn from(_: PoisonError<T>) -> Self {
        AppError::InternalServerError("state lock poisoned".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatline_core::{Field, SeatSelectionError};

    fn status_of(err: CoreError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_core_errors_map_to_status_codes() {
        let mut fields = FieldErrors::new();
        fields.add(Field::Email, "Email is invalid");

        assert_eq!(status_of(CoreError::ValidationError(fields)), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(CoreError::NotFound("Delhi → Goa".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(SeatSelectionError::AlreadyBooked(vec![3]).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(CoreError::LoginRequired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(CoreError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(CoreError::StorageError("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
