pub mod checkout;
pub mod identity;
pub mod validation;

pub use seatline_shared::SeatSelectionError;
pub use validation::{Field, FieldErrors};

/// Every failure the booking flow can report. None of them is fatal: each
/// maps to a recovery step in an earlier flow state. Corrupt stored data is
/// repaired by the store on load and never reaches callers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid seat selection: {0}")]
    InvalidSeatSelection(#[from] SeatSelectionError),

    #[error("Storage failure: {0}")]
    StorageError(String),

    #[error("Login required")]
    LoginRequired,

    #[error("Admin access required")]
    Forbidden,

    #[error("Invalid flow transition: {0}")]
    InvalidTransition(String),

    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        CoreError::ValidationError(errors)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
