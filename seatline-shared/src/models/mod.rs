pub mod booking;
pub mod bus;
pub mod events;
pub mod platform;
pub mod user;

use bus::{BusId, SeatNumber};

/// Rejections raised while building or deserializing a persisted record.
///
/// Stored data passes through the same checks as freshly created data, so a
/// hand-edited or truncated store never yields a record that breaks the
/// ledger invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("bus {0} has no seats")]
    ZeroCapacity(BusId),

    #[error("seat {seat} is outside 1..={total_seats}")]
    SeatOutOfRange {
        seat: SeatNumber,
        total_seats: u32,
    },

    #[error("seat {0} appears more than once")]
    DuplicateSeat(SeatNumber),

    #[error("booking {0} has no seats")]
    EmptySeats(String),

    #[error("booking {0} has a non-positive price per seat")]
    NonPositivePrice(String),

    #[error("booking {id}: total price {found} does not match {expected}")]
    TotalMismatch {
        id: String,
        expected: u32,
        found: u32,
    },

    #[error("booking {0}: total price overflows")]
    PriceOverflow(String),
}
