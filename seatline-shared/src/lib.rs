pub mod models;
pub mod pii;

pub use models::booking::Booking;
pub use models::bus::{Bus, BusId, SeatNumber, SeatSelectionError};
pub use models::platform::{Destination, Platform};
pub use models::user::{User, UserType};
pub use models::RecordError;
pub use pii::Masked;
