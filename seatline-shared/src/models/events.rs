use serde::{Deserialize, Serialize};

use super::booking::Booking;
use super::bus::{BusId, SeatNumber};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BookingConfirmedEvent {
    pub booking_id: String,
    pub bus_id: BusId,
    pub destination: String,
    pub seats: Vec<SeatNumber>,
    pub platform: String,
    pub total_price: u32,
    pub timestamp: i64,
}

impl From<&Booking> for BookingConfirmedEvent {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id().to_string(),
            bus_id: booking.bus_id(),
            destination: booking.destination().to_string(),
            seats: booking.seats().iter().copied().collect(),
            platform: booking.platform().key().to_string(),
            total_price: booking.total_price(),
            timestamp: booking.timestamp().timestamp(),
        }
    }
}
