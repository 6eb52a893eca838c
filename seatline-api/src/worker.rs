use chrono::DateTime;
use seatline_shared::models::events::BookingConfirmedEvent;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tracing::{info, warn};

/// Log every confirmed booking until the channel closes.
pub async fn log_booking_events(mut rx: Receiver<BookingConfirmedEvent>) {
    info!("Booking event logger started");

    loop {
        match rx.recv().await {
            Ok(event) => info!(
                booking_id = %event.booking_id,
                bus_id = event.bus_id,
                destination = %event.destination,
                seats = ?event.seats,
                platform = %event.platform,
                total_price = event.total_price,
                booked_at = %booked_at(&event),
                "booking.confirmed"
            ),
            Err(RecvError::Lagged(skipped)) => warn!("Booking event logger lagged, skipped {}", skipped),
            Err(RecvError::Closed) => break,
        }
    }

    info!("Booking event logger stopped");
}

/// RFC 3339 form of the event's unix timestamp, or the raw seconds if out of range.
fn booked_at(event: &BookingConfirmedEvent) -> String {
    DateTime::from_timestamp(event.timestamp, 0)
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| event.timestamp.to_string())
}
