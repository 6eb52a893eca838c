use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::bus::{BusId, SeatNumber};
use super::platform::{Destination, Platform};
use super::RecordError;

/// An immutable record of seats reserved on one bus.
///
/// `total_price` is always `price_per_seat * seats.len()`; both constructors
/// (including deserialization) enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "BookingRecord")]
pub struct Booking {
    id: String,
    bus_id: BusId,
    destination: Destination,
    seats: BTreeSet<SeatNumber>,
    platform: Platform,
    price_per_seat: u32,
    total_price: u32,
    timestamp: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        id: String,
        bus_id: BusId,
        destination: Destination,
        seats: BTreeSet<SeatNumber>,
        platform: Platform,
        price_per_seat: u32,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        if seats.is_empty() {
            return Err(RecordError::EmptySeats(id));
        }
        if price_per_seat == 0 {
            return Err(RecordError::NonPositivePrice(id));
        }
        let total_price = price_per_seat
            .checked_mul(seats.len() as u32)
            .ok_or_else(|| RecordError::PriceOverflow(id.clone()))?;

        Ok(Self {
            id,
            bus_id,
            destination,
            seats,
            platform,
            price_per_seat,
            total_price,
            timestamp,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bus_id(&self) -> BusId {
        self.bus_id
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn seats(&self) -> &BTreeSet<SeatNumber> {
        &self.seats
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn price_per_seat(&self) -> u32 {
        self.price_per_seat
    }

    pub fn total_price(&self) -> u32 {
        self.total_price
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingRecord {
    id: String,
    bus_id: BusId,
    destination: Destination,
    seats: Vec<SeatNumber>,
    platform: Platform,
    price_per_seat: u32,
    total_price: u32,
    timestamp: DateTime<Utc>,
}

impl TryFrom<BookingRecord> for Booking {
    type Error = RecordError;

    fn try_from(record: BookingRecord) -> Result<Self, Self::Error> {
        let mut seats = BTreeSet::new();
        for seat in record.seats {
            if !seats.insert(seat) {
                return Err(RecordError::DuplicateSeat(seat));
            }
        }

        let booking = Booking::new(
            record.id,
            record.bus_id,
            record.destination,
            seats,
            record.platform,
            record.price_per_seat,
            record.timestamp,
        )?;

        if booking.total_price != record.total_price {
            return Err(RecordError::TotalMismatch {
                id: booking.id,
                expected: booking.total_price,
                found: record.total_price,
            });
        }

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Booking {
        Booking::new(
            "bk_1_abc".to_string(),
            1,
            Destination::from("Delhi → Agra"),
            BTreeSet::from([3, 4]),
            Platform::Own,
            380,
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_total_price_derived() {
        let booking = sample();
        assert_eq!(booking.total_price(), 760);
    }

    #[test]
    fn test_rejects_empty_and_free() {
        let now = Utc::now();
        let empty = Booking::new("a".into(), 1, "X".into(), BTreeSet::new(), Platform::Own, 100, now);
        assert_eq!(empty, Err(RecordError::EmptySeats("a".into())));

        let free = Booking::new("b".into(), 1, "X".into(), BTreeSet::from([1]), Platform::Own, 0, now);
        assert_eq!(free, Err(RecordError::NonPositivePrice("b".into())));
    }

    #[test]
    fn test_persisted_layout() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["busId"], 1);
        assert_eq!(value["seats"], serde_json::json!([3, 4]));
        assert_eq!(value["platform"], "own");
        assert_eq!(value["pricePerSeat"], 380);
        assert_eq!(value["totalPrice"], 760);
        assert!(value["timestamp"].as_str().unwrap().starts_with("2025-03-01T10:30:00"));
    }

    #[test]
    fn test_deserialize_rejects_tampered_total() {
        let json = r#"{
            "id": "bk_1_abc",
            "busId": 1,
            "destination": "Delhi → Agra",
            "seats": [3, 4],
            "platform": "own",
            "pricePerSeat": 380,
            "totalPrice": 100,
            "timestamp": "2025-03-01T10:30:00Z"
        }"#;
        let err = serde_json::from_str::<Booking>(json).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_deserialize_rejects_unknown_platform() {
        let json = r#"{
            "id": "bk_1_abc",
            "busId": 1,
            "destination": "Delhi → Agra",
            "seats": [3],
            "platform": "cleartrip",
            "pricePerSeat": 380,
            "totalPrice": 380,
            "timestamp": "2025-03-01T10:30:00Z"
        }"#;
        assert!(serde_json::from_str::<Booking>(json).is_err());
    }
}
