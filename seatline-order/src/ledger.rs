use chrono::{DateTime, Utc};
use rand::Rng;
use seatline_core::{CoreError, CoreResult, SeatSelectionError};
use seatline_shared::models::events::BookingConfirmedEvent;
use seatline_shared::{Booking, Bus, BusId, Destination, Platform, SeatNumber};
use seatline_store::app_config::BookingRules;
use seatline_store::PersistenceAdapter;
use std::sync::Arc;
use tracing::{debug, info};

/// Receives a notification after every confirmed booking.
pub trait BookingEventSink: Send + Sync {
    fn booking_confirmed(&self, event: &BookingConfirmedEvent);
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Append-only booking ledger plus the bus roster it books against.
///
/// The ledger holds the latest state this process has seen and writes the
/// whole roster and ledger back after every booking. Another process writing
/// the same store in between is not detected.
pub struct BookingLedger {
    adapter: PersistenceAdapter,
    rules: BookingRules,
    buses: Vec<Bus>,
    bookings: Vec<Booking>,
    sinks: Vec<Arc<dyn BookingEventSink>>,
}

impl BookingLedger {
    pub fn open(adapter: PersistenceAdapter, rules: BookingRules) -> CoreResult<Self> {
        let snapshot = adapter.load()?;
        info!(
            "Ledger opened with {} buses and {} bookings",
            snapshot.buses.len(),
            snapshot.bookings.len()
        );

        Ok(Self {
            adapter,
            rules,
            buses: snapshot.buses,
            bookings: snapshot.bookings,
            sinks: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, sink: Arc<dyn BookingEventSink>) {
        self.sinks.push(sink);
    }

    pub fn rules(&self) -> &BookingRules {
        &self.rules
    }

    /// Bookings in creation order, most recent last.
    pub fn list_bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn list_buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn bus(&self, bus_id: BusId) -> Option<&Bus> {
        self.buses.iter().find(|b| b.id == bus_id)
    }

    /// Re-read buses and bookings from storage.
    pub fn reload(&mut self) -> CoreResult<()> {
        let snapshot = self.adapter.load()?;
        self.buses = snapshot.buses;
        self.bookings = snapshot.bookings;
        Ok(())
    }

    /// Book `seats` on `bus_id` and persist the result.
    ///
    /// The request is checked again here against the ledger's own bus state,
    /// whatever the caller saw. On any failure neither the ledger nor the bus
    /// changes, in memory or in storage.
    pub fn create_booking(
        &mut self,
        bus_id: BusId,
        destination: Destination,
        seats: &[SeatNumber],
        platform: Platform,
        price_per_seat: u32,
    ) -> CoreResult<Booking> {
        let index = self
            .buses
            .iter()
            .position(|b| b.id == bus_id)
            .ok_or(SeatSelectionError::UnknownBus(bus_id))?;

        let mut bus = self.buses[index].clone();
        let seats = bus.book(seats)?;

        let now = Utc::now();
        let booking = Booking::new(
            self.next_id(now),
            bus_id,
            destination,
            seats,
            platform,
            price_per_seat,
            now,
        )
        .map_err(|e| CoreError::InternalError(e.to_string()))?;

        let mut buses = self.buses.clone();
        buses[index] = bus;
        let mut bookings = self.bookings.clone();
        bookings.push(booking.clone());

        self.adapter.save(&buses, &bookings)?;
        self.buses = buses;
        self.bookings = bookings;

        info!(
            "Booking {} confirmed: bus {} seats {:?} via {} for {}",
            booking.id(),
            bus_id,
            booking.seats(),
            platform,
            booking.total_price()
        );

        let event = BookingConfirmedEvent::from(&booking);
        for sink in &self.sinks {
            sink.booking_confirmed(&event);
        }

        Ok(booking)
    }

    /// `{prefix}_{millis}_{9 base-36 chars}`, unique within this ledger.
    fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let suffix: String = (0..ID_SUFFIX_LEN)
                .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
                .collect();
            let id = format!("{}_{}_{}", self.rules.booking_id_prefix, now.timestamp_millis(), suffix);
            if !self.bookings.iter().any(|b| b.id() == id) {
                return id;
            }
            debug!("Booking id collision on {}, regenerating", id);
        }
    }
}
