use seatline_shared::{Booking, Bus, BusId, SeatNumber};
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::kv::KeyValueStore;
use crate::{StoreError, BOOKINGS_KEY, BUSES_KEY};

/// Buses and bookings as read or written together.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub buses: Vec<Bus>,
    pub bookings: Vec<Booking>,
}

/// A snapshot whose buses and bookings disagree with each other.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SnapshotError(String);

impl Snapshot {
    pub fn seed(roster: &[Bus]) -> Self {
        Self {
            buses: roster.to_vec(),
            bookings: Vec::new(),
        }
    }

    /// Check the cross-record invariants: bus ids and booking ids are unique,
    /// every booking points at a known bus, and each bus's booked seats are
    /// exactly the disjoint union of its bookings' seats.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        let mut buses: HashMap<BusId, &Bus> = HashMap::new();
        for bus in &self.buses {
            if buses.insert(bus.id, bus).is_some() {
                return Err(SnapshotError(format!("duplicate bus id {}", bus.id)));
            }
        }

        let mut ids = HashSet::new();
        let mut claimed: HashMap<BusId, BTreeSet<SeatNumber>> = HashMap::new();
        for booking in &self.bookings {
            if !ids.insert(booking.id()) {
                return Err(SnapshotError(format!("duplicate booking id {}", booking.id())));
            }
            let bus = buses.get(&booking.bus_id()).ok_or_else(|| {
                SnapshotError(format!(
                    "booking {} references unknown bus {}",
                    booking.id(),
                    booking.bus_id()
                ))
            })?;
            let seats = claimed.entry(bus.id).or_default();
            for &seat in booking.seats() {
                if !bus.in_range(seat) {
                    return Err(SnapshotError(format!(
                        "booking {} holds seat {} outside bus {}",
                        booking.id(),
                        seat,
                        bus.id
                    )));
                }
                if !seats.insert(seat) {
                    return Err(SnapshotError(format!(
                        "seat {} on bus {} is booked twice",
                        seat, bus.id
                    )));
                }
            }
        }

        for bus in &self.buses {
            let expected = claimed.remove(&bus.id).unwrap_or_default();
            if &expected != bus.booked_seats() {
                return Err(SnapshotError(format!(
                    "bus {} booked seats do not match its bookings",
                    bus.id
                )));
            }
        }

        Ok(())
    }

    /// Recompute every bus's booked seats from the bookings, treating the
    /// bookings as the record of truth. Fails when the bookings themselves
    /// cannot all be placed.
    pub fn rebuild_booked_seats(&self) -> Result<Snapshot, SnapshotError> {
        let mut buses: Vec<Bus> = self
            .buses
            .iter()
            .map(|bus| Bus::new(bus.id, bus.name.clone(), bus.total_seats))
            .collect();

        for booking in &self.bookings {
            let bus = buses
                .iter_mut()
                .find(|bus| bus.id == booking.bus_id())
                .ok_or_else(|| {
                    SnapshotError(format!(
                        "booking {} references unknown bus {}",
                        booking.id(),
                        booking.bus_id()
                    ))
                })?;
            let seats: Vec<SeatNumber> = booking.seats().iter().copied().collect();
            bus.book(&seats)
                .map_err(|e| SnapshotError(format!("booking {}: {}", booking.id(), e)))?;
        }

        let rebuilt = Snapshot {
            buses,
            bookings: self.bookings.clone(),
        };
        rebuilt.verify()?;
        Ok(rebuilt)
    }
}

enum Loaded<T> {
    Missing,
    Present(T),
    Corrupt(String),
}

/// Reads and writes the bus roster and booking ledger.
///
/// Storage is read-modify-written as a whole, last write wins. Two processes
/// sharing one store can still double-book a seat between their read and
/// write; nothing here locks across processes.
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
    roster: Vec<Bus>,
}

impl PersistenceAdapter {
    /// `roster` is the first-run seed.
    pub fn new(store: Arc<dyn KeyValueStore>, roster: Vec<Bus>) -> Self {
        Self { store, roster }
    }

    /// Load the stored snapshot, seeding on first run.
    ///
    /// Unparseable data is logged and replaced with a fresh seed rather than
    /// returned as an error. When only the buses' booked seats disagree with
    /// the bookings, the seats are rebuilt from the bookings instead, so no
    /// confirmed booking is dropped. Only I/O failures propagate.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let buses = self.read::<Vec<Bus>>(BUSES_KEY)?;
        let bookings = self.read::<Vec<Booking>>(BOOKINGS_KEY)?;

        let (snapshot, dirty) = match (buses, bookings) {
            (Loaded::Corrupt(reason), _) | (_, Loaded::Corrupt(reason)) => {
                warn!("Stored booking data is corrupt, re-seeding: {}", reason);
                return self.reseed();
            }
            (Loaded::Missing, Loaded::Missing) => {
                info!("No stored booking data, seeding {} buses", self.roster.len());
                return self.reseed();
            }
            (Loaded::Missing, Loaded::Present(bookings)) => (
                Snapshot { buses: self.roster.clone(), bookings },
                true,
            ),
            (Loaded::Present(buses), Loaded::Missing) => (
                Snapshot { buses, bookings: Vec::new() },
                true,
            ),
            (Loaded::Present(buses), Loaded::Present(bookings)) => {
                (Snapshot { buses, bookings }, false)
            }
        };

        if let Err(e) = snapshot.verify() {
            return match snapshot.rebuild_booked_seats() {
                Ok(rebuilt) => {
                    warn!("Stored bus seats disagree with bookings, rebuilding: {}", e);
                    self.save(&rebuilt.buses, &rebuilt.bookings)?;
                    Ok(rebuilt)
                }
                Err(unplaceable) => {
                    warn!("Stored bookings are inconsistent, re-seeding: {}", unplaceable);
                    self.reseed()
                }
            };
        }

        if dirty {
            self.save(&snapshot.buses, &snapshot.bookings)?;
        }

        Ok(snapshot)
    }

    /// Overwrite both keys unconditionally.
    pub fn save(&self, buses: &[Bus], bookings: &[Booking]) -> Result<(), StoreError> {
        let encode = |key: &str, value: Result<String, serde_json::Error>| {
            value.map_err(|source| StoreError::Encode {
                key: key.to_string(),
                source,
            })
        };
        let buses = encode(BUSES_KEY, serde_json::to_string(buses))?;
        let bookings = encode(BOOKINGS_KEY, serde_json::to_string(bookings))?;

        self.store
            .set_many(&[(BOOKINGS_KEY, bookings), (BUSES_KEY, buses)])
    }

    fn reseed(&self) -> Result<Snapshot, StoreError> {
        let snapshot = Snapshot::seed(&self.roster);
        self.save(&snapshot.buses, &snapshot.bookings)?;
        Ok(snapshot)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Loaded<T>, StoreError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Loaded::Missing);
        };
        Ok(match serde_json::from_str(&raw) {
            Ok(value) => Loaded::Present(value),
            Err(e) => Loaded::Corrupt(format!("{}: {}", key, e)),
        })
    }
}
