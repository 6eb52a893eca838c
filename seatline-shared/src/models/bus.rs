use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::RecordError;

pub type BusId = u32;
pub type SeatNumber = u32;

/// Why a requested set of seats cannot be booked on a bus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeatSelectionError {
    #[error("bus {0} does not exist")]
    UnknownBus(BusId),

    #[error("no seats selected")]
    Empty,

    #[error("seat {seat} is outside 1..={total_seats}")]
    OutOfRange {
        seat: SeatNumber,
        total_seats: u32,
    },

    #[error("seat {0} selected more than once")]
    Duplicate(SeatNumber),

    #[error("seats already booked: {0:?}")]
    AlreadyBooked(Vec<SeatNumber>),

    #[error("expected {expected} seats, got {actual}")]
    CountMismatch {
        expected: usize,
        actual: usize,
    },

    #[error("bus {bus_id} has {available} seats left, {requested} requested")]
    InsufficientCapacity {
        bus_id: BusId,
        available: u32,
        requested: u32,
    },
}

/// A fixed-capacity seat pool.
///
/// `booked_seats` only grows, and only through [`Bus::book`], which keeps
/// every entry inside `1..=total_seats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "BusRecord")]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    pub total_seats: u32,
    booked_seats: BTreeSet<SeatNumber>,
}

impl Bus {
    pub fn new(id: BusId, name: impl Into<String>, total_seats: u32) -> Self {
        Self {
            id,
            name: name.into(),
            total_seats,
            booked_seats: BTreeSet::new(),
        }
    }

    pub fn booked_seats(&self) -> &BTreeSet<SeatNumber> {
        &self.booked_seats
    }

    pub fn is_booked(&self, seat: SeatNumber) -> bool {
        self.booked_seats.contains(&seat)
    }

    pub fn in_range(&self, seat: SeatNumber) -> bool {
        (1..=self.total_seats).contains(&seat)
    }

    pub fn available_seats(&self) -> u32 {
        self.total_seats.saturating_sub(self.booked_seats.len() as u32)
    }

    /// Check a seat request against the current booked set without mutating.
    pub fn check_request(
        &self,
        seats: &[SeatNumber],
    ) -> Result<BTreeSet<SeatNumber>, SeatSelectionError> {
        if seats.is_empty() {
            return Err(SeatSelectionError::Empty);
        }

        let mut requested = BTreeSet::new();
        for &seat in seats {
            if !self.in_range(seat) {
                return Err(SeatSelectionError::OutOfRange {
                    seat,
                    total_seats: self.total_seats,
                });
            }
            if !requested.insert(seat) {
                return Err(SeatSelectionError::Duplicate(seat));
            }
        }

        let taken: Vec<SeatNumber> = requested
            .intersection(&self.booked_seats)
            .copied()
            .collect();
        if !taken.is_empty() {
            return Err(SeatSelectionError::AlreadyBooked(taken));
        }

        Ok(requested)
    }

    /// Validate and merge `seats` into the booked set.
    pub fn book(&mut self, seats: &[SeatNumber]) -> Result<BTreeSet<SeatNumber>, SeatSelectionError> {
        let requested = self.check_request(seats)?;
        self.booked_seats.extend(requested.iter().copied());
        Ok(requested)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BusRecord {
    id: BusId,
    name: String,
    total_seats: u32,
    #[serde(default)]
    booked_seats: Vec<SeatNumber>,
}

impl TryFrom<BusRecord> for Bus {
    type Error = RecordError;

    fn try_from(record: BusRecord) -> Result<Self, Self::Error> {
        if record.total_seats == 0 {
            return Err(RecordError::ZeroCapacity(record.id));
        }

        let mut booked_seats = BTreeSet::new();
        for seat in record.booked_seats {
            if !(1..=record.total_seats).contains(&seat) {
                return Err(RecordError::SeatOutOfRange {
                    seat,
                    total_seats: record.total_seats,
                });
            }
            if !booked_seats.insert(seat) {
                return Err(RecordError::DuplicateSeat(seat));
            }
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            total_seats: record.total_seats,
            booked_seats,
        })
    }
}
