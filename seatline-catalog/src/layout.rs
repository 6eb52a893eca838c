use seatline_shared::{Bus, SeatNumber};
use serde::{Deserialize, Serialize};

use crate::allocator::{SeatAllocator, SeatStatus, Selection};

/// Seats on each side of the aisle. Derived for display only; a bus stores
/// nothing but its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatLayout {
    pub left: u32,
    pub right: u32,
}

impl Default for SeatLayout {
    fn default() -> Self {
        Self { left: 3, right: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatCell {
    pub seat: SeatNumber,
    pub status: SeatStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatMapRow {
    pub left: Vec<SeatCell>,
    pub right: Vec<SeatCell>,
}

impl SeatLayout {
    pub fn per_row(&self) -> u32 {
        self.left + self.right
    }

    /// Number seats row by row, left block first. The last row may be short.
    pub fn rows(&self, total_seats: u32) -> Vec<(Vec<SeatNumber>, Vec<SeatNumber>)> {
        let per_row = self.per_row().max(1);
        let left_width = self.left.min(per_row);

        (1..=total_seats)
            .collect::<Vec<_>>()
            .chunks(per_row as usize)
            .map(|row| {
                let split = row.len().min(left_width as usize);
                (row[..split].to_vec(), row[split..].to_vec())
            })
            .collect()
    }

    pub fn seat_map(&self, bus: &Bus, selection: &Selection) -> Vec<SeatMapRow> {
        let cell = |seat: &SeatNumber| SeatCell {
            seat: *seat,
            status: SeatAllocator::status(bus, *seat, selection),
        };

        self.rows(bus.total_seats)
            .into_iter()
            .map(|(left, right)| SeatMapRow {
                left: left.iter().map(cell).collect(),
                right: right.iter().map(cell).collect(),
            })
            .collect()
    }
}
