use seatline_shared::{Bus, SeatNumber};
use serde::Serialize;
use std::collections::BTreeSet;

/// Seats picked so far in a session, ascending.
pub type Selection = BTreeSet<SeatNumber>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Booked,
    Selected,
    Available,
}

/// Seat picking rules. Every function is pure in (bus, selection, target
/// count); nothing is remembered between calls.
pub struct SeatAllocator;

impl SeatAllocator {
    /// Booked wins over Selected: a seat booked since it was picked shows as
    /// Booked.
    pub fn status(bus: &Bus, seat: SeatNumber, selection: &Selection) -> SeatStatus {
        if bus.is_booked(seat) {
            SeatStatus::Booked
        } else if selection.contains(&seat) {
            SeatStatus::Selected
        } else {
            SeatStatus::Available
        }
    }

    /// Apply one click on `seat`.
    ///
    /// Booked and out-of-range seats are ignored. A selected seat is dropped.
    /// An available seat is added only while fewer than `target` are picked;
    /// a full selection is never evicted to make room.
    pub fn toggle(bus: &Bus, seat: SeatNumber, selection: &Selection, target: usize) -> Selection {
        let mut next = selection.clone();

        if bus.is_booked(seat) || !bus.in_range(seat) {
            return next;
        }

        if !next.remove(&seat) && next.len() < target {
            next.insert(seat);
        }

        next
    }

    pub fn is_complete(selection: &Selection, target: usize) -> bool {
        selection.len() == target
    }

    /// Whether `bus` can hold a booking of `target` seats at all.
    pub fn can_seat(bus: &Bus, target: usize) -> bool {
        bus.available_seats() as usize >= target
    }

    /// "Selected: n / k", with seat numbers when any are picked.
    pub fn summary(selection: &Selection, target: usize) -> String {
        let mut line = format!("Selected: {} / {} seats", selection.len(), target);
        if !selection.is_empty() {
            let seats: Vec<String> = selection.iter().map(|s| s.to_string()).collect();
            line.push_str(&format!(" ({})", seats.join(", ")));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus_with_booked(seats: &[SeatNumber]) -> Bus {
        let mut bus = Bus::new(1, "Express Deluxe A", 36);
        if !seats.is_empty() {
            bus.book(seats).unwrap();
        }
        bus
    }

    #[test]
    fn test_status() {
        let bus = bus_with_booked(&[3]);
        let selection = Selection::from([5]);

        assert_eq!(SeatAllocator::status(&bus, 3, &selection), SeatStatus::Booked);
        assert_eq!(SeatAllocator::status(&bus, 5, &selection), SeatStatus::Selected);
        assert_eq!(SeatAllocator::status(&bus, 6, &selection), SeatStatus::Available);
    }

    #[test]
    fn test_toggle_alternates_membership() {
        let bus = bus_with_booked(&[]);
        let mut selection = Selection::new();

        for round in 0..4 {
            selection = SeatAllocator::toggle(&bus, 9, &selection, 2);
            assert_eq!(selection.contains(&9), round % 2 == 0);
            assert!(selection.len() <= 2);
        }
    }

    #[test]
    fn test_toggle_on_booked_seat_is_noop() {
        let bus = bus_with_booked(&[3, 4]);

        let empty = Selection::new();
        assert_eq!(SeatAllocator::toggle(&bus, 3, &empty, 2), empty);

        // Even if a stale selection still holds it
        let stale = Selection::from([4]);
        assert_eq!(SeatAllocator::toggle(&bus, 4, &stale, 2), stale);
    }

    #[test]
    fn test_full_selection_is_not_evicted() {
        let bus = bus_with_booked(&[]);
        let selection = Selection::from([5]);

        assert_eq!(SeatAllocator::toggle(&bus, 7, &selection, 1), Selection::from([5]));
        assert!(SeatAllocator::is_complete(&selection, 1));
    }

    #[test]
    fn test_out_of_range_seat_ignored() {
        let bus = bus_with_booked(&[]);
        assert!(SeatAllocator::toggle(&bus, 0, &Selection::new(), 2).is_empty());
        assert!(SeatAllocator::toggle(&bus, 37, &Selection::new(), 2).is_empty());
    }

    #[test]
    fn test_can_seat_and_summary() {
        let bus = bus_with_booked(&(1..=34).collect::<Vec<_>>());

        assert!(SeatAllocator::can_seat(&bus, 2));
        assert!(!SeatAllocator::can_seat(&bus, 3));
        assert_eq!(
            SeatAllocator::summary(&Selection::from([12, 3]), 3),
            "Selected: 2 / 3 seats (3, 12)"
        );
    }
}
