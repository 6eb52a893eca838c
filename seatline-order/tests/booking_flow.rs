use chrono::{NaiveDate, NaiveDateTime};
use seatline_catalog::{Catalog, SeatAllocator, SeatStatus, Selection};
use seatline_core::identity::{AuthProvider, LoginRequest};
use seatline_core::{CoreError, SeatSelectionError};
use seatline_order::{BookingLedger, BookingSession, FlowState, NextStep, TripRequest};
use seatline_shared::{Masked, Platform, UserType};
use seatline_store::app_config::BookingRules;
use seatline_store::{FileStore, KeyValueStore, MemoryStore, PersistenceAdapter, StoredAuth};
use std::collections::BTreeSet;
use std::sync::Arc;

struct Fixture {
    catalog: Catalog,
    ledger: BookingLedger,
    auth: Arc<StoredAuth>,
}

fn fixture_on(store: Arc<dyn KeyValueStore>) -> Fixture {
    let catalog = Catalog::reference();
    let adapter = PersistenceAdapter::new(store.clone(), catalog.list_buses().to_vec());
    let ledger = BookingLedger::open(adapter, BookingRules::default()).unwrap();
    Fixture {
        catalog,
        ledger,
        auth: Arc::new(StoredAuth::new(store)),
    }
}

fn fixture() -> Fixture {
    fixture_on(Arc::new(MemoryStore::new()))
}

fn login(auth: &StoredAuth) {
    auth.login(LoginRequest {
        name: "Ravi".to_string(),
        email: "ravi@example.com".to_string(),
        password: Masked("pw".to_string()),
        user_type: UserType::User,
    })
    .unwrap();
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 5, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn agra_trip(seats: i64) -> TripRequest {
    TripRequest {
        destination: "Delhi → Agra".to_string(),
        seat_count: Some(seats),
        date_time: Some("2026-05-03T12:00".to_string()),
    }
}

fn session_on_bus(f: &Fixture, seats: i64, bus_id: u32) -> BookingSession {
    let mut session = BookingSession::new(f.auth.clone(), 10);
    assert_eq!(session.choose_trip_at(&agra_trip(seats), now()).unwrap(), NextStep::ChoosePlatform);
    session.choose_platform(&f.catalog, Platform::Own).unwrap();
    session.choose_bus(&f.ledger, bus_id).unwrap();
    session
}

#[test]
fn test_scenario_a_full_booking() {
    let mut f = fixture();
    login(&f.auth);

    let mut session = session_on_bus(&f, 2, 1);
    assert_eq!(session.draft().price_per_seat, Some(380));

    assert_eq!(session.toggle_seat(&f.ledger, 3).unwrap(), SeatStatus::Selected);
    assert_eq!(session.state(), FlowState::PlatformChosen);
    session.toggle_seat(&f.ledger, 4).unwrap();
    assert_eq!(session.state(), FlowState::SeatsChosen);

    let booking = session.confirm(&mut f.ledger).unwrap();
    assert_eq!(booking.price_per_seat(), 380);
    assert_eq!(booking.total_price(), 760);
    assert_eq!(booking.seats(), &BTreeSet::from([3, 4]));
    assert_eq!(f.ledger.bus(1).unwrap().booked_seats(), &BTreeSet::from([3, 4]));

    assert_eq!(session.state(), FlowState::Confirmed);
    assert_eq!(session.booking(), Some(&booking));
}

#[test]
fn test_scenario_b_rebooking_fails() {
    let mut f = fixture();
    f.ledger
        .create_booking(1, "Delhi → Agra".into(), &[3, 4], Platform::Own, 380)
        .unwrap();

    let err = f
        .ledger
        .create_booking(1, "Delhi → Agra".into(), &[3], Platform::Own, 380)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidSeatSelection(SeatSelectionError::AlreadyBooked(ref seats)) if seats == &vec![3]
    ));
    assert_eq!(f.ledger.list_bookings().len(), 1);
}

#[test]
fn test_scenario_c_booked_seat_toggle_is_noop() {
    let mut f = fixture();
    f.ledger
        .create_booking(1, "Delhi → Agra".into(), &[9], Platform::Ixigo, 420)
        .unwrap();
    let bus = f.ledger.bus(1).unwrap();

    let empty = Selection::new();
    assert_eq!(SeatAllocator::toggle(bus, 9, &empty, 2), empty);
    let picked = Selection::from([1]);
    assert_eq!(SeatAllocator::toggle(bus, 9, &picked, 2), picked);
}

#[test]
fn test_scenario_d_no_eviction_at_capacity() {
    let f = fixture();
    login(&f.auth);
    let mut session = session_on_bus(&f, 1, 1);

    session.toggle_seat(&f.ledger, 5).unwrap();
    assert_eq!(session.toggle_seat(&f.ledger, 7).unwrap(), SeatStatus::Available);
    assert_eq!(session.draft().chosen_seats, Selection::from([5]));
    assert_eq!(session.state(), FlowState::SeatsChosen);
}

#[test]
fn test_scenario_e_unknown_bus_leaves_ledger_untouched() {
    let mut f = fixture();
    let buses_before = f.ledger.list_buses().to_vec();

    let err = f
        .ledger
        .create_booking(99, "Delhi → Agra".into(), &[1], Platform::Own, 380)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidSeatSelection(SeatSelectionError::UnknownBus(99))
    ));
    assert!(f.ledger.list_bookings().is_empty());
    assert_eq!(f.ledger.list_buses(), buses_before.as_slice());
}

#[test]
fn test_confirm_conflict_returns_to_seat_picking() {
    let mut f = fixture();
    login(&f.auth);

    let mut first = session_on_bus(&f, 1, 1);
    let mut second = session_on_bus(&f, 1, 1);
    first.toggle_seat(&f.ledger, 12).unwrap();
    second.toggle_seat(&f.ledger, 12).unwrap();

    first.confirm(&mut f.ledger).unwrap();

    let err = second.confirm(&mut f.ledger).unwrap_err();
    assert!(matches!(err, CoreError::InvalidSeatSelection(_)));
    assert_eq!(second.state(), FlowState::PlatformChosen);
    assert!(second.draft().chosen_seats.is_empty());
    assert_eq!(second.draft().bus_id, Some(1));

    // Reselect against fresh bus state
    assert_eq!(second.toggle_seat(&f.ledger, 12).unwrap(), SeatStatus::Booked);
    second.toggle_seat(&f.ledger, 13).unwrap();
    assert_eq!(second.confirm(&mut f.ledger).unwrap().seats(), &BTreeSet::from([13]));
}

#[test]
fn test_ledger_invariants_hold_after_many_bookings() {
    let mut f = fixture();
    let requests: [(u32, &[u32], Platform, u32); 4] = [
        (1, &[1, 2, 3], Platform::MakeMyTrip, 450),
        (2, &[36], Platform::RedBus, 400),
        (1, &[10], Platform::Ixigo, 420),
        (2, &[1, 2], Platform::Own, 380),
    ];
    for (bus, seats, platform, price) in requests {
        f.ledger
            .create_booking(bus, "Delhi → Agra".into(), seats, platform, price)
            .unwrap();
    }

    for booking in f.ledger.list_bookings() {
        assert_eq!(
            booking.total_price(),
            booking.price_per_seat() * booking.seats().len() as u32
        );
    }
    for bus in f.ledger.list_buses() {
        let union: BTreeSet<u32> = f
            .ledger
            .list_bookings()
            .iter()
            .filter(|b| b.bus_id() == bus.id)
            .flat_map(|b| b.seats().iter().copied())
            .collect();
        assert_eq!(bus.booked_seats(), &union);
        assert!(union.iter().all(|&s| (1..=bus.total_seats).contains(&s)));
    }
}

#[test]
fn test_bookings_survive_restart_on_file_store() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let mut f = fixture_on(store);
        f.ledger
            .create_booking(2, "Delhi → Lucknow".into(), &[20, 21], Platform::RedBus, 700)
            .unwrap();
    }

    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let f = fixture_on(store);
    assert_eq!(f.ledger.list_bookings().len(), 1);
    assert_eq!(f.ledger.list_bookings()[0].total_price(), 1400);
    assert!(f.ledger.bus(2).unwrap().is_booked(21));
}

/// Two ledgers over one store do not see each other's writes; the later save
/// replaces the earlier one wholesale.
#[test]
fn test_shared_store_is_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let mut tab_one = fixture_on(Arc::new(FileStore::open(dir.path()).unwrap()));
    let mut tab_two = fixture_on(Arc::new(FileStore::open(dir.path()).unwrap()));

    let first = tab_one
        .ledger
        .create_booking(1, "Delhi → Agra".into(), &[3], Platform::Own, 380)
        .unwrap();
    let second = tab_two
        .ledger
        .create_booking(1, "Delhi → Agra".into(), &[3], Platform::RedBus, 400)
        .unwrap();

    tab_one.ledger.reload().unwrap();
    let ids: Vec<&str> = tab_one.ledger.list_bookings().iter().map(|b| b.id()).collect();
    assert_eq!(ids, vec![second.id()]);
    assert_ne!(first.id(), second.id());
}
