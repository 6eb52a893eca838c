use chrono::{Local, NaiveDateTime};
use seatline_catalog::{Catalog, CatalogError, SeatAllocator, SeatStatus, Selection};
use seatline_core::identity::AuthProvider;
use seatline_core::{CoreError, CoreResult, Field, FieldErrors, SeatSelectionError};
use seatline_shared::{Booking, Bus, BusId, Destination, Platform, SeatNumber};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ledger::BookingLedger;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// The first form of the flow, as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub seat_count: Option<i64>,
    /// `yyyy-MM-ddTHH:mm`, seconds optional.
    #[serde(default)]
    pub date_time: Option<String>,
}

/// A trip request that passed validation.
#[derive(Debug, Clone, PartialEq)]
struct Trip {
    destination: Destination,
    seat_count: u32,
    date_time: NaiveDateTime,
}

impl TripRequest {
    /// Every field is checked, so one call reports all problems at once.
    fn validate(&self, now: NaiveDateTime, max_seats: u32) -> Result<Trip, FieldErrors> {
        let mut errors = FieldErrors::new();

        let destination = Destination::new(self.destination.trim());
        if destination.is_blank() {
            errors.add(Field::Destination, "Please select a destination");
        }

        let seat_count = match self.seat_count {
            Some(n) if n < 1 => {
                errors.add(Field::SeatCount, "Please enter at least 1 seat");
                0
            }
            Some(n) if n > i64::from(max_seats) => {
                errors.add(Field::SeatCount, format!("Maximum {} seats allowed", max_seats));
                0
            }
            Some(n) => n as u32,
            None => {
                errors.add(Field::SeatCount, "Please enter at least 1 seat");
                0
            }
        };

        let date_time = match self.date_time.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add(Field::Date, "Please select a date");
                None
            }
            Some(raw) => match parse_date_time(raw) {
                Some(parsed) if parsed < now => {
                    errors.add(Field::Date, "Travel date cannot be in the past");
                    None
                }
                Some(parsed) => Some(parsed),
                None => {
                    errors.add(Field::Date, "Please select a valid date");
                    None
                }
            },
        };

        errors.into_result()?;
        Ok(Trip {
            destination,
            seat_count,
            // Only absent when a date error was recorded above
            date_time: date_time.unwrap_or(now),
        })
    }
}

fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowState {
    Empty,
    DestinationChosen,
    PlatformChosen,
    SeatsChosen,
    Confirmed,
}

/// What the caller should show next after a trip is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NextStep {
    LoginRequired,
    ChoosePlatform,
}

/// The in-progress booking. Fields fill in as the flow advances.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub destination: Option<Destination>,
    pub seat_count: u32,
    pub date_time: Option<NaiveDateTime>,
    pub platform: Option<Platform>,
    pub price_per_seat: Option<u32>,
    pub bus_id: Option<BusId>,
    pub chosen_seats: Selection,
}

impl SessionDraft {
    fn target(&self) -> usize {
        self.seat_count as usize
    }
}

/// One user's walk through the booking flow.
///
/// `Empty → DestinationChosen → PlatformChosen → SeatsChosen → Confirmed`.
/// The session only holds the draft; buses and bookings are always read from
/// the ledger passed in, so seat state is never cached here.
pub struct BookingSession {
    auth: Arc<dyn AuthProvider>,
    max_seats: u32,
    state: FlowState,
    draft: SessionDraft,
    awaiting_login: bool,
    booking: Option<Booking>,
}

impl BookingSession {
    pub fn new(auth: Arc<dyn AuthProvider>, max_seats: u32) -> Self {
        Self {
            auth,
            max_seats,
            state: FlowState::Empty,
            draft: SessionDraft::default(),
            awaiting_login: false,
            booking: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn draft(&self) -> &SessionDraft {
        &self.draft
    }

    pub fn awaiting_login(&self) -> bool {
        self.awaiting_login
    }

    /// The booking made by the last successful confirm.
    pub fn booking(&self) -> Option<&Booking> {
        self.booking.as_ref()
    }

    /// Start (or start over) with a destination, seat count and travel date.
    pub fn choose_trip(&mut self, request: &TripRequest) -> CoreResult<NextStep> {
        self.choose_trip_at(request, Local::now().naive_local())
    }

    /// As [`choose_trip`](Self::choose_trip) with an explicit clock.
    pub fn choose_trip_at(&mut self, request: &TripRequest, now: NaiveDateTime) -> CoreResult<NextStep> {
        self.restart();
        let trip = request.validate(now, self.max_seats)?;

        debug!(
            "Trip chosen: {} for {} seats at {}",
            trip.destination, trip.seat_count, trip.date_time
        );
        self.draft = SessionDraft {
            destination: Some(trip.destination),
            seat_count: trip.seat_count,
            date_time: Some(trip.date_time),
            ..SessionDraft::default()
        };
        self.state = FlowState::DestinationChosen;

        self.login_gate()
    }

    /// Continue a flow that was suspended for login.
    pub fn resume(&mut self) -> CoreResult<NextStep> {
        if self.state != FlowState::DestinationChosen {
            return Err(self.invalid("resume"));
        }
        self.login_gate()
    }

    fn login_gate(&mut self) -> CoreResult<NextStep> {
        if self.auth.current_user()?.is_some() {
            self.awaiting_login = false;
            Ok(NextStep::ChoosePlatform)
        } else {
            info!("Booking flow suspended until login");
            self.awaiting_login = true;
            Ok(NextStep::LoginRequired)
        }
    }

    /// Pick the platform to book through. Returns the price per seat.
    ///
    /// A destination the catalog has no pricing for resets the whole flow.
    pub fn choose_platform(&mut self, catalog: &Catalog, platform: Platform) -> CoreResult<u32> {
        if !matches!(
            self.state,
            FlowState::DestinationChosen | FlowState::PlatformChosen | FlowState::SeatsChosen
        ) {
            return Err(self.invalid("choose a platform"));
        }
        if self.awaiting_login {
            return Err(CoreError::LoginRequired);
        }
        let Some(destination) = self.draft.destination.clone() else {
            return Err(self.invalid("choose a platform"));
        };

        let price = match catalog.price_for(&destination, platform) {
            Ok(price) => price,
            Err(CatalogError::NotFound(name)) => {
                warn!("No pricing for {}, restarting flow", name);
                self.restart();
                return Err(CoreError::NotFound(name));
            }
            Err(e) => return Err(e.into()),
        };

        self.draft.platform = Some(platform);
        self.draft.price_per_seat = Some(price);
        self.draft.bus_id = None;
        self.draft.chosen_seats.clear();
        self.state = FlowState::PlatformChosen;
        Ok(price)
    }

    /// Buses with room for the whole party.
    pub fn eligible_buses<'a>(&self, buses: &'a [Bus]) -> Vec<&'a Bus> {
        buses
            .iter()
            .filter(|bus| SeatAllocator::can_seat(bus, self.draft.target()))
            .collect()
    }

    /// Switching bus drops any seats picked on the previous one.
    pub fn choose_bus(&mut self, ledger: &BookingLedger, bus_id: BusId) -> CoreResult<()> {
        self.require_seat_picking("choose a bus")?;

        let bus = ledger
            .bus(bus_id)
            .ok_or(SeatSelectionError::UnknownBus(bus_id))?;
        if !SeatAllocator::can_seat(bus, self.draft.target()) {
            return Err(SeatSelectionError::InsufficientCapacity {
                bus_id,
                available: bus.available_seats(),
                requested: self.draft.seat_count,
            }
            .into());
        }

        self.draft.bus_id = Some(bus_id);
        self.draft.chosen_seats.clear();
        self.state = FlowState::PlatformChosen;
        Ok(())
    }

    /// Click a seat on the chosen bus. Returns the seat's status afterwards.
    pub fn toggle_seat(&mut self, ledger: &BookingLedger, seat: SeatNumber) -> CoreResult<SeatStatus> {
        self.require_seat_picking("pick seats")?;
        let bus = self.chosen_bus(ledger)?;

        let target = self.draft.target();
        let selection = SeatAllocator::toggle(bus, seat, &self.draft.chosen_seats, target);
        let status = SeatAllocator::status(bus, seat, &selection);

        self.state = if SeatAllocator::is_complete(&selection, target) {
            FlowState::SeatsChosen
        } else {
            FlowState::PlatformChosen
        };
        self.draft.chosen_seats = selection;
        Ok(status)
    }

    /// Book the chosen seats.
    ///
    /// If the ledger rejects the seats the selection is cleared, bus state is
    /// re-read, and the session goes back to seat picking on the same bus.
    pub fn confirm(&mut self, ledger: &mut BookingLedger) -> CoreResult<Booking> {
        if self.state != FlowState::SeatsChosen {
            return Err(self.invalid("confirm"));
        }
        let (Some(destination), Some(platform), Some(price), Some(bus_id)) = (
            self.draft.destination.clone(),
            self.draft.platform,
            self.draft.price_per_seat,
            self.draft.bus_id,
        ) else {
            return Err(self.invalid("confirm"));
        };

        let seats: Vec<SeatNumber> = self.draft.chosen_seats.iter().copied().collect();
        let result: CoreResult<Booking> = if seats.len() != self.draft.target() {
            Err(SeatSelectionError::CountMismatch {
                expected: self.draft.target(),
                actual: seats.len(),
            }
            .into())
        } else {
            ledger.create_booking(bus_id, destination, &seats, platform, price)
        };

        match result {
            Ok(booking) => {
                self.draft = SessionDraft::default();
                self.state = FlowState::Confirmed;
                self.booking = Some(booking.clone());
                Ok(booking)
            }
            Err(CoreError::InvalidSeatSelection(e)) => {
                warn!("Seat selection rejected at confirmation: {}", e);
                if let Err(reload) = ledger.reload() {
                    warn!("Could not refresh bus state: {}", reload);
                }
                self.draft.chosen_seats.clear();
                self.state = FlowState::PlatformChosen;
                Err(CoreError::InvalidSeatSelection(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the draft and any confirmed booking.
    pub fn restart(&mut self) {
        self.state = FlowState::Empty;
        self.draft = SessionDraft::default();
        self.awaiting_login = false;
        self.booking = None;
    }

    fn require_seat_picking(&self, action: &str) -> CoreResult<()> {
        if matches!(self.state, FlowState::PlatformChosen | FlowState::SeatsChosen) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn chosen_bus<'a>(&self, ledger: &'a BookingLedger) -> CoreResult<&'a Bus> {
        let bus_id = self
            .draft
            .bus_id
            .ok_or_else(|| CoreError::InvalidTransition("no bus chosen".to_string()))?;
        Ok(ledger
            .bus(bus_id)
            .ok_or(SeatSelectionError::UnknownBus(bus_id))?)
    }

    fn invalid(&self, action: &str) -> CoreError {
        CoreError::InvalidTransition(format!("cannot {} from {:?}", action, self.state))
    }
}
