pub mod analytics;
pub mod ledger;
pub mod session;

pub use analytics::{AdminSummary, BusStat, DailyStat, PlatformStat};
pub use ledger::{BookingEventSink, BookingLedger};
pub use session::{BookingSession, FlowState, NextStep, SessionDraft, TripRequest};
