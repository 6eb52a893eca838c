use seatline_catalog::{Catalog, SeatLayout};
use seatline_core::identity::AuthProvider;
use seatline_core::CoreResult;
use seatline_order::{BookingEventSink, BookingLedger, BookingSession};
use seatline_shared::models::events::BookingConfirmedEvent;
use seatline_store::app_config::BookingRules;
use seatline_store::{KeyValueStore, PersistenceAdapter, StoredAuth};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Forwards ledger notifications onto the broadcast channel.
struct BroadcastSink(broadcast::Sender<BookingConfirmedEvent>);

impl BookingEventSink for BroadcastSink {
    fn booking_confirmed(&self, event: &BookingConfirmedEvent) {
        // No receivers is fine
        let _ = self.0.send(event.clone());
    }
}

struct OpenSession {
    session: BookingSession,
    last_used: Instant,
}

/// Open booking sessions keyed by id. A session untouched for longer than
/// the idle timeout is treated as gone and dropped on the next insert.
pub struct SessionRegistry {
    open: HashMap<Uuid, OpenSession>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            open: HashMap::new(),
            idle_timeout,
        }
    }

    pub fn insert(&mut self, id: Uuid, session: BookingSession, now: Instant) {
        self.prune(now);
        self.open.insert(id, OpenSession { session, last_used: now });
    }

    /// Fetch a live session and mark it used.
    pub fn get_mut(&mut self, id: &Uuid, now: Instant) -> Option<&mut BookingSession> {
        if self.is_expired(id, now) {
            self.open.remove(id);
            return None;
        }
        let entry = self.open.get_mut(id)?;
        entry.last_used = now;
        Some(&mut entry.session)
    }

    /// Read a live session without refreshing it.
    pub fn get(&self, id: &Uuid, now: Instant) -> Option<&BookingSession> {
        if self.is_expired(id, now) {
            return None;
        }
        self.open.get(id).map(|entry| &entry.session)
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<BookingSession> {
        self.open.remove(id).map(|entry| entry.session)
    }

    fn prune(&mut self, now: Instant) {
        let before = self.open.len();
        let timeout = self.idle_timeout;
        self.open
            .retain(|_, entry| now.saturating_duration_since(entry.last_used) <= timeout);
        let dropped = before - self.open.len();
        if dropped > 0 {
            debug!("Dropped {} idle booking sessions", dropped);
        }
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    fn is_expired(&self, id: &Uuid, now: Instant) -> bool {
        self.open
            .get(id)
            .is_some_and(|entry| now.saturating_duration_since(entry.last_used) > self.idle_timeout)
    }
}

/// Shared handler state.
///
/// Lock order is `sessions` then `ledger`; no handler holds either across an
/// await point.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub ledger: Arc<Mutex<BookingLedger>>,
    pub sessions: Arc<Mutex<SessionRegistry>>,
    pub auth: Arc<dyn AuthProvider>,
    pub layout: SeatLayout,
    pub rules: BookingRules,
    pub events_tx: broadcast::Sender<BookingConfirmedEvent>,
}

impl AppState {
    /// Wire every component to the one `store`.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        catalog: Catalog,
        rules: BookingRules,
        layout: SeatLayout,
    ) -> CoreResult<Self> {
        let (events_tx, _) = broadcast::channel(100);

        let adapter = PersistenceAdapter::new(store.clone(), catalog.list_buses().to_vec());
        let mut ledger = BookingLedger::open(adapter, rules.clone())?;
        ledger.subscribe(Arc::new(BroadcastSink(events_tx.clone())));

        Ok(Self {
            catalog: Arc::new(catalog),
            ledger: Arc::new(Mutex::new(ledger)),
            sessions: Arc::new(Mutex::new(SessionRegistry::new(Duration::from_secs(
                rules.session_idle_minutes * 60,
            )))),
            auth: Arc::new(StoredAuth::new(store)),
            layout,
            rules,
            events_tx,
        })
    }

    pub fn new_session(&self) -> BookingSession {
        BookingSession::new(self.auth.clone(), self.rules.max_seats_per_booking)
    }
}
