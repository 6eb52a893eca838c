use seatline_catalog::{Catalog, CatalogError, PricingEntry, SeatLayout};
use seatline_shared::{Bus, BusId};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::kv::{FileStore, KeyValueStore, MemoryStore};
use crate::StoreError;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub booking: BookingRules,
    #[serde(default)]
    pub layout: SeatLayout,
    /// Replaces the reference routes and fleet when present.
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BookingRules {
    #[serde(default = "default_max_seats")]
    pub max_seats_per_booking: u32,
    #[serde(default = "default_id_prefix")]
    pub booking_id_prefix: String,
    /// Open booking sessions untouched this long are dropped.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,
}

fn default_max_seats() -> u32 { 10 }

fn default_id_prefix() -> String { "bk".to_string() }

fn default_session_idle_minutes() -> u64 { 30 }

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            max_seats_per_booking: default_max_seats(),
            booking_id_prefix: default_id_prefix(),
            session_idle_minutes: default_session_idle_minutes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub routes: Vec<PricingEntry>,
    pub buses: Vec<RosterBus>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RosterBus {
    pub id: BusId,
    pub name: String,
    pub seats: u32,
}

impl CatalogConfig {
    pub fn build(&self) -> Result<Catalog, CatalogError> {
        let roster = self
            .buses
            .iter()
            .map(|bus| Bus::new(bus.id, bus.name.clone(), bus.seats))
            .collect();
        Catalog::new(self.routes.clone(), roster)
    }
}

impl StorageConfig {
    pub fn open(&self) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        let store: Arc<dyn KeyValueStore> = match self.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File => Arc::new(FileStore::open(&self.data_dir)?),
        };
        Ok(store)
    }
}

impl Config {
    /// The configured catalog, or the reference one.
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog {
            Some(custom) => custom.build(),
            None => Ok(Catalog::reference()),
        }
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Layer `<dir>/default`, `<dir>/<RUN_MODE>`, `<dir>/local`, then
    /// `SEATLINE__*` environment variables.
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let source = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&source("default")))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&source(&run_mode)).required(false))
            // Untracked local overrides
            .add_source(config::File::with_name(&source("local")).required(false))
            // Eg.. `SEATLINE__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("SEATLINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
