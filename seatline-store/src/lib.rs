pub mod app_config;
pub mod kv;
pub mod login_session;
pub mod persistence;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use login_session::StoredAuth;
pub use persistence::{PersistenceAdapter, Snapshot, SnapshotError};

use seatline_core::CoreError;
use std::path::PathBuf;

pub const BUSES_KEY: &str = "buses";
pub const BOOKINGS_KEY: &str = "bookings";
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::StorageError(err.to_string())
    }
}
