//! Durable key/value preference storage with swappable backends.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

/// Key for the JSON-encoded vault list.
pub const KEY_VAULT_LIST: &str = "vaultList";
/// Key for the default user address (plain string).
pub const KEY_USER_ADDRESS: &str = "defaultUserAddress";
/// Key for the default from-date (ISO `YYYY-MM-DD`).
pub const KEY_FROM_DATE: &str = "defaultFromDate";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Small durable string store. Absent keys read as `Ok(None)`; writes
/// replace the previous value wholesale.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
