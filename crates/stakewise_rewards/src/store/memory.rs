//! In-memory preference store for tests and dry runs.

use crate::store::{PreferenceStore, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a key, e.g. a stored vault list for a test scenario.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        {
            let mut values = self.values.lock().expect("store lock");
            values.insert(key.to_string(), value.to_string());
        }
        self
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
