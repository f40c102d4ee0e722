//! In-memory record store for tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use super::{Collection, RecordStore, StorageError};

/// Record store backed by a map.
///
/// Saves can be switched off with [`MemoryStore::fail_saves`] to exercise
/// persistence-failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Value>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    /// Seed a collection directly, bypassing the failure switch.
    pub fn seed(&self, collection: Collection, records: Value) -> Result<(), StorageError> {
        self.collections
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))?
            .insert(collection, records);
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, collection: Collection) -> Result<Option<Value>, StorageError> {
        let collections = self
            .collections
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))?;
        Ok(collections.get(&collection).cloned())
    }

    fn save(&self, collection: Collection, records: &Value) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!(
                "saving {collection} is disabled"
            )));
        }
        self.collections
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))?
            .insert(collection, records.clone());
        Ok(())
    }
}
