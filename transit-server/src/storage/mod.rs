//! Persistence for the engine's record sets.
//!
//! The engine only needs whole-collection load and atomic whole-collection
//! replace. [`RecordStore`] is that contract; [`JsonFileStore`] backs it with
//! one JSON file per collection and [`MemoryStore`] keeps everything in
//! memory for tests.

mod error;
mod json_file;
mod memory;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::StorageError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// A named set of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Routes,
    Buses,
    Tickets,
    Journeys,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Routes,
        Collection::Buses,
        Collection::Tickets,
        Collection::Journeys,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Routes => "routes",
            Collection::Buses => "buses",
            Collection::Tickets => "tickets",
            Collection::Journeys => "journeys",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Routes => "routes.json",
            Collection::Buses => "buses.json",
            Collection::Tickets => "tickets.json",
            Collection::Journeys => "journeys.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whole-collection persistence.
///
/// `save` must replace the collection atomically: a reader sees either the
/// previous contents or the new ones, never a mix.
pub trait RecordStore: Send + Sync {
    /// Load a collection, or `None` if it has never been saved.
    fn load(&self, collection: Collection) -> Result<Option<Value>, StorageError>;

    /// Replace a collection.
    fn save(&self, collection: Collection, records: &Value) -> Result<(), StorageError>;
}

/// Load and decode a collection. Missing collections are empty.
///
/// Accepts a bare array, or an object holding the array under the
/// collection's name (`{"routes": [...]}`).
pub fn load_records<T: DeserializeOwned>(
    store: &dyn RecordStore,
    collection: Collection,
) -> Result<Vec<T>, StorageError> {
    let Some(value) = store.load(collection)? else {
        return Ok(Vec::new());
    };
    let records = match value {
        array @ Value::Array(_) => array,
        Value::Null => return Ok(Vec::new()),
        Value::Object(mut map) => match map.remove(collection.name()) {
            Some(inner @ Value::Array(_)) => inner,
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(_) => {
                return Err(StorageError::Shape {
                    collection: collection.name(),
                    reason: "expected an array of records",
                });
            }
        },
        _ => {
            return Err(StorageError::Shape {
                collection: collection.name(),
                reason: "expected an array of records",
            });
        }
    };
    Ok(serde_json::from_value(records)?)
}

/// Encode and replace a collection.
///
/// Encoding happens on the caller's task; the store write runs on tokio's
/// blocking pool so file I/O never stalls the async workers.
pub async fn save_records<T: Serialize>(
    store: &Arc<dyn RecordStore>,
    collection: Collection,
    records: &[T],
) -> Result<(), StorageError> {
    let value = serde_json::to_value(records)?;
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || store.save(collection, &value))
        .await
        .map_err(|e| StorageError::Unavailable(format!("save of {collection} did not finish: {e}")))?
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_collection_is_empty() {
        let store = MemoryStore::new();
        let routes: Vec<Value> = load_records(&store, Collection::Routes).unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn accepts_wrapped_array() {
        let store = MemoryStore::new();
        store
            .save(Collection::Journeys, &json!({"journeys": [{"a": 1}, {"a": 2}]}))
            .unwrap();
        let journeys: Vec<Value> = load_records(&store, Collection::Journeys).unwrap();
        assert_eq!(journeys.len(), 2);
    }

    #[test]
    fn rejects_scalar() {
        let store = MemoryStore::new();
        store.save(Collection::Buses, &json!(42)).unwrap();
        let result: Result<Vec<Value>, _> = load_records(&store, Collection::Buses);
        assert!(matches!(result, Err(StorageError::Shape { .. })));
    }

    #[tokio::test]
    async fn save_then_load() {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn RecordStore> = memory.clone();
        save_records(&store, Collection::Tickets, &[json!({"id": "T-1"})])
            .await
            .unwrap();
        let back: Vec<Value> = load_records(memory.as_ref(), Collection::Tickets).unwrap();
        assert_eq!(back, vec![json!({"id": "T-1"})]);
    }

    #[tokio::test]
    async fn save_errors_come_back_from_the_blocking_pool() {
        let memory = Arc::new(MemoryStore::new());
        memory.fail_saves(true);
        let store: Arc<dyn RecordStore> = memory.clone();
        let result = save_records(&store, Collection::Routes, &[json!({"route_id": "R1"})]).await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert!(memory.load(Collection::Routes).unwrap().is_none());
    }

    #[tokio::test]
    async fn file_saves_run_off_the_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn RecordStore> = Arc::new(JsonFileStore::new(dir.path()).unwrap());
        save_records(&store, Collection::Buses, &[json!({"bus_number": "42A"})])
            .await
            .unwrap();
        assert!(dir.path().join("buses.json").exists());
        let back: Vec<Value> = load_records(store.as_ref(), Collection::Buses).unwrap();
        assert_eq!(back.len(), 1);
    }
}
