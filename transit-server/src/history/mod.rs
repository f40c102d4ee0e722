//! Undo/redo history for route and fleet mutations.

mod action_log;

use serde::Serialize;

pub use action_log::{ActionLog, ActionRecord};

use crate::domain::Bus;
use crate::routes::Route;

/// Full contents of one undoable store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "store", content = "records", rename_all = "lowercase")]
pub enum StoreSnapshot {
    Routes(Vec<Route>),
    Buses(Vec<Bus>),
}

impl StoreSnapshot {
    pub fn store_name(&self) -> &'static str {
        match self {
            StoreSnapshot::Routes(_) => "routes",
            StoreSnapshot::Buses(_) => "buses",
        }
    }
}

/// A history entry as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub description: String,
    pub store: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<&ActionRecord<StoreSnapshot>> for HistoryEntry {
    fn from(record: &ActionRecord<StoreSnapshot>) -> Self {
        HistoryEntry {
            description: record.description.clone(),
            store: record.after.store_name(),
            timestamp: record.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub recent: Vec<HistoryEntry>,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl HistorySummary {
    pub fn of(log: &ActionLog<StoreSnapshot>, limit: usize) -> Self {
        HistorySummary {
            recent: log.recent(limit).into_iter().map(HistoryEntry::from).collect(),
            can_undo: log.can_undo(),
            can_redo: log.can_redo(),
        }
    }
}
