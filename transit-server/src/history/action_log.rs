//! Undo/redo stacks of whole-store snapshots.
//!
//! The log only moves records between stacks. Applying a snapshot to live
//! state is the caller's job, so callers peek first and commit the move
//! once the snapshot is safely applied.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{HistoryStack, StateError};

/// One recorded mutation with the store contents before and after.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord<S> {
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub before: S,
    pub after: S,
}

impl<S> ActionRecord<S> {
    pub fn new(description: impl Into<String>, before: S, after: S, timestamp: DateTime<Utc>) -> Self {
        Self {
            description: description.into(),
            timestamp,
            before,
            after,
        }
    }
}

/// Undo stack plus redo stack. Neither is capped.
#[derive(Debug, Clone)]
pub struct ActionLog<S> {
    undo: Vec<ActionRecord<S>>,
    redo: Vec<ActionRecord<S>>,
}

impl<S> Default for ActionLog<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ActionLog<S> {
    pub fn new() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    /// Push a new record. Any redo history is discarded.
    pub fn record(&mut self, record: ActionRecord<S>) {
        self.undo.push(record);
        self.redo.clear();
    }

    /// The record `undo` would revert.
    pub fn peek_undo(&self) -> Result<&ActionRecord<S>, StateError> {
        self.undo
            .last()
            .ok_or(StateError::EmptyStack(HistoryStack::Undo))
    }

    /// The record `redo` would reapply.
    pub fn peek_redo(&self) -> Result<&ActionRecord<S>, StateError> {
        self.redo
            .last()
            .ok_or(StateError::EmptyStack(HistoryStack::Redo))
    }

    /// Move the top undo record to the redo stack and return it.
    pub fn undo(&mut self) -> Result<&ActionRecord<S>, StateError> {
        let record = self
            .undo
            .pop()
            .ok_or(StateError::EmptyStack(HistoryStack::Undo))?;
        self.redo.push(record);
        self.peek_redo()
    }

    /// Move the top redo record back to the undo stack and return it.
    pub fn redo(&mut self) -> Result<&ActionRecord<S>, StateError> {
        let record = self
            .redo
            .pop()
            .ok_or(StateError::EmptyStack(HistoryStack::Redo))?;
        self.undo.push(record);
        self.peek_undo()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Up to `limit` undoable records, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<&ActionRecord<S>> {
        self.undo.iter().rev().take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(label: &str, before: u32, after: u32) -> ActionRecord<u32> {
        ActionRecord::new(label, before, after, Utc::now())
    }

    #[test]
    fn undo_then_redo_round_trip() {
        let mut log = ActionLog::new();
        log.record(rec("first", 0, 1));
        log.record(rec("second", 1, 2));

        let undone = log.undo().unwrap();
        assert_eq!(undone.before, 1);
        assert_eq!(undone.description, "second");
        assert!(log.can_redo());

        let redone = log.redo().unwrap();
        assert_eq!(redone.after, 2);
        assert!(!log.can_redo());
        assert_eq!(log.undo_len(), 2);
    }

    #[test]
    fn empty_stacks_fail() {
        let mut log: ActionLog<u32> = ActionLog::new();
        assert_eq!(
            log.undo().unwrap_err(),
            StateError::EmptyStack(HistoryStack::Undo)
        );
        assert_eq!(
            log.redo().unwrap_err(),
            StateError::EmptyStack(HistoryStack::Redo)
        );
        assert!(log.peek_undo().is_err());
    }

    #[test]
    fn new_record_clears_redo() {
        let mut log = ActionLog::new();
        log.record(rec("a", 0, 1));
        log.undo().unwrap();
        assert!(log.can_redo());

        log.record(rec("b", 0, 5));
        assert!(!log.can_redo());
        assert_eq!(
            log.redo().unwrap_err(),
            StateError::EmptyStack(HistoryStack::Redo)
        );
    }

    #[test]
    fn long_histories_keep_every_record() {
        let mut log = ActionLog::new();
        for n in 0..500 {
            log.record(rec(&format!("step {n}"), n, n + 1));
        }
        assert_eq!(log.undo_len(), 500);

        let labels: Vec<&str> = log.recent(2).iter().map(|r| r.description.as_str()).collect();
        assert_eq!(labels, vec!["step 499", "step 498"]);

        let mut undone = 0;
        while log.undo().is_ok() {
            undone += 1;
        }
        assert_eq!(undone, 500);
        assert_eq!(log.redo_len(), 500);
        assert_eq!(log.peek_redo().unwrap().before, 0);
    }

    #[test]
    fn peek_does_not_move() {
        let mut log = ActionLog::new();
        log.record(rec("a", 0, 1));
        assert_eq!(log.peek_undo().unwrap().after, 1);
        assert_eq!(log.undo_len(), 1);
        assert_eq!(log.redo_len(), 0);
    }
}
