//! Ordered, position-addressed stop list for a single route.
//!
//! Positions are 1-based. Whatever entry ends up first always has a
//! distance-from-previous of zero; every mutation re-establishes this.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{RouteStopEntry, StopUpdate, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RouteStopEntry>", into = "Vec<RouteStopEntry>")]
pub struct RouteStops {
    entries: Vec<RouteStopEntry>,
}

impl From<Vec<RouteStopEntry>> for RouteStops {
    fn from(entries: Vec<RouteStopEntry>) -> Self {
        let mut stops = RouteStops { entries };
        stops.normalize_head();
        stops
    }
}

impl From<RouteStops> for Vec<RouteStopEntry> {
    fn from(stops: RouteStops) -> Self {
        stops.entries
    }
}

impl RouteStops {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteStopEntry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[RouteStopEntry] {
        &self.entries
    }

    /// Sum of all distances along the route.
    pub fn total_distance(&self) -> f64 {
        self.entries.iter().map(|e| e.distance_from_previous).sum()
    }

    pub fn add_first(&mut self, entry: RouteStopEntry) {
        self.entries.insert(0, entry);
        self.normalize_head();
    }

    pub fn add_last(&mut self, entry: RouteStopEntry) {
        self.entries.push(entry);
        self.normalize_head();
    }

    /// Insert so that `entry` ends up at `position` (1..=len+1).
    pub fn insert_at(&mut self, position: usize, entry: RouteStopEntry) -> Result<(), ValidationError> {
        if position == 0 || position > self.entries.len() + 1 {
            return Err(self.out_of_range(position));
        }
        self.entries.insert(position - 1, entry);
        self.normalize_head();
        Ok(())
    }

    pub fn remove_at(&mut self, position: usize) -> Result<RouteStopEntry, ValidationError> {
        let idx = self.checked_index(position)?;
        let removed = self.entries.remove(idx);
        self.normalize_head();
        Ok(removed)
    }

    pub fn get_at(&self, position: usize) -> Result<&RouteStopEntry, ValidationError> {
        let idx = self.checked_index(position)?;
        Ok(&self.entries[idx])
    }

    pub fn update_at(
        &mut self,
        position: usize,
        update: StopUpdate,
        now: DateTime<Utc>,
    ) -> Result<&RouteStopEntry, ValidationError> {
        let idx = self.checked_index(position)?;
        self.entries[idx].apply(update, now)?;
        self.normalize_head();
        Ok(&self.entries[idx])
    }

    /// Rearrange entries so that new position `i` holds old entry `new_order[i]`.
    ///
    /// `new_order` uses 0-based indices and must be a permutation of exactly
    /// the current length. Nothing changes on error.
    pub fn reorder(&mut self, new_order: &[usize]) -> Result<(), ValidationError> {
        let len = self.entries.len();
        if new_order.len() != len {
            return Err(ValidationError::ReorderLength {
                expected: len,
                actual: new_order.len(),
            });
        }
        let mut seen = vec![false; len];
        for &idx in new_order {
            if idx >= len || seen[idx] {
                return Err(ValidationError::ReorderNotPermutation(idx));
            }
            seen[idx] = true;
        }

        let mut slots: Vec<Option<RouteStopEntry>> =
            std::mem::take(&mut self.entries).into_iter().map(Some).collect();
        self.entries = new_order
            .iter()
            .filter_map(|&idx| slots[idx].take())
            .collect();
        self.normalize_head();
        Ok(())
    }

    /// Replace every inter-stop distance at once.
    ///
    /// `distances[i]` becomes the distance into stop `i + 2`, so exactly
    /// `len - 1` strictly positive values are required.
    pub fn set_distances(&mut self, distances: &[f64], now: DateTime<Utc>) -> Result<(), ValidationError> {
        let len = self.entries.len();
        if len < 2 {
            return Err(ValidationError::RouteTooShort(len));
        }
        if distances.len() != len - 1 {
            return Err(ValidationError::DistanceCount {
                expected: len - 1,
                actual: distances.len(),
            });
        }
        if let Some(&bad) = distances.iter().find(|d| !(d.is_finite() && **d > 0.0)) {
            return Err(ValidationError::InvalidDistance(bad));
        }

        for (entry, &distance) in self.entries.iter_mut().skip(1).zip(distances) {
            entry.distance_from_previous = distance;
            entry.updated_at = Some(now);
        }
        if let Some(first) = self.entries.first_mut() {
            first.updated_at = Some(now);
        }
        self.normalize_head();
        Ok(())
    }

    fn checked_index(&self, position: usize) -> Result<usize, ValidationError> {
        if position == 0 || position > self.entries.len() {
            Err(self.out_of_range(position))
        } else {
            Ok(position - 1)
        }
    }

    fn out_of_range(&self, position: usize) -> ValidationError {
        ValidationError::IndexOutOfRange {
            position,
            len: self.entries.len(),
        }
    }

    fn normalize_head(&mut self) {
        if let Some(first) = self.entries.first_mut() {
            first.distance_from_previous = 0.0;
        }
    }
}

impl<'a> IntoIterator for &'a RouteStops {
    type Item = &'a RouteStopEntry;
    type IntoIter = std::slice::Iter<'a, RouteStopEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
