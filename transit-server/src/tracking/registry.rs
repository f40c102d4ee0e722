//! Stored journeys.

use chrono::{DateTime, Utc};

use super::simulator::{JourneyProgress, advance};
use crate::domain::{Journey, NotFound};

/// Journeys in start order.
#[derive(Debug, Clone, Default)]
pub struct JourneyRegistry {
    journeys: Vec<Journey>,
}

impl JourneyRegistry {
    pub fn new(journeys: Vec<Journey>) -> Self {
        Self { journeys }
    }

    pub fn journeys(&self) -> &[Journey] {
        &self.journeys
    }

    pub fn to_journeys(&self) -> Vec<Journey> {
        self.journeys.clone()
    }

    pub fn len(&self) -> usize {
        self.journeys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.journeys.is_empty()
    }

    pub fn insert(&mut self, journey: Journey) {
        self.journeys.push(journey);
    }

    pub fn get(&self, journey_id: &str) -> Result<&Journey, NotFound> {
        self.journeys
            .iter()
            .find(|j| j.journey_id == journey_id)
            .ok_or_else(|| NotFound::Journey(journey_id.to_string()))
    }

    pub fn for_passenger(&self, passenger_id: &str) -> Vec<&Journey> {
        self.journeys
            .iter()
            .filter(|j| j.passenger_id == passenger_id)
            .collect()
    }

    /// Recompute a journey's progress and cache the result on the record.
    pub fn refresh(
        &mut self,
        journey_id: &str,
        now: DateTime<Utc>,
        approach_threshold: f64,
    ) -> Result<JourneyProgress, NotFound> {
        let journey = self
            .journeys
            .iter_mut()
            .find(|j| j.journey_id == journey_id)
            .ok_or_else(|| NotFound::Journey(journey_id.to_string()))?;
        let progress = advance(journey, now, approach_threshold);
        journey.status = progress.status;
        journey.distance_covered = (progress.distance_covered * 100.0).round() / 100.0;
        journey.last_updated = now;
        Ok(progress)
    }
}
