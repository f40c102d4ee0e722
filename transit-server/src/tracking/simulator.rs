//! Maps elapsed time to a position along a journey's path.
//!
//! The simulation is stateless: a journey's start time, speed and segments
//! are enough to recompute progress at any instant.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Journey, JourneyStatus, Segment, StopName};

/// Speed assumed for journeys stored without a usable one (kph).
pub const FALLBACK_SPEED_KPH: f64 = 30.0;

/// Where a journey is along its path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    /// Index into the journey's segments; `None` when there are no segments.
    pub segment_index: Option<usize>,
    pub from: Option<StopName>,
    pub to: Option<StopName>,
    /// Fraction of the current segment covered, in `[0, 1]`.
    pub segment_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyProgress {
    pub status: JourneyStatus,
    pub position: Position,
    pub distance_covered: f64,
    pub remaining_distance: f64,
    pub remaining_minutes: f64,
    pub total_distance: f64,
}

/// Progress of `journey` at `now`.
///
/// Distance covered is speed times elapsed time, clamped to the path length.
/// A stored speed that is not positive counts as [`FALLBACK_SPEED_KPH`].
/// Once the remaining distance is within `approach_threshold` the journey is
/// reported as approaching its destination.
pub fn advance(journey: &Journey, now: DateTime<Utc>, approach_threshold: f64) -> JourneyProgress {
    let elapsed_minutes =
        ((now - journey.start_time).num_milliseconds() as f64 / 60_000.0).max(0.0);
    let speed = if journey.speed_kph.is_finite() && journey.speed_kph > 0.0 {
        journey.speed_kph
    } else {
        FALLBACK_SPEED_KPH
    };
    let total: f64 = journey.segments.iter().map(|s| s.distance).sum();

    let covered = (speed * elapsed_minutes / 60.0).min(total);
    let remaining = (total - covered).max(0.0);
    let remaining_minutes = remaining * 60.0 / speed;

    let status = if remaining <= approach_threshold {
        JourneyStatus::ApproachingDestination
    } else {
        JourneyStatus::InTransit
    };

    JourneyProgress {
        status,
        position: locate(&journey.segments, covered, total),
        distance_covered: covered,
        remaining_distance: remaining,
        remaining_minutes,
        total_distance: total,
    }
}

fn locate(segments: &[Segment], covered: f64, total: f64) -> Position {
    let Some(last) = segments.last() else {
        return Position {
            segment_index: None,
            from: None,
            to: None,
            segment_progress: 0.0,
        };
    };

    if covered < total {
        let mut left = covered.max(0.0);
        for (i, segment) in segments.iter().enumerate() {
            if left <= segment.distance {
                let progress = if segment.distance == 0.0 {
                    0.0
                } else {
                    left / segment.distance
                };
                return Position {
                    segment_index: Some(i),
                    from: Some(segment.from.clone()),
                    to: Some(segment.to.clone()),
                    segment_progress: progress,
                };
            }
            left -= segment.distance;
        }
    }

    Position {
        segment_index: Some(segments.len() - 1),
        from: Some(last.from.clone()),
        to: Some(last.to.clone()),
        segment_progress: 1.0,
    }
}
