//! Priority views over the roster.
//!
//! Both views hold bus ids only and are rebuilt from scratch whenever the
//! roster changes. Entries carry the roster position as a sequence number so
//! equal keys resolve in roster order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::domain::{Bus, BusId, TimeOfDay};

/// Inclusive peak-hour windows.
pub const PEAK_WINDOWS: [(TimeOfDay, TimeOfDay); 2] = [
    (TimeOfDay::from_hm(7, 0), TimeOfDay::from_hm(9, 0)),
    (TimeOfDay::from_hm(17, 0), TimeOfDay::from_hm(19, 0)),
];

pub fn is_peak(time: TimeOfDay) -> bool {
    PEAK_WINDOWS
        .iter()
        .any(|&(start, end)| time.within(start, end))
}

/// Parsed arrival time, with unparsable strings mapped to `fallback`.
pub fn arrival_time(bus: &Bus, fallback: TimeOfDay) -> TimeOfDay {
    TimeOfDay::parse_or(&bus.next_arrival, fallback)
}

/// Operational priority of a bus. Higher is more urgent.
///
/// +50 for a peak-hour arrival, plus route demand, plus a tenth of capacity,
/// plus 30 above 80% load or 20 above 60% load.
pub fn priority_score(bus: &Bus, fallback: TimeOfDay) -> f64 {
    let mut score = 0.0;
    if is_peak(arrival_time(bus, fallback)) {
        score += 50.0;
    }
    score += bus.route_demand as f64;
    score += bus.capacity as f64 / 10.0;

    let load = bus.load_factor();
    if load > 0.8 {
        score += 30.0;
    } else if load > 0.6 {
        score += 20.0;
    }
    score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArrivalEntry {
    time: TimeOfDay,
    seq: usize,
    id: BusId,
}

// Reversed so the max-heap pops the earliest time.
impl Ord for ArrivalEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ArrivalEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
struct PriorityEntry {
    score: f64,
    seq: usize,
    id: BusId,
}

impl Ord for PriorityEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PriorityEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PriorityEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityEntry {}

/// Min-queue of buses by next arrival time.
#[derive(Debug, Clone, Default)]
pub struct ArrivalView {
    heap: BinaryHeap<ArrivalEntry>,
}

impl ArrivalView {
    pub fn rebuild(buses: &[Bus], fallback: TimeOfDay) -> Self {
        let heap = buses
            .iter()
            .enumerate()
            .map(|(seq, bus)| ArrivalEntry {
                time: arrival_time(bus, fallback),
                seq,
                id: bus.id,
            })
            .collect();
        Self { heap }
    }

    /// The bus arriving soonest.
    pub fn peek(&self) -> Option<BusId> {
        self.heap.peek().map(|e| e.id)
    }

    /// All bus ids, earliest arrival first.
    pub fn ordered(&self) -> Vec<BusId> {
        let mut sorted = self.heap.clone().into_sorted_vec();
        sorted.reverse();
        sorted.into_iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Max-queue of buses by [`priority_score`].
#[derive(Debug, Clone, Default)]
pub struct PriorityView {
    heap: BinaryHeap<PriorityEntry>,
}

impl PriorityView {
    pub fn rebuild(buses: &[Bus], fallback: TimeOfDay) -> Self {
        let heap = buses
            .iter()
            .enumerate()
            .map(|(seq, bus)| PriorityEntry {
                score: priority_score(bus, fallback),
                seq,
                id: bus.id,
            })
            .collect();
        Self { heap }
    }

    /// The highest-priority bus.
    pub fn peek(&self) -> Option<BusId> {
        self.heap.peek().map(|e| e.id)
    }

    /// All bus ids with their scores, highest first.
    pub fn ordered(&self) -> Vec<(BusId, f64)> {
        let mut sorted = self.heap.clone().into_sorted_vec();
        sorted.reverse();
        sorted.into_iter().map(|e| (e.id, e.score)).collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
