//! Shortest paths over the stop graph.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;
use tracing::{debug, trace};

use super::graph::StopGraph;
use crate::domain::{RouteId, Segment, StopName};

/// Frontier entry. Ordered so that `BinaryHeap` pops the smallest distance,
/// and among equal distances the entry pushed first.
#[derive(Debug, Clone, Copy)]
struct State {
    distance: f64,
    seq: u64,
    node: usize,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

/// Result of a shortest-path query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPath {
    /// Stops from start to end inclusive; empty when there is no path.
    pub path: Vec<StopName>,
    /// Total weight, `None` when there is no path.
    pub distance: Option<f64>,
    /// Stops in the order they left the frontier.
    pub settled_order: Vec<StopName>,
}

/// A traversed edge attributed to the route that owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSegment {
    pub from: StopName,
    pub to: StopName,
    pub distance: f64,
    pub route_id: Option<RouteId>,
    pub route_name: Option<String>,
}

impl ShortestPath {
    fn unreachable(settled_order: Vec<StopName>) -> Self {
        Self {
            path: Vec::new(),
            distance: None,
            settled_order,
        }
    }

    pub fn is_found(&self) -> bool {
        self.distance.is_some()
    }

    /// Expand the path into one segment per traversed edge.
    pub fn segments(&self, graph: &StopGraph) -> Vec<Segment> {
        self.path
            .windows(2)
            .map(|pair| {
                let distance = graph.weight(pair[0].as_str(), pair[1].as_str()).unwrap_or(0.0);
                Segment::new(pair[0].clone(), pair[1].clone(), distance)
            })
            .collect()
    }

    /// Expand the path into segments annotated with the owning route.
    pub fn route_segments(&self, graph: &StopGraph) -> Vec<RouteSegment> {
        self.path
            .windows(2)
            .map(|pair| {
                let edge = graph.edge_between(pair[0].as_str(), pair[1].as_str());
                RouteSegment {
                    from: pair[0].clone(),
                    to: pair[1].clone(),
                    distance: edge.map(|e| e.weight).unwrap_or(0.0),
                    route_id: edge.map(|e| e.route_id.clone()),
                    route_name: edge.map(|e| e.route_name.clone()),
                }
            })
            .collect()
    }
}

/// The route owning the most segments; the first one encountered wins ties.
pub fn dominant_route(segments: &[RouteSegment]) -> Option<(RouteId, String)> {
    let mut tally: Vec<(&RouteId, &str, usize)> = Vec::new();
    for segment in segments {
        let (Some(id), Some(name)) = (&segment.route_id, &segment.route_name) else {
            continue;
        };
        match tally.iter_mut().find(|(seen, _, _)| *seen == id) {
            Some(slot) => slot.2 += 1,
            None => tally.push((id, name.as_str(), 1)),
        }
    }

    let mut best: Option<(&RouteId, &str, usize)> = None;
    for candidate in tally {
        if best.is_none_or(|b| candidate.2 > b.2) {
            best = Some(candidate);
        }
    }
    best.map(|(id, name, _)| (id.clone(), name.to_string()))
}

/// Dijkstra from `start` to `end`.
///
/// Each stop is settled at most once and the search stops as soon as `end`
/// is settled. Unknown endpoints and unreachable targets produce an empty
/// path with no distance rather than an error.
pub fn shortest_path(graph: &StopGraph, start: &str, end: &str) -> ShortestPath {
    let (Some(source), Some(target)) = (graph.index_of(start), graph.index_of(end)) else {
        debug!(start, end, "shortest path endpoint not in graph");
        return ShortestPath::unreachable(Vec::new());
    };

    let n = graph.stop_count();
    let mut distance = vec![f64::INFINITY; n];
    let mut previous: Vec<Option<usize>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut settled_order = Vec::new();
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    distance[source] = 0.0;
    heap.push(State {
        distance: 0.0,
        seq,
        node: source,
    });

    while let Some(State { distance: cost, node, .. }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;
        settled_order.push(node);
        trace!(stop = %graph.stop_at(node), cost, "settled");

        if node == target {
            break;
        }

        for &(next, weight) in graph.adjacent(node) {
            if settled[next] {
                continue;
            }
            let candidate = cost + weight;
            if candidate < distance[next] {
                distance[next] = candidate;
                previous[next] = Some(node);
                seq += 1;
                heap.push(State {
                    distance: candidate,
                    seq,
                    node: next,
                });
            }
        }
    }

    let settled_names: Vec<StopName> = settled_order
        .iter()
        .map(|&i| graph.stop_at(i).clone())
        .collect();

    if !settled[target] {
        debug!(start, end, settled = settled_names.len(), "no path");
        return ShortestPath::unreachable(settled_names);
    }

    let mut path = vec![target];
    let mut cursor = target;
    while let Some(p) = previous[cursor] {
        path.push(p);
        cursor = p;
    }
    path.reverse();

    debug!(
        start,
        end,
        settled = settled_names.len(),
        hops = path.len() - 1,
        distance = distance[target],
        "shortest path found"
    );

    ShortestPath {
        path: path.into_iter().map(|i| graph.stop_at(i).clone()).collect(),
        distance: Some(distance[target]),
        settled_order: settled_names,
    }
}
