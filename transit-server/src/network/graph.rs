//! Undirected weighted stop graph derived from route definitions.
//!
//! Stops are interned into dense indices so the shortest-path search can
//! work on plain vectors. Edges are stored in both directions in the
//! adjacency lists and once in a deduplicated edge list that remembers which
//! route contributed the current weight.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{RouteId, StopName};
use crate::routes::Route;

/// An undirected edge between two stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from: StopName,
    pub to: StopName,
    pub weight: f64,
    /// Route that first established the current (minimum) weight.
    pub route_id: RouteId,
    pub route_name: String,
}

/// The stop graph.
///
/// Built in one pass from a set of routes; never mutated afterwards. Rebuild
/// it when the routes change.
#[derive(Debug, Clone, Default)]
pub struct StopGraph {
    stops: Vec<StopName>,
    index: HashMap<StopName, usize>,
    adjacency: Vec<Vec<(usize, f64)>>,
    edges: Vec<Edge>,
    /// Normalized (low, high) vertex pair to position in `edges`.
    edge_index: HashMap<(usize, usize), usize>,
}

impl StopGraph {
    /// Build the graph from routes in store order.
    ///
    /// Each pair of consecutive stops contributes an edge weighted by the
    /// second stop's distance from the previous one, or `default_weight`
    /// when that distance is zero or not finite. Self-loops are dropped.
    /// Duplicate edges keep the strictly smaller weight.
    pub fn build<'a, I>(routes: I, default_weight: f64) -> Self
    where
        I: IntoIterator<Item = &'a Route>,
    {
        let mut graph = StopGraph::default();

        for route in routes {
            let mut previous: Option<usize> = None;
            for entry in route.stops.iter() {
                let current = graph.intern(&entry.stop_name);
                if let Some(prev) = previous {
                    if prev != current {
                        let d = entry.distance_from_previous;
                        let weight = if d.is_finite() && d > 0.0 {
                            d
                        } else {
                            default_weight
                        };
                        graph.connect(prev, current, weight, route);
                    }
                }
                previous = Some(current);
            }
        }

        graph
    }

    fn intern(&mut self, name: &StopName) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.stops.len();
        self.stops.push(name.clone());
        self.index.insert(name.clone(), idx);
        self.adjacency.push(Vec::new());
        idx
    }

    fn connect(&mut self, a: usize, b: usize, weight: f64, route: &Route) {
        let key = (a.min(b), a.max(b));
        match self.edge_index.get(&key) {
            Some(&pos) => {
                if weight < self.edges[pos].weight {
                    let edge = &mut self.edges[pos];
                    edge.weight = weight;
                    edge.route_id = route.route_id.clone();
                    edge.route_name = route.route_name.clone();
                    set_weight(&mut self.adjacency[a], b, weight);
                    set_weight(&mut self.adjacency[b], a, weight);
                }
            }
            None => {
                self.adjacency[a].push((b, weight));
                self.adjacency[b].push((a, weight));
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(Edge {
                    from: self.stops[a].clone(),
                    to: self.stops[b].clone(),
                    weight,
                    route_id: route.route_id.clone(),
                    route_name: route.route_name.clone(),
                });
            }
        }
    }

    /// All stops, in the order they were first seen.
    pub fn stops(&self) -> &[StopName] {
        &self.stops
    }

    /// The deduplicated edge list.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_stop(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Neighbours of a stop with edge weights, in insertion order.
    ///
    /// Empty for unknown stops.
    pub fn neighbors(&self, name: &str) -> Vec<(&StopName, f64)> {
        self.index
            .get(name)
            .map(|&idx| {
                self.adjacency[idx]
                    .iter()
                    .map(|&(n, w)| (&self.stops[n], w))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Weight of the edge between two stops, if they are adjacent.
    pub fn weight(&self, a: &str, b: &str) -> Option<f64> {
        self.edge_between(a, b).map(|e| e.weight)
    }

    /// The edge-list entry between two stops, in either direction.
    pub fn edge_between(&self, a: &str, b: &str) -> Option<&Edge> {
        let a = *self.index.get(a)?;
        let b = *self.index.get(b)?;
        let pos = self.edge_index.get(&(a.min(b), a.max(b)))?;
        self.edges.get(*pos)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn stop_at(&self, idx: usize) -> &StopName {
        &self.stops[idx]
    }

    pub(crate) fn adjacent(&self, idx: usize) -> &[(usize, f64)] {
        &self.adjacency[idx]
    }
}

fn set_weight(list: &mut [(usize, f64)], neighbor: usize, weight: f64) {
    if let Some(slot) = list.iter_mut().find(|(n, _)| *n == neighbor) {
        slot.1 = weight;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;

    use crate::domain::{NewStop, RouteStopEntry};
    use crate::routes::Route;

    /// Build a route from `(stop, distance_from_previous)` pairs.
    pub fn route(name: &str, stops: &[(&str, f64)]) -> Route {
        let mut route = Route::new(name.to_string());
        for (stop, distance) in stops {
            let entry =
                RouteStopEntry::from_new(NewStop::named(*stop).with_distance(*distance), Utc::now())
                    .unwrap();
            route.stops.add_last(entry);
        }
        route
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::route;
    use super::*;

    #[test]
    fn builds_symmetric_edges() {
        let routes = vec![route("R1", &[("A", 0.0), ("B", 2.0), ("C", 3.0)])];
        let graph = StopGraph::build(&routes, 1.0);

        assert_eq!(graph.stop_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.weight("A", "B"), Some(2.0));
        assert_eq!(graph.weight("B", "A"), Some(2.0));
        assert_eq!(graph.weight("C", "B"), Some(3.0));
        assert_eq!(graph.weight("A", "C"), None);
    }

    #[test]
    fn missing_distance_uses_default() {
        let routes = vec![route("R1", &[("A", 0.0), ("B", 0.0)])];
        let graph = StopGraph::build(&routes, 1.5);
        assert_eq!(graph.weight("A", "B"), Some(1.5));
    }

    #[test]
    fn duplicate_edge_keeps_minimum_and_its_owner() {
        let routes = vec![
            route("Slow", &[("A", 0.0), ("B", 5.0)]),
            route("Fast", &[("B", 0.0), ("A", 2.0)]),
            route("Tie", &[("A", 0.0), ("B", 2.0)]),
        ];
        let graph = StopGraph::build(&routes, 1.0);

        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edge_between("B", "A").unwrap();
        assert_eq!(edge.weight, 2.0);
        assert_eq!(edge.route_name, "Fast");
        assert_eq!(graph.neighbors("A"), vec![(&graph.stops()[1], 2.0)]);
    }

    #[test]
    fn self_loops_are_ignored() {
        let routes = vec![route("Loop", &[("A", 0.0), ("A", 3.0), ("B", 1.0)])];
        let graph = StopGraph::build(&routes, 1.0);

        assert_eq!(graph.stop_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.neighbors("A").iter().all(|(n, _)| n.as_str() != "A"));
    }

    #[test]
    fn single_stop_route_adds_isolated_vertex() {
        let routes = vec![route("Lonely", &[("Depot", 0.0)])];
        let graph = StopGraph::build(&routes, 1.0);
        assert!(graph.has_stop("Depot"));
        assert!(graph.neighbors("Depot").is_empty());
    }

    #[test]
    fn neighbours_follow_insertion_order() {
        let routes = vec![
            route("R1", &[("Hub", 0.0), ("X", 1.0)]),
            route("R2", &[("Hub", 0.0), ("Y", 1.0)]),
            route("R3", &[("Z", 0.0), ("Hub", 1.0)]),
        ];
        let graph = StopGraph::build(&routes, 1.0);
        let names: Vec<&str> = graph
            .neighbors("Hub")
            .into_iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn unknown_stop_has_no_neighbours() {
        let routes: Vec<Route> = Vec::new();
        let graph = StopGraph::build(&routes, 1.0);
        assert!(!graph.has_stop("Nowhere"));
        assert!(graph.neighbors("Nowhere").is_empty());
        assert!(graph.edge_between("Nowhere", "Else").is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::test_support::route;
    use super::*;
    use proptest::prelude::*;

    const NAMES: [&str; 5] = ["A", "B", "C", "D", "E"];

    fn arb_routes() -> impl Strategy<Value = Vec<Vec<(usize, u8)>>> {
        prop::collection::vec(prop::collection::vec((0usize..5, 0u8..10), 1..6), 0..6)
    }

    proptest! {
        /// Every edge is symmetric and carries the minimum contributed weight
        #[test]
        fn symmetric_min_weight(raw in arb_routes()) {
            let routes: Vec<Route> = raw
                .iter()
                .enumerate()
                .map(|(i, stops)| {
                    let stops: Vec<(&str, f64)> =
                        stops.iter().map(|&(s, d)| (NAMES[s], d as f64)).collect();
                    route(&format!("R{i}"), &stops)
                })
                .collect();
            let graph = StopGraph::build(&routes, 1.0);

            let mut expected: HashMap<(&str, &str), f64> = HashMap::new();
            for r in &routes {
                let entries: Vec<_> = r.stops.iter().collect();
                for w in entries.windows(2) {
                    let (a, b) = (w[0].stop_name.as_str(), w[1].stop_name.as_str());
                    if a == b {
                        continue;
                    }
                    let d = w[1].distance_from_previous;
                    let weight = if d > 0.0 { d } else { 1.0 };
                    let key = if a < b { (a, b) } else { (b, a) };
                    let slot = expected.entry(key).or_insert(weight);
                    if weight < *slot {
                        *slot = weight;
                    }
                }
            }

            prop_assert_eq!(graph.edge_count(), expected.len());
            for ((a, b), w) in expected {
                prop_assert_eq!(graph.weight(a, b), Some(w));
                prop_assert_eq!(graph.weight(b, a), Some(w));
                let forward = graph.neighbors(a).into_iter().find(|(n, _)| n.as_str() == b).map(|(_, w)| w);
                let backward = graph.neighbors(b).into_iter().find(|(n, _)| n.as_str() == a).map(|(_, w)| w);
                prop_assert_eq!(forward, Some(w));
                prop_assert_eq!(backward, Some(w));
            }
        }
    }
}
