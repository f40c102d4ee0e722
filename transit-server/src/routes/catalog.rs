//! The set of routes with a case-insensitive name index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::sequence::RouteStops;
use crate::domain::{NotFound, RouteId, RouteStopEntry, ValidationError};

/// A named, ordered sequence of stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RouteRecord", into = "RouteRecord")]
pub struct Route {
    pub route_id: RouteId,
    pub route_name: String,
    pub stops: RouteStops,
}

impl Route {
    /// An empty route with a freshly generated id.
    pub fn new(route_name: String) -> Self {
        Self {
            route_id: RouteId::generate(),
            route_name,
            stops: RouteStops::new(),
        }
    }
}

/// Stored shape of a route. `total_stops` is derived on write and ignored on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    pub route_id: RouteId,
    pub route_name: String,
    #[serde(default)]
    pub stops: Vec<RouteStopEntry>,
    #[serde(default)]
    pub total_stops: usize,
}

impl From<RouteRecord> for Route {
    fn from(record: RouteRecord) -> Self {
        Route {
            route_id: record.route_id,
            route_name: record.route_name,
            stops: RouteStops::from(record.stops),
        }
    }
}

impl From<Route> for RouteRecord {
    fn from(route: Route) -> Self {
        let total_stops = route.stops.len();
        RouteRecord {
            route_id: route.route_id,
            route_name: route.route_name,
            stops: route.stops.into(),
            total_stops,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStats {
    pub total_routes: usize,
    pub total_stops: usize,
    pub average_stops_per_route: f64,
}

/// All routes in creation order.
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: Vec<Route>,
    /// Lowercased name to id.
    names: HashMap<String, RouteId>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalogue from stored routes, keeping their order.
    pub fn from_routes(routes: Vec<Route>) -> Self {
        let names = routes
            .iter()
            .rev()
            .map(|r| (name_key(&r.route_name), r.route_id.clone()))
            .collect();
        Self { routes, names }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn to_routes(&self) -> Vec<Route> {
        self.routes.clone()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Create an empty route. Names are trimmed and must be unique ignoring case.
    pub fn create(&mut self, name: &str) -> Result<&Route, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyRouteName);
        }
        let key = name_key(name);
        if self.names.contains_key(&key) {
            return Err(ValidationError::DuplicateRouteName(name.to_string()));
        }

        let route = Route::new(name.to_string());
        self.names.insert(key, route.route_id.clone());
        self.routes.push(route);
        Ok(&self.routes[self.routes.len() - 1])
    }

    /// Remove a route, freeing its name.
    pub fn delete(&mut self, id: &str) -> Result<Route, NotFound> {
        let idx = self.position(id)?;
        let route = self.routes.remove(idx);
        let key = name_key(&route.route_name);
        if self.names.get(&key) == Some(&route.route_id) {
            self.names.remove(&key);
        }
        Ok(route)
    }

    pub fn get(&self, id: &str) -> Result<&Route, NotFound> {
        let idx = self.position(id)?;
        Ok(&self.routes[idx])
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Route, NotFound> {
        let idx = self.position(id)?;
        Ok(&mut self.routes[idx])
    }

    /// Routes whose name, or any stop name, contains `query` ignoring case.
    pub fn search(&self, query: &str) -> Vec<&Route> {
        let needle = query.trim().to_lowercase();
        self.routes
            .iter()
            .filter(|r| {
                r.route_name.to_lowercase().contains(&needle)
                    || r
                        .stops
                        .iter()
                        .any(|s| s.stop_name.as_str().to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn stats(&self) -> RouteStats {
        let total_routes = self.routes.len();
        let total_stops: usize = self.routes.iter().map(|r| r.stops.len()).sum();
        let average = if total_routes == 0 {
            0.0
        } else {
            round2(total_stops as f64 / total_routes as f64)
        };
        RouteStats {
            total_routes,
            total_stops,
            average_stops_per_route: average,
        }
    }

    fn position(&self, id: &str) -> Result<usize, NotFound> {
        self.routes
            .iter()
            .position(|r| r.route_id.as_str() == id)
            .ok_or_else(|| NotFound::Route(id.to_string()))
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::NewStop;

    fn add_stop(route: &mut Route, name: &str) {
        let entry = RouteStopEntry::from_new(NewStop::named(name), Utc::now()).unwrap();
        route.stops.add_last(entry);
    }

    #[test]
    fn create_rejects_case_insensitive_duplicates() {
        let mut catalog = RouteCatalog::new();
        catalog.create("Airport Express").unwrap();
        assert_eq!(
            catalog.create("  airport express ").unwrap_err(),
            ValidationError::DuplicateRouteName("airport express".into())
        );
        assert_eq!(catalog.create("   ").unwrap_err(), ValidationError::EmptyRouteName);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn delete_frees_name() {
        let mut catalog = RouteCatalog::new();
        let id = catalog.create("Loop").unwrap().route_id.clone();
        let removed = catalog.delete(id.as_str()).unwrap();
        assert_eq!(removed.route_name, "Loop");
        assert!(catalog.is_empty());
        assert!(catalog.create("LOOP").is_ok());
        assert_eq!(
            catalog.delete("missing").unwrap_err(),
            NotFound::Route("missing".into())
        );
    }

    #[test]
    fn from_routes_rebuilds_name_index() {
        let mut catalog = RouteCatalog::new();
        catalog.create("Harbour").unwrap();
        let mut rebuilt = RouteCatalog::from_routes(catalog.to_routes());
        assert!(rebuilt.create("HARBOUR").is_err());
    }

    #[test]
    fn search_matches_route_and_stop_names() {
        let mut catalog = RouteCatalog::new();
        let a = catalog.create("City Line").unwrap().route_id.clone();
        let b = catalog.create("Coastal").unwrap().route_id.clone();
        add_stop(catalog.get_mut(b.as_str()).unwrap(), "Old City Gate");
        add_stop(catalog.get_mut(a.as_str()).unwrap(), "Museum");

        let hits: Vec<&str> = catalog
            .search("city")
            .into_iter()
            .map(|r| r.route_name.as_str())
            .collect();
        assert_eq!(hits, vec!["City Line", "Coastal"]);
        assert_eq!(catalog.search("museum").len(), 1);
        assert!(catalog.search("zoo").is_empty());
    }

    #[test]
    fn stats_average_rounds_to_two_places() {
        let mut catalog = RouteCatalog::new();
        assert_eq!(catalog.stats().average_stops_per_route, 0.0);

        for name in ["R1", "R2", "R3"] {
            catalog.create(name).unwrap();
        }
        let ids: Vec<RouteId> = catalog.routes().iter().map(|r| r.route_id.clone()).collect();
        add_stop(catalog.get_mut(ids[0].as_str()).unwrap(), "A");
        add_stop(catalog.get_mut(ids[0].as_str()).unwrap(), "B");
        add_stop(catalog.get_mut(ids[1].as_str()).unwrap(), "C");

        let stats = catalog.stats();
        assert_eq!(stats.total_routes, 3);
        assert_eq!(stats.total_stops, 3);
        assert_eq!(stats.average_stops_per_route, 1.0);

        add_stop(catalog.get_mut(ids[2].as_str()).unwrap(), "D");
        assert_eq!(catalog.stats().average_stops_per_route, 1.33);
    }

    #[test]
    fn record_shape_carries_total_stops() {
        let mut route = Route::new("Ring".into());
        add_stop(&mut route, "North");
        add_stop(&mut route, "South");
        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(value["total_stops"], 2);
        assert_eq!(value["route_name"], "Ring");
        assert_eq!(value["stops"][1]["stop_name"], "South");

        let back: Route = serde_json::from_value(value).unwrap();
        assert_eq!(back, route);
    }
}
