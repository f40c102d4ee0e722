//! The stop network: a weighted graph derived from routes and shortest-path
//! search over it.

pub mod dijkstra;
pub mod graph;

pub use dijkstra::{RouteSegment, ShortestPath, dominant_route, shortest_path};
pub use graph::{Edge, StopGraph};
