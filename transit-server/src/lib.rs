//! Transit operations server.
//!
//! Routes made of ordered stops, a stop graph with shortest-path search,
//! a bus fleet with arrival and priority views, ticketing, simulated
//! journeys and undo/redo over route and fleet changes, all persisted
//! through a pluggable record store.

pub mod config;
pub mod domain;
pub mod engine;
pub mod fleet;
pub mod history;
pub mod network;
pub mod routes;
pub mod storage;
pub mod tickets;
pub mod tracking;
pub mod web;
