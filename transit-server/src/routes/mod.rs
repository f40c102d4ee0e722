//! Route definitions: the catalogue of named routes and the ordered stop
//! sequence each one carries.

mod catalog;
mod sequence;

pub use catalog::{Route, RouteCatalog, RouteRecord, RouteStats};
pub(crate) use catalog::round2;
pub use sequence::RouteStops;
