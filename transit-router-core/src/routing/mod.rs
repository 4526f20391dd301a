//! Shortest path precomputation and itinerary queries

pub(crate) mod dijkstra;
pub mod engine;
pub mod itinerary;
pub mod router;

pub use engine::RoutingEngine;
pub use itinerary::{Item, ItemKind, Route, RouteItem};
pub use router::{RouteInfo, RouteInternalData, Router};
