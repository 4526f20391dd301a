//! Routing engine for bus networks.
//!
//! A [`Catalogue`] of stops and buses is translated into a directed weighted
//! graph (two vertices per stop, one edge per wait and per bus span), all
//! shortest paths are precomputed once, and [`RoutingEngine`] answers
//! stop-to-stop itinerary queries from that table.

pub mod error;
pub mod loading;
pub mod model;
pub mod persistence;
pub mod prelude;
pub mod routing;

pub use error::Error;
pub use loading::{RoutingSettings, TransitGraph, build_transit_graph};
pub use model::{BusStats, Catalogue, CatalogueData, Coordinates, DirectedWeightedGraph, Edge};
pub use persistence::RouterData;
pub use routing::{Route, RouteItem, RoutingEngine};

/// Graph vertex index
pub type VertexId = usize;
/// Graph edge index, dense and assigned in insertion order
pub type EdgeId = usize;
/// Index of a stop in the catalogue arena
pub type StopId = usize;
/// Index of a bus in the catalogue arena
pub type BusId = usize;
/// Travel time in minutes
pub type Minutes = f64;
