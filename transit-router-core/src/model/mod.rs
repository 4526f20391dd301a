//! Data model for bus network routing
//!
//! Contains the stop/bus catalogue and the directed weighted graph
//! the router works on.

pub mod catalogue;
pub mod graph;

// Re-export of basic types for convenience
pub use catalogue::{Bus, BusStats, Catalogue, CatalogueData, Coordinates, Stop};
pub use graph::{DirectedWeightedGraph, Edge};
