//! This module is responsible for turning a stop/bus catalogue
//! into the weighted graph the router works on.

mod builder;
mod config;

pub use builder::{GraphBuilder, StopVertices, TransitGraph, build_transit_graph};
pub use config::RoutingSettings;
