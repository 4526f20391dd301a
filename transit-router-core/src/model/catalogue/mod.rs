//! Stops, buses and road distances between stops

pub mod data;
pub mod types;

pub use data::{Catalogue, CatalogueData};
pub use types::{Bus, BusStats, Coordinates, Stop};
