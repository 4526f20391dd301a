// Re-export key components
pub use crate::loading::{RoutingSettings, TransitGraph, build_transit_graph};
pub use crate::model::{BusStats, Catalogue, CatalogueData, Coordinates};
pub use crate::persistence::{RouterData, read_snapshot, write_snapshot};
pub use crate::routing::{Route, RouteItem, RoutingEngine};

// Core graph types
pub use crate::model::{DirectedWeightedGraph, Edge};
pub use crate::{EdgeId, VertexId};

// Catalogue identifiers
pub use crate::{BusId, Minutes, StopId};

pub use crate::Error;
