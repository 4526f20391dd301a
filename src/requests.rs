use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use transit_router_core::prelude::RoutingSettings;

/// Top level request document
#[derive(Debug, Clone, Deserialize)]
pub struct RequestDocument {
    #[serde(default)]
    pub serialization_settings: Option<SerializationSettings>,
    #[serde(default)]
    pub routing_settings: Option<RoutingSettings>,
    #[serde(default)]
    pub base_requests: Vec<BaseRequest>,
    #[serde(default)]
    pub stat_requests: Vec<StatRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerializationSettings {
    /// Base file written by `make-base` and read by `process-requests`
    pub file: PathBuf,
}

/// Catalogue content
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum BaseRequest {
    Stop {
        name: String,
        latitude: f64,
        longitude: f64,
        /// Road distance in metres to neighbouring stops
        #[serde(default)]
        road_distances: BTreeMap<String, f64>,
    },
    Bus {
        name: String,
        stops: Vec<String>,
        is_roundtrip: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatRequest {
    pub id: i64,
    #[serde(flatten)]
    pub kind: StatKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum StatKind {
    Bus {
        name: String,
    },
    Stop {
        name: String,
    },
    Route {
        from: String,
        to: String,
    },
    /// Any request type this router doesn't answer, e.g. `Map`
    #[serde(other)]
    Unsupported,
}
