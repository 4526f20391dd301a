use geo::Point;
use serde::{Deserialize, Serialize};

use crate::StopId;

/// Geographic position of a stop in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Point in (x = longitude, y = latitude) order
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,
    pub coordinates: Coordinates,
}

/// Bus route over catalogue stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub name: String,
    /// Stops in travel order
    pub stops: Vec<StopId>,
    /// Round trips are only travelled in the listed direction,
    /// other routes also run back from the last stop to the first one
    pub is_roundtrip: bool,
}

/// Route statistics reported for `Bus` requests
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BusStats {
    /// Number of stops visited, counting the way back for non round trips
    pub stop_count: usize,
    pub unique_stop_count: usize,
    /// Road length in metres
    pub route_length: f64,
    /// Ratio of the road length to the great-circle length
    pub curvature: f64,
}
