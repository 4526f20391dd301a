//! In-memory catalogue of stops, buses and road distances

use geo::{Distance, Haversine};
use hashbrown::HashMap;
use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};

use super::types::{Bus, BusStats, Coordinates, Stop};
use crate::{BusId, Error, StopId};

/// Stops and buses of the network, stored in insertion order.
///
/// Stops and buses are kept in arenas and addressed by index, so the
/// catalogue can be moved or cloned without invalidating any id handed out
/// by [`Catalogue::add_stop`] or [`Catalogue::add_bus`].
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    stops: Vec<Stop>,
    buses: Vec<Bus>,
    stop_index: HashMap<String, StopId>,
    bus_index: HashMap<String, BusId>,
    /// Buses through each stop, in bus insertion order
    stop_buses: Vec<Vec<BusId>>,
    /// Directed road distances in metres
    distances: HashMap<(StopId, StopId), f64>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stop and returns its id
    ///
    /// # Errors
    ///
    /// Returns an error if a stop with the same name already exists
    pub fn add_stop(
        &mut self,
        name: impl Into<String>,
        coordinates: Coordinates,
    ) -> Result<StopId, Error> {
        let name = name.into();
        if self.stop_index.contains_key(&name) {
            return Err(Error::InvalidData(format!("Duplicate stop '{name}'")));
        }

        let id = self.stops.len();
        self.stop_index.insert(name.clone(), id);
        self.stops.push(Stop { name, coordinates });
        self.stop_buses.push(Vec::new());
        Ok(id)
    }

    /// Adds a bus visiting the named stops in order
    ///
    /// # Errors
    ///
    /// Returns an error if a stop is not in the catalogue, the stop list is
    /// empty or a bus with the same name already exists
    pub fn add_bus<S: AsRef<str>>(
        &mut self,
        name: impl Into<String>,
        stop_names: &[S],
        is_roundtrip: bool,
    ) -> Result<BusId, Error> {
        let stops = stop_names
            .iter()
            .map(|stop_name| {
                let stop_name = stop_name.as_ref();
                self.stop_id(stop_name)
                    .ok_or_else(|| Error::UnknownStop(stop_name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.insert_bus(Bus {
            name: name.into(),
            stops,
            is_roundtrip,
        })
    }

    fn insert_bus(&mut self, bus: Bus) -> Result<BusId, Error> {
        if bus.stops.is_empty() {
            return Err(Error::InvalidData(format!("Bus '{}' has no stops", bus.name)));
        }
        if self.bus_index.contains_key(&bus.name) {
            return Err(Error::InvalidData(format!("Duplicate bus '{}'", bus.name)));
        }
        if bus.stops.len() < 2 {
            warn!("Bus '{}' visits a single stop and can't be ridden", bus.name);
        }

        let id = self.buses.len();
        for &stop in &bus.stops {
            let buses = &mut self.stop_buses[stop];
            if !buses.contains(&id) {
                buses.push(id);
            }
        }
        self.bus_index.insert(bus.name.clone(), id);
        self.buses.push(bus);
        Ok(id)
    }

    /// Sets the road distance in metres when driving from `from` to `to`
    ///
    /// # Errors
    ///
    /// Returns an error if either stop is unknown or the distance is negative
    pub fn set_distance(&mut self, from: &str, to: &str, metres: f64) -> Result<(), Error> {
        let from_id = self
            .stop_id(from)
            .ok_or_else(|| Error::UnknownStop(from.to_string()))?;
        let to_id = self
            .stop_id(to)
            .ok_or_else(|| Error::UnknownStop(to.to_string()))?;
        self.insert_distance(from_id, to_id, metres)
    }

    fn insert_distance(&mut self, from: StopId, to: StopId, metres: f64) -> Result<(), Error> {
        if !metres.is_finite() || metres < 0.0 {
            return Err(Error::InvalidData(format!(
                "Invalid distance {metres} between '{}' and '{}'",
                self.stops[from].name, self.stops[to].name
            )));
        }
        self.distances.insert((from, to), metres);
        Ok(())
    }

    /// Road distance in metres from `from` to `to`.
    ///
    /// Falls back to the opposite direction when only that one is known,
    /// and to zero when neither is.
    pub fn distance(&self, from: StopId, to: StopId) -> f64 {
        self.distances
            .get(&(from, to))
            .or_else(|| self.distances.get(&(to, from)))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn stop_id(&self, name: &str) -> Option<StopId> {
        self.stop_index.get(name).copied()
    }

    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn bus(&self, id: BusId) -> Option<&Bus> {
        self.buses.get(id)
    }

    pub fn bus_by_name(&self, name: &str) -> Option<&Bus> {
        self.bus_index.get(name).map(|&id| &self.buses[id])
    }

    /// All stops in insertion order
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// All buses in insertion order
    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    /// Sorted names of the buses through a stop, `None` if the stop is unknown
    pub fn buses_for_stop(&self, name: &str) -> Option<Vec<&str>> {
        let stop = self.stop_id(name)?;
        Some(
            self.stop_buses[stop]
                .iter()
                .map(|&bus| self.buses[bus].name.as_str())
                .sorted_unstable()
                .dedup()
                .collect(),
        )
    }

    /// Statistics of a bus route, `None` if the bus is unknown
    pub fn bus_stats(&self, name: &str) -> Option<BusStats> {
        let bus = self.bus_by_name(name)?;
        let path = full_path(bus);

        let route_length: f64 = path
            .iter()
            .tuple_windows()
            .map(|(&from, &to)| self.distance(from, to))
            .sum();

        let geo_length: f64 = path
            .iter()
            .map(|&stop| self.stops[stop].coordinates.to_point())
            .tuple_windows()
            .map(|(from, to)| Haversine.distance(from, to))
            .sum();

        let curvature = if geo_length > 0.0 {
            route_length / geo_length
        } else {
            0.0
        };

        Some(BusStats {
            stop_count: path.len(),
            unique_stop_count: path.iter().unique().count(),
            route_length,
            curvature,
        })
    }
}

/// Stops in the order a bus actually visits them, including the way back
fn full_path(bus: &Bus) -> Vec<StopId> {
    if bus.is_roundtrip {
        bus.stops.clone()
    } else {
        bus.stops
            .iter()
            .chain(bus.stops.iter().rev().skip(1))
            .copied()
            .collect()
    }
}

/// Plain snapshot of a [`Catalogue`] used for persistence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogueData {
    pub stops: Vec<Stop>,
    pub buses: Vec<Bus>,
    /// (from, to, metres), sorted by stop pair
    pub distances: Vec<(StopId, StopId, f64)>,
}

impl From<&Catalogue> for CatalogueData {
    fn from(catalogue: &Catalogue) -> Self {
        let distances = catalogue
            .distances
            .iter()
            .map(|(&(from, to), &metres)| (from, to, metres))
            .sorted_unstable_by_key(|&(from, to, _)| (from, to))
            .collect();

        Self {
            stops: catalogue.stops.clone(),
            buses: catalogue.buses.clone(),
            distances,
        }
    }
}

impl TryFrom<CatalogueData> for Catalogue {
    type Error = Error;

    fn try_from(data: CatalogueData) -> Result<Self, Self::Error> {
        let mut catalogue = Catalogue::new();
        for stop in data.stops {
            catalogue.add_stop(stop.name, stop.coordinates)?;
        }

        let stop_count = catalogue.stop_count();
        let check_stop = |stop: StopId| {
            if stop < stop_count {
                Ok(stop)
            } else {
                Err(Error::InvalidData(format!("Stop id {stop} is out of range")))
            }
        };

        for bus in data.buses {
            for &stop in &bus.stops {
                check_stop(stop)?;
            }
            catalogue.insert_bus(bus)?;
        }

        for (from, to, metres) in data.distances {
            catalogue.insert_distance(check_stop(from)?, check_stop(to)?, metres)?;
        }

        Ok(catalogue)
    }
}
