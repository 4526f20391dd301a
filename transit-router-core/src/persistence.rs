//! Binary encoding of precomputed router state.
//!
//! Everything is stored with bincode's standard configuration through serde,
//! so any `Serialize` snapshot (router state, catalogue, or a struct holding
//! both) can be written with the same helpers.

use std::path::Path;

use bincode::config::Configuration;
use log::info;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::Error;
use crate::loading::{RoutingSettings, StopVertices};
use crate::model::Edge;
use crate::model::graph::IncidenceList;
use crate::routing::{Item, RouteInternalData};

/// Version of the [`RouterData`] layout, bumped on incompatible changes
pub const FORMAT_VERSION: u32 = 1;

/// Everything needed to answer queries without rebuilding the graph
/// or rerunning the shortest path precomputation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterData {
    pub format_version: u32,
    pub settings: RoutingSettings,
    pub edges: Vec<Edge>,
    pub incidence_lists: Vec<IncidenceList>,
    /// Flattened |V|×|V| route table, row-major by source vertex
    pub routes: Vec<Option<RouteInternalData>>,
    /// Vertices of every stop in vertex order
    pub stop_vertices: Vec<StopVertices>,
    /// Itinerary item of every edge, indexed by edge id
    pub items: Vec<Item>,
}

fn config() -> Configuration {
    bincode::config::standard()
}

/// # Errors
///
/// Returns an error if the value can't be encoded
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
    Ok(bincode::serde::encode_to_vec(value, config())?)
}

/// Decodes a value that must span the whole buffer
///
/// # Errors
///
/// Returns an error if the buffer is truncated, malformed or has trailing bytes
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    let (value, read) = bincode::serde::decode_from_slice(bytes, config())?;
    if read != bytes.len() {
        return Err(Error::CorruptState(format!(
            "{} unexpected trailing bytes",
            bytes.len() - read
        )));
    }
    Ok(value)
}

/// Writes a snapshot to `path`, replacing any previous file only once the
/// new one is complete
///
/// # Errors
///
/// Returns an error if encoding or any file operation fails
pub fn write_snapshot<T: Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    let bytes = encode(value)?;

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    std::fs::write(&temp_path, &bytes).map_err(|e| with_path(e, path))?;
    std::fs::rename(&temp_path, path).map_err(|e| with_path(e, path))?;

    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// # Errors
///
/// Returns an error if the file can't be read or decoded
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let bytes = std::fs::read(path).map_err(|e| with_path(e, path))?;
    info!("Read {} bytes from {}", bytes.len(), path.display());
    decode(&bytes)
}

fn with_path(error: std::io::Error, path: &Path) -> Error {
    Error::IoError(std::io::Error::new(
        error.kind(),
        format!("'{}': {}", path.display(), error),
    ))
}
