use std::path::Path;

use serde::{Deserialize, Serialize};
use transit_router_core::prelude::*;

/// Contents of a base file: the catalogue and the precomputed router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub catalogue: CatalogueData,
    pub router: RouterData,
}

impl Base {
    pub fn new(catalogue: &Catalogue, engine: &RoutingEngine) -> Self {
        Self {
            catalogue: CatalogueData::from(catalogue),
            router: engine.export_state(),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the file can't be written
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        write_snapshot(path, self)
    }

    /// # Errors
    ///
    /// Returns an error if the file can't be read or decoded
    pub fn load(path: &Path) -> Result<Self, Error> {
        read_snapshot(path)
    }

    /// Restores the catalogue and the routing engine without recomputing routes
    ///
    /// # Errors
    ///
    /// Returns an error if either part is inconsistent
    pub fn restore(self) -> Result<(Catalogue, RoutingEngine), Error> {
        let catalogue = Catalogue::try_from(self.catalogue)?;
        let engine = RoutingEngine::import_state(self.router)?;

        if let Some(stop) = catalogue
            .stops()
            .iter()
            .find(|stop| engine.stop_vertices(&stop.name).is_none())
        {
            return Err(Error::CorruptState(format!(
                "Stop '{}' is missing from the router",
                stop.name
            )));
        }
        Ok((catalogue, engine))
    }
}
