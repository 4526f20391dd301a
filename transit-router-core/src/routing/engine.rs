//! Stop-to-stop route queries over a precomputed router

use std::sync::Arc;

use hashbrown::HashMap;
use log::{debug, info};

use super::itinerary::{Item, ItemKind, Route, RouteItem};
use super::router::{Router, same_weight};
use crate::loading::{RoutingSettings, StopVertices, TransitGraph, build_transit_graph};
use crate::model::{Catalogue, DirectedWeightedGraph};
use crate::persistence::{self, FORMAT_VERSION, RouterData};
use crate::{Error, Minutes, VertexId};

/// Answers itinerary queries between named stops.
///
/// Built once from a catalogue (or restored from [`RouterData`]) and
/// read-only afterwards. Clones share the same precomputed state, so an
/// engine can be handed to several threads.
#[derive(Debug, Clone)]
pub struct RoutingEngine {
    inner: Arc<EngineState>,
}

#[derive(Debug)]
struct EngineState {
    settings: RoutingSettings,
    router: Router,
    stop_vertices: Vec<StopVertices>,
    /// Stop name to its position in `stop_vertices`
    stop_index: HashMap<String, usize>,
    items: Vec<Item>,
}

impl RoutingEngine {
    /// Builds the routing graph for a catalogue and precomputes all routes
    ///
    /// # Errors
    ///
    /// Returns an error if the routing settings are invalid
    pub fn build(catalogue: &Catalogue, settings: RoutingSettings) -> Result<Self, Error> {
        let TransitGraph {
            graph,
            stop_vertices,
            items,
        } = build_transit_graph(catalogue, &settings)?;

        let router = Router::new(graph);
        let engine = Self::assemble(settings, router, stop_vertices, items)?;
        info!("Routing engine is ready");
        Ok(engine)
    }

    fn assemble(
        settings: RoutingSettings,
        router: Router,
        stop_vertices: Vec<StopVertices>,
        items: Vec<Item>,
    ) -> Result<Self, Error> {
        let mut stop_index = HashMap::with_capacity(stop_vertices.len());
        for (position, vertices) in stop_vertices.iter().enumerate() {
            if stop_index
                .insert(vertices.stop_name.clone(), position)
                .is_some()
            {
                return Err(Error::CorruptState(format!(
                    "Stop '{}' has more than one vertex pair",
                    vertices.stop_name
                )));
            }
        }

        Ok(Self {
            inner: Arc::new(EngineState {
                settings,
                router,
                stop_vertices,
                stop_index,
                items,
            }),
        })
    }

    /// Fastest route between two stops.
    ///
    /// Returns `Ok(None)` when both stops exist but no bus connects them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStop`] if either name is not a stop of the network
    pub fn query(&self, from: &str, to: &str) -> Result<Option<Route>, Error> {
        let from_vertex = self.wait_vertex(from)?;
        let to_vertex = self.wait_vertex(to)?;

        let Some(route) = self.inner.router.build_route(from_vertex, to_vertex) else {
            debug!("No route from '{from}' to '{to}'");
            return Ok(None);
        };

        let items: Vec<RouteItem> = route
            .edges
            .iter()
            .map(|&edge| RouteItem::from(&self.inner.items[edge]))
            .collect();

        let items_time: Minutes = items.iter().map(RouteItem::time).sum();
        debug_assert!(
            (items_time - route.weight).abs() <= 1e-9 * route.weight.max(1.0),
            "items of route '{from}' -> '{to}' add up to {items_time}, expected {}",
            route.weight
        );

        Ok(Some(Route {
            total_time: route.weight,
            items,
        }))
    }

    fn wait_vertex(&self, stop_name: &str) -> Result<VertexId, Error> {
        self.stop_vertices(stop_name)
            .map(|vertices| vertices.wait)
            .ok_or_else(|| Error::UnknownStop(stop_name.to_string()))
    }

    /// Wait and depart vertices of a stop
    pub fn stop_vertices(&self, stop_name: &str) -> Option<&StopVertices> {
        self.inner
            .stop_index
            .get(stop_name)
            .map(|&position| &self.inner.stop_vertices[position])
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.inner.settings
    }

    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    pub fn graph(&self) -> &DirectedWeightedGraph {
        self.inner.router.graph()
    }

    /// Itinerary item of every edge, indexed by edge id
    pub fn items(&self) -> &[Item] {
        &self.inner.items
    }

    pub fn vertex_count(&self) -> usize {
        self.graph().vertex_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph().edge_count()
    }

    /// Snapshot of the precomputed state
    pub fn export_state(&self) -> RouterData {
        let graph = self.graph();
        RouterData {
            format_version: FORMAT_VERSION,
            settings: self.inner.settings,
            edges: graph.edges().to_vec(),
            incidence_lists: graph.incidence_lists().to_vec(),
            routes: self.inner.router.routes().to_vec(),
            stop_vertices: self.inner.stop_vertices.clone(),
            items: self.inner.items.clone(),
        }
    }

    /// Restores an engine from a snapshot without recomputing any route
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is inconsistent in any way
    pub fn import_state(data: RouterData) -> Result<Self, Error> {
        if data.format_version != FORMAT_VERSION {
            return Err(Error::CorruptState(format!(
                "Unsupported format version {}, expected {FORMAT_VERSION}",
                data.format_version
            )));
        }
        data.settings.validate()?;

        let graph = DirectedWeightedGraph::from_parts(data.edges, data.incidence_lists)?;
        if data.items.len() != graph.edge_count() {
            return Err(Error::CorruptState(format!(
                "{} itinerary items for {} edges",
                data.items.len(),
                graph.edge_count()
            )));
        }

        let vertex_count = graph.vertex_count();
        if let Some(vertices) = data
            .stop_vertices
            .iter()
            .find(|vertices| vertices.wait >= vertex_count || vertices.depart >= vertex_count)
        {
            return Err(Error::CorruptState(format!(
                "Stop '{}' refers to vertices outside of the graph",
                vertices.stop_name
            )));
        }

        validate_items(&graph, &data.stop_vertices, &data.items, &data.settings)?;

        let router = Router::from_parts(graph, data.routes)?;
        let engine = Self::assemble(data.settings, router, data.stop_vertices, data.items)?;
        info!(
            "Restored routing engine with {} vertices and {} edges",
            engine.vertex_count(),
            engine.edge_count()
        );
        Ok(engine)
    }

    /// # Errors
    ///
    /// Returns an error if the state can't be encoded
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        persistence::encode(&self.export_state())
    }

    /// # Errors
    ///
    /// Returns an error if the bytes don't hold a valid router state
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::import_state(persistence::decode(bytes)?)
    }
}

/// Checks that every edge carries the itinerary item the graph builder
/// would have attached to it
fn validate_items(
    graph: &DirectedWeightedGraph,
    stop_vertices: &[StopVertices],
    items: &[Item],
    settings: &RoutingSettings,
) -> Result<(), Error> {
    // Owning stop of every wait and depart vertex
    let mut wait_of: Vec<Option<usize>> = vec![None; graph.vertex_count()];
    let mut depart_of: Vec<Option<usize>> = vec![None; graph.vertex_count()];
    for (stop, vertices) in stop_vertices.iter().enumerate() {
        if vertices.wait == vertices.depart
            || wait_of[vertices.wait].is_some()
            || depart_of[vertices.wait].is_some()
            || wait_of[vertices.depart].is_some()
            || depart_of[vertices.depart].is_some()
        {
            return Err(Error::CorruptState(format!(
                "Stop '{}' shares its vertices",
                vertices.stop_name
            )));
        }
        wait_of[vertices.wait] = Some(stop);
        depart_of[vertices.depart] = Some(stop);
    }

    let mut has_wait_edge = vec![false; stop_vertices.len()];
    for (id, (edge, item)) in graph.edges().iter().zip(items).enumerate() {
        if !same_weight(item.time, edge.weight) {
            return Err(Error::CorruptState(format!(
                "Item of edge {id} takes {} minutes, the edge {}",
                item.time, edge.weight
            )));
        }

        match item.kind {
            ItemKind::Wait => {
                let stop = wait_of[edge.from]
                    .filter(|&stop| depart_of[edge.to] == Some(stop))
                    .ok_or_else(|| {
                        Error::CorruptState(format!("Wait edge {id} doesn't stay at a stop"))
                    })?;
                if item.name != stop_vertices[stop].stop_name
                    || item.span_count != 1
                    || !same_weight(item.time, settings.wait_time())
                {
                    return Err(Error::CorruptState(format!(
                        "Wait edge {id} doesn't match stop '{}'",
                        stop_vertices[stop].stop_name
                    )));
                }
                has_wait_edge[stop] = true;
            }
            ItemKind::Bus => {
                if depart_of[edge.from].is_none()
                    || wait_of[edge.to].is_none()
                    || item.span_count == 0
                {
                    return Err(Error::CorruptState(format!(
                        "Bus edge {id} of '{}' doesn't run between stops",
                        item.name
                    )));
                }
            }
        }
    }

    if let Some(stop) = has_wait_edge.iter().position(|&seen| !seen) {
        return Err(Error::CorruptState(format!(
            "Stop '{}' has no wait edge",
            stop_vertices[stop].stop_name
        )));
    }
    Ok(())
}
