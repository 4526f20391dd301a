//! Directed weighted graph with a fixed vertex set and append-only edges

use serde::{Deserialize, Serialize};

use crate::{EdgeId, Error, Minutes, VertexId};

/// Graph edge, weighted by travel time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
    pub weight: Minutes,
}

/// Edge ids leaving one vertex, in insertion order
pub type IncidenceList = Vec<EdgeId>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectedWeightedGraph {
    edges: Vec<Edge>,
    incidence_lists: Vec<IncidenceList>,
}

impl DirectedWeightedGraph {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            incidence_lists: vec![Vec::new(); vertex_count],
        }
    }

    /// Restores a graph from its stored parts
    ///
    /// # Errors
    ///
    /// Returns an error if an edge points outside the vertex set, has an
    /// invalid weight, or the incidence lists don't match the edges
    pub fn from_parts(
        edges: Vec<Edge>,
        incidence_lists: Vec<IncidenceList>,
    ) -> Result<Self, Error> {
        let vertex_count = incidence_lists.len();

        for (id, edge) in edges.iter().enumerate() {
            if edge.from >= vertex_count || edge.to >= vertex_count {
                return Err(Error::CorruptState(format!(
                    "Edge {id} connects {} -> {} outside of {vertex_count} vertices",
                    edge.from, edge.to
                )));
            }
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(Error::CorruptState(format!(
                    "Edge {id} has invalid weight {}",
                    edge.weight
                )));
            }
        }

        // Every edge must be listed exactly once, under its own source vertex
        let mut listed = vec![false; edges.len()];
        for (vertex, list) in incidence_lists.iter().enumerate() {
            for &id in list {
                let edge = edges.get(id).ok_or_else(|| {
                    Error::CorruptState(format!("Vertex {vertex} lists unknown edge {id}"))
                })?;
                if edge.from != vertex || listed[id] {
                    return Err(Error::CorruptState(format!(
                        "Edge {id} is misplaced in the incidence list of vertex {vertex}"
                    )));
                }
                listed[id] = true;
            }
        }
        if let Some(id) = listed.iter().position(|&seen| !seen) {
            return Err(Error::CorruptState(format!(
                "Edge {id} is missing from the incidence lists"
            )));
        }

        Ok(Self {
            edges,
            incidence_lists,
        })
    }

    /// Appends an edge and returns its id
    ///
    /// # Panics
    ///
    /// If `edge.from` or `edge.to` is not a vertex of the graph
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        assert!(
            edge.to < self.incidence_lists.len(),
            "edge target {} is out of range",
            edge.to
        );
        let id = self.edges.len();
        self.incidence_lists[edge.from].push(id);
        self.edges.push(edge);
        id
    }

    pub fn vertex_count(&self) -> usize {
        self.incidence_lists.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// # Panics
    ///
    /// If `id` is not an edge of the graph
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Ids of edges leaving `vertex`, in insertion order
    ///
    /// # Panics
    ///
    /// If `vertex` is not a vertex of the graph
    pub fn incident_edges(&self, vertex: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.incidence_lists[vertex].iter().copied()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn incidence_lists(&self) -> &[IncidenceList] {
        &self.incidence_lists
    }
}
