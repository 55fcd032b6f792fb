//! In-memory graph store.
//!
//! `MemoryGraph` keeps vertices, edges and adjacency lists behind a single
//! lock. It is the store used by the command line front end and the tests,
//! and it can be populated from a JSON document:
//!
//! ```json
//! {
//!   "name": "people",
//!   "vertices": [{ "id": 1, "properties": { "name": "alice" } }],
//!   "edges": [{ "out_v": 1, "in_v": 2, "label": "knows" }]
//! }
//! ```

use super::{EdgeId, EdgeRecord, ElementKey, ElementKind, GraphRef, GraphStore, Properties, VertexId};
use crate::element::{EdgeRef, VertexRef};
use crate::error::{Result, RouteError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct StoredEdge {
    record: EdgeRecord,
    properties: Properties,
}

#[derive(Debug, Default)]
struct GraphData {
    vertices: BTreeMap<VertexId, Properties>,
    edges: BTreeMap<EdgeId, StoredEdge>,
    out_adj: HashMap<VertexId, Vec<EdgeId>>,
    in_adj: HashMap<VertexId, Vec<EdgeId>>,
    next_vertex: u64,
    next_edge: u64,
}

/// Graph store held entirely in memory.
#[derive(Debug)]
pub struct MemoryGraph {
    name: String,
    data: RwLock<GraphData>,
}

impl MemoryGraph {
    /// Create an empty graph.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            data: RwLock::new(GraphData::default()),
        })
    }

    /// Add a vertex with the next free id.
    pub fn add_vertex(&self, properties: Properties) -> VertexId {
        let mut data = self.data.write();
        let mut id = VertexId(data.next_vertex);
        while data.vertices.contains_key(&id) {
            id = VertexId(id.0 + 1);
        }
        data.next_vertex = id.0 + 1;
        data.vertices.insert(id, properties);
        id
    }

    /// Add a vertex with an explicit id.
    pub fn add_vertex_with_id(&self, id: VertexId, properties: Properties) -> Result<VertexId> {
        let mut data = self.data.write();
        if data.vertices.contains_key(&id) {
            return Err(RouteError::Graph(format!("vertex {} already exists", id)));
        }
        data.vertices.insert(id, properties);
        if id.0 >= data.next_vertex {
            data.next_vertex = id.0 + 1;
        }
        Ok(id)
    }

    /// Add an edge between two existing vertices.
    pub fn add_edge(
        &self,
        out_v: VertexId,
        in_v: VertexId,
        label: impl Into<String>,
        properties: Properties,
    ) -> Result<EdgeId> {
        let mut data = self.data.write();
        let id = EdgeId(data.next_edge);
        Self::insert_edge(&mut data, id, out_v, in_v, label.into(), properties)?;
        Ok(id)
    }

    fn insert_edge(
        data: &mut GraphData,
        id: EdgeId,
        out_v: VertexId,
        in_v: VertexId,
        label: String,
        properties: Properties,
    ) -> Result<()> {
        for v in [out_v, in_v] {
            if !data.vertices.contains_key(&v) {
                return Err(RouteError::Graph(format!(
                    "edge {} references missing vertex {}",
                    id, v
                )));
            }
        }
        if data.edges.contains_key(&id) {
            return Err(RouteError::Graph(format!("edge {} already exists", id)));
        }
        data.out_adj.entry(out_v).or_default().push(id);
        data.in_adj.entry(in_v).or_default().push(id);
        data.edges.insert(
            id,
            StoredEdge {
                record: EdgeRecord {
                    id,
                    label,
                    out_v,
                    in_v,
                },
                properties,
            },
        );
        if id.0 >= data.next_edge {
            data.next_edge = id.0 + 1;
        }
        Ok(())
    }

    /// Set a single property on a vertex or edge.
    pub fn set_property(
        &self,
        key: ElementKey,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<()> {
        let mut data = self.data.write();
        let properties = match key {
            ElementKey::Vertex(id) => data.vertices.get_mut(&id),
            ElementKey::Edge(id) => data.edges.get_mut(&id).map(|e| &mut e.properties),
        }
        .ok_or_else(|| RouteError::Graph(format!("no element {:?}", key)))?;
        properties.insert(name.into(), value);
        Ok(())
    }

    /// Load and initialize a vertex by id.
    pub fn vertex(self: &Arc<Self>, id: VertexId) -> Option<VertexRef> {
        GraphRef::new(self).vertex(id)
    }

    /// Load and initialize an edge by id.
    pub fn edge(self: &Arc<Self>, id: EdgeId) -> Option<EdgeRef> {
        GraphRef::new(self).edge(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.data.read().vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.data.read().edges.len()
    }

    /// Build a graph from a JSON document.
    pub fn from_json_str(content: &str) -> Result<Arc<Self>> {
        let doc: GraphDocument = serde_json::from_str(content)?;
        let graph = Self::new(doc.name.unwrap_or_else(|| "graph".to_string()));
        for vertex in doc.vertices {
            graph.add_vertex_with_id(vertex.id, vertex.properties)?;
        }
        {
            let mut data = graph.data.write();
            for edge in doc.edges {
                let id = edge.id.unwrap_or(EdgeId(data.next_edge));
                Self::insert_edge(
                    &mut data,
                    id,
                    edge.out_v,
                    edge.in_v,
                    edge.label,
                    edge.properties,
                )?;
            }
        }
        tracing::debug!(
            "Loaded graph '{}' with {} vertices and {} edges",
            graph.name,
            graph.vertex_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Import a graph from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RouteError::Graph(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Serialize the graph to a JSON document.
    pub fn to_json_string(&self) -> Result<String> {
        let data = self.data.read();
        let doc = GraphDocument {
            name: Some(self.name.clone()),
            vertices: data
                .vertices
                .iter()
                .map(|(&id, properties)| VertexDocument {
                    id,
                    properties: properties.clone(),
                })
                .collect(),
            edges: data
                .edges
                .values()
                .map(|edge| EdgeDocument {
                    id: Some(edge.record.id),
                    out_v: edge.record.out_v,
                    in_v: edge.record.in_v,
                    label: edge.record.label.clone(),
                    properties: edge.properties.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

impl GraphStore for MemoryGraph {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_element_kind(&self, kind: ElementKind) -> bool {
        kind.is_graph_element()
    }

    fn vertex_ids(&self) -> Vec<VertexId> {
        self.data.read().vertices.keys().copied().collect()
    }

    fn edge_ids(&self) -> Vec<EdgeId> {
        self.data.read().edges.keys().copied().collect()
    }

    fn has_vertex(&self, id: VertexId) -> bool {
        self.data.read().vertices.contains_key(&id)
    }

    fn edge(&self, id: EdgeId) -> Option<EdgeRecord> {
        self.data.read().edges.get(&id).map(|e| e.record.clone())
    }

    fn out_edges(&self, id: VertexId) -> Vec<EdgeId> {
        self.data.read().out_adj.get(&id).cloned().unwrap_or_default()
    }

    fn in_edges(&self, id: VertexId) -> Vec<EdgeId> {
        self.data.read().in_adj.get(&id).cloned().unwrap_or_default()
    }

    fn properties(&self, key: ElementKey) -> Option<Properties> {
        let data = self.data.read();
        match key {
            ElementKey::Vertex(id) => data.vertices.get(&id).cloned(),
            ElementKey::Edge(id) => data.edges.get(&id).map(|e| e.properties.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    vertices: Vec<VertexDocument>,
    #[serde(default)]
    edges: Vec<EdgeDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VertexDocument {
    id: VertexId,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeDocument {
    #[serde(default)]
    id: Option<EdgeId>,
    out_v: VertexId,
    in_v: VertexId,
    label: String,
    #[serde(default)]
    properties: Properties,
}
