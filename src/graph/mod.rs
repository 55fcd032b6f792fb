//! Graph store contract.
//!
//! Routes never own the graph they traverse. They hold a [`GraphRef`], a weak
//! handle that is upgraded on demand and compares by identity. A dropped
//! graph simply stops resolving; nothing downstream treats that as an error.
//!
//! Any storage backend can take part by implementing [`GraphStore`]. The
//! crate ships [`MemoryGraph`] as an in-process implementation.

pub mod id;
pub mod memory;

pub use id::{EdgeId, ElementKey, VertexId};
pub use memory::MemoryGraph;

use crate::element::{EdgeRef, Item, VertexRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

/// Property bag attached to vertices and edges.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// The declared kind of the elements a route produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Arbitrary values
    #[default]
    Object,
    /// The graph itself
    Graph,
    Vertex,
    Edge,
}

impl ElementKind {
    /// Short label used in route descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Object => "Obj",
            ElementKind::Graph => "Graph",
            ElementKind::Vertex => "V",
            ElementKind::Edge => "E",
        }
    }

    /// Whether this kind names a graph element.
    pub fn is_graph_element(&self) -> bool {
        matches!(self, ElementKind::Vertex | ElementKind::Edge)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Stored shape of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub label: String,
    pub out_v: VertexId,
    pub in_v: VertexId,
}

/// Storage backend contract.
///
/// Implementations answer in terms of ids and records. [`GraphRef`] turns
/// those into graph-tagged [`Item`]s.
#[cfg_attr(test, mockall::automock)]
pub trait GraphStore: Send + Sync {
    /// Human-readable name used when the graph itself is displayed.
    fn name(&self) -> String;

    /// Whether elements of `kind` are ones this store can enrich.
    fn is_element_kind(&self, kind: ElementKind) -> bool;

    fn vertex_ids(&self) -> Vec<VertexId>;

    fn edge_ids(&self) -> Vec<EdgeId>;

    fn has_vertex(&self, id: VertexId) -> bool;

    fn edge(&self, id: EdgeId) -> Option<EdgeRecord>;

    /// Ids of edges leaving `id`.
    fn out_edges(&self, id: VertexId) -> Vec<EdgeId>;

    /// Ids of edges arriving at `id`.
    fn in_edges(&self, id: VertexId) -> Vec<EdgeId>;

    fn properties(&self, key: ElementKey) -> Option<Properties>;
}

/// Weak, identity-compared handle to a graph store.
#[derive(Clone)]
pub struct GraphRef(Weak<dyn GraphStore>);

impl GraphRef {
    pub fn new<G: GraphStore + 'static>(graph: &Arc<G>) -> Self {
        let graph: Arc<dyn GraphStore> = graph.clone();
        Self(Arc::downgrade(&graph))
    }

    pub fn from_dyn(graph: &Arc<dyn GraphStore>) -> Self {
        Self(Arc::downgrade(graph))
    }

    /// The store, if it is still alive.
    pub fn upgrade(&self) -> Option<Arc<dyn GraphStore>> {
        self.0.upgrade()
    }

    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Identity comparison.
    pub fn same(&self, other: &GraphRef) -> bool {
        std::ptr::addr_eq(self.0.as_ptr(), other.0.as_ptr())
    }

    /// Address of the store, used as an identity key.
    pub fn addr(&self) -> usize {
        self.0.as_ptr() as *const () as usize
    }

    pub fn name(&self) -> Option<String> {
        self.upgrade().map(|g| g.name())
    }

    pub fn is_element_kind(&self, kind: ElementKind) -> bool {
        self.upgrade().is_some_and(|g| g.is_element_kind(kind))
    }

    /// Look up a vertex by id, tagged with this graph.
    pub fn vertex(&self, id: VertexId) -> Option<VertexRef> {
        let graph = self.upgrade()?;
        graph
            .has_vertex(id)
            .then(|| VertexRef::new(id).with_graph(self.clone()))
    }

    /// Look up an edge by id, tagged with this graph.
    pub fn edge(&self, id: EdgeId) -> Option<EdgeRef> {
        let record = self.upgrade()?.edge(id)?;
        Some(EdgeRef::from_record(record).with_graph(self.clone()))
    }

    /// Load the given vertices, skipping ids the store does not know.
    pub fn load_vertices(&self, ids: &[VertexId]) -> Vec<Item> {
        ids.iter()
            .filter_map(|&id| self.vertex(id))
            .map(Item::Vertex)
            .collect()
    }

    /// Load the given edges, skipping ids the store does not know.
    pub fn load_edges(&self, ids: &[EdgeId]) -> Vec<Item> {
        ids.iter()
            .filter_map(|&id| self.edge(id))
            .map(Item::Edge)
            .collect()
    }

    /// Every vertex in the store.
    pub fn vertices(&self) -> Vec<Item> {
        match self.upgrade() {
            Some(graph) => self.load_vertices(&graph.vertex_ids()),
            None => Vec::new(),
        }
    }

    /// Every edge in the store.
    pub fn edges(&self) -> Vec<Item> {
        match self.upgrade() {
            Some(graph) => self.load_edges(&graph.edge_ids()),
            None => Vec::new(),
        }
    }

    pub fn properties(&self, key: ElementKey) -> Option<Properties> {
        self.upgrade()?.properties(key)
    }
}

impl PartialEq for GraphRef {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for GraphRef {}

impl fmt::Debug for GraphRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "GraphRef({})", name),
            None => write!(f, "GraphRef(dropped)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_store() -> Arc<MockGraphStore> {
        let mut store = MockGraphStore::new();
        store.expect_name().return_const("mock".to_string());
        store
            .expect_has_vertex()
            .returning(|id| id == VertexId(1) || id == VertexId(2));
        store.expect_edge().returning(|id| {
            (id == EdgeId(10)).then(|| EdgeRecord {
                id,
                label: "knows".to_string(),
                out_v: VertexId(1),
                in_v: VertexId(2),
            })
        });
        store
            .expect_vertex_ids()
            .returning(|| vec![VertexId(1), VertexId(2)]);
        store
            .expect_is_element_kind()
            .returning(|kind| kind.is_graph_element());
        Arc::new(store)
    }

    #[test]
    fn test_load_vertices_skips_unknown_ids() {
        let store = mock_store();
        let graph = GraphRef::new(&store);
        let items = graph.load_vertices(&[VertexId(1), VertexId(5), VertexId(2)]);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.graph() == Some(&graph)));
    }

    #[test]
    fn test_edge_lookup_is_tagged() {
        let store = mock_store();
        let graph = GraphRef::new(&store);
        let edge = graph.edge(EdgeId(10)).unwrap();
        assert_eq!(edge.label, "knows");
        assert_eq!(edge.graph.as_ref(), Some(&graph));
        assert!(graph.edge(EdgeId(11)).is_none());
    }

    #[test]
    fn test_identity_comparison() {
        let a = mock_store();
        let b = mock_store();
        assert_eq!(GraphRef::new(&a), GraphRef::new(&a));
        assert_ne!(GraphRef::new(&a), GraphRef::new(&b));
    }

    #[test]
    fn test_dropped_graph_degrades() {
        let store = mock_store();
        let graph = GraphRef::new(&store);
        assert!(graph.is_live());
        assert!(graph.is_element_kind(ElementKind::Vertex));
        drop(store);
        assert!(!graph.is_live());
        assert!(graph.vertices().is_empty());
        assert!(!graph.is_element_kind(ElementKind::Vertex));
        assert_eq!(format!("{:?}", graph), "GraphRef(dropped)");
    }
}
