//! Values that flow through pipelines.
//!
//! [`Item`] is the raw value a pipe produces: a vertex or edge reference, the
//! graph itself, or an arbitrary JSON value. [`Element`] wraps an item with
//! the capability extensions, owning route and graph it picked up on its way
//! through a route, without copying or altering the item.

use crate::error::{Result, RouteError};
use crate::extension::ExtensionSet;
use crate::graph::{EdgeId, EdgeRecord, ElementKey, ElementKind, GraphRef, Properties, VertexId};
use crate::route::Route;
use serde_json::Value;
use std::fmt;
use std::ops::Deref;

/// Reference to a vertex, optionally tagged with its graph.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexRef {
    pub id: VertexId,
    pub graph: Option<GraphRef>,
}

impl VertexRef {
    pub fn new(id: VertexId) -> Self {
        Self { id, graph: None }
    }

    pub fn with_graph(mut self, graph: GraphRef) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn properties(&self) -> Properties {
        self.graph
            .as_ref()
            .and_then(|g| g.properties(ElementKey::Vertex(self.id)))
            .unwrap_or_default()
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.properties().remove(name)
    }
}

/// Reference to an edge, carrying its label and endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRef {
    pub id: EdgeId,
    pub label: String,
    pub out_v: VertexId,
    pub in_v: VertexId,
    pub graph: Option<GraphRef>,
}

impl EdgeRef {
    pub fn from_record(record: EdgeRecord) -> Self {
        Self {
            id: record.id,
            label: record.label,
            out_v: record.out_v,
            in_v: record.in_v,
            graph: None,
        }
    }

    pub fn with_graph(mut self, graph: GraphRef) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn properties(&self) -> Properties {
        self.graph
            .as_ref()
            .and_then(|g| g.properties(ElementKey::Edge(self.id)))
            .unwrap_or_default()
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.properties().remove(name)
    }
}

/// Raw pipeline value.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Vertex(VertexRef),
    Edge(EdgeRef),
    Graph(GraphRef),
    Value(Value),
}

/// Hashable identity of an item, used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Vertex(usize, u64),
    Edge(usize, u64),
    Graph(usize),
    Value(String),
}

impl Item {
    pub fn kind(&self) -> ElementKind {
        match self {
            Item::Vertex(_) => ElementKind::Vertex,
            Item::Edge(_) => ElementKind::Edge,
            Item::Graph(_) => ElementKind::Graph,
            Item::Value(_) => ElementKind::Object,
        }
    }

    /// The graph this item belongs to, if it carries one.
    pub fn graph(&self) -> Option<&GraphRef> {
        match self {
            Item::Vertex(v) => v.graph.as_ref(),
            Item::Edge(e) => e.graph.as_ref(),
            Item::Graph(g) => Some(g),
            Item::Value(_) => None,
        }
    }

    /// Whether the item can be associated with a graph.
    pub fn supports_graph(&self) -> bool {
        matches!(self, Item::Vertex(_) | Item::Edge(_))
    }

    /// Associate the item with `graph` unless it already has one.
    pub fn attach_graph(&mut self, graph: &GraphRef) {
        match self {
            Item::Vertex(v) if v.graph.is_none() => v.graph = Some(graph.clone()),
            Item::Edge(e) if e.graph.is_none() => e.graph = Some(graph.clone()),
            _ => {}
        }
    }

    pub fn as_vertex(&self) -> Option<&VertexRef> {
        match self {
            Item::Vertex(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&EdgeRef> {
        match self {
            Item::Edge(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Item::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    /// Property of a vertex or edge, looked up through its graph.
    pub fn property(&self, name: &str) -> Option<Value> {
        match self {
            Item::Vertex(v) => v.property(name),
            Item::Edge(e) => e.property(name),
            _ => None,
        }
    }

    pub fn identity_key(&self) -> ItemKey {
        match self {
            Item::Vertex(v) => ItemKey::Vertex(v.graph.as_ref().map_or(0, GraphRef::addr), v.id.0),
            Item::Edge(e) => ItemKey::Edge(e.graph.as_ref().map_or(0, GraphRef::addr), e.id.0),
            Item::Graph(g) => ItemKey::Graph(g.addr()),
            Item::Value(v) => ItemKey::Value(v.to_string()),
        }
    }

    /// JSON view of the item. Vertices and edges expose their properties
    /// with `id`, `label`, `out_v` and `in_v` layered on top.
    pub fn to_json(&self) -> Value {
        match self {
            Item::Vertex(v) => {
                let mut map = v.properties();
                map.insert("id".to_string(), Value::from(v.id.0));
                Value::Object(map)
            }
            Item::Edge(e) => {
                let mut map = e.properties();
                map.insert("id".to_string(), Value::from(e.id.0));
                map.insert("label".to_string(), Value::from(e.label.clone()));
                map.insert("out_v".to_string(), Value::from(e.out_v.0));
                map.insert("in_v".to_string(), Value::from(e.in_v.0));
                Value::Object(map)
            }
            Item::Graph(g) => Value::from(g.name().unwrap_or_default()),
            Item::Value(v) => v.clone(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Vertex(v) => write!(f, "#<V[{}]>", v.id),
            Item::Edge(e) => write!(f, "#<E[{}]:{}-{}-{}>", e.id, e.out_v, e.label, e.in_v),
            Item::Graph(g) => match g.name() {
                Some(name) => write!(f, "#<Graph {}>", name),
                None => write!(f, "#<Graph>"),
            },
            Item::Value(v) => write!(f, "{}", v),
        }
    }
}

impl From<VertexRef> for Item {
    fn from(v: VertexRef) -> Self {
        Item::Vertex(v)
    }
}

impl From<EdgeRef> for Item {
    fn from(e: EdgeRef) -> Self {
        Item::Edge(e)
    }
}

impl From<GraphRef> for Item {
    fn from(g: GraphRef) -> Self {
        Item::Graph(g)
    }
}

impl From<Value> for Item {
    fn from(v: Value) -> Self {
        Item::Value(v)
    }
}

impl From<i64> for Item {
    fn from(n: i64) -> Self {
        Item::Value(Value::from(n))
    }
}

impl From<i32> for Item {
    fn from(n: i32) -> Self {
        Item::Value(Value::from(n))
    }
}

impl From<f64> for Item {
    fn from(n: f64) -> Self {
        Item::Value(Value::from(n))
    }
}

impl From<bool> for Item {
    fn from(b: bool) -> Self {
        Item::Value(Value::from(b))
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Value(Value::from(s))
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::Value(Value::from(s))
    }
}

/// An item decorated with capability extensions, its owning route and graph.
#[derive(Clone)]
pub struct Element {
    item: Item,
    extensions: ExtensionSet,
    back: Option<Route>,
    graph: Option<GraphRef>,
}

impl Element {
    /// Wrap an item with no extensions, route or graph.
    pub fn new(item: Item) -> Self {
        Self {
            item,
            extensions: ExtensionSet::new(),
            back: None,
            graph: None,
        }
    }

    /// Add every extension in `extensions`. Adding a set twice has the same
    /// effect as adding it once.
    pub fn with_extensions(mut self, extensions: &ExtensionSet) -> Self {
        self.add_extensions(extensions);
        self
    }

    pub fn add_extensions(&mut self, extensions: &ExtensionSet) {
        self.extensions.merge(extensions);
    }

    /// Record the route this element is being evaluated for.
    pub fn with_back(mut self, route: Route) -> Self {
        self.back = Some(route);
        self
    }

    /// Associate a graph with the wrapper. The wrapped item is untouched.
    pub fn with_graph(mut self, graph: Option<GraphRef>) -> Self {
        self.graph = graph;
        self
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Unwrap the raw item.
    pub fn into_item(self) -> Item {
        self.item
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    /// The route that produced this element, when evaluated in context.
    pub fn back(&self) -> Option<&Route> {
        self.back.as_ref()
    }

    /// The wrapper's graph, falling back to the item's own.
    pub fn graph(&self) -> Option<&GraphRef> {
        self.graph.as_ref().or_else(|| self.item.graph())
    }

    /// Property lookup that also works for items not yet tagged with a graph.
    pub fn property(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.item.property(name) {
            return Some(value);
        }
        let graph = self.graph()?;
        let key = match &self.item {
            Item::Vertex(v) => ElementKey::Vertex(v.id),
            Item::Edge(e) => ElementKey::Edge(e.id),
            _ => return None,
        };
        graph.properties(key)?.remove(name)
    }

    pub fn responds_to(&self, method: &str) -> bool {
        self.extensions
            .element_method(self.item.kind(), method)
            .is_some()
    }

    /// Call an element capability contributed by one of the extensions.
    pub fn invoke(&self, method: &str, args: &[Item]) -> Result<Item> {
        let f = self
            .extensions
            .element_method(self.item.kind(), method)
            .ok_or_else(|| RouteError::MissingMethod {
                method: method.to_string(),
                target: self.item.to_string(),
            })?;
        f(self, args)
    }
}

impl Deref for Element {
    type Target = Item;

    fn deref(&self) -> &Item {
        &self.item
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("item", &self.item)
            .field("extensions", &self.extensions.names())
            .field("back", &self.back.as_ref().map(Route::describe))
            .finish()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.item, f)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item
    }
}
