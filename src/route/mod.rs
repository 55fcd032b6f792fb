//! Routes: lazy, chainable descriptions of a traversal.
//!
//! A [`Route`] is one link in a chain. It points back at the route it was
//! built from (or holds a terminal [`Source`] if it is a root), names the
//! stage it adds, and carries the extensions its elements pick up. Building
//! a chain does no traversal work; iterating it compiles a fresh pipeline.
//!
//! ```ignore
//! use graphroute::prelude::*;
//!
//! let graph = MemoryGraph::load_json("people.json")?;
//! let adults = graph.v().filter_script("it.age >= 18");
//! for element in adults.elements()? {
//!     println!("{}", element?);
//! }
//! ```

mod inspect;
mod iter;
mod source;

pub use inspect::{write_columns, Inspector};
pub use iter::{Contexts, Elements, Objects, Paths};
pub use source::{resolve_source, Producer, Source};

use crate::element::Item;
use crate::error::{Result, RouteError};
use crate::extension::{AsExtension, Extension, ExtensionSet};
use crate::graph::{ElementKind, GraphRef, GraphStore};
use crate::pipeline::{
    CompiledPipeline, PipelineCompiler, PipelineResult, Predicate, StageArg, StageKind, StageSpec,
};
use crate::vars::Vars;
use parking_lot::RwLock;
use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a route draws from.
#[derive(Clone, Debug, Default)]
pub enum Link {
    /// Nothing set yet.
    #[default]
    Root,
    /// The previous route in the chain.
    Back(Route),
    /// A terminal source; the route is a root.
    Source(Source),
}

impl From<Route> for Link {
    fn from(route: Route) -> Self {
        Link::Back(route)
    }
}

impl From<Source> for Link {
    fn from(source: Source) -> Self {
        Link::Source(source)
    }
}

impl From<GraphRef> for Link {
    fn from(graph: GraphRef) -> Self {
        Link::Source(Source::Graph(graph))
    }
}

struct RouteInner {
    link: RwLock<Link>,
    stage: Option<StageSpec>,
    element_kind: ElementKind,
    graph: RwLock<Option<GraphRef>>,
    extensions: RwLock<ExtensionSet>,
    display_name: Option<String>,
    info: Option<String>,
    hide_elements: AtomicBool,
    vars: Vars,
}

/// One link of a lazy traversal. Cloning is cheap and shares the link.
#[derive(Clone)]
pub struct Route {
    inner: Arc<RouteInner>,
}

/// Builder for [`Route`].
#[derive(Default)]
pub struct RouteBuilder {
    link: Link,
    stage: Option<StageSpec>,
    element_kind: ElementKind,
    graph: Option<GraphRef>,
    extensions: ExtensionSet,
    display_name: Option<String>,
    info: Option<String>,
    hide_elements: bool,
}

impl RouteBuilder {
    pub fn back(mut self, back: Route) -> Self {
        self.link = Link::Back(back);
        self
    }

    pub fn source(mut self, source: impl Into<Source>) -> Self {
        self.link = Link::Source(source.into());
        self
    }

    pub fn stage(mut self, stage: StageSpec) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn element_kind(mut self, kind: ElementKind) -> Self {
        self.element_kind = kind;
        self
    }

    pub fn graph(mut self, graph: GraphRef) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn extensions(mut self, extensions: ExtensionSet) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn info(mut self, info: impl ToString) -> Self {
        self.info = Some(info.to_string());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hide_elements = hidden;
        self
    }

    pub fn build(self) -> Route {
        Route {
            inner: Arc::new(RouteInner {
                link: RwLock::new(self.link),
                stage: self.stage,
                element_kind: self.element_kind,
                graph: RwLock::new(self.graph),
                extensions: RwLock::new(self.extensions),
                display_name: self.display_name,
                info: self.info,
                hide_elements: AtomicBool::new(self.hide_elements),
                vars: Vars::new(),
            }),
        }
    }
}

impl Route {
    pub fn builder() -> RouteBuilder {
        RouteBuilder::default()
    }

    /// Root route over a fixed list of values.
    pub fn from_items<I, T>(items: I) -> Route
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        Route::builder().source(Source::items(items)).build()
    }

    /// Root route over the given vertices, loaded when iteration starts.
    /// Ids the graph does not know are skipped.
    pub fn from_vertex_ids(graph: GraphRef, ids: Vec<crate::graph::VertexId>) -> Route {
        let count = ids.len();
        let loader = graph.clone();
        Route::builder()
            .source(Source::deferred(move || {
                Source::Items(Arc::new(loader.load_vertices(&ids)))
            }))
            .graph(graph)
            .element_kind(ElementKind::Vertex)
            .info(count)
            .build()
    }

    /// Root route over the given edges, loaded when iteration starts.
    pub fn from_edge_ids(graph: GraphRef, ids: Vec<crate::graph::EdgeId>) -> Route {
        let count = ids.len();
        let loader = graph.clone();
        Route::builder()
            .source(Source::deferred(move || {
                Source::Items(Arc::new(loader.load_edges(&ids)))
            }))
            .graph(graph)
            .element_kind(ElementKind::Edge)
            .info(count)
            .build()
    }

    // ===== Chain and graph resolution =====

    /// The link this route draws from.
    pub fn link(&self) -> Link {
        self.inner.link.read().clone()
    }

    /// The explicit graph, else whatever the back route or source resolves.
    pub fn graph(&self) -> Option<GraphRef> {
        if let Some(graph) = self.inner.graph.read().as_ref() {
            return Some(graph.clone());
        }
        match &*self.inner.link.read() {
            Link::Back(back) => back.graph(),
            Link::Source(source) => source.graph(),
            Link::Root => None,
        }
    }

    pub fn set_graph(&self, graph: GraphRef) -> &Self {
        *self.inner.graph.write() = Some(graph);
        self
    }

    /// Whether `graph` is the graph this route operates on.
    pub fn from_graph(&self, graph: &GraphRef) -> bool {
        self.graph().is_some_and(|g| g.same(graph))
    }

    /// A route is a root if it has a source or nothing behind it.
    pub fn is_root(&self) -> bool {
        !matches!(&*self.inner.link.read(), Link::Back(_))
    }

    pub fn back(&self) -> Option<Route> {
        match &*self.inner.link.read() {
            Link::Back(back) => Some(back.clone()),
            _ => None,
        }
    }

    /// This link's own source, if it is a root with one.
    pub fn source(&self) -> Option<Source> {
        match &*self.inner.link.read() {
            Link::Source(source) => Some(source.clone()),
            _ => None,
        }
    }

    /// Make this route a root drawing from `source`. Drops the back route.
    pub fn set_source(&self, source: impl Into<Source>) -> &Self {
        *self.inner.link.write() = Link::Source(source.into());
        self
    }

    /// Routes become the back route; anything else becomes the source.
    pub fn set_back(&self, back: impl Into<Link>) -> &Self {
        *self.inner.link.write() = back.into();
        self
    }

    /// Replace the source at the root of the chain.
    pub fn set_root_source(&self, source: impl Into<Source>) -> &Self {
        match self.back() {
            Some(back) => {
                back.set_root_source(source);
            }
            None => {
                self.set_source(source);
            }
        }
        self
    }

    /// The first route of the chain.
    pub fn root(&self) -> Route {
        let mut current = self.clone();
        while let Some(back) = current.back() {
            current = back;
        }
        current
    }

    /// Whether the chain's root has something to iterate.
    pub fn has_source(&self) -> bool {
        match self.root().source() {
            Some(source) => !source.is_null(),
            None => false,
        }
    }

    /// The route in this chain attached directly after `other`.
    pub fn route_after(&self, other: &Route) -> Option<Route> {
        if self.same(other) {
            return None;
        }
        let back = self.back()?;
        if back.same(other) {
            Some(self.clone())
        } else {
            back.route_after(other)
        }
    }

    /// Identity comparison.
    pub fn same(&self, other: &Route) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn stage(&self) -> Option<&StageSpec> {
        self.inner.stage.as_ref()
    }

    pub fn element_kind(&self) -> ElementKind {
        self.inner.element_kind
    }

    pub fn display_name(&self) -> Option<&str> {
        self.inner.display_name.as_deref()
    }

    pub fn info(&self) -> Option<&str> {
        self.inner.info.as_deref()
    }

    /// Shared variables for the evaluation in progress. Every link of a
    /// chain hands out the root's map.
    pub fn vars(&self) -> Vars {
        match self.back() {
            Some(back) => back.vars(),
            None => self.inner.vars.clone(),
        }
    }

    /// Stop the inspector from evaluating this route.
    pub fn hide(&self) -> &Self {
        self.inner.hide_elements.store(true, Ordering::Relaxed);
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.hide_elements.load(Ordering::Relaxed)
    }

    // ===== Extensions =====

    pub fn extensions(&self) -> ExtensionSet {
        self.inner.extensions.read().clone()
    }

    /// Record an extension. Modules declaring no capabilities are ignored.
    pub fn add_extension(&self, extension: Arc<Extension>) -> &Self {
        if extension.capabilities().is_empty() {
            tracing::trace!("Ignoring extension {} with no capabilities", extension.name());
            return self;
        }
        self.inner.extensions.write().insert(extension);
        self
    }

    /// Add every entry that is an extension; other entries are skipped.
    pub fn add_extensions<I>(&self, entries: I) -> &Self
    where
        I: IntoIterator,
        I::Item: AsExtension,
    {
        for extension in entries.into_iter().filter_map(|e| e.as_extension()) {
            self.add_extension(extension);
        }
        self
    }

    pub fn responds_to(&self, method: &str) -> bool {
        self.inner.extensions.read().route_method(method).is_some()
    }

    /// Call a route capability contributed by one of the extensions.
    pub fn invoke(&self, method: &str, args: &[Item]) -> Result<Item> {
        let f = self
            .inner
            .extensions
            .read()
            .route_method(method)
            .cloned()
            .ok_or_else(|| RouteError::MissingMethod {
                method: method.to_string(),
                target: self.describe(),
            })?;
        f(self, args)
    }

    // ===== Compilation and description =====

    /// Build a fresh pipeline for this route.
    pub fn compile(&self) -> PipelineResult<CompiledPipeline> {
        PipelineCompiler::compile(self)
    }

    /// How this link renders in a description.
    pub fn inspect_string(&self) -> String {
        if let Some(name) = &self.inner.display_name {
            return name.clone();
        }
        let mut s = self.element_kind().label().to_string();
        if let Some(info) = &self.inner.info {
            s = format!("{} {}", s, info);
        }
        if let Some(spec) = &self.inner.stage {
            let args = spec.render_args();
            let rendered = if spec.kind.is_filter() {
                if args.is_empty() {
                    spec.kind.short_name().to_string()
                } else {
                    format!("{}({})", spec.kind.short_name(), args)
                }
            } else {
                args
            };
            if !rendered.is_empty() {
                s = format!("{}({})", s, rendered);
            }
        }
        s
    }

    /// One string per link, root first.
    pub fn inspect_strings(&self) -> Vec<String> {
        let mut strings = match self.back() {
            Some(back) => back.inspect_strings(),
            None => Vec::new(),
        };
        strings.push(self.inspect_string());
        strings
    }

    /// The chain description, e.g. `#<V -> V(Block(adult)) -> E(OutE)>`.
    pub fn describe(&self) -> String {
        format!("#<{}>", self.inspect_strings().join(" -> "))
    }

    /// Print a preview of the matches to stdout using the installed
    /// settings, and return the description.
    pub fn inspect(&self, limit: Option<usize>) -> Result<String> {
        let settings = &crate::config::current().inspect;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        Inspector::new(settings).inspect(self, limit, &mut out)
    }

    // ===== Chain building =====

    fn chain(&self, kind: ElementKind, stage: StageSpec) -> Route {
        Route::builder()
            .back(self.clone())
            .stage(stage)
            .element_kind(kind)
            .extensions(self.extensions())
            .build()
    }

    /// Append any stage.
    pub fn pipe(&self, kind: StageKind, args: Vec<StageArg>) -> Route {
        self.chain(self.element_kind(), StageSpec::new(kind, args))
    }

    /// Keep elements for which `f` returns true.
    pub fn filter<F>(&self, f: F) -> Route
    where
        F: Fn(&crate::element::Element) -> bool + Send + Sync + 'static,
    {
        self.filter_with(Predicate::new(f))
    }

    pub fn filter_with(&self, predicate: Predicate) -> Route {
        self.pipe(StageKind::BlockFilter, vec![StageArg::Predicate(predicate)])
    }

    /// Keep elements for which a Rhai expression over `it` is true.
    pub fn filter_script(&self, expression: &str) -> Route {
        self.pipe(StageKind::ScriptFilter, vec![StageArg::from(expression)])
    }

    /// Keep the matches at the given positions.
    pub fn range<R: RangeBounds<usize>>(&self, bounds: R) -> Route {
        let (low, high) = range_args(&bounds);
        self.pipe(
            StageKind::RangeFilter,
            vec![StageArg::Int(low), StageArg::Int(high)],
        )
    }

    /// Keep only the match at `index`.
    pub fn at(&self, index: usize) -> Route {
        self.range(index..=index)
    }

    pub fn uniq(&self) -> Route {
        self.pipe(StageKind::DuplicateFilter, Vec::new())
    }

    /// Keep each match with probability `bias`.
    pub fn random(&self, bias: f64) -> Route {
        self.pipe(StageKind::RandomFilter, vec![StageArg::Float(bias)])
    }

    pub fn random_seeded(&self, bias: f64, seed: u64) -> Route {
        self.pipe(
            StageKind::RandomFilter,
            vec![StageArg::Float(bias), StageArg::Int(seed as i64)],
        )
    }

    fn edges(&self, kind: StageKind, labels: &[&str]) -> Route {
        let route = self.chain(ElementKind::Edge, StageSpec::bare(kind));
        if labels.is_empty() {
            route
        } else {
            route.labels(labels)
        }
    }

    /// Outgoing edges, optionally restricted to `labels`.
    pub fn out_e(&self, labels: &[&str]) -> Route {
        self.edges(StageKind::OutEdges, labels)
    }

    pub fn in_e(&self, labels: &[&str]) -> Route {
        self.edges(StageKind::InEdges, labels)
    }

    pub fn both_e(&self, labels: &[&str]) -> Route {
        self.edges(StageKind::BothEdges, labels)
    }

    /// The vertex each edge leaves from.
    pub fn out_v(&self) -> Route {
        self.chain(ElementKind::Vertex, StageSpec::bare(StageKind::OutVertex))
    }

    /// The vertex each edge arrives at.
    pub fn in_v(&self) -> Route {
        self.chain(ElementKind::Vertex, StageSpec::bare(StageKind::InVertex))
    }

    pub fn both_v(&self) -> Route {
        self.chain(ElementKind::Vertex, StageSpec::bare(StageKind::BothVertices))
    }

    /// Keep edges carrying one of `labels`.
    pub fn labels(&self, labels: &[&str]) -> Route {
        self.pipe(
            StageKind::LabelFilter,
            labels.iter().map(|l| StageArg::from(*l)).collect(),
        )
    }

    /// Vertices of every graph this route yields.
    pub fn v(&self) -> Route {
        self.chain(ElementKind::Vertex, StageSpec::bare(StageKind::GraphVertices))
    }

    /// Edges of every graph this route yields.
    pub fn e(&self) -> Route {
        self.chain(ElementKind::Edge, StageSpec::bare(StageKind::GraphEdges))
    }
}

/// Lower and upper position for a range stage; `-1` leaves the top open.
/// Positions past `i64::MAX` are unreachable, so an oversized start keeps
/// nothing and an oversized end is open.
fn range_args<R: RangeBounds<usize>>(bounds: &R) -> (i64, i64) {
    let position = |n: usize| i64::try_from(n).ok();
    let low = match bounds.start_bound() {
        Bound::Included(&n) => position(n).unwrap_or(i64::MAX),
        Bound::Excluded(&n) => position(n)
            .and_then(|n| n.checked_add(1))
            .unwrap_or(i64::MAX),
        Bound::Unbounded => 0,
    };
    let high = match bounds.end_bound() {
        Bound::Included(&n) => position(n).unwrap_or(-1),
        // `..0` keeps nothing
        Bound::Excluded(0) => return (low.max(1), 0),
        Bound::Excluded(&n) => position(n).map_or(-1, |n| n - 1),
        Bound::Unbounded => -1,
    };
    (low, high)
}

impl PartialEq for Route {
    /// Same stage kind, same graph and the same description. Anonymous
    /// predicates only match themselves.
    fn eq(&self, other: &Self) -> bool {
        self.stage().map(|s| &s.kind) == other.stage().map(|s| &s.kind)
            && self.graph() == other.graph()
            && self.inspect_strings() == other.inspect_strings()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Route({})", self.describe())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Entry points for routes over a graph.
pub trait GraphRoutes {
    /// A route yielding the graph itself.
    fn route(&self) -> Route;

    /// Every vertex of the graph.
    fn v(&self) -> Route;

    /// Every edge of the graph.
    fn e(&self) -> Route;
}

impl GraphRoutes for GraphRef {
    fn route(&self) -> Route {
        Route::builder()
            .source(self.clone())
            .graph(self.clone())
            .element_kind(ElementKind::Graph)
            .build()
    }

    fn v(&self) -> Route {
        Route::builder()
            .source(self.clone())
            .graph(self.clone())
            .stage(StageSpec::bare(StageKind::GraphVertices))
            .element_kind(ElementKind::Vertex)
            .build()
    }

    fn e(&self) -> Route {
        Route::builder()
            .source(self.clone())
            .graph(self.clone())
            .stage(StageSpec::bare(StageKind::GraphEdges))
            .element_kind(ElementKind::Edge)
            .build()
    }
}

impl<G: GraphStore + 'static> GraphRoutes for Arc<G> {
    fn route(&self) -> Route {
        GraphRef::new(self).route()
    }

    fn v(&self) -> Route {
        GraphRef::new(self).v()
    }

    fn e(&self) -> Route {
        GraphRef::new(self).e()
    }
}
