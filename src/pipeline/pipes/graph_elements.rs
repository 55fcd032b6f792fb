//! Expands a graph into its vertices or edges.

use crate::element::Item;
use crate::graph::{ElementKey, GraphRef};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::pipe::{PathTracker, Pipe, Upstream};
use std::collections::VecDeque;

/// For each upstream graph, yields its vertices (or edges) one at a time.
/// Only the id list is read up front; each element is looked up when it is
/// pulled, so elements removed in the meantime are skipped.
pub struct GraphElementsPipe {
    upstream: Upstream,
    edges: bool,
    current: Option<(GraphRef, VecDeque<ElementKey>)>,
    path: PathTracker,
}

impl GraphElementsPipe {
    pub fn vertices() -> Self {
        Self::new(false)
    }

    pub fn edges() -> Self {
        Self::new(true)
    }

    fn new(edges: bool) -> Self {
        Self {
            upstream: Upstream::default(),
            edges,
            current: None,
            path: PathTracker::default(),
        }
    }

    fn stage_name(&self) -> &'static str {
        if self.edges {
            "GraphEdges"
        } else {
            "GraphVertices"
        }
    }

    fn keys_of(&self, graph: &GraphRef) -> VecDeque<ElementKey> {
        let Some(store) = graph.upgrade() else {
            return VecDeque::new();
        };
        if self.edges {
            store.edge_ids().into_iter().map(ElementKey::Edge).collect()
        } else {
            store.vertex_ids().into_iter().map(ElementKey::Vertex).collect()
        }
    }

    fn next_from_current(&mut self) -> Option<Item> {
        let (graph, keys) = self.current.as_mut()?;
        while let Some(key) = keys.pop_front() {
            let item = match key {
                ElementKey::Vertex(id) => graph.vertex(id).map(Item::Vertex),
                ElementKey::Edge(id) => graph.edge(id).map(Item::Edge),
            };
            if item.is_some() {
                return item;
            }
        }
        None
    }
}

impl Pipe for GraphElementsPipe {
    fn name(&self) -> &str {
        self.stage_name()
    }

    fn set_upstream(&mut self, upstream: Box<dyn Pipe>) {
        self.upstream.set(upstream);
    }

    fn upstream(&self) -> Option<&(dyn Pipe + 'static)> {
        self.upstream.get()
    }

    fn upstream_mut(&mut self) -> Option<&mut (dyn Pipe + 'static)> {
        self.upstream.get_mut()
    }

    fn next_match(&mut self) -> PipelineResult<Option<Item>> {
        loop {
            if let Some(item) = self.next_from_current() {
                self.path.record(&item);
                return Ok(Some(item));
            }
            self.current = None;
            let Some(input) = self.upstream.pull(self.stage_name())? else {
                return Ok(None);
            };
            match input {
                Item::Graph(graph) => {
                    let keys = self.keys_of(&graph);
                    self.current = Some((graph, keys));
                }
                other => tracing::trace!("{} skipping {}", self.stage_name(), other),
            }
        }
    }

    fn enable_path(&mut self) {
        self.path.enable();
        if let Some(upstream) = self.upstream.get_mut() {
            upstream.enable_path();
        }
    }

    fn path(&self) -> Vec<Item> {
        self.path.extend(self.upstream.path())
    }
}
