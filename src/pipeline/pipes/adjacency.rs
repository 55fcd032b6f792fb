//! Adjacency steps: vertex to edges and edge to vertices.

use crate::element::{Item, VertexRef};
use crate::graph::GraphRef;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::pipe::{PathTracker, Pipe, Upstream};
use crate::pipeline::stage::Direction;
use std::collections::VecDeque;

/// What an adjacency step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Vertex in, incident edges out
    Edges,
    /// Edge in, endpoint vertices out
    Vertices,
}

/// Expands each upstream value into its neighbours. Values of the wrong
/// kind have no neighbours and are skipped.
pub struct AdjacencyPipe {
    upstream: Upstream,
    direction: Direction,
    step: Step,
    fallback_graph: Option<GraphRef>,
    pending: VecDeque<Item>,
    path: PathTracker,
}

impl AdjacencyPipe {
    pub fn new(direction: Direction, step: Step) -> Self {
        Self {
            upstream: Upstream::default(),
            direction,
            step,
            fallback_graph: None,
            pending: VecDeque::new(),
            path: PathTracker::default(),
        }
    }

    /// Graph used for values that are not tagged with one.
    pub fn with_graph(mut self, graph: Option<GraphRef>) -> Self {
        self.fallback_graph = graph;
        self
    }

    fn stage_name(&self) -> &'static str {
        match (self.step, self.direction) {
            (Step::Edges, Direction::Out) => "OutE",
            (Step::Edges, Direction::In) => "InE",
            (Step::Edges, Direction::Both) => "BothE",
            (Step::Vertices, Direction::Out) => "OutV",
            (Step::Vertices, Direction::In) => "InV",
            (Step::Vertices, Direction::Both) => "BothV",
        }
    }

    fn expand(&self, item: &Item) -> PipelineResult<Vec<Item>> {
        match (self.step, item) {
            (Step::Edges, Item::Vertex(vertex)) => {
                let graph = vertex
                    .graph
                    .as_ref()
                    .or(self.fallback_graph.as_ref())
                    .ok_or_else(|| PipelineError::GraphUnavailable {
                        stage: self.stage_name().to_string(),
                    })?;
                let Some(store) = graph.upgrade() else {
                    return Ok(Vec::new());
                };
                let mut ids = Vec::new();
                if matches!(self.direction, Direction::Out | Direction::Both) {
                    ids.extend(store.out_edges(vertex.id));
                }
                if matches!(self.direction, Direction::In | Direction::Both) {
                    ids.extend(store.in_edges(vertex.id));
                }
                Ok(graph.load_edges(&ids))
            }
            (Step::Vertices, Item::Edge(edge)) => {
                let graph = edge.graph.as_ref().or(self.fallback_graph.as_ref());
                let ids = match self.direction {
                    Direction::Out => vec![edge.out_v],
                    Direction::In => vec![edge.in_v],
                    Direction::Both => vec![edge.out_v, edge.in_v],
                };
                Ok(ids
                    .into_iter()
                    .map(|id| {
                        let vertex = VertexRef::new(id);
                        Item::Vertex(match graph {
                            Some(g) => vertex.with_graph(g.clone()),
                            None => vertex,
                        })
                    })
                    .collect())
            }
            _ => {
                tracing::trace!("{} skipping {}", self.stage_name(), item);
                Ok(Vec::new())
            }
        }
    }
}

impl Pipe for AdjacencyPipe {
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
            if let Some(item) = self.pending.pop_front() {
                self.path.record(&item);
                return Ok(Some(item));
            }
            let Some(input) = self.upstream.pull(self.stage_name())? else {
                return Ok(None);
            };
            self.pending.extend(self.expand(&input)?);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, Properties, VertexId};
    use crate::pipeline::pipes::IterPipe;

    fn triangle() -> std::sync::Arc<MemoryGraph> {
        let graph = MemoryGraph::new("triangle");
        let a = graph.add_vertex(Properties::new());
        let b = graph.add_vertex(Properties::new());
        let c = graph.add_vertex(Properties::new());
        graph.add_edge(a, b, "knows", Properties::new()).unwrap();
        graph.add_edge(b, c, "knows", Properties::new()).unwrap();
        graph.add_edge(c, a, "likes", Properties::new()).unwrap();
        graph
    }

    fn drain(pipe: &mut AdjacencyPipe) -> Vec<Item> {
        let mut out = Vec::new();
        while let Some(item) = pipe.next_match().unwrap() {
            out.push(item);
        }
        out
    }

    #[test]
    fn test_out_edges_of_tagged_vertex() {
        let graph = triangle();
        let start = graph.vertex(VertexId(1)).unwrap();
        let mut pipe = AdjacencyPipe::new(Direction::Out, Step::Edges);
        pipe.set_upstream(Box::new(IterPipe::once(Item::Vertex(start))));
        let edges = drain(&mut pipe);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].as_edge().unwrap().in_v, VertexId(2));
    }

    #[test]
    fn test_both_edges() {
        let graph = triangle();
        let start = graph.vertex(VertexId(0)).unwrap();
        let mut pipe = AdjacencyPipe::new(Direction::Both, Step::Edges);
        pipe.set_upstream(Box::new(IterPipe::once(Item::Vertex(start))));
        assert_eq!(drain(&mut pipe).len(), 2);
    }

    #[test]
    fn test_untagged_vertex_uses_fallback_graph() {
        let graph = triangle();
        let mut pipe = AdjacencyPipe::new(Direction::In, Step::Edges)
            .with_graph(Some(GraphRef::new(&graph)));
        pipe.set_upstream(Box::new(IterPipe::once(Item::Vertex(VertexRef::new(VertexId(0))))));
        let edges = drain(&mut pipe);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].as_edge().unwrap().label, "likes");
    }

    #[test]
    fn test_untagged_vertex_without_graph_fails() {
        let mut pipe = AdjacencyPipe::new(Direction::Out, Step::Edges);
        pipe.set_upstream(Box::new(IterPipe::once(Item::Vertex(VertexRef::new(VertexId(0))))));
        assert!(matches!(
            pipe.next_match(),
            Err(PipelineError::GraphUnavailable { .. })
        ));
    }

    #[test]
    fn test_edge_endpoints_and_path() {
        let graph = triangle();
        let edge = graph.edge(crate::graph::EdgeId(0)).unwrap();
        let mut pipe = AdjacencyPipe::new(Direction::Both, Step::Vertices);
        pipe.set_upstream(Box::new(IterPipe::once(Item::Edge(edge.clone()))));
        pipe.enable_path();

        let first = pipe.next_match().unwrap().unwrap();
        assert_eq!(first.as_vertex().unwrap().id, VertexId(0));
        assert_eq!(pipe.path(), vec![Item::Edge(edge.clone()), first]);
        let second = pipe.next_match().unwrap().unwrap();
        assert_eq!(second.as_vertex().unwrap().id, VertexId(1));
        assert_eq!(pipe.next_match().unwrap(), None);
    }

    #[test]
    fn test_wrong_kind_is_skipped() {
        let mut pipe = AdjacencyPipe::new(Direction::Out, Step::Vertices);
        pipe.set_upstream(Box::new(IterPipe::once(Item::from(3))));
        assert!(drain(&mut pipe).is_empty());
    }
}
