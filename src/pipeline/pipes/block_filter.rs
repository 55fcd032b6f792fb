//! Predicate filter.
//!
//! Candidates of a graph element kind are handed to the predicate wrapped in
//! an [`Element`] that carries the route's extensions, the filter-context
//! marker, the owning route and the graph. Anything else is handed over bare.
//! Accepted candidates are emitted unwrapped.

use crate::element::{Element, Item};
use crate::extension::{filter_context, ExtensionSet};
use crate::graph::GraphRef;
use crate::pipeline::error::{Exhausted, PipelineError, PipelineResult};
use crate::pipeline::pipe::{Pipe, Upstream};
use crate::pipeline::stage::Predicate;
use crate::route::Route;

pub struct BlockFilterPipe {
    upstream: Upstream,
    back: Route,
    predicate: Predicate,
    graph: Option<GraphRef>,
    extensions: ExtensionSet,
    is_element: bool,
}

impl BlockFilterPipe {
    pub fn new(back: &Route, predicate: Predicate) -> Self {
        let graph = back.graph();
        let mut extensions = back.extensions();
        extensions.insert(filter_context());
        let is_element = graph
            .as_ref()
            .is_some_and(|g| g.is_element_kind(back.element_kind()));

        Self {
            upstream: Upstream::default(),
            back: back.clone(),
            predicate,
            graph,
            extensions,
            is_element,
        }
    }

    fn wrap(&self, candidate: &Item) -> Element {
        if self.is_element {
            Element::new(candidate.clone())
                .with_extensions(&self.extensions)
                .with_back(self.back.clone())
                .with_graph(self.graph.clone())
        } else {
            Element::new(candidate.clone())
        }
    }
}

impl Pipe for BlockFilterPipe {
    fn name(&self) -> &str {
        "BlockFilter"
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
        while let Some(candidate) = self.upstream.pull("BlockFilter")? {
            let element = self.wrap(&candidate);
            match self.predicate.call(&element) {
                Ok(true) => return Ok(Some(candidate)),
                Ok(false) => continue,
                Err(err) if err.is::<Exhausted>() => {
                    tracing::trace!("predicate {} ended iteration", self.predicate.label());
                    return Ok(None);
                }
                Err(source) => {
                    return Err(PipelineError::Execution {
                        stage: format!("BlockFilter({})", self.predicate.label()),
                        source,
                    })
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::VertexRef;
    use crate::extension::FILTER_CONTEXT;
    use crate::graph::{ElementKind, MemoryGraph, Properties};
    use crate::route::GraphRoutes;
    use crate::pipeline::pipes::IterPipe;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn numbers(values: &[i64]) -> Vec<Item> {
        values.iter().copied().map(Item::from).collect()
    }

    fn filter_over(items: Vec<Item>, predicate: Predicate) -> BlockFilterPipe {
        let route = Route::from_items(Vec::<Item>::new());
        let mut pipe = BlockFilterPipe::new(&route, predicate);
        pipe.set_upstream(Box::new(IterPipe::from_items(items)));
        pipe
    }

    fn drain(pipe: &mut dyn Pipe) -> Vec<Item> {
        let mut out = Vec::new();
        while let Some(item) = pipe.next_match().unwrap() {
            out.push(item);
        }
        out
    }

    #[test]
    fn test_even_predicate() {
        let even = Predicate::new(|e| e.as_i64().is_some_and(|n| n % 2 == 0));
        let mut pipe = filter_over(numbers(&[1, 2, 3, 4]), even);
        assert_eq!(pipe.next_match().unwrap(), Some(Item::from(2)));
        assert_eq!(pipe.next_match().unwrap(), Some(Item::from(4)));
        assert_eq!(pipe.next_match().unwrap(), None);
    }

    #[test]
    fn test_always_false_is_immediately_exhausted() {
        let mut pipe = filter_over(numbers(&[1, 2, 3, 4]), Predicate::new(|_| false));
        assert_eq!(pipe.next_match().unwrap(), None);
    }

    #[test]
    fn test_exhausted_marker_ends_iteration() {
        let stop_at_three = Predicate::try_new(|e| match e.as_i64() {
            Some(3) => Err(Exhausted.into()),
            _ => Ok(true),
        });
        let mut pipe = filter_over(numbers(&[1, 2, 3, 4]), stop_at_three);
        assert_eq!(drain(&mut pipe), numbers(&[1, 2]));
    }

    #[test]
    fn test_predicate_error_names_stage() {
        let failing = Predicate::try_new(|_| Err("boom".into())).named("explode");
        let mut pipe = filter_over(numbers(&[1]), failing);
        let err = pipe.next_match().unwrap_err();
        assert_eq!(err.stage(), "BlockFilter(explode)");
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_no_upstream_fails_loudly() {
        let route = Route::from_items(Vec::<Item>::new());
        let mut pipe = BlockFilterPipe::new(&route, Predicate::new(|_| true));
        assert!(matches!(
            pipe.next_match(),
            Err(PipelineError::NoInput { .. })
        ));
    }

    #[test]
    fn test_graph_elements_are_wrapped_in_context() {
        let graph = MemoryGraph::new("people");
        graph.add_vertex(Properties::new());
        let route = graph.v();
        assert_eq!(route.element_kind(), ElementKind::Vertex);

        let saw_context = Arc::new(AtomicBool::new(false));
        let flag = saw_context.clone();
        let expected = route.clone();
        let predicate = Predicate::new(move |e| {
            let in_context = e.has_extension(FILTER_CONTEXT)
                && e.back().is_some_and(|back| back.same(&expected))
                && e.graph().is_some();
            flag.store(in_context, Ordering::SeqCst);
            true
        });

        let mut pipe = BlockFilterPipe::new(&route, predicate);
        pipe.set_upstream(Box::new(IterPipe::once(Item::Vertex(VertexRef::new(
            crate::graph::VertexId(0),
        )))));
        let emitted = pipe.next_match().unwrap().unwrap();
        assert!(saw_context.load(Ordering::SeqCst));
        // the emitted value is the raw candidate, not the wrapper's graph view
        assert!(emitted.graph().is_none());
    }

    #[test]
    fn test_plain_values_are_passed_bare() {
        let saw_bare = Arc::new(AtomicBool::new(false));
        let flag = saw_bare.clone();
        let predicate = Predicate::new(move |e| {
            flag.store(e.extensions().is_empty() && e.back().is_none(), Ordering::SeqCst);
            true
        });
        let mut pipe = filter_over(numbers(&[7]), predicate);
        pipe.next_match().unwrap();
        assert!(saw_bare.load(Ordering::SeqCst));
    }

    proptest! {
        #[test]
        fn test_matches_std_filter(values in prop::collection::vec(-1000i64..1000, 0..64)) {
            let even = Predicate::new(|e| e.as_i64().is_some_and(|n| n % 2 == 0));
            let mut pipe = filter_over(numbers(&values), even);
            let expected: Vec<Item> = values.iter().copied().filter(|n| n % 2 == 0).map(Item::from).collect();
            prop_assert_eq!(drain(&mut pipe), expected);
        }
    }
}
