//! Iteration surface.
//!
//! Every entry point compiles the route afresh, so two calls never share
//! state. Exhaustion ends the sequence; any other pipeline failure is
//! yielded once as an error and then the sequence ends.

use super::Route;
use crate::element::{Element, Item};
use crate::error::Result;
use crate::extension::{filter_context, ExtensionSet};
use crate::graph::GraphRef;
use crate::pipeline::CompiledPipeline;

struct Cursor {
    pipeline: CompiledPipeline,
    done: bool,
}

impl Cursor {
    fn new(pipeline: CompiledPipeline) -> Self {
        Self {
            pipeline,
            done: false,
        }
    }

    fn advance(&mut self) -> Option<Result<Item>> {
        if self.done {
            return None;
        }
        match self.pipeline.next_match() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err.into()))
            }
        }
    }
}

/// Matches wrapped with the route's extensions and tagged with its graph.
pub struct Elements {
    cursor: Cursor,
    graph: Option<GraphRef>,
    extensions: ExtensionSet,
}

impl Iterator for Elements {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.cursor.advance()?;
        Some(next.map(|mut item| {
            if !item.supports_graph() {
                return Element::new(item);
            }
            if let Some(graph) = &self.graph {
                item.attach_graph(graph);
            }
            Element::new(item).with_extensions(&self.extensions)
        }))
    }
}

/// For each match, the values the pipeline went through to produce it.
pub struct Paths {
    cursor: Cursor,
    graph: Option<GraphRef>,
}

impl Iterator for Paths {
    type Item = Result<Vec<Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = self.cursor.advance()? {
            return Some(Err(err));
        }
        let mut path = self.cursor.pipeline.path();
        if let Some(graph) = &self.graph {
            for item in &mut path {
                item.attach_graph(graph);
            }
        }
        Some(Ok(path))
    }
}

/// Matches wrapped the way a filter predicate sees them.
pub struct Contexts {
    cursor: Cursor,
    route: Route,
    graph: Option<GraphRef>,
    extensions: ExtensionSet,
}

impl Iterator for Contexts {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.cursor.advance()?;
        Some(next.map(|item| {
            Element::new(item)
                .with_extensions(&self.extensions)
                .with_back(self.route.clone())
                .with_graph(self.graph.clone())
        }))
    }
}

/// Raw matches.
pub struct Objects {
    cursor: Cursor,
}

impl Iterator for Objects {
    type Item = Result<Item>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.advance()
    }
}

impl Route {
    /// Clear the chain's vars and build a fresh pipeline.
    fn start(&self) -> Result<CompiledPipeline> {
        self.vars().reset();
        Ok(self.compile()?)
    }

    pub fn elements(&self) -> Result<Elements> {
        Ok(Elements {
            cursor: Cursor::new(self.start()?),
            graph: self.graph(),
            extensions: self.extensions(),
        })
    }

    pub fn paths(&self) -> Result<Paths> {
        let mut pipeline = self.start()?;
        pipeline.enable_path();
        Ok(Paths {
            cursor: Cursor::new(pipeline),
            graph: self.graph(),
        })
    }

    pub fn contexts(&self) -> Result<Contexts> {
        let mut extensions = self.extensions();
        extensions.insert(filter_context());
        Ok(Contexts {
            cursor: Cursor::new(self.start()?),
            route: self.clone(),
            graph: self.graph(),
            extensions,
        })
    }

    pub fn objects(&self) -> Result<Objects> {
        Ok(Objects {
            cursor: Cursor::new(self.start()?),
        })
    }

    /// Feed every element to `f`, then hand the route back for chaining.
    pub fn each_element<F: FnMut(Element)>(&self, mut f: F) -> Result<&Route> {
        for element in self.elements()? {
            f(element?);
        }
        Ok(self)
    }

    pub fn each_path<F: FnMut(Vec<Item>)>(&self, mut f: F) -> Result<&Route> {
        for path in self.paths()? {
            f(path?);
        }
        Ok(self)
    }

    pub fn each_context<F: FnMut(Element)>(&self, mut f: F) -> Result<&Route> {
        for element in self.contexts()? {
            f(element?);
        }
        Ok(self)
    }

    pub fn each_object<F: FnMut(Item)>(&self, mut f: F) -> Result<&Route> {
        for item in self.objects()? {
            f(item?);
        }
        Ok(self)
    }

    /// Every element, collected.
    pub fn to_vec(&self) -> Result<Vec<Element>> {
        self.elements()?.collect()
    }

    /// Every raw match, collected.
    pub fn items(&self) -> Result<Vec<Item>> {
        self.objects()?.collect()
    }

    pub fn count(&self) -> Result<usize> {
        let mut count = 0;
        for item in self.objects()? {
            item?;
            count += 1;
        }
        Ok(count)
    }

    /// Whether the route has no matches. Pulls at most one.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.first()?.is_none())
    }

    pub fn first(&self) -> Result<Option<Element>> {
        self.elements()?.next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{Extension, FILTER_CONTEXT};
    use crate::graph::{MemoryGraph, Properties};
    use crate::pipeline::{Predicate, PipelineError};
    use crate::route::GraphRoutes;
    use std::sync::Arc;

    fn chain() -> Arc<MemoryGraph> {
        let graph = MemoryGraph::new("chain");
        let a = graph.add_vertex(Properties::new());
        let b = graph.add_vertex(Properties::new());
        let c = graph.add_vertex(Properties::new());
        graph.add_edge(a, b, "next", Properties::new()).unwrap();
        graph.add_edge(b, c, "next", Properties::new()).unwrap();
        graph
    }

    fn tagged() -> Arc<Extension> {
        Extension::builder("tagged")
            .vertex("tag", |_, _| Ok(Item::from("v")))
            .build()
    }

    #[test]
    fn test_elements_attach_graph_and_extensions() {
        let graph = chain();
        let route = graph.v();
        route.add_extension(tagged());
        let elements = route.to_vec().unwrap();
        assert_eq!(elements.len(), 3);
        for element in &elements {
            assert_eq!(element.item().graph(), Some(&GraphRef::new(&graph)));
            assert_eq!(element.invoke("tag", &[]).unwrap(), Item::from("v"));
            assert!(!element.has_extension(FILTER_CONTEXT));
        }
    }

    #[test]
    fn test_plain_values_are_not_extended() {
        let route = Route::from_items([1, 2]);
        route.add_extension(tagged());
        for element in route.elements().unwrap() {
            assert!(element.unwrap().extensions().is_empty());
        }
    }

    #[test]
    fn test_objects_are_raw() {
        let graph = chain();
        let vertices = Route::from_items(graph.v().items().unwrap());
        let items = vertices.items().unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item.as_vertex().is_some()));
    }

    #[test]
    fn test_contexts_carry_route_and_marker() {
        let graph = chain();
        let route = graph.v().out_e(&[]);
        let contexts: Vec<Element> = route.contexts().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(contexts.len(), 2);
        for element in contexts {
            assert!(element.has_extension(FILTER_CONTEXT));
            assert!(element.back().unwrap().same(&route));
            assert_eq!(element.graph(), Some(&GraphRef::new(&graph)));
        }
    }

    #[test]
    fn test_paths_follow_the_pipeline() {
        let graph = chain();
        let paths: Vec<Vec<Item>> = graph
            .v()
            .out_e(&[])
            .in_v()
            .paths()
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(paths.len(), 2);
        for path in &paths {
            let kinds: Vec<_> = path.iter().map(Item::kind).collect();
            assert_eq!(
                kinds,
                vec![
                    crate::graph::ElementKind::Graph,
                    crate::graph::ElementKind::Vertex,
                    crate::graph::ElementKind::Edge,
                    crate::graph::ElementKind::Vertex,
                ]
            );
        }
    }

    #[test]
    fn test_independent_iterations() {
        let route = Route::from_items([1, 2, 3]).uniq();
        let mut first = route.objects().unwrap();
        let mut second = route.objects().unwrap();
        assert_eq!(first.next().unwrap().unwrap(), Item::from(1));
        assert_eq!(first.next().unwrap().unwrap(), Item::from(2));
        assert_eq!(second.next().unwrap().unwrap(), Item::from(1));
        assert_eq!(first.next().unwrap().unwrap(), Item::from(3));
        assert!(first.next().is_none());
        assert!(first.next().is_none());
        assert_eq!(second.count(), 2);
    }

    #[test]
    fn test_errors_end_the_sequence() {
        let failing = Predicate::try_new(|_| Err("boom".into())).named("boom");
        let route = Route::from_items([1, 2]).filter_with(failing);
        let mut objects = route.objects().unwrap();
        let err = objects.next().unwrap().unwrap_err();
        assert!(matches!(
            err.pipeline_error(),
            Some(PipelineError::Execution { .. })
        ));
        assert!(objects.next().is_none());
        assert!(route.count().is_err());
    }

    #[test]
    fn test_each_hands_the_route_back() {
        let route = Route::from_items([1, 2, 3]);
        let mut seen = Vec::new();
        let returned = route.each_object(|item| seen.push(item)).unwrap();
        assert!(returned.same(&route));
        assert_eq!(seen.len(), 3);

        let mut total = 0;
        route
            .each_element(|_| total += 1)
            .unwrap()
            .each_context(|_| total += 1)
            .unwrap();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_empty_and_first() {
        assert!(Route::from_items(Vec::<Item>::new()).is_empty().unwrap());
        assert!(Route::builder().build().is_empty().unwrap());
        let first = Route::from_items([4, 5]).first().unwrap().unwrap();
        assert_eq!(first.item(), &Item::from(4));
    }

    #[test]
    fn test_missing_source_with_stage_fails() {
        let route = Route::builder().build().uniq();
        assert!(route.objects().is_err());
    }
}
