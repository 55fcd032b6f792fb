//! Terminal data origins for root routes.

use crate::element::{Element, Item};
use crate::graph::GraphRef;
use crate::pipeline::pipes::IterPipe;
use crate::pipeline::Pipe;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Zero-argument callback producing a source when iteration starts.
pub type Producer = Arc<dyn Fn() -> Source + Send + Sync>;

/// Where a root route gets its values from.
#[derive(Clone, Default)]
pub enum Source {
    /// Yields the graph itself, once.
    Graph(GraphRef),
    /// Yields the wrapped item, once.
    Element(Arc<Element>),
    /// Invoked on every compile; its result is resolved in turn.
    Deferred(Producer),
    /// An already-built pipe. It can only be run once; later compiles see
    /// an exhausted source.
    Pipe(Arc<Mutex<Option<Box<dyn Pipe>>>>),
    Items(Arc<Vec<Item>>),
    Item(Item),
    /// Nothing to iterate.
    #[default]
    Null,
}

impl Source {
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn() -> Source + Send + Sync + 'static,
    {
        Source::Deferred(Arc::new(f))
    }

    pub fn pipe(pipe: Box<dyn Pipe>) -> Self {
        Source::Pipe(Arc::new(Mutex::new(Some(pipe))))
    }

    pub fn items<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        Source::Items(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Source::Null)
    }

    /// The graph this source is tied to. Deferred producers are not invoked.
    pub fn graph(&self) -> Option<GraphRef> {
        match self {
            Source::Graph(graph) => Some(graph.clone()),
            Source::Element(element) => element.graph().cloned(),
            Source::Item(item) => item.graph().cloned(),
            Source::Deferred(_) | Source::Pipe(_) | Source::Items(_) | Source::Null => None,
        }
    }
}

/// Turn a source into a runnable pipe. `None` means there is nothing to
/// iterate.
pub fn resolve_source(source: &Source) -> Option<Box<dyn Pipe>> {
    match source {
        Source::Graph(graph) => Some(Box::new(IterPipe::once(Item::Graph(graph.clone())))),
        Source::Element(element) => Some(Box::new(IterPipe::once(element.item().clone()))),
        Source::Deferred(producer) => {
            tracing::debug!("Invoking deferred source");
            resolve_source(&producer())
        }
        Source::Pipe(slot) => {
            let pipe = slot.lock().take();
            if pipe.is_none() {
                tracing::warn!("Pipe source was already consumed by an earlier compile");
            }
            pipe
        }
        Source::Items(items) => {
            let items = items.clone();
            Some(Box::new(IterPipe::new(
                (0..items.len()).map(move |i| items[i].clone()),
            )))
        }
        Source::Item(item) => Some(Box::new(IterPipe::once(item.clone()))),
        Source::Null => None,
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Graph(graph) => write!(f, "Source::Graph({:?})", graph),
            Source::Element(element) => write!(f, "Source::Element({})", element),
            Source::Deferred(_) => write!(f, "Source::Deferred"),
            Source::Pipe(_) => write!(f, "Source::Pipe"),
            Source::Items(items) => write!(f, "Source::Items({} items)", items.len()),
            Source::Item(item) => write!(f, "Source::Item({})", item),
            Source::Null => write!(f, "Source::Null"),
        }
    }
}

impl From<GraphRef> for Source {
    fn from(graph: GraphRef) -> Self {
        Source::Graph(graph)
    }
}

impl From<Element> for Source {
    fn from(element: Element) -> Self {
        Source::Element(Arc::new(element))
    }
}

impl From<Item> for Source {
    fn from(item: Item) -> Self {
        Source::Item(item)
    }
}

impl From<Vec<Item>> for Source {
    fn from(items: Vec<Item>) -> Self {
        Source::Items(Arc::new(items))
    }
}

impl From<Box<dyn Pipe>> for Source {
    fn from(pipe: Box<dyn Pipe>) -> Self {
        Source::pipe(pipe)
    }
}

impl<T: Into<Source>> From<Option<T>> for Source {
    fn from(value: Option<T>) -> Self {
        value.map_or(Source::Null, Into::into)
    }
}
