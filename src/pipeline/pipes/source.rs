//! Terminal and pass-through pipes.

use crate::element::Item;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::pipe::{PathTracker, Pipe, Upstream};

type ItemIter = Box<dyn Iterator<Item = Item> + Send>;

/// Yields the values of an iterator. The iterator is dropped as soon as it
/// runs dry.
pub struct IterPipe {
    items: Option<ItemIter>,
    path: PathTracker,
}

impl IterPipe {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Item>,
        I::IntoIter: Send + 'static,
    {
        Self {
            items: Some(Box::new(items.into_iter())),
            path: PathTracker::default(),
        }
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Self::new(items)
    }

    /// Yield `item` exactly once.
    pub fn once(item: Item) -> Self {
        Self::new(std::iter::once(item))
    }
}

impl Pipe for IterPipe {
    fn name(&self) -> &str {
        "Source"
    }

    fn set_upstream(&mut self, _upstream: Box<dyn Pipe>) {
        tracing::warn!("Source pipes have no upstream, ignoring");
    }

    fn upstream(&self) -> Option<&(dyn Pipe + 'static)> {
        None
    }

    fn upstream_mut(&mut self) -> Option<&mut (dyn Pipe + 'static)> {
        None
    }

    fn next_match(&mut self) -> PipelineResult<Option<Item>> {
        let next = self.items.as_mut().and_then(Iterator::next);
        match &next {
            Some(item) => self.path.record(item),
            None => self.items = None,
        }
        Ok(next)
    }

    fn enable_path(&mut self) {
        self.path.enable();
    }

    fn path(&self) -> Vec<Item> {
        self.path.extend(Vec::new())
    }
}

/// A pipe that is exhausted from the start.
#[derive(Default)]
pub struct EmptyPipe;

impl EmptyPipe {
    pub fn new() -> Self {
        Self
    }
}

impl Pipe for EmptyPipe {
    fn name(&self) -> &str {
        "Empty"
    }

    fn set_upstream(&mut self, _upstream: Box<dyn Pipe>) {}

    fn upstream(&self) -> Option<&(dyn Pipe + 'static)> {
        None
    }

    fn upstream_mut(&mut self) -> Option<&mut (dyn Pipe + 'static)> {
        None
    }

    fn next_match(&mut self) -> PipelineResult<Option<Item>> {
        Ok(None)
    }
}

/// Passes every upstream value through.
#[derive(Default)]
pub struct IdentityPipe {
    upstream: Upstream,
}

impl IdentityPipe {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pipe for IdentityPipe {
    fn name(&self) -> &str {
        "Identity"
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
        self.upstream.pull("Identity")
    }
}
