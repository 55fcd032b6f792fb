use super::error::PipelineResult;
use super::pipe::{walk_upstream, Pipe};
use crate::element::Item;

/// A runnable pipeline compiled from one route chain.
///
/// Owns the tail pipe; every other pipe is reachable by following upstream
/// links. Built fresh by every compile call and never shared.
pub struct CompiledPipeline {
    tail: Box<dyn Pipe>,
    stats: PlanStats,
}

/// Statistics about the compiled pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanStats {
    /// Route links visited, root to tip
    pub links: usize,

    /// Pipes instantiated, including the source pipe
    pub pipes: usize,

    /// Links that carry no stage of their own
    pub pass_through: usize,

    /// Whether the chain resolved to a real data source
    pub has_source: bool,

    /// Compilation time in microseconds
    pub compile_time_us: u64,
}

impl CompiledPipeline {
    pub(crate) fn new(tail: Box<dyn Pipe>, stats: PlanStats) -> Self {
        Self { tail, stats }
    }

    pub fn stats(&self) -> &PlanStats {
        &self.stats
    }

    /// The last pipe; the one results are pulled from.
    pub fn tail(&self) -> &dyn Pipe {
        self.tail.as_ref()
    }

    /// The first pipe, `pipes - 1` upstream hops from the tail.
    pub fn head(&self) -> &dyn Pipe {
        let hops = self.stats.pipes.saturating_sub(1);
        walk_upstream(self.tail.as_ref(), hops).unwrap_or(self.tail.as_ref())
    }

    /// Number of pipes between head and tail, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.tail.as_ref();
        while let Some(up) = current.upstream() {
            depth += 1;
            current = up;
        }
        depth
    }

    pub fn next_match(&mut self) -> PipelineResult<Option<Item>> {
        self.tail.next_match()
    }

    pub fn enable_path(&mut self) {
        self.tail.enable_path();
    }

    /// Path to the most recent match.
    pub fn path(&self) -> Vec<Item> {
        self.tail.path()
    }

    pub fn into_tail(self) -> Box<dyn Pipe> {
        self.tail
    }
}

impl std::fmt::Debug for CompiledPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPipeline")
            .field("tail", &self.tail.name())
            .field("stats", &self.stats)
            .finish()
    }
}
