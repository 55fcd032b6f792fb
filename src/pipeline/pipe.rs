//! The pull-based stage contract.
//!
//! A [`Pipe`] produces one match per [`Pipe::next_match`] call, pulling from
//! its upstream pipe as needed. `Ok(None)` means exhausted; only real
//! failures are reported as errors. Pipes hold their cursor state in their
//! own fields between calls, so nothing runs ahead of demand.
//!
//! Path tracking is opt-in. Filters report their upstream's path unchanged;
//! pipes that emit new values append the value they last produced.

use crate::element::Item;
use crate::pipeline::error::{PipelineError, PipelineResult};

/// A runnable pipeline stage.
pub trait Pipe: Send {
    /// Stage name used in diagnostics.
    fn name(&self) -> &str;

    /// Wire the stage this pipe pulls from.
    fn set_upstream(&mut self, upstream: Box<dyn Pipe>);

    fn upstream(&self) -> Option<&(dyn Pipe + 'static)>;

    fn upstream_mut(&mut self) -> Option<&mut (dyn Pipe + 'static)>;

    /// Produce the next match, or `Ok(None)` once exhausted.
    fn next_match(&mut self) -> PipelineResult<Option<Item>>;

    /// Start recording paths. Propagates to every upstream stage.
    fn enable_path(&mut self) {
        if let Some(upstream) = self.upstream_mut() {
            upstream.enable_path();
        }
    }

    /// Values produced on the way to the last match, oldest first.
    fn path(&self) -> Vec<Item> {
        self.upstream().map(|up| up.path()).unwrap_or_default()
    }
}

/// Upstream slot shared by every built-in pipe.
#[derive(Default)]
pub struct Upstream(Option<Box<dyn Pipe>>);

impl Upstream {
    pub fn set(&mut self, upstream: Box<dyn Pipe>) {
        self.0 = Some(upstream);
    }

    pub fn get(&self) -> Option<&(dyn Pipe + 'static)> {
        self.0.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut (dyn Pipe + 'static)> {
        self.0.as_deref_mut()
    }

    /// Pull the next upstream value on behalf of `stage`.
    pub fn pull(&mut self, stage: &str) -> PipelineResult<Option<Item>> {
        match self.0.as_deref_mut() {
            Some(upstream) => upstream.next_match(),
            None => Err(PipelineError::NoInput {
                stage: stage.to_string(),
            }),
        }
    }

    pub fn path(&self) -> Vec<Item> {
        self.get().map(|up| up.path()).unwrap_or_default()
    }
}

/// Records the last emitted value for pipes that extend the path.
#[derive(Debug, Default)]
pub struct PathTracker {
    enabled: bool,
    last: Option<Item>,
}

impl PathTracker {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Remember `item` as the value just emitted.
    pub fn record(&mut self, item: &Item) {
        if self.enabled {
            self.last = Some(item.clone());
        }
    }

    /// `upstream` followed by the last recorded value.
    pub fn extend(&self, mut upstream: Vec<Item>) -> Vec<Item> {
        if let Some(last) = &self.last {
            upstream.push(last.clone());
        }
        upstream
    }
}

/// Follow `hops` upstream links from `pipe`.
pub fn walk_upstream(pipe: &dyn Pipe, hops: usize) -> Option<&dyn Pipe> {
    let mut current = pipe;
    for _ in 0..hops {
        current = current.upstream()?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pipes::{IdentityPipe, IterPipe};

    #[test]
    fn test_pull_without_upstream_is_loud() {
        let mut upstream = Upstream::default();
        let err = upstream.pull("Identity").unwrap_err();
        assert!(matches!(err, PipelineError::NoInput { .. }));
    }

    #[test]
    fn test_walk_upstream() {
        let mut outer = IdentityPipe::new();
        let mut inner = IdentityPipe::new();
        inner.set_upstream(Box::new(IterPipe::from_items(vec![Item::from(1)])));
        outer.set_upstream(Box::new(inner));

        assert_eq!(walk_upstream(&outer, 0).unwrap().name(), "Identity");
        assert_eq!(walk_upstream(&outer, 2).unwrap().name(), "Source");
        assert!(walk_upstream(&outer, 3).is_none());
    }

    #[test]
    fn test_path_tracker_only_records_when_enabled() {
        let mut tracker = PathTracker::default();
        tracker.record(&Item::from(1));
        assert!(tracker.extend(Vec::new()).is_empty());
        tracker.enable();
        tracker.record(&Item::from(2));
        assert_eq!(tracker.extend(vec![Item::from(1)]), vec![Item::from(1), Item::from(2)]);
    }
}
