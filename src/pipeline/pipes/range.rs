//! Positional window filter.

use crate::element::Item;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::pipe::{Pipe, Upstream};

/// Keeps values at positions `low..=high`. With no upper bound everything
/// from `low` on passes. Once past `high` the upstream is not pulled again,
/// and a window with `high < low` never pulls at all.
pub struct RangeFilterPipe {
    upstream: Upstream,
    low: usize,
    high: Option<usize>,
    position: usize,
}

impl RangeFilterPipe {
    pub fn new(low: usize, high: Option<usize>) -> Self {
        Self {
            upstream: Upstream::default(),
            low,
            high,
            position: 0,
        }
    }

    fn past_end(&self) -> bool {
        self.high
            .is_some_and(|high| self.position > high || high < self.low)
    }
}

impl Pipe for RangeFilterPipe {
    fn name(&self) -> &str {
        "RangeFilter"
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
        while !self.past_end() {
            let Some(item) = self.upstream.pull("RangeFilter")? else {
                return Ok(None);
            };
            let position = self.position;
            self.position += 1;
            if position >= self.low {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}
