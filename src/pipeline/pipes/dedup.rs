//! Duplicate filter.

use crate::element::{Item, ItemKey};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::pipe::{Pipe, Upstream};
use std::collections::HashSet;

/// Emits each distinct value once, by [`Item::identity_key`].
#[derive(Default)]
pub struct DuplicateFilterPipe {
    upstream: Upstream,
    seen: HashSet<ItemKey>,
}

impl DuplicateFilterPipe {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pipe for DuplicateFilterPipe {
    fn name(&self) -> &str {
        "DuplicateFilter"
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
        while let Some(item) = self.upstream.pull("DuplicateFilter")? {
            if self.seen.insert(item.identity_key()) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pipes::IterPipe;

    #[test]
    fn test_first_occurrence_wins() {
        let mut pipe = DuplicateFilterPipe::new();
        pipe.set_upstream(Box::new(IterPipe::from_items(
            [3, 1, 3, 2, 1].into_iter().map(Item::from).collect(),
        )));
        let mut out = Vec::new();
        while let Some(item) = pipe.next_match().unwrap() {
            out.push(item);
        }
        assert_eq!(out, vec![Item::from(3), Item::from(1), Item::from(2)]);
    }
}
