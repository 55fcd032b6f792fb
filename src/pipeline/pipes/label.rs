//! Edge label filter.

use crate::element::Item;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::pipe::{Pipe, Upstream};

/// Keeps edges whose label is one of `labels`. Non-edges never match.
pub struct LabelFilterPipe {
    upstream: Upstream,
    labels: Vec<String>,
}

impl LabelFilterPipe {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            upstream: Upstream::default(),
            labels,
        }
    }

    fn accepts(&self, item: &Item) -> bool {
        item.as_edge()
            .is_some_and(|edge| self.labels.iter().any(|l| *l == edge.label))
    }
}

impl Pipe for LabelFilterPipe {
    fn name(&self) -> &str {
        "LabelFilter"
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
        while let Some(item) = self.upstream.pull("LabelFilter")? {
            if self.accepts(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::EdgeRef;
    use crate::graph::{EdgeId, VertexId};
    use crate::pipeline::pipes::IterPipe;

    fn edge(id: u64, label: &str) -> Item {
        Item::Edge(EdgeRef {
            id: EdgeId(id),
            label: label.to_string(),
            out_v: VertexId(0),
            in_v: VertexId(1),
            graph: None,
        })
    }

    #[test]
    fn test_keeps_listed_labels() {
        let mut pipe = LabelFilterPipe::new(vec!["knows".to_string(), "likes".to_string()]);
        pipe.set_upstream(Box::new(IterPipe::from_items(vec![
            edge(1, "knows"),
            edge(2, "owns"),
            Item::from("knows"),
            edge(3, "likes"),
        ])));
        assert_eq!(pipe.next_match().unwrap(), Some(edge(1, "knows")));
        assert_eq!(pipe.next_match().unwrap(), Some(edge(3, "likes")));
        assert_eq!(pipe.next_match().unwrap(), None);
    }
}
