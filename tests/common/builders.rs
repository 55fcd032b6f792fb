//! Test data builders for creating graph fixtures

use graphroute::graph::{MemoryGraph, Properties, VertexId};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for small people graphs keyed by name
pub struct GraphBuilder {
    name: String,
    people: Vec<(String, i64)>,
    edges: Vec<(String, String, String)>,
}

impl GraphBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            people: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn person(mut self, name: &str, age: i64) -> Self {
        self.people.push((name.to_string(), age));
        self
    }

    pub fn edge(mut self, from: &str, label: &str, to: &str) -> Self {
        self.edges
            .push((from.to_string(), label.to_string(), to.to_string()));
        self
    }

    pub fn knows(self, from: &str, to: &str) -> Self {
        self.edge(from, "knows", to)
    }

    pub fn build(self) -> Arc<MemoryGraph> {
        let graph = MemoryGraph::new(self.name);
        let mut ids: HashMap<String, VertexId> = HashMap::new();
        for (name, age) in self.people {
            let id = graph.add_vertex(properties(json!({ "name": name, "age": age })));
            ids.insert(name, id);
        }
        for (from, label, to) in self.edges {
            graph
                .add_edge(ids[&from], ids[&to], label, Properties::new())
                .expect("fixture edge endpoints exist");
        }
        graph
    }
}

fn properties(value: serde_json::Value) -> Properties {
    value.as_object().cloned().unwrap_or_default()
}

/// alice(34) -knows-> bob(17), alice -knows-> carol(52),
/// carol -knows-> dave(25), bob -likes-> dave, dave -knows-> alice
pub fn social() -> Arc<MemoryGraph> {
    GraphBuilder::new("social")
        .person("alice", 34)
        .person("bob", 17)
        .person("carol", 52)
        .person("dave", 25)
        .knows("alice", "bob")
        .knows("alice", "carol")
        .knows("carol", "dave")
        .edge("bob", "likes", "dave")
        .knows("dave", "alice")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_builder() {
        let graph = social();
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 5);
    }
}
