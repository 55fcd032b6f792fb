//! Rhai engine configured for predicate evaluation.

use super::{CompiledScript, ScriptCache, SharedScriptCache};
use crate::element::Item;
use crate::error::{Result, RouteError};
use parking_lot::RwLock;
use rhai::{Dynamic, Engine, Scope};
use std::sync::Arc;

/// Script engine shared by every script filter.
pub struct ScriptEngine {
    engine: Engine,
    cache: SharedScriptCache,
}

impl ScriptEngine {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(RwLock::new(ScriptCache::new())))
    }

    pub fn with_cache(cache: SharedScriptCache) -> Self {
        let mut engine = Engine::new();
        Self::configure_engine(&mut engine);
        Self { engine, cache }
    }

    /// Safety limits plus a few helpers for property checks.
    fn configure_engine(engine: &mut Engine) {
        engine.set_max_expr_depths(64, 64);
        engine.set_max_call_levels(32);
        engine.set_max_operations(10_000);
        engine.set_max_string_size(10_000);
        engine.set_max_array_size(1_000);
        engine.set_max_map_size(1_000);

        engine.register_fn("is_even", |n: i64| n % 2 == 0);
        engine.register_fn("is_odd", |n: i64| n % 2 != 0);
        engine.register_fn("has", |map: rhai::Map, key: &str| map.contains_key(key));
    }

    /// Compile a single expression, reusing a cached AST when possible.
    pub fn compile_expression(&self, source: &str) -> Result<CompiledScript> {
        if let Some(script) = self.cache.read().get(source) {
            return Ok(script);
        }
        self.cache.write().get_or_compile(&self.engine, source)
    }

    /// Evaluate a predicate with `it` bound to the candidate and `kind` to
    /// its element kind label.
    pub fn test(&self, script: &CompiledScript, item: &Item) -> Result<bool> {
        let it = rhai::serde::to_dynamic(item.to_json())
            .map_err(|e| RouteError::Script(format!("Cannot expose value to script: {}", e)))?;

        let mut scope = Scope::new();
        scope.push_constant("it", it);
        scope.push_constant("kind", item.kind().label().to_string());

        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, script.ast())
            .map_err(|e| RouteError::Script(format!("Execution error: {}", e)))?;

        result.as_bool().map_err(|type_name| {
            RouteError::Script(format!(
                "Predicate `{}` must return a bool, got {}",
                script.source(),
                type_name
            ))
        })
    }

    /// Compile and evaluate in one step.
    pub fn eval(&self, source: &str, item: &Item) -> Result<bool> {
        let script = self.compile_expression(source)?;
        self.test(&script, item)
    }

    /// Check that an expression parses.
    pub fn validate(&self, source: &str) -> Result<()> {
        self.engine
            .compile_expression(source)
            .map(|_| ())
            .map_err(|e| RouteError::Script(format!("Syntax error: {}", e)))
    }

    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    pub fn cache(&self) -> &SharedScriptCache {
        &self.cache
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEngine")
            .field("cache_size", &self.cache.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::VertexRef;
    use crate::graph::{GraphRef, MemoryGraph, VertexId};
    use crate::scripting::DEFAULT_CACHE_CAPACITY;
    use serde_json::json;

    #[test]
    fn test_plain_value_predicates() {
        let engine = ScriptEngine::new();
        assert!(engine.eval("it > 3", &Item::from(5)).unwrap());
        assert!(!engine.eval("is_even(it)", &Item::from(5)).unwrap());
        assert!(engine.eval("it == \"alice\"", &Item::from("alice")).unwrap());
    }

    #[test]
    fn test_vertex_properties_are_visible() {
        let graph = MemoryGraph::new("people");
        let id = graph.add_vertex(json!({"name": "bob", "age": 41}).as_object().cloned().unwrap());
        let item = Item::Vertex(VertexRef::new(id).with_graph(GraphRef::new(&graph)));

        let engine = ScriptEngine::new();
        assert!(engine.eval("it.age > 40 && kind == \"V\"", &item).unwrap());
        assert!(engine.eval("has(it, \"name\")", &item).unwrap());
        assert!(!engine.eval("has(it, \"email\")", &item).unwrap());

        let untagged = Item::Vertex(VertexRef::new(VertexId(99)));
        assert!(engine.eval("it.id == 99", &untagged).unwrap());
    }

    #[test]
    fn test_non_bool_result_is_an_error() {
        let engine = ScriptEngine::new();
        let err = engine.eval("it + 1", &Item::from(1)).unwrap_err();
        assert!(matches!(err, RouteError::Script(_)));
    }

    #[test]
    fn test_validation() {
        let engine = ScriptEngine::new();
        assert!(engine.validate("it > 1").is_ok());
        assert!(engine.validate("it > ").is_err());
    }

    #[test]
    fn test_caching() {
        let engine = ScriptEngine::new();
        engine.compile_expression("it > 1").unwrap();
        engine.compile_expression("it > 1").unwrap();
        assert_eq!(engine.cache().read().len(), 1);
        engine.clear_cache();
        assert!(engine.cache().read().is_empty());
    }

    #[test]
    fn test_distinct_expressions_stay_bounded() {
        let engine = ScriptEngine::with_cache(Arc::new(RwLock::new(ScriptCache::with_capacity(4))));
        for n in 0..20 {
            engine.compile_expression(&format!("it > {}", n)).unwrap();
        }
        assert_eq!(engine.cache().read().len(), 4);
        assert_eq!(ScriptEngine::new().cache().read().capacity(), DEFAULT_CACHE_CAPACITY);
    }
}
