//! Rhai scripting for route predicates
//!
//! Script filters take a single Rhai expression that must evaluate to a
//! bool. The candidate is bound as `it`:
//!
//! - plain values are exposed as themselves (`it > 3`)
//! - vertices and edges are exposed as a map of their properties plus
//!   `id` (and `label`, `out_v`, `in_v` for edges): `it.age > 40`
//!
//! `kind` holds the candidate's element kind label (`"V"`, `"E"`, `"Obj"`,
//! `"Graph"`). Helper functions: `is_even(n)`, `is_odd(n)`, `has(map, key)`.
//!
//! ## Example Predicates
//!
//! ```rhai
//! it.name == "alice" || it.age >= 18
//! ```
//!
//! ```rhai
//! kind == "E" && it.label == "knows"
//! ```

mod engine;

pub use engine::ScriptEngine;

use crate::error::{Result, RouteError};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rhai::{Engine, AST};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// A compiled predicate expression.
#[derive(Clone)]
pub struct CompiledScript {
    ast: Arc<AST>,
    source: String,
}

impl CompiledScript {
    pub fn ast(&self) -> &AST {
        &self.ast
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for CompiledScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledScript")
            .field("source", &self.source)
            .finish()
    }
}

/// Number of compiled scripts kept before the oldest is evicted.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Bounded cache for compiled scripts to avoid recompilation
pub struct ScriptCache {
    /// Map from script source to compiled script
    cache: HashMap<String, CompiledScript>,
    /// Sources in insertion order, oldest first
    order: VecDeque<String>,
    capacity: usize,
}

impl Default for ScriptCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` scripts (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, source: &str) -> Option<CompiledScript> {
        self.cache.get(source).cloned()
    }

    /// Get a cached script or compile and cache it
    pub fn get_or_compile(&mut self, engine: &Engine, source: &str) -> Result<CompiledScript> {
        if let Some(script) = self.cache.get(source) {
            return Ok(script.clone());
        }

        let ast = engine
            .compile_expression(source)
            .map_err(|e| RouteError::Script(format!("Compilation error: {}", e)))?;

        let script = CompiledScript {
            ast: Arc::new(ast),
            source: source.to_string(),
        };
        while self.cache.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.cache.remove(&oldest);
        }
        self.cache.insert(source.to_string(), script.clone());
        self.order.push_back(source.to_string());
        Ok(script)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    /// Remove a specific script from the cache
    pub fn invalidate(&mut self, source: &str) {
        if self.cache.remove(source).is_some() {
            self.order.retain(|known| known != source);
        }
    }
}

/// Thread-safe script cache wrapper
pub type SharedScriptCache = Arc<RwLock<ScriptCache>>;

static SHARED_ENGINE: Lazy<ScriptEngine> = Lazy::new(ScriptEngine::new);

/// The engine used by script filter stages.
pub fn shared_engine() -> &'static ScriptEngine {
    &SHARED_ENGINE
}
