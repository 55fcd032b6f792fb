//! Per-evaluation variables shared by every link of one route chain.
//!
//! The root-most route owns the map; every other link hands out its back
//! route's [`Vars`]. The map is cleared each time an iteration is requested,
//! so it only ever describes the evaluation in progress.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared, mutable bookkeeping map for one evaluation pass.
#[derive(Clone, Default)]
pub struct Vars(Arc<Mutex<HashMap<String, Value>>>);

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.lock().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.lock().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.lock().remove(key)
    }

    /// Add `by` to an integer counter, starting from zero. Returns the new value.
    pub fn increment(&self, key: &str, by: i64) -> i64 {
        let mut map = self.0.lock();
        let next = map.get(key).and_then(Value::as_i64).unwrap_or(0) + by;
        map.insert(key.to_string(), Value::from(next));
        next
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Forget everything recorded by a previous evaluation.
    pub fn reset(&self) {
        self.0.lock().clear();
    }

    /// Whether two handles share the same map.
    pub fn same(&self, other: &Vars) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for Vars {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.0.lock().iter()).finish()
    }
}
