//! Capability extensions.
//!
//! An [`Extension`] is a named bundle of methods. Each method is registered
//! under one capability:
//!
//! - **vertex** - available on elements wrapping a vertex
//! - **edge** - available on elements wrapping an edge
//! - **element** - available on any element
//! - **route** - available on the route the extension is added to
//!
//! Routes keep their extensions in an [`ExtensionSet`] and hand that set to
//! every element they yield. Membership is by identity: two extensions built
//! separately are both kept even when they share a name. Sets only grow.

use crate::element::{Element, Item};
use crate::error::Result;
use crate::graph::ElementKind;
use crate::route::Route;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Method callable on an element.
pub type ElementMethod = Arc<dyn Fn(&Element, &[Item]) -> Result<Item> + Send + Sync>;

/// Method callable on a route.
pub type RouteMethod = Arc<dyn Fn(&Route, &[Item]) -> Result<Item> + Send + Sync>;

/// Name of the built-in extension carried by elements handed to filter
/// predicates and yielded by [`Route::contexts`].
pub const FILTER_CONTEXT: &str = "filter_context";

/// Which kind of target a capability applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Vertex,
    Edge,
    Element,
    Route,
}

/// A named bundle of capability methods.
pub struct Extension {
    name: String,
    vertex: BTreeMap<String, ElementMethod>,
    edge: BTreeMap<String, ElementMethod>,
    element: BTreeMap<String, ElementMethod>,
    route: BTreeMap<String, RouteMethod>,
}

impl Extension {
    pub fn builder(name: impl Into<String>) -> ExtensionBuilder {
        ExtensionBuilder {
            extension: Extension {
                name: name.into(),
                vertex: BTreeMap::new(),
                edge: BTreeMap::new(),
                element: BTreeMap::new(),
                route: BTreeMap::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capabilities this extension declares.
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut caps = Vec::new();
        if !self.vertex.is_empty() {
            caps.push(Capability::Vertex);
        }
        if !self.edge.is_empty() {
            caps.push(Capability::Edge);
        }
        if !self.element.is_empty() {
            caps.push(Capability::Element);
        }
        if !self.route.is_empty() {
            caps.push(Capability::Route);
        }
        caps
    }

    pub fn has_route_capability(&self) -> bool {
        !self.route.is_empty()
    }

    pub fn has_element_capability(&self) -> bool {
        !(self.vertex.is_empty() && self.edge.is_empty() && self.element.is_empty())
    }

    /// Kind-specific methods win over generic ones.
    pub fn element_method(&self, kind: ElementKind, method: &str) -> Option<&ElementMethod> {
        let specific = match kind {
            ElementKind::Vertex => self.vertex.get(method),
            ElementKind::Edge => self.edge.get(method),
            _ => None,
        };
        specific.or_else(|| self.element.get(method))
    }

    pub fn route_method(&self, method: &str) -> Option<&RouteMethod> {
        self.route.get(method)
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// Builder for [`Extension`].
pub struct ExtensionBuilder {
    extension: Extension,
}

impl ExtensionBuilder {
    pub fn vertex<F>(mut self, method: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Element, &[Item]) -> Result<Item> + Send + Sync + 'static,
    {
        self.extension.vertex.insert(method.into(), Arc::new(f));
        self
    }

    pub fn edge<F>(mut self, method: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Element, &[Item]) -> Result<Item> + Send + Sync + 'static,
    {
        self.extension.edge.insert(method.into(), Arc::new(f));
        self
    }

    pub fn element<F>(mut self, method: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Element, &[Item]) -> Result<Item> + Send + Sync + 'static,
    {
        self.extension.element.insert(method.into(), Arc::new(f));
        self
    }

    pub fn route<F>(mut self, method: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Route, &[Item]) -> Result<Item> + Send + Sync + 'static,
    {
        self.extension.route.insert(method.into(), Arc::new(f));
        self
    }

    pub fn build(self) -> Arc<Extension> {
        Arc::new(self.extension)
    }
}

/// Set of extensions in insertion order, compared by identity.
#[derive(Clone, Default)]
pub struct ExtensionSet(Vec<Arc<Extension>>);

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an extension. Re-adding the same extension is a no-op.
    pub fn insert(&mut self, extension: Arc<Extension>) -> bool {
        if self.0.iter().any(|known| Arc::ptr_eq(known, &extension)) {
            return false;
        }
        self.0.push(extension);
        true
    }

    /// Union with `other`.
    pub fn merge(&mut self, other: &ExtensionSet) {
        for extension in &other.0 {
            self.insert(extension.clone());
        }
    }

    /// Whether any member is named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|ext| ext.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|ext| ext.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Extension>> {
        self.0.iter()
    }

    /// The most recently added extension providing `method` wins.
    pub fn element_method(&self, kind: ElementKind, method: &str) -> Option<&ElementMethod> {
        self.0
            .iter()
            .rev()
            .find_map(|ext| ext.element_method(kind, method))
    }

    pub fn route_method(&self, method: &str) -> Option<&RouteMethod> {
        self.0.iter().rev().find_map(|ext| ext.route_method(method))
    }
}

impl FromIterator<Arc<Extension>> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = Arc<Extension>>>(iter: I) -> Self {
        let mut set = ExtensionSet::new();
        for extension in iter {
            set.insert(extension);
        }
        set
    }
}

impl PartialEq for ExtensionSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .all(|ext| other.0.iter().any(|theirs| Arc::ptr_eq(ext, theirs)))
    }
}

impl fmt::Debug for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Anything that may or may not be a capability extension. Collections
/// handed to [`Route::add_extensions`] are filtered through this.
pub trait AsExtension {
    fn as_extension(&self) -> Option<Arc<Extension>>;
}

impl AsExtension for Arc<Extension> {
    fn as_extension(&self) -> Option<Arc<Extension>> {
        Some(self.clone())
    }
}

impl AsExtension for Option<Arc<Extension>> {
    fn as_extension(&self) -> Option<Arc<Extension>> {
        self.clone()
    }
}

impl AsExtension for Item {
    fn as_extension(&self) -> Option<Arc<Extension>> {
        None
    }
}

impl<T: AsExtension + ?Sized> AsExtension for &T {
    fn as_extension(&self) -> Option<Arc<Extension>> {
        (**self).as_extension()
    }
}

/// Heterogeneous entry for mixed collections of extensions and other values.
#[derive(Debug, Clone)]
pub enum Mixin {
    Extension(Arc<Extension>),
    Other(Item),
}

impl AsExtension for Mixin {
    fn as_extension(&self) -> Option<Arc<Extension>> {
        match self {
            Mixin::Extension(ext) => Some(ext.clone()),
            Mixin::Other(_) => None,
        }
    }
}

static FILTER_CONTEXT_EXTENSION: Lazy<Arc<Extension>> = Lazy::new(|| {
    Extension::builder(FILTER_CONTEXT)
        .element("back", |element, _| {
            Ok(element
                .back()
                .map(|route| Item::from(route.describe()))
                .unwrap_or(Item::Value(serde_json::Value::Null)))
        })
        .element("graph", |element, _| {
            Ok(element
                .graph()
                .cloned()
                .map(Item::Graph)
                .unwrap_or(Item::Value(serde_json::Value::Null)))
        })
        .build()
});

/// The built-in extension marking an element as evaluated in a route context.
pub fn filter_context() -> Arc<Extension> {
    FILTER_CONTEXT_EXTENSION.clone()
}
