//! # graphroute: lazy routes over property graphs
//!
//! A route is a chain of links, each describing one step of a traversal:
//! start at a graph or a list of values, expand to vertices, follow edges,
//! filter. Building a chain does no work. Asking a route for its elements
//! compiles the chain into a pull-based pipeline that produces matches one
//! at a time, only as fast as they are consumed.
//!
//! ## Architecture
//!
//! - **Route**: immutable chain links with a back reference or a terminal source
//! - **Pipeline**: the compiler and the stages it wires together
//! - **Extensions**: capability modules adding methods to routes and elements
//! - **Graph**: the store contract plus an in-memory store
//! - **Scripting**: Rhai expressions usable as filter predicates
//!
//! ## Configuration
//!
//! Inspection and logging defaults are read from `settings.toml` in the
//! platform config directory under `graphroute`:
//!
//! - **Linux**: `~/.config/graphroute/`
//! - **macOS**: `~/Library/Application Support/graphroute/`
//! - **Windows**: `%APPDATA%\graphroute\`
//!
//! ## Example
//!
//! ```ignore
//! use graphroute::prelude::*;
//!
//! let graph = MemoryGraph::load_json("people.json")?;
//! let friends = graph
//!     .v()
//!     .filter(|person| person.property("age").and_then(|a| a.as_i64()) >= Some(18))
//!     .out_e(&["knows"])
//!     .in_v()
//!     .uniq();
//!
//! println!("{}", friends.inspect(Some(20))?);
//! for friend in friends.elements()? {
//!     println!("{}", friend?);
//! }
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod extension;
pub mod graph;
pub mod pipeline;
pub mod route;
pub mod scripting;
pub mod vars;

// Re-export commonly used types
pub use config::Settings;
pub use element::{EdgeRef, Element, Item, VertexRef};
pub use error::{Result, RouteError};
pub use extension::{Extension, ExtensionSet};
pub use graph::{ElementKind, GraphRef, GraphStore, MemoryGraph};
pub use pipeline::{PipelineError, Predicate, StageKind};
pub use route::{GraphRoutes, Route, Source};
pub use scripting::ScriptEngine;
pub use vars::Vars;

/// Everything needed to build and run routes.
pub mod prelude {
    pub use crate::element::{Element, Item};
    pub use crate::error::{Result, RouteError};
    pub use crate::extension::{Extension, ExtensionSet, Mixin};
    pub use crate::graph::{ElementKind, GraphRef, GraphStore, MemoryGraph, Properties};
    pub use crate::pipeline::{Exhausted, Predicate, StageArg, StageKind};
    pub use crate::route::{GraphRoutes, Route, Source};
}
