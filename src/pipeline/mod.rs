//! Pull-based pipelines compiled from route chains.
//!
//! A route describes a stage; a pipe runs it. Compiling a route walks its
//! chain back to the root and wires one fresh pipe per stage-bearing link:
//!
//! ```text
//! [Source] ──► [GraphVertices] ──► [BlockFilter] ──► [OutE]
//!   head                                              tail
//! ```
//!
//! # Design
//!
//! - **Pull on demand**: nothing runs until the tail is asked for a match,
//!   and each stage pulls only as much as it needs.
//! - **Exhaustion is a value**: `Ok(None)`, never an error.
//! - **Enum for built-ins, trait for plugins**: `StageKind` names every
//!   built-in stage; `StageFactory` admits stages defined elsewhere.

pub mod compiled_plan;
pub mod compiler;
pub mod error;
pub mod pipe;
pub mod pipes;
pub mod stage;

pub use compiled_plan::{CompiledPipeline, PlanStats};
pub use compiler::PipelineCompiler;
pub use error::{BoxError, Exhausted, PipelineError, PipelineResult};
pub use pipe::{walk_upstream, PathTracker, Pipe, Upstream};
pub use stage::{Direction, Predicate, StageArg, StageContext, StageFactory, StageKind, StageSpec};
