//! Error handling for graphroute
//!
//! This module defines the crate-level error type and a Result alias used by
//! routes, extensions, configuration and the graph store helpers. Stage-level
//! failures live in [`crate::pipeline::PipelineError`] and are wrapped here.

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for graphroute operations
#[derive(Error, Debug)]
pub enum RouteError {
    /// Errors raised while compiling or running a pipeline
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// No extension on the target provides the requested method
    #[error("No method '{method}' available on {target}")]
    MissingMethod { method: String, target: String },

    /// Errors raised by a capability method
    #[error("Extension error: {0}")]
    Extension(String),

    /// Errors related to Rhai scripting
    #[error("Script error: {0}")]
    Script(String),

    /// Errors related to the graph store
    #[error("Graph error: {0}")]
    Graph(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<RouteError>,
    },
}

impl RouteError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        RouteError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The pipeline error at the bottom of any context wrapping, if any.
    pub fn pipeline_error(&self) -> Option<&PipelineError> {
        match self {
            RouteError::Pipeline(e) => Some(e),
            RouteError::WithContext { source, .. } => source.pipeline_error(),
            _ => None,
        }
    }
}

/// Result type alias for graphroute operations
pub type Result<T> = std::result::Result<T, RouteError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<RouteError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
