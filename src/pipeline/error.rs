//! Pipeline-specific error types.

use thiserror::Error;

/// Boxed error raised by user code running inside a stage.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building or running a pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid args for stage: {kind}({args}): {reason}")]
    Construction {
        kind: String,
        args: String,
        reason: String,
    },

    #[error("Stage {stage} has no input to draw from")]
    NoInput { stage: String },

    #[error("Stage {stage} failed: {source}")]
    Execution {
        stage: String,
        #[source]
        source: BoxError,
    },

    #[error("Script error in {stage}: {message}")]
    Script { stage: String, message: String },

    #[error("Stage {stage} needs a graph but none could be resolved")]
    GraphUnavailable { stage: String },
}

impl PipelineError {
    /// Name of the stage the error originated from.
    pub fn stage(&self) -> &str {
        match self {
            PipelineError::Construction { kind, .. } => kind,
            PipelineError::NoInput { stage }
            | PipelineError::Execution { stage, .. }
            | PipelineError::Script { stage, .. }
            | PipelineError::GraphUnavailable { stage } => stage,
        }
    }
}

/// Signal a predicate may raise to end iteration early. Stages translate it
/// into ordinary exhaustion instead of reporting it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no more elements")]
pub struct Exhausted;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
