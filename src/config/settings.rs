//! Settings sections read from the settings file
//!
//! - [`InspectSettings`] - How routes render themselves when inspected
//! - [`LoggingSettings`] - Default log filter for the command line front end
//!
//! Every field carries a serde default so partial files load cleanly.

use serde::{Deserialize, Serialize};

/// Default number of matches the inspector will evaluate before giving up
pub const DEFAULT_INSPECT_LIMIT: usize = 500;

/// Default maximum width of the column-formatted preview
pub const DEFAULT_COLUMNS: usize = 120;

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Controls route inspection output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectSettings {
    /// Maximum number of matches evaluated for a preview. Routes with more
    /// matches than this are shown as their description only.
    #[serde(default = "default_inspect_limit")]
    pub limit: usize,

    /// Character width available to the preview columns
    #[serde(default = "default_columns")]
    pub columns: usize,

    /// Never evaluate routes during inspection
    #[serde(default)]
    pub hide_elements: bool,
}

fn default_inspect_limit() -> usize {
    DEFAULT_INSPECT_LIMIT
}

fn default_columns() -> usize {
    DEFAULT_COLUMNS
}

impl Default for InspectSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_INSPECT_LIMIT,
            columns: DEFAULT_COLUMNS,
            hide_elements: false,
        }
    }
}

impl InspectSettings {
    /// Settings that always render description-only output
    pub fn hidden() -> Self {
        Self {
            hide_elements: true,
            ..Self::default()
        }
    }

    /// Override the match limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Override the column width
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
