//! Configuration module for graphroute
//!
//! Settings are read from a TOML file and installed once at startup as the
//! process-wide defaults. Library code that needs a setting takes it as an
//! explicit argument; only the convenience entry points (such as
//! [`Route::inspect`](crate::route::Route::inspect)) fall back to
//! [`current`].
//!
//! # Settings Location
//!
//! - **Linux**: `~/.config/graphroute/settings.toml`
//! - **macOS**: `~/Library/Application Support/graphroute/settings.toml`
//! - **Windows**: `%APPDATA%\graphroute\settings.toml`
//!
//! # Example
//!
//! ```ignore
//! use graphroute::config::{self, Settings};
//!
//! let settings = Settings::load_or_default();
//! config::install(settings)?;
//! assert_eq!(config::current().inspect.limit, 500);
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, RouteError};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "graphroute";

/// Settings filename
pub const SETTINGS_FILE: &str = "settings.toml";

static INSTALLED: OnceCell<Settings> = OnceCell::new();
static DEFAULTS: once_cell::sync::Lazy<Settings> = once_cell::sync::Lazy::new(Settings::default);

/// Get the path of the default settings file
pub fn default_settings_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(SETTINGS_FILE))
}

/// Install the process-wide settings. May only be called once.
pub fn install(settings: Settings) -> Result<()> {
    INSTALLED
        .set(settings)
        .map_err(|_| RouteError::Config("Settings have already been installed".to_string()))?;
    tracing::debug!("Installed process-wide settings");
    Ok(())
}

/// The installed settings, or the defaults if nothing was installed.
pub fn current() -> &'static Settings {
    INSTALLED.get().unwrap_or(&DEFAULTS)
}

/// Complete settings file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub inspect: InspectSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RouteError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load settings from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = default_settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save settings to a file, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.inspect.columns == 0 {
            return Err(RouteError::Config(
                "inspect.columns must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
