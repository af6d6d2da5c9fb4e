//! User settings.
//!
//! Stored as JSON in the platform config dir. A missing or unreadable
//! file falls back to defaults with a warning, never an error, and the
//! `LEDGERDOCK_HOME_ROUTE` env var overrides the configured home route.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use ledgerdock_routes::RouteRegistry;

use crate::errors::{WorkbenchError, WorkbenchResult};

const SETTINGS_FILE: &str = "settings.json";
pub const HOME_ROUTE_ENV: &str = "LEDGERDOCK_HOME_ROUTE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Route opened by the default tab and the home command.
    pub default_route: String,
    /// Show the key hints in the status bar.
    pub show_help_hint: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_route: crate::DEFAULT_ROUTE.to_string(),
            show_help_hint: true,
        }
    }
}

impl Settings {
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(crate::APP_NAME).join(SETTINGS_FILE))
    }

    pub fn settings_path() -> Option<String> {
        Self::path().map(|path| path.display().to_string())
    }

    /// Loads settings from disk, then applies env overrides.
    pub fn load() -> Self {
        let mut settings = Self::load_from_file();
        if let Ok(route) = std::env::var(HOME_ROUTE_ENV) {
            if !route.is_empty() {
                settings.default_route = route;
            }
        }
        settings
    }

    fn load_from_file() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                tracing::warn!(path = %path.display(), %error, "settings file is invalid, using defaults");
                Self::default()
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to read settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> WorkbenchResult<()> {
        let Some(path) = Self::path() else {
            return Err(WorkbenchError::ConfigDirUnavailable);
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The configured home route if the registry knows it, the shipped
    /// default otherwise.
    pub fn validated_route(&self, registry: &RouteRegistry) -> String {
        if registry.lookup(&self.default_route).is_some() {
            self.default_route.clone()
        } else {
            tracing::warn!(
                route = %self.default_route,
                "configured home route is not registered, using the default"
            );
            crate::DEFAULT_ROUTE.to_string()
        }
    }
}
