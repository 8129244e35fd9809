//! User configuration file parsing
//!
//! Looked up in priority order:
//! 1. ./.plugin-typescript.toml (project-specific)
//! 2. $PLUGIN_TYPESCRIPT_CONFIG
//! 3. <config dir>/plugin-typescript/config.toml (user-global)

use crate::types::{PluginError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PROJECT_CONFIG_FILE: &str = ".plugin-typescript.toml";
pub const CONFIG_ENV_VAR: &str = "PLUGIN_TYPESCRIPT_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub workspace_root: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Default for the `ignore-local-config` flag when not given on the CLI.
    pub ignore_local_config: Option<bool>,
}

impl UserConfig {
    /// Load the first configuration file found, if any.
    pub fn load() -> Result<Option<Self>> {
        for path in Self::candidates() {
            if path.exists() {
                return Self::load_from(&path).map(Some);
            }
        }

        debug!("No user config file found");
        Ok(None)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading user config from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| PluginError::ConfigError(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| PluginError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(PROJECT_CONFIG_FILE));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            candidates.push(PathBuf::from(config_path));
        }

        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("plugin-typescript").join("config.toml"));
        }

        candidates
    }
}
