use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot read directory {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Capability '{key}' already registered by provider '{provider}'")]
    RegistrationConflict { provider: String, key: String },

    #[error("Unknown capability key: {0}")]
    UnknownCapability(String),

    #[error("Handler for '{key}' must be a {expected} handler")]
    HandlerMismatch { key: String, expected: String },

    #[error("Transform construction failed: {0}")]
    Transform(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PluginError {
    /// Registration conflicts are reported but never abort activation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, PluginError::RegistrationConflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;
