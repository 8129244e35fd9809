//! Configuration resolution
//!
//! Decides whether the transform honors the project's own compiler
//! configuration or receives the built-in default:
//! 1. `ignore-local-config` set: default, without touching the filesystem
//! 2. Local configuration reachable from the working directory: defer to it
//! 3. Otherwise: default

use crate::config::defaults::{build_default, CompilerOptions};
use crate::config::probe::{ConfigProbe, DirectoryProbe};
use crate::host::{CliFlags, InputType};
use crate::types::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Flag forcing the default configuration regardless of what is on disk.
pub const IGNORE_LOCAL_CONFIG: &str = "ignore-local-config";

/// Input to one resolution.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub working_directory: PathBuf,
    pub flags: CliFlags,
    pub input_type: InputType,
}

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedConfiguration {
    /// Let the transform discover and honor the local configuration itself.
    Empty,
    /// Configuration handed to the transform as-is.
    Explicit(CompilerOptions),
}

impl ResolvedConfiguration {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResolvedConfiguration::Empty)
    }

    pub fn explicit(&self) -> Option<&CompilerOptions> {
        match self {
            ResolvedConfiguration::Empty => None,
            ResolvedConfiguration::Explicit(options) => Some(options),
        }
    }

    /// Transform option object: `{}` when deferring.
    pub fn to_options(&self) -> Result<serde_json::Value> {
        match self {
            ResolvedConfiguration::Empty => Ok(serde_json::json!({})),
            ResolvedConfiguration::Explicit(options) => Ok(serde_json::to_value(options)?),
        }
    }
}

pub struct ConfigResolver {
    probe: Arc<dyn ConfigProbe>,
}

impl ConfigResolver {
    pub fn new(probe: Arc<dyn ConfigProbe>) -> Self {
        Self { probe }
    }

    pub async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolvedConfiguration> {
        debug_assert_eq!(request.input_type, InputType::Typescript);

        if request.flags.is_enabled(IGNORE_LOCAL_CONFIG) {
            debug!("{} set; using default TypeScript configuration", IGNORE_LOCAL_CONFIG);
            return Ok(ResolvedConfiguration::Explicit(build_default()));
        }

        if self
            .probe
            .has_local_config(&request.working_directory)
            .await?
        {
            info!(
                "Deferring to local TypeScript configuration file(s) under {}",
                request.working_directory.display()
            );
            return Ok(ResolvedConfiguration::Empty);
        }

        debug!(
            "No local TypeScript configuration under {}; using default",
            request.working_directory.display()
        );
        Ok(ResolvedConfiguration::Explicit(build_default()))
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new(Arc::new(DirectoryProbe::default()))
    }
}
