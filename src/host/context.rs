//! Values exchanged with the bundling host
//!
//! Everything the provider needs from the host arrives through these types;
//! nothing is read from process-global state.

use crate::host::bus::CapabilityBus;
use crate::types::{PluginError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

/// A single CLI flag value as forwarded by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Text(value.to_string())
    }
}

/// CLI flags of the current bundle invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CliFlags(BTreeMap<String, FlagValue>);

impl CliFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.0.get(name)
    }

    /// True only when the flag is present as boolean `true`.
    pub fn is_enabled(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(FlagValue::Bool(true)))
    }
}

impl<K: Into<String>, V: Into<FlagValue>> FromIterator<(K, V)> for CliFlags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Kind of source a bundle unit is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Typescript,
    #[serde(other)]
    Other,
}

/// Data shared by every unit of one bundle run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    #[serde(default)]
    pub cli_flags: CliFlags,
}

/// The unit the host is currently assembling a pipeline for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleUnit {
    pub input_type: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
}

impl BundleUnit {
    pub fn new(input_type: InputType) -> Self {
        Self {
            input_type,
            input: None,
        }
    }
}

/// Pipeline stage handed back to the host: a transform plugin and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformStage {
    pub name: String,
    pub options: serde_json::Value,
}

/// Loader for one configuration file extension: `(path, contents) -> value`.
pub type LoaderFn = Arc<dyn Fn(&Path, &str) -> Result<serde_json::Value> + Send + Sync>;

/// Extra search places and loaders contributed to the host's config loader.
#[derive(Clone)]
pub struct LoaderExtension {
    pub search_places: Vec<String>,
    pub loaders: BTreeMap<String, LoaderFn>,
}

impl LoaderExtension {
    /// Serializable view without the loader functions.
    pub fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "searchPlaces": self.search_places,
            "loaders": self.loaders.keys().collect::<Vec<_>>(),
        })
    }
}

impl fmt::Debug for LoaderExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderExtension")
            .field("search_places", &self.search_places)
            .field("loaders", &self.loaders.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Host-side sink for errors that abort provider activation.
pub trait ErrorChannel: Send + Sync {
    fn report(&self, provider: &str, error: &PluginError);
}

/// Reports through the tracing subscriber.
#[derive(Debug, Default)]
pub struct LogErrorChannel;

impl ErrorChannel for LogErrorChannel {
    fn report(&self, provider: &str, error: &PluginError) {
        error!("{} failed to activate: {}", provider, error);
    }
}

/// Everything a provider receives from the host when it is loaded.
#[derive(Clone)]
pub struct HostContext {
    bus: Arc<dyn CapabilityBus>,
    run_id: String,
    original_cwd: PathBuf,
    errors: Arc<dyn ErrorChannel>,
    ts_loader: LoaderFn,
}

impl HostContext {
    pub fn new(bus: Arc<dyn CapabilityBus>, original_cwd: impl Into<PathBuf>) -> Self {
        Self {
            bus,
            run_id: String::new(),
            original_cwd: original_cwd.into(),
            errors: Arc::new(LogErrorChannel),
            ts_loader: Arc::new(|path: &Path, _contents: &str| -> Result<serde_json::Value> {
                Err(PluginError::ConfigError(format!(
                    "host supplied no loader for {}",
                    path.display()
                )))
            }),
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn with_error_channel(mut self, errors: Arc<dyn ErrorChannel>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_ts_loader(mut self, loader: LoaderFn) -> Self {
        self.ts_loader = loader;
        self
    }

    pub fn bus(&self) -> &dyn CapabilityBus {
        self.bus.as_ref()
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Working directory the bundler was started from.
    pub fn original_cwd(&self) -> &Path {
        &self.original_cwd
    }

    pub fn errors(&self) -> &dyn ErrorChannel {
        self.errors.as_ref()
    }

    pub fn ts_loader(&self) -> LoaderFn {
        Arc::clone(&self.ts_loader)
    }
}
