//! Typed capability bus
//!
//! Providers publish operations under fixed capability keys; the host invokes
//! them by key. Each key accepts exactly one handler shape, checked when the
//! handler is registered.

use crate::host::context::{BundleMetadata, BundleUnit, LoaderExtension, TransformStage};
use crate::types::{PluginError, Result};
use futures::future::BoxFuture;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Vendor namespace shared by every key on the bus.
pub const BUS_PREFIX: &str = "typhonjs:oclif";

const INPUT_PLUGIN_KEY: &str = "typhonjs:oclif:bundle:plugins:main:input:get";
const CONFIG_LOADER_KEY: &str = "typhonjs:oclif:system:file:util:cosmiconfig:loader:get";

/// Capabilities a provider can expose on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKey {
    /// Supplies an input transform for a bundle unit.
    InputPlugin,
    /// Supplies search places and loaders for the host's config loader.
    ConfigLoaderExtension,
}

impl CapabilityKey {
    pub const ALL: [CapabilityKey; 2] = [
        CapabilityKey::InputPlugin,
        CapabilityKey::ConfigLoaderExtension,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKey::InputPlugin => INPUT_PLUGIN_KEY,
            CapabilityKey::ConfigLoaderExtension => CONFIG_LOADER_KEY,
        }
    }

    pub fn parse(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == key)
            .ok_or_else(|| PluginError::UnknownCapability(key.to_string()))
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CapabilityKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

pub type InputPluginHandler = Arc<
    dyn Fn(BundleMetadata, BundleUnit) -> BoxFuture<'static, Result<Option<TransformStage>>>
        + Send
        + Sync,
>;

pub type ConfigLoaderHandler =
    Arc<dyn Fn(serde_json::Value) -> BoxFuture<'static, Result<LoaderExtension>> + Send + Sync>;

/// A handler together with the operation shape it implements.
#[derive(Clone)]
pub enum CapabilityHandler {
    InputPlugin(InputPluginHandler),
    ConfigLoader(ConfigLoaderHandler),
}

impl CapabilityHandler {
    /// The only key this handler may be registered under.
    pub fn accepts(&self) -> CapabilityKey {
        match self {
            CapabilityHandler::InputPlugin(_) => CapabilityKey::InputPlugin,
            CapabilityHandler::ConfigLoader(_) => CapabilityKey::ConfigLoaderExtension,
        }
    }

    fn kind_name(key: CapabilityKey) -> &'static str {
        match key {
            CapabilityKey::InputPlugin => "input plugin",
            CapabilityKey::ConfigLoaderExtension => "config loader",
        }
    }
}

impl fmt::Debug for CapabilityHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityHandler::InputPlugin(_) => f.write_str("CapabilityHandler::InputPlugin"),
            CapabilityHandler::ConfigLoader(_) => f.write_str("CapabilityHandler::ConfigLoader"),
        }
    }
}

/// Registration side of the host's capability bus.
pub trait CapabilityBus: Send + Sync {
    /// Publish `handler` under `key` for `provider`.
    ///
    /// Fails with `RegistrationConflict` when `provider` already owns `key`.
    fn register(&self, provider: &str, key: CapabilityKey, handler: CapabilityHandler)
        -> Result<()>;
}

struct Subscription {
    provider: String,
    key: CapabilityKey,
    handler: CapabilityHandler,
}

/// In-memory capability bus.
#[derive(Default)]
pub struct EventBus {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register by raw key string, as a dynamically-typed host would.
    pub fn on(&self, provider: &str, key: &str, handler: CapabilityHandler) -> Result<()> {
        self.register(provider, CapabilityKey::parse(key)?, handler)
    }

    /// Providers subscribed to `key`, in registration order.
    pub fn providers(&self, key: CapabilityKey) -> Vec<String> {
        self.read()
            .iter()
            .filter(|sub| sub.key == key)
            .map(|sub| sub.provider.clone())
            .collect()
    }

    /// First stage any provider supplies for `unit`.
    pub async fn trigger_input_plugin(
        &self,
        bundle: &BundleMetadata,
        unit: &BundleUnit,
    ) -> Result<Option<TransformStage>> {
        for handler in self.input_plugin_handlers() {
            if let Some(stage) = handler(bundle.clone(), unit.clone()).await? {
                return Ok(Some(stage));
            }
        }

        Ok(None)
    }

    /// Loader extensions from every subscribed provider.
    pub async fn trigger_config_loader(
        &self,
        module_name: serde_json::Value,
    ) -> Result<Vec<LoaderExtension>> {
        let mut extensions = Vec::new();

        for handler in self.config_loader_handlers() {
            extensions.push(handler(module_name.clone()).await?);
        }

        Ok(extensions)
    }

    fn input_plugin_handlers(&self) -> Vec<InputPluginHandler> {
        self.read()
            .iter()
            .filter_map(|sub| match &sub.handler {
                CapabilityHandler::InputPlugin(handler) => Some(Arc::clone(handler)),
                CapabilityHandler::ConfigLoader(_) => None,
            })
            .collect()
    }

    fn config_loader_handlers(&self) -> Vec<ConfigLoaderHandler> {
        self.read()
            .iter()
            .filter_map(|sub| match &sub.handler {
                CapabilityHandler::ConfigLoader(handler) => Some(Arc::clone(handler)),
                CapabilityHandler::InputPlugin(_) => None,
            })
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Subscription>> {
        self.subscriptions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CapabilityBus for EventBus {
    fn register(
        &self,
        provider: &str,
        key: CapabilityKey,
        handler: CapabilityHandler,
    ) -> Result<()> {
        if handler.accepts() != key {
            return Err(PluginError::HandlerMismatch {
                key: key.to_string(),
                expected: CapabilityHandler::kind_name(key).to_string(),
            });
        }

        let mut subscriptions = self
            .subscriptions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if subscriptions
            .iter()
            .any(|sub| sub.provider == provider && sub.key == key)
        {
            return Err(PluginError::RegistrationConflict {
                provider: provider.to_string(),
                key: key.to_string(),
            });
        }

        debug!("Registered {} for {}", key, provider);
        subscriptions.push(Subscription {
            provider: provider.to_string(),
            key,
            handler,
        });

        Ok(())
    }
}
