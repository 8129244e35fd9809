//! Capability registry adapter
//!
//! Publishes the provider's two operations on the host bus:
//! - input plugin: a configured TypeScript transform for `typescript` units
//! - config loader extension: `.ts` search places for the host's config loader

use crate::config::{ConfigResolver, ResolutionRequest, IGNORE_LOCAL_CONFIG};
use crate::host::{
    BundleMetadata, BundleUnit, CapabilityBus, CapabilityHandler, CapabilityKey, FlagValue,
    HostContext, InputType, LoaderExtension, LoaderFn, TransformStage,
};
use crate::plugin::transform::{TransformFactory, TypescriptTransform, TRANSFORM_NAME};
use crate::types::{PluginError, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Package name this provider registers under.
pub const PLUGIN_NAME: &str = "@typhonjs-node-rollup/plugin-typescript";

/// Extension of configuration files the loader extension handles.
pub const CONFIG_EXTENSION: &str = ".ts";

/// Identity and published operations of a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRegistration {
    pub name: String,
    pub operations: Vec<CapabilityKey>,
    /// Providers whose functionality this one duplicates.
    pub conflicts_with: BTreeSet<String>,
}

/// A CLI flag the host should accept on behalf of this provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub default: FlagValue,
}

/// Search places for a config module: `.{name}rc.ts` and `{name}.config.ts`.
pub fn search_places(module_name: &str) -> Vec<String> {
    vec![
        format!(".{}rc{}", module_name, CONFIG_EXTENSION),
        format!("{}.config{}", module_name, CONFIG_EXTENSION),
    ]
}

/// Build the loader extension for `module_name`, which must be a JSON string.
pub fn config_loader_extension(
    module_name: &serde_json::Value,
    loader: LoaderFn,
) -> Result<LoaderExtension> {
    let module_name = module_name.as_str().ok_or_else(|| {
        PluginError::InvalidArgument(format!(
            "module name must be a string, got {}",
            module_name
        ))
    })?;

    let mut loaders = BTreeMap::new();
    loaders.insert(CONFIG_EXTENSION.to_string(), loader);

    Ok(LoaderExtension {
        search_places: search_places(module_name),
        loaders,
    })
}

/// Supplies configured TypeScript transforms to the host.
#[derive(Clone)]
pub struct PluginLoader {
    resolver: Arc<ConfigResolver>,
    transform: Arc<dyn TransformFactory>,
    ts_loader: LoaderFn,
}

impl PluginLoader {
    pub fn new(
        resolver: Arc<ConfigResolver>,
        transform: Arc<dyn TransformFactory>,
        ts_loader: LoaderFn,
    ) -> Self {
        Self {
            resolver,
            transform,
            ts_loader,
        }
    }

    /// Default probe and transform, with the host's `.ts` loader.
    pub fn from_context(ctx: &HostContext) -> Self {
        Self::new(
            Arc::new(ConfigResolver::default()),
            Arc::new(TypescriptTransform),
            ctx.ts_loader(),
        )
    }

    pub fn identity() -> CapabilityRegistration {
        CapabilityRegistration {
            name: PLUGIN_NAME.to_string(),
            operations: CapabilityKey::ALL.to_vec(),
            conflicts_with: [TRANSFORM_NAME.to_string()].into_iter().collect(),
        }
    }

    pub fn flags() -> Vec<FlagDescriptor> {
        vec![FlagDescriptor {
            name: IGNORE_LOCAL_CONFIG,
            description: "Ignore local TypeScript configuration files and use the built-in default",
            default: FlagValue::Bool(false),
        }]
    }

    /// Transform stage for `unit`, or `None` for non-TypeScript units.
    pub async fn get_input_plugin(
        &self,
        working_directory: &Path,
        bundle: &BundleMetadata,
        unit: &BundleUnit,
    ) -> Result<Option<TransformStage>> {
        if unit.input_type != InputType::Typescript {
            return Ok(None);
        }

        let request = ResolutionRequest {
            working_directory: working_directory.to_path_buf(),
            flags: bundle.cli_flags.clone(),
            input_type: unit.input_type,
        };

        let config = self.resolver.resolve(&request).await?;
        self.transform.create(&config).map(Some)
    }

    pub fn get_config_loader(&self, module_name: &serde_json::Value) -> Result<LoaderExtension> {
        config_loader_extension(module_name, Arc::clone(&self.ts_loader))
    }

    /// Subscribe both operations on `bus`.
    ///
    /// A conflict on a key is logged and the remaining keys are still
    /// registered; any other bus error aborts.
    pub fn register(
        &self,
        bus: &dyn CapabilityBus,
        working_directory: PathBuf,
    ) -> Result<CapabilityRegistration> {
        let registration = Self::identity();

        for key in &registration.operations {
            let handler = match key {
                CapabilityKey::InputPlugin => self.input_plugin_handler(working_directory.clone()),
                CapabilityKey::ConfigLoaderExtension => self.config_loader_handler(),
            };

            match bus.register(&registration.name, *key, handler) {
                Ok(()) => debug!("{} subscribed to {}", registration.name, key),
                Err(e) if e.is_conflict() => warn!("{}", e),
                Err(e) => return Err(e),
            }
        }

        Ok(registration)
    }

    fn input_plugin_handler(&self, working_directory: PathBuf) -> CapabilityHandler {
        let loader = self.clone();
        CapabilityHandler::InputPlugin(Arc::new(
            move |bundle: BundleMetadata,
                  unit: BundleUnit|
                  -> BoxFuture<'static, Result<Option<TransformStage>>> {
                let loader = loader.clone();
                let working_directory = working_directory.clone();
                async move {
                    loader
                        .get_input_plugin(&working_directory, &bundle, &unit)
                        .await
                }
                .boxed()
            },
        ))
    }

    fn config_loader_handler(&self) -> CapabilityHandler {
        let loader = self.clone();
        CapabilityHandler::ConfigLoader(Arc::new(
            move |module_name: serde_json::Value| -> BoxFuture<'static, Result<LoaderExtension>> {
                let result = loader.get_config_loader(&module_name);
                async move { result }.boxed()
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigProbe, ResolvedConfiguration};
    use crate::host::{CliFlags, EventBus};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProbe {
        found: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ConfigProbe for FixedProbe {
        async fn has_local_config(&self, _root: &Path) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.found)
        }
    }

    struct RejectingBus;

    impl CapabilityBus for RejectingBus {
        fn register(
            &self,
            provider: &str,
            key: CapabilityKey,
            _handler: CapabilityHandler,
        ) -> Result<()> {
            Err(PluginError::RegistrationConflict {
                provider: provider.to_string(),
                key: key.to_string(),
            })
        }
    }

    fn json_loader() -> LoaderFn {
        Arc::new(
            |_path: &Path, contents: &str| -> Result<serde_json::Value> {
                Ok(serde_json::from_str(contents)?)
            },
        )
    }

    fn loader_with(found: bool) -> (PluginLoader, Arc<FixedProbe>) {
        let probe = Arc::new(FixedProbe {
            found,
            calls: AtomicUsize::new(0),
        });
        let loader = PluginLoader::new(
            Arc::new(ConfigResolver::new(probe.clone())),
            Arc::new(TypescriptTransform),
            json_loader(),
        );
        (loader, probe)
    }

    #[test]
    fn test_search_places() {
        for name in ["rollup", "my-tool", "", "with space"] {
            let places = search_places(name);
            assert_eq!(places.len(), 2);
            for place in &places {
                assert!(place.contains(name));
                assert!(place.ends_with(CONFIG_EXTENSION));
            }
        }
        assert_eq!(search_places("rollup"), vec![".rolluprc.ts", "rollup.config.ts"]);
    }

    #[test]
    fn test_config_loader_rejects_non_string() {
        for value in [
            serde_json::json!(null),
            serde_json::json!(42),
            serde_json::json!(["rollup"]),
            serde_json::json!({ "name": "rollup" }),
        ] {
            let err = config_loader_extension(&value, json_loader()).unwrap_err();
            assert!(matches!(err, PluginError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_config_loader_maps_extension_to_loader() {
        let extension =
            config_loader_extension(&serde_json::json!("rollup"), json_loader()).unwrap();
        let loader = extension.loaders.get(CONFIG_EXTENSION).unwrap();
        let value = loader(Path::new("rollup.config.ts"), r#"{"a": 1}"#).unwrap();
        assert_eq!(value, serde_json::json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn test_non_typescript_unit_is_noop() {
        let (loader, probe) = loader_with(false);

        let stage = loader
            .get_input_plugin(
                Path::new("/repo"),
                &BundleMetadata::default(),
                &BundleUnit::new(InputType::Other),
            )
            .await
            .unwrap();

        assert!(stage.is_none());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_typescript_unit_gets_stage() {
        let (loader, _probe) = loader_with(true);

        let stage = loader
            .get_input_plugin(
                Path::new("/repo"),
                &BundleMetadata::default(),
                &BundleUnit::new(InputType::Typescript),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stage.name, TRANSFORM_NAME);
        assert_eq!(
            stage.options,
            ResolvedConfiguration::Empty.to_options().unwrap()
        );
    }

    #[tokio::test]
    async fn test_register_exposes_both_operations() {
        let (loader, _probe) = loader_with(false);
        let bus = EventBus::new();

        let registration = loader.register(&bus, PathBuf::from("/repo")).unwrap();
        assert_eq!(registration, PluginLoader::identity());
        assert!(registration.conflicts_with.contains(TRANSFORM_NAME));

        for key in CapabilityKey::ALL {
            assert_eq!(bus.providers(key), vec![PLUGIN_NAME]);
        }

        let bundle = BundleMetadata {
            cli_flags: CliFlags::new().with(IGNORE_LOCAL_CONFIG, true),
        };
        let stage = bus
            .trigger_input_plugin(&bundle, &BundleUnit::new(InputType::Typescript))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stage.options["tsconfig"], serde_json::json!(false));

        let extensions = bus
            .trigger_config_loader(serde_json::json!("rollup"))
            .await
            .unwrap();
        assert_eq!(extensions[0].search_places, search_places("rollup"));

        let err = bus
            .trigger_config_loader(serde_json::json!(7))
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidArgument(_)));
    }

    #[test]
    fn test_register_twice_is_not_fatal() {
        let (loader, _probe) = loader_with(false);
        let bus = EventBus::new();

        loader.register(&bus, PathBuf::from("/repo")).unwrap();
        loader.register(&bus, PathBuf::from("/repo")).unwrap();

        for key in CapabilityKey::ALL {
            assert_eq!(bus.providers(key).len(), 1);
        }
    }

    #[test]
    fn test_rejected_registration_is_warning() {
        let (loader, _probe) = loader_with(false);
        assert!(loader.register(&RejectingBus, PathBuf::from("/repo")).is_ok());
    }

    #[test]
    fn test_flags_describe_ignore_local_config() {
        let flags = PluginLoader::flags();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].name, IGNORE_LOCAL_CONFIG);
        assert_eq!(flags[0].default, FlagValue::Bool(false));
    }
}
