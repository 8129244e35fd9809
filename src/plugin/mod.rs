//! The TypeScript provider: bus adapter, transform seam and startup hook

pub mod hook;
pub mod loader;
pub mod transform;

pub use hook::{on_load, on_load_with};
pub use loader::{
    config_loader_extension, search_places, CapabilityRegistration, FlagDescriptor, PluginLoader,
    CONFIG_EXTENSION, PLUGIN_NAME,
};
pub use transform::{TransformFactory, TypescriptTransform, TRANSFORM_NAME};
