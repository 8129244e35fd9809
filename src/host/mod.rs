//! Host boundary: bundle data, host context and the capability bus

pub mod bus;
pub mod context;

pub use bus::{
    CapabilityBus, CapabilityHandler, CapabilityKey, ConfigLoaderHandler, EventBus,
    InputPluginHandler, BUS_PREFIX,
};
pub use context::{
    BundleMetadata, BundleUnit, CliFlags, ErrorChannel, FlagValue, HostContext, InputType,
    LoaderExtension, LoaderFn, LogErrorChannel, TransformStage,
};
