//! plugin-typescript - TypeScript input provider for bundling hosts
//!
//! Publishes a configured TypeScript transform and a `.ts` config-loader
//! extension on a host's capability bus. The transform either defers to the
//! project's own tsconfig.json / jsconfig.json or receives a built-in default.

pub mod config;
pub mod host;
pub mod plugin;
pub mod types;

pub use config::{ConfigResolver, ResolutionRequest, ResolvedConfiguration};
pub use host::{EventBus, HostContext};
pub use plugin::{on_load, PluginLoader};
pub use types::PluginError;
