//! Configuration for the TypeScript transform
//!
//! Resolution order:
//! 1. `ignore-local-config` flag: built-in default
//! 2. Local tsconfig.json / jsconfig.json: defer to it
//! 3. Built-in default

mod defaults;
mod probe;
mod resolver;
mod user_config;

pub use defaults::{
    build_default, CompilerOptions, CompilerRef, DEFAULT_COMPILER_MODULE, DEFAULT_LIBS,
    DEFAULT_TARGET,
};
pub use probe::{has_local_config, ConfigProbe, DirectoryProbe, LOCAL_CONFIG_MARKERS, SKIP_DIRS};
pub use resolver::{ConfigResolver, ResolutionRequest, ResolvedConfiguration, IGNORE_LOCAL_CONFIG};
pub use user_config::{Settings, UserConfig, CONFIG_ENV_VAR, PROJECT_CONFIG_FILE};
