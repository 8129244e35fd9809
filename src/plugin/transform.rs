//! Construction of the external TypeScript transform

use crate::config::ResolvedConfiguration;
use crate::host::TransformStage;
use crate::types::Result;

/// Name of the raw transform this provider configures.
pub const TRANSFORM_NAME: &str = "@rollup/plugin-typescript";

/// Builds the pipeline stage for a resolved configuration.
pub trait TransformFactory: Send + Sync {
    fn create(&self, config: &ResolvedConfiguration) -> Result<TransformStage>;
}

/// Hands the configuration to `@rollup/plugin-typescript` as its option object.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypescriptTransform;

impl TransformFactory for TypescriptTransform {
    fn create(&self, config: &ResolvedConfiguration) -> Result<TransformStage> {
        Ok(TransformStage {
            name: TRANSFORM_NAME.to_string(),
            options: config.to_options()?,
        })
    }
}
