//! Startup hook run once by the host

use crate::host::HostContext;
use crate::plugin::loader::{CapabilityRegistration, PluginLoader, PLUGIN_NAME};
use crate::types::Result;
use path_clean::PathClean;
use tracing::debug;

/// Wire the default provider onto the host's bus.
pub fn on_load(ctx: &HostContext) -> Result<CapabilityRegistration> {
    on_load_with(ctx, PluginLoader::from_context(ctx))
}

/// Wire `loader` onto the host's bus.
///
/// Errors are reported on the host's error channel and returned; activation
/// does not proceed.
pub fn on_load_with(ctx: &HostContext, loader: PluginLoader) -> Result<CapabilityRegistration> {
    let working_directory = ctx.original_cwd().clean();

    match loader.register(ctx.bus(), working_directory) {
        Ok(registration) => {
            debug!("{} init hook running '{}'", PLUGIN_NAME, ctx.run_id());
            Ok(registration)
        }
        Err(e) => {
            ctx.errors().report(PLUGIN_NAME, &e);
            Err(e)
        }
    }
}
