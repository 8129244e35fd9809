//! Shared error types

mod errors;

pub use errors::{PluginError, Result};
