//! Built-in default compiler configuration
//!
//! Supplied to the transform when no local `tsconfig.json` / `jsconfig.json`
//! is reachable from the working directory, or when the caller forces it.

use serde::{Deserialize, Serialize};

/// Library set handed to the compiler, in order.
pub const DEFAULT_LIBS: &[&str] = &["dom", "es6", "es2020"];

/// Language level the compiler emits.
pub const DEFAULT_TARGET: &str = "es2020";

/// Module the transform loads the compiler from.
pub const DEFAULT_COMPILER_MODULE: &str = "typescript";

/// Reference to the compiler toolchain the transform should use.
///
/// Opaque to this crate: only the transform resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilerRef {
    module: String,
}

impl CompilerRef {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }
}

/// Explicit compiler options passed to the transform.
///
/// Field names follow the transform's option object so the value can be
/// serialized straight into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    pub lib: Vec<String>,
    pub target: String,
    /// `false` disables the transform's own project-file discovery.
    #[serde(rename = "tsconfig")]
    pub use_project_file: bool,
    #[serde(rename = "typescript")]
    pub compiler: CompilerRef,
}

/// Build a fresh copy of the default configuration.
pub fn build_default() -> CompilerOptions {
    CompilerOptions {
        lib: DEFAULT_LIBS.iter().map(|lib| lib.to_string()).collect(),
        target: DEFAULT_TARGET.to_string(),
        use_project_file: false,
        compiler: CompilerRef::new(DEFAULT_COMPILER_MODULE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default() {
        let config = build_default();
        assert_eq!(config.lib, vec!["dom", "es6", "es2020"]);
        assert_eq!(config.target, "es2020");
        assert!(!config.use_project_file);
        assert_eq!(config.compiler.module(), "typescript");
    }

    #[test]
    fn test_default_copies_are_independent() {
        let mut first = build_default();
        let second = build_default();
        assert_eq!(first, second);

        first.lib.push("esnext".to_string());
        first.target = "es5".to_string();

        assert_eq!(second, build_default());
        assert_ne!(first, second);
    }

    #[test]
    fn test_serializes_as_transform_options() {
        let value = serde_json::to_value(build_default()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "lib": ["dom", "es6", "es2020"],
                "target": "es2020",
                "tsconfig": false,
                "typescript": "typescript"
            })
        );
    }
}
