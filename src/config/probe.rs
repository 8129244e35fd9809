//! Local configuration discovery
//!
//! Walks the working directory looking for a project configuration file,
//! never descending into build output or dependency caches.

use crate::types::{PluginError, Result};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names that mark a directory tree as carrying its own configuration.
pub const LOCAL_CONFIG_MARKERS: &[&str] = &["tsconfig.json", "jsconfig.json"];

/// Directory names the probe never enters.
pub const SKIP_DIRS: &[&str] = &["deploy", "dist", "node_modules"];

/// Answers whether a local compiler configuration exists below a root.
#[async_trait]
pub trait ConfigProbe: Send + Sync {
    async fn has_local_config(&self, root: &Path) -> Result<bool>;
}

/// Filesystem-backed probe over a fixed marker set and skip set.
#[derive(Debug, Clone)]
pub struct DirectoryProbe {
    markers: HashSet<String>,
    skip_dirs: HashSet<String>,
}

impl DirectoryProbe {
    pub fn new<M, S>(markers: M, skip_dirs: S) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
            skip_dirs: skip_dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn markers(&self) -> &HashSet<String> {
        &self.markers
    }

    pub fn skip_dirs(&self) -> &HashSet<String> {
        &self.skip_dirs
    }
}

impl Default for DirectoryProbe {
    fn default() -> Self {
        Self::new(
            LOCAL_CONFIG_MARKERS.iter().copied(),
            SKIP_DIRS.iter().copied(),
        )
    }
}

#[async_trait]
impl ConfigProbe for DirectoryProbe {
    async fn has_local_config(&self, root: &Path) -> Result<bool> {
        has_local_config(root, &self.markers, &self.skip_dirs).await
    }
}

/// Breadth-first search for a marker file below `root`.
///
/// Entries of each directory are visited in lexical order. Only `root` being
/// unreadable is an error; unreadable subdirectories are skipped. Symlinked
/// directories are not followed.
pub async fn has_local_config(
    root: &Path,
    markers: &HashSet<String>,
    skip_dirs: &HashSet<String>,
) -> Result<bool> {
    let mut pending: VecDeque<PathBuf> = VecDeque::new();

    let root_entries = read_sorted(root).await.map_err(|source| PluginError::Filesystem {
        path: root.to_path_buf(),
        source,
    })?;
    if let Some(found) = scan(root_entries, markers, skip_dirs, &mut pending) {
        debug!("Found local configuration: {}", found.display());
        return Ok(true);
    }

    while let Some(dir) = pending.pop_front() {
        tokio::task::yield_now().await;

        let entries = match read_sorted(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
        };

        if let Some(found) = scan(entries, markers, skip_dirs, &mut pending) {
            debug!("Found local configuration: {}", found.display());
            return Ok(true);
        }
    }

    Ok(false)
}

struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

async fn read_sorted(dir: &Path) -> std::io::Result<Vec<Entry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let is_dir = entry.file_type().await?.is_dir();
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            is_dir,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Returns the first marker among `entries`, queueing traversable subdirectories.
fn scan(
    entries: Vec<Entry>,
    markers: &HashSet<String>,
    skip_dirs: &HashSet<String>,
    pending: &mut VecDeque<PathBuf>,
) -> Option<PathBuf> {
    if let Some(marker) = entries
        .iter()
        .find(|entry| !entry.is_dir && markers.contains(&entry.name))
    {
        return Some(marker.path.clone());
    }

    pending.extend(
        entries
            .into_iter()
            .filter(|entry| entry.is_dir && !skip_dirs.contains(&entry.name))
            .map(|entry| entry.path),
    );

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[tokio::test]
    async fn test_empty_tree_has_no_config() {
        let tmp = TempDir::new().unwrap();
        let probe = DirectoryProbe::default();
        assert!(!probe.has_local_config(tmp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_tree_without_marker() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "package.json");
        touch(tmp.path(), "src/index.ts");
        touch(tmp.path(), "src/lib/util.ts");

        let probe = DirectoryProbe::default();
        assert!(!probe.has_local_config(tmp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_marker_at_root() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "tsconfig.json");

        let probe = DirectoryProbe::default();
        assert!(probe.has_local_config(tmp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_nested_marker() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "packages/app/src/jsconfig.json");

        let probe = DirectoryProbe::default();
        assert!(probe.has_local_config(tmp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_marker_only_inside_skip_dirs() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "node_modules/some-lib/tsconfig.json");
        touch(tmp.path(), "dist/tsconfig.json");
        touch(tmp.path(), "deploy/nested/jsconfig.json");
        touch(tmp.path(), "src/index.ts");

        let probe = DirectoryProbe::default();
        assert!(!probe.has_local_config(tmp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_skip_dirs_match_at_any_depth() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "packages/app/node_modules/tsconfig.json");

        let probe = DirectoryProbe::default();
        assert!(!probe.has_local_config(tmp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_directory_named_like_marker_is_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("tsconfig.json")).unwrap();

        let probe = DirectoryProbe::default();
        assert!(!probe.has_local_config(tmp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_custom_sets() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "build/custom.json");

        let probe = DirectoryProbe::new(["custom.json"], ["build"]);
        assert!(!probe.has_local_config(tmp.path()).await.unwrap());

        let probe = DirectoryProbe::new(["custom.json"], Vec::<String>::new());
        assert!(probe.has_local_config(tmp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_root_is_filesystem_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does-not-exist");

        let probe = DirectoryProbe::default();
        let err = probe.has_local_config(&missing).await.unwrap_err();
        match err {
            PluginError::Filesystem { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }
}
