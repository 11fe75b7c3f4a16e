//! Asset resolution capability
//!
//! The host application ships bundled assets (prebuilt seed databases,
//! pinned certificates) under logical keys. The session manager never
//! touches the bundle layout directly; it resolves keys through this
//! capability, injected at construction time.

use std::path::{Path, PathBuf};

/// Resolves a logical asset key to a filesystem path.
///
/// Returning `None` means the bundle carries no asset under that key.
pub trait AssetResolver {
    /// Look up the path for a bundled asset key
    fn lookup(&self, key: &str) -> Option<PathBuf>;
}

/// Stock resolver backed by a flat asset directory.
///
/// A key resolves to `<root>/<key>` when that path exists on disk.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    /// Create a resolver over the given asset directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the asset directory root
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetResolver for DirectoryAssets {
    fn lookup(&self, key: &str) -> Option<PathBuf> {
        let candidate = self.root.join(key);
        if candidate.exists() {
            Some(candidate)
        } else {
            None
        }
    }
}
