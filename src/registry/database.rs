//! Database registry
//!
//! Owns every open database handle, keyed by name, and tracks which one
//! is the current default. Opening is lazy and idempotent by name: a
//! registered name only switches the default selection, with zero
//! storage I/O. First-time opens bootstrap from a bundled prebuilt store
//! when the host ships one under `<name>.synclite`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assets::AssetResolver;
use crate::engine::{Database, DatabaseConfig, STORE_EXTENSION};
use crate::observability::Logger;

use super::errors::{StorageError, StorageResult};

/// Registry of open database handles with a default selection
#[derive(Debug)]
pub struct DatabaseRegistry {
    root: PathBuf,
    config: DatabaseConfig,
    databases: HashMap<String, Database>,
    default_name: Option<String>,
}

impl DatabaseRegistry {
    /// Create an empty registry rooted at the application-private
    /// storage directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config: DatabaseConfig::new(&root),
            root,
            databases: HashMap::new(),
            default_name: None,
        }
    }

    /// Open the database named `name`, creating it if needed, and make
    /// it the default selection.
    ///
    /// A registered name short-circuits: only the default selection
    /// changes, no storage I/O happens. Otherwise the storage root is
    /// created (recursively) if missing, and when no store exists on
    /// disk yet, a bundled prebuilt asset named `<name>.synclite` is
    /// copied into place before opening.
    pub fn open_or_create(
        &mut self,
        name: &str,
        assets: &dyn AssetResolver,
    ) -> StorageResult<()> {
        if self.databases.contains_key(name) {
            self.default_name = Some(name.to_string());
            Logger::info("DATABASE_SELECT", &[("name", name)]);
            return Ok(());
        }

        fs::create_dir_all(&self.root).map_err(|source| StorageError::RootCreation {
            path: self.root.clone(),
            source,
        })?;

        if !Database::exists(name, &self.root) {
            let asset_key = format!("{}.{}", name, STORE_EXTENSION);
            if let Some(prebuilt) = assets.lookup(&asset_key) {
                Database::copy(&prebuilt, name, &self.config).map_err(|source| {
                    StorageError::PrebuiltCopy {
                        name: name.to_string(),
                        source,
                    }
                })?;
                Logger::info("DATABASE_PREBUILT_INSTALL", &[("name", name)]);
            }
        }

        let database = Database::open(name, &self.config).map_err(|source| StorageError::Open {
            name: name.to_string(),
            source,
        })?;
        self.databases.insert(name.to_string(), database);
        self.default_name = Some(name.to_string());
        Logger::info("DATABASE_OPEN", &[("name", name)]);
        Ok(())
    }

    /// Returns the default database handle, if one is selected and open
    pub fn default_database(&self) -> Option<&Database> {
        self.databases.get(self.default_name.as_deref()?)
    }

    /// Mutable variant of [`default_database`](Self::default_database)
    pub fn default_database_mut(&mut self) -> Option<&mut Database> {
        let name = self.default_name.clone()?;
        self.databases.get_mut(&name)
    }

    /// Returns the name of the default selection
    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Look up a handle by name
    pub fn get(&self, name: &str) -> Option<&Database> {
        self.databases.get(name)
    }

    /// Close and deregister the handle for `name`.
    ///
    /// A no-op when the name is not registered. The default selection is
    /// left alone; a closed default simply makes subsequent document
    /// operations report no default database.
    pub fn close(&mut self, name: &str) {
        if let Some(mut database) = self.databases.remove(name) {
            if let Err(err) = database.close() {
                Logger::error("DATABASE_CLOSE_FAILED", &[("error", &err.to_string()), ("name", name)]);
            } else {
                Logger::info("DATABASE_CLOSE", &[("name", name)]);
            }
        }
    }

    /// Delete the store named `name` from disk, regardless of whether it
    /// is registered. Delegates to engine-level delete-by-name.
    pub fn delete(&mut self, name: &str) -> StorageResult<()> {
        Database::delete(name, &self.root).map_err(|source| StorageError::Delete {
            name: name.to_string(),
            source,
        })?;
        Logger::info("DATABASE_DELETE", &[("name", name)]);
        Ok(())
    }

    /// Build a full-text index over `properties` on the default
    /// database, accent folding enabled
    pub fn create_fulltext_index(
        &mut self,
        index_name: &str,
        properties: &[String],
    ) -> StorageResult<()> {
        let database = self
            .default_database_mut()
            .ok_or(StorageError::NoDefaultDatabase)?;
        let name = database.name().to_string();
        database
            .create_fulltext_index(index_name, properties)
            .map_err(|source| StorageError::Index { name, source })?;
        Logger::info("INDEX_CREATE", &[("index", index_name)]);
        Ok(())
    }

    /// Returns the application-private storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of registered handles
    pub fn len(&self) -> usize {
        self.databases.len()
    }

    /// Whether no handles are registered
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirectoryAssets;
    use crate::engine::Document;
    use serde_json::json;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn empty_assets() -> DirectoryAssets {
        // Points at a directory guaranteed to hold no assets
        DirectoryAssets::new(std::env::temp_dir().join("synclite-no-assets"))
    }

    #[test]
    fn test_open_registers_and_selects_default() {
        let root = TempDir::new().unwrap();
        let mut registry = DatabaseRegistry::new(root.path());

        registry.open_or_create("store1", &empty_assets()).unwrap();
        assert_eq!(registry.default_name(), Some("store1"));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("store1").is_some());
    }

    #[test]
    fn test_reopen_switches_default_without_io() {
        let root = TempDir::new().unwrap();
        let mut registry = DatabaseRegistry::new(root.path());
        registry.open_or_create("a", &empty_assets()).unwrap();
        registry.open_or_create("b", &empty_assets()).unwrap();
        assert_eq!(registry.default_name(), Some("b"));

        // Touch nothing on disk while re-selecting a registered name
        let store_dir = root.path().join(format!("a.{}", STORE_EXTENSION));
        let before = fs::metadata(&store_dir).unwrap().modified().unwrap();
        registry.open_or_create("a", &empty_assets()).unwrap();
        let after = fs::metadata(&store_dir).unwrap().modified().unwrap();

        assert_eq!(registry.default_name(), Some("a"));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            before.duration_since(SystemTime::UNIX_EPOCH).unwrap(),
            after.duration_since(SystemTime::UNIX_EPOCH).unwrap()
        );
    }

    #[test]
    fn test_prebuilt_store_copied_on_first_open_only() {
        let asset_dir = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();

        // Ship a seed store as a bundled asset
        let seed_root = TempDir::new().unwrap();
        {
            let mut seed =
                Database::open("seed", &DatabaseConfig::new(seed_root.path())).unwrap();
            seed.save_document(Document::with_id("d1", json!({"seeded": true}).as_object().unwrap().clone()))
                .unwrap();
        }
        let bundled = asset_dir.path().join(format!("store1.{}", STORE_EXTENSION));
        fs::rename(
            seed_root.path().join(format!("seed.{}", STORE_EXTENSION)),
            &bundled,
        )
        .unwrap();

        let assets = DirectoryAssets::new(asset_dir.path());
        let mut registry = DatabaseRegistry::new(root.path());
        registry.open_or_create("store1", &assets).unwrap();
        assert_eq!(registry.get("store1").unwrap().count(), 1);

        // Mutate the local copy, then close and reopen: the bundled seed
        // must not be copied over the existing store again
        registry
            .default_database_mut()
            .unwrap()
            .save_document(Document::with_id("d2", json!({}).as_object().unwrap().clone()))
            .unwrap();
        registry.close("store1");
        registry.open_or_create("store1", &assets).unwrap();
        assert_eq!(registry.get("store1").unwrap().count(), 2);
    }

    #[test]
    fn test_close_is_silent_for_unknown_name() {
        let root = TempDir::new().unwrap();
        let mut registry = DatabaseRegistry::new(root.path());
        registry.close("never-opened");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_close_keeps_other_default() {
        let root = TempDir::new().unwrap();
        let mut registry = DatabaseRegistry::new(root.path());
        registry.open_or_create("a", &empty_assets()).unwrap();
        registry.open_or_create("b", &empty_assets()).unwrap();

        registry.close("a");
        assert_eq!(registry.default_name(), Some("b"));
        assert!(registry.default_database().is_some());
    }

    #[test]
    fn test_delete_by_name_without_registration() {
        let root = TempDir::new().unwrap();
        let mut registry = DatabaseRegistry::new(root.path());
        registry.open_or_create("a", &empty_assets()).unwrap();
        registry.close("a");

        registry.delete("a").unwrap();
        assert!(!Database::exists("a", root.path()));
    }

    #[test]
    fn test_delete_unknown_surfaces_storage_error() {
        let root = TempDir::new().unwrap();
        let mut registry = DatabaseRegistry::new(root.path());
        let err = registry.delete("ghost").unwrap_err();
        assert!(matches!(err, StorageError::Delete { .. }));
    }

    #[test]
    fn test_index_requires_default_database() {
        let root = TempDir::new().unwrap();
        let mut registry = DatabaseRegistry::new(root.path());
        let err = registry
            .create_fulltext_index("idx", &["title".to_string()])
            .unwrap_err();
        assert!(matches!(err, StorageError::NoDefaultDatabase));
    }

    #[test]
    fn test_index_lands_on_default_database() {
        let root = TempDir::new().unwrap();
        let mut registry = DatabaseRegistry::new(root.path());
        registry.open_or_create("store1", &empty_assets()).unwrap();
        registry
            .create_fulltext_index("by_title", &["title".to_string()])
            .unwrap();

        let spec = &registry.get("store1").unwrap().indexes()["by_title"];
        assert!(spec.ignore_accents);
    }
}
