//! Database handles
//!
//! A database is one directory per name under the application-private
//! root: `<root>/<name>.synclite/`. Documents live in `documents.json`
//! (id -> body, latest write wins), index definitions in `indexes.json`.
//! Writes go through a temp file and rename so a crashed write never
//! leaves a half-written store behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::Document;
use super::errors::{EngineError, EngineResult};

/// Filename extension for on-disk stores
pub const STORE_EXTENSION: &str = "synclite";

const DOCUMENTS_FILE: &str = "documents.json";
const INDEXES_FILE: &str = "indexes.json";

/// Open-time configuration for a database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Application-private root the store directory lives under
    pub directory: PathBuf,
}

impl DatabaseConfig {
    /// Create a configuration rooted at the given directory
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

/// Definition of a full-text index over document properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullTextIndexSpec {
    /// Document properties covered by the index
    pub properties: Vec<String>,
    /// Whether accents are folded during tokenization
    pub ignore_accents: bool,
}

/// An open handle to a named store
#[derive(Debug)]
pub struct Database {
    name: String,
    directory: PathBuf,
    documents: BTreeMap<String, Map<String, Value>>,
    indexes: BTreeMap<String, FullTextIndexSpec>,
    closed: bool,
}

impl Database {
    /// Open the store named `name`, creating it if absent
    pub fn open(name: &str, config: &DatabaseConfig) -> EngineResult<Database> {
        let directory = Self::store_path(name, &config.directory);
        fs::create_dir_all(&directory)?;

        let documents = match Self::load_json(&directory.join(DOCUMENTS_FILE))? {
            Some(docs) => docs,
            None => BTreeMap::new(),
        };
        let indexes = match Self::load_json(&directory.join(INDEXES_FILE))? {
            Some(specs) => specs,
            None => BTreeMap::new(),
        };

        Ok(Database {
            name: name.to_string(),
            directory,
            documents,
            indexes,
            closed: false,
        })
    }

    /// Whether a store named `name` exists under `root`
    pub fn exists(name: &str, root: &Path) -> bool {
        Self::store_path(name, root).exists()
    }

    /// Copy a prebuilt store into place under `name`.
    ///
    /// `from` is either a store directory (copied verbatim) or a single
    /// seed file holding the document map (installed as the store's
    /// document file). Callers only invoke this when the target store
    /// does not exist yet.
    pub fn copy(from: &Path, name: &str, config: &DatabaseConfig) -> EngineResult<()> {
        let dest = Self::store_path(name, &config.directory);
        if from.is_dir() {
            copy_tree(from, &dest)?;
        } else {
            fs::create_dir_all(&dest)?;
            fs::copy(from, dest.join(DOCUMENTS_FILE))?;
        }
        Ok(())
    }

    /// Delete the store named `name`, handle-independent
    pub fn delete(name: &str, root: &Path) -> EngineResult<()> {
        let path = Self::store_path(name, root);
        if !path.exists() {
            return Err(EngineError::NotFound(name.to_string()));
        }
        fs::remove_dir_all(&path)?;
        Ok(())
    }

    /// Returns the store name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the store directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Save a document, overwriting any prior revision with the same id
    pub fn save_document(&mut self, document: Document) -> EngineResult<String> {
        self.ensure_open()?;
        let id = document.id().to_string();
        self.documents.insert(id.clone(), document.into_body());
        self.persist_documents()?;
        Ok(id)
    }

    /// Fetch a document by id
    pub fn document_with_id(&self, id: &str) -> Option<Document> {
        self.documents
            .get(id)
            .map(|body| Document::with_id(id, body.clone()))
    }

    /// Number of documents in the store
    pub fn count(&self) -> u64 {
        self.documents.len() as u64
    }

    /// Create (or replace) a full-text index over the given properties.
    /// Accent folding is always enabled.
    pub fn create_fulltext_index(&mut self, name: &str, properties: &[String]) -> EngineResult<()> {
        self.ensure_open()?;
        self.indexes.insert(
            name.to_string(),
            FullTextIndexSpec {
                properties: properties.to_vec(),
                ignore_accents: true,
            },
        );
        self.persist_indexes()
    }

    /// Returns the index definitions, keyed by index name
    pub fn indexes(&self) -> &BTreeMap<String, FullTextIndexSpec> {
        &self.indexes
    }

    /// Close the handle. Subsequent writes fail with `EngineError::Closed`.
    pub fn close(&mut self) -> EngineResult<()> {
        if self.closed {
            return Ok(());
        }
        self.persist_documents()?;
        self.persist_indexes()?;
        self.closed = true;
        Ok(())
    }

    /// Whether the handle has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> EngineResult<()> {
        if self.closed {
            return Err(EngineError::Closed(self.name.clone()));
        }
        Ok(())
    }

    fn store_path(name: &str, root: &Path) -> PathBuf {
        root.join(format!("{}.{}", name, STORE_EXTENSION))
    }

    fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read(path)?;
        let value = serde_json::from_slice(&raw)
            .map_err(|e| EngineError::Corrupt(format!("{}: {}", path.display(), e)))?;
        Ok(Some(value))
    }

    fn persist_documents(&self) -> EngineResult<()> {
        self.write_json(DOCUMENTS_FILE, &self.documents)
    }

    fn persist_indexes(&self) -> EngineResult<()> {
        self.write_json(INDEXES_FILE, &self.indexes)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> EngineResult<()> {
        let path = self.directory.join(file);
        let tmp = self.directory.join(format!("{}.tmp", file));
        let raw = serde_json::to_vec_pretty(value)
            .map_err(|e| EngineError::Corrupt(e.to_string()))?;
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Recursively copy a directory tree
fn copy_tree(from: &Path, to: &Path) -> EngineResult<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}
