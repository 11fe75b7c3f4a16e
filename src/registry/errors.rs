//! # Storage Errors
//!
//! Error types for database registry operations. Directory-creation
//! failure is a recoverable error here, never process termination.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;

/// Result type for registry operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by database registry operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// The application-private storage root could not be created
    #[error("could not create storage root {path}: {source}")]
    RootCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A bundled prebuilt store could not be copied into place
    #[error("could not install prebuilt store for '{name}': {source}")]
    PrebuiltCopy {
        name: String,
        #[source]
        source: EngineError,
    },

    /// The store could not be opened or created
    #[error("could not open database '{name}': {source}")]
    Open {
        name: String,
        #[source]
        source: EngineError,
    },

    /// The store could not be removed from disk
    #[error("could not delete database '{name}': {source}")]
    Delete {
        name: String,
        #[source]
        source: EngineError,
    },

    /// Index creation failed on the default database
    #[error("index build failed on '{name}': {source}")]
    Index {
        name: String,
        #[source]
        source: EngineError,
    },

    /// A document write was rejected by the engine
    #[error("write failed on database '{name}': {source}")]
    Write {
        name: String,
        #[source]
        source: EngineError,
    },

    /// A document or index operation was issued with no default selected
    #[error("no default database selected")]
    NoDefaultDatabase,
}
