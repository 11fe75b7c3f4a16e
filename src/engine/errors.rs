//! # Engine Errors
//!
//! Error types for the embedded store capability layer.

use std::io;

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the embedded store
#[derive(Debug, Error)]
pub enum EngineError {
    /// Underlying filesystem failure
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// Store contents could not be decoded
    #[error("store is corrupt: {0}")]
    Corrupt(String),

    /// No store exists under the given name
    #[error("no database named '{0}'")]
    NotFound(String),

    /// Operation issued against a closed handle
    #[error("database '{0}' is closed")]
    Closed(String),

    /// Certificate bytes could not be decoded as PEM or DER
    #[error("invalid certificate data: {0}")]
    InvalidCertificate(String),
}
