//! # Replication Errors

use thiserror::Error;

/// Result type for replication operations
pub type ReplicationResult<T> = Result<T, ReplicationError>;

/// Errors surfaced by replication configuration
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// The pinned-certificate asset could not be resolved or decoded.
    /// The configuration is left unpinned when this is returned.
    #[error("certificate pinning failed for asset '{asset_key}': {reason}")]
    CertificatePinning { asset_key: String, reason: String },
}
