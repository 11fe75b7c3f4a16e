//! Embedded store capability layer
//!
//! The session manager treats the document store as an opaque capability:
//! named databases it can open, copy, and delete; queries it can attach
//! change listeners to; a replicator it can build from a configuration
//! snapshot. This module supplies that boundary.
//!
//! # Design Principles
//!
//! - One directory per database under the application-private root
//! - Schema-less JSON documents, latest write wins per id
//! - Listener tokens are single-owner, released exactly once
//! - Replicator state machine only; network sync lives outside this crate

mod database;
mod document;
mod errors;
mod query;
mod replicator;

pub use database::{Database, DatabaseConfig, FullTextIndexSpec, STORE_EXTENSION};
pub use document::Document;
pub use errors::{EngineError, EngineResult};
pub use query::{ListenerToken, Query, QueryChange};
pub use replicator::{
    Authenticator, Certificate, Direction, Replicator, ReplicatorConfig, ReplicatorState,
};
