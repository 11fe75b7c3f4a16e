//! Session facade
//!
//! One `SessionManager` per controlling context: composes the database
//! registry, the query registry, and the replicator controller, and
//! holds the injected asset-resolution capability.

mod manager;

pub use manager::{DocumentEnvelope, SessionConfig, SessionManager};
