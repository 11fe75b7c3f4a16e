//! synclite - session manager for an embedded document store with sync
//!
//! Mediates between a host application and a document-oriented embedded
//! store with bidirectional replication. Tracks open database handles,
//! live query subscriptions with change-listener tokens, and a single
//! configurable replicator.

pub mod assets;
pub mod engine;
pub mod observability;
pub mod registry;
pub mod replication;
pub mod session;
