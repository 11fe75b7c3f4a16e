//! Replication control
//!
//! One controller per session: at most one pending configuration and at
//! most one built replicator, advanced through
//! Unconfigured -> Configured -> Built -> Running <-> Stopped.
//!
//! Operations issued before their prerequisite state are permissive
//! no-ops (warn-logged), matching the embedded-store convention that
//! configuration calls never hard-fail mid-setup. Certificate pinning is
//! the exception: a bad asset is a real error the caller must see.

mod controller;
mod errors;

pub use controller::ReplicatorController;
pub use errors::{ReplicationError, ReplicationResult};
