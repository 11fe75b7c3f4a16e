//! Handle registries
//!
//! Two registries back the session manager: named database handles with
//! a current/default selection, and live query subscriptions paired 1:1
//! with their change-listener tokens.
//!
//! # Invariants
//!
//! - Never two handles for the same database name
//! - Reopening a registered name switches the default selection, no I/O
//! - Removing a subscription always detaches its token first

mod database;
mod errors;
mod query;

pub use database::DatabaseRegistry;
pub use errors::{StorageError, StorageResult};
pub use query::QueryRegistry;
