//! Observability subsystem for synclite
//!
//! - Structured logs (JSON), one line per event
//! - Deterministic key ordering
//! - Synchronous, no buffering
//! - Runtime-adjustable minimum severity

mod logger;

pub use logger::{Logger, Severity};
