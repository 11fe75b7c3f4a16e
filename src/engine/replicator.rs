//! Replicator configuration and state machine
//!
//! A `Replicator` is built from exactly one `ReplicatorConfig` snapshot
//! and then only moves through {Idle, Running, Stopped}. The network
//! sync protocol itself lives outside this crate; what matters here is
//! that state transitions are explicit and the configuration snapshot is
//! immutable once built.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use super::errors::{EngineError, EngineResult};

/// Sync directionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Local changes pushed to the endpoint
    Push,
    /// Remote changes pulled from the endpoint (default)
    #[default]
    Pull,
    /// Both directions
    PushAndPull,
}

impl Direction {
    /// Canonical token form
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Push => "PUSH",
            Direction::Pull => "PULL",
            Direction::PushAndPull => "PUSH_AND_PULL",
        }
    }

    /// Parse a direction token. Unrecognized input coerces to `Pull`.
    pub fn from_token(token: &str) -> Direction {
        match token {
            "PUSH" => Direction::Push,
            "PUSH_AND_PULL" => Direction::PushAndPull,
            _ => Direction::Pull,
        }
    }
}

/// Credentials presented to the sync endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Authenticator {
    /// No credentials (default)
    #[default]
    None,
    /// HTTP basic credentials
    Basic { username: String, password: String },
    /// Pre-established session token
    Session { token: String },
}

/// A certificate the replicator must match during transport negotiation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    /// Decode certificate bytes: a PEM body is base64-decoded to DER,
    /// anything else is taken as raw DER. Empty input is rejected.
    pub fn from_bytes(raw: &[u8]) -> EngineResult<Certificate> {
        if raw.is_empty() {
            return Err(EngineError::InvalidCertificate("empty input".to_string()));
        }

        let text = std::str::from_utf8(raw).ok();
        if let Some(text) = text {
            if text.contains("-----BEGIN") {
                let body: String = text
                    .lines()
                    .filter(|line| !line.starts_with("-----"))
                    .collect();
                let der = BASE64
                    .decode(body.trim())
                    .map_err(|e| EngineError::InvalidCertificate(e.to_string()))?;
                if der.is_empty() {
                    return Err(EngineError::InvalidCertificate(
                        "PEM body is empty".to_string(),
                    ));
                }
                return Ok(Certificate { der });
            }
        }

        Ok(Certificate { der: raw.to_vec() })
    }

    /// Returns the DER-encoded certificate bytes
    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

/// Replicator configuration, mutable until a replicator is built from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicatorConfig {
    /// Name of the source database
    pub database: String,
    /// Target endpoint URL
    pub endpoint: String,
    /// Sync directionality
    pub direction: Direction,
    /// Credentials presented to the endpoint
    pub authenticator: Authenticator,
    /// Certificate pinned for transport negotiation, if any
    pub pinned_certificate: Option<Certificate>,
    /// Whether sync keeps running after the initial pass
    pub continuous: bool,
}

impl ReplicatorConfig {
    /// Create a configuration with default direction (PULL), no
    /// credentials, no pinned certificate, one-shot sync
    pub fn new(database: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            endpoint: endpoint.into(),
            direction: Direction::default(),
            authenticator: Authenticator::default(),
            pinned_certificate: None,
            continuous: false,
        }
    }
}

/// Replicator lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicatorState {
    /// Built, never started
    Idle,
    /// Sync activity in progress
    Running,
    /// Halted by `stop`
    Stopped,
}

impl ReplicatorState {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicatorState::Idle => "IDLE",
            ReplicatorState::Running => "RUNNING",
            ReplicatorState::Stopped => "STOPPED",
        }
    }
}

/// A replicator instance bound to one configuration snapshot
#[derive(Debug)]
pub struct Replicator {
    config: ReplicatorConfig,
    state: ReplicatorState,
}

impl Replicator {
    /// Build a replicator from a configuration snapshot
    pub fn new(config: ReplicatorConfig) -> Self {
        Self {
            config,
            state: ReplicatorState::Idle,
        }
    }

    /// Returns the configuration snapshot this instance was built from
    pub fn config(&self) -> &ReplicatorConfig {
        &self.config
    }

    /// Returns the current lifecycle state
    pub fn state(&self) -> ReplicatorState {
        self.state
    }

    /// Begin sync activity. Idle or Stopped moves to Running;
    /// starting a running replicator is a no-op.
    pub fn start(&mut self) {
        self.state = ReplicatorState::Running;
    }

    /// Halt sync activity. Idempotent; in-flight work is not cut short
    /// synchronously, callers observe the engine's state notifications.
    pub fn stop(&mut self) {
        self.state = ReplicatorState::Stopped;
    }
}
