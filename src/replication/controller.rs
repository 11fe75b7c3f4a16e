//! Replicator controller
//!
//! Holds the pending `ReplicatorConfig` and the built `Replicator`.
//! `set_endpoint` always starts a fresh configuration; every other
//! setter mutates it in place and takes effect on the next `build`.
//! Building replaces a previously built instance without stopping it;
//! stopping the old instance stays the caller's responsibility.

use std::fs;

use crate::assets::AssetResolver;
use crate::engine::{Authenticator, Certificate, Direction, Replicator, ReplicatorConfig};
use crate::observability::Logger;

use super::errors::{ReplicationError, ReplicationResult};

/// Configuration/build/run state machine for the session's replicator
#[derive(Debug, Default)]
pub struct ReplicatorController {
    config: Option<ReplicatorConfig>,
    replicator: Option<Replicator>,
}

impl ReplicatorController {
    /// Create an unconfigured controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh configuration targeting `endpoint` with `source` as
    /// the source database.
    ///
    /// Overwrites any prior configuration entirely: direction, auth,
    /// pinning, and continuity reset to their defaults. A no-op when
    /// `source` is `None` (no default database selected).
    pub fn set_endpoint(&mut self, endpoint: &str, source: Option<&str>) {
        let Some(source) = source else {
            Logger::warn("REPLICATOR_NO_DATABASE", &[("endpoint", endpoint)]);
            return;
        };
        self.config = Some(ReplicatorConfig::new(source, endpoint));
        Logger::info(
            "REPLICATOR_CONFIGURE",
            &[("database", source), ("endpoint", endpoint)],
        );
    }

    /// Set sync directionality from a token (PUSH, PULL, PUSH_AND_PULL;
    /// anything else coerces to PULL).
    ///
    /// Returns the canonical token of the resulting direction, or the
    /// empty string when no configuration exists yet.
    pub fn set_direction(&mut self, kind: &str) -> String {
        let Some(config) = self.config.as_mut() else {
            Logger::warn("REPLICATOR_NOT_CONFIGURED", &[("op", "set_direction")]);
            return String::new();
        };
        config.direction = Direction::from_token(kind);
        config.direction.as_str().to_string()
    }

    /// Install basic credentials, overwriting any prior authenticator.
    /// A no-op when unconfigured.
    pub fn set_auth(&mut self, username: &str, password: &str) {
        let Some(config) = self.config.as_mut() else {
            Logger::warn("REPLICATOR_NOT_CONFIGURED", &[("op", "set_auth")]);
            return;
        };
        config.authenticator = Authenticator::Basic {
            username: username.to_string(),
            password: password.to_string(),
        };
    }

    /// Install a session token, overwriting any prior authenticator.
    /// A no-op on an empty token or when unconfigured.
    pub fn set_session_auth(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        let Some(config) = self.config.as_mut() else {
            Logger::warn("REPLICATOR_NOT_CONFIGURED", &[("op", "set_session_auth")]);
            return;
        };
        config.authenticator = Authenticator::Session {
            token: token.to_string(),
        };
    }

    /// Pin the transport certificate shipped under `asset_key`.
    ///
    /// The key resolves through the injected AssetResolver; a missing
    /// asset, unreadable file, or undecodable certificate fails with
    /// `CertificatePinning` and leaves the configuration unpinned.
    /// Silently succeeds without effect when unconfigured.
    pub fn set_pinned_certificate(
        &mut self,
        asset_key: &str,
        assets: &dyn AssetResolver,
    ) -> ReplicationResult<()> {
        let Some(config) = self.config.as_mut() else {
            Logger::warn(
                "REPLICATOR_NOT_CONFIGURED",
                &[("op", "set_pinned_certificate")],
            );
            return Ok(());
        };

        let path = assets.lookup(asset_key).ok_or_else(|| {
            ReplicationError::CertificatePinning {
                asset_key: asset_key.to_string(),
                reason: "asset not found".to_string(),
            }
        })?;
        let raw = fs::read(&path).map_err(|e| ReplicationError::CertificatePinning {
            asset_key: asset_key.to_string(),
            reason: e.to_string(),
        })?;
        let certificate =
            Certificate::from_bytes(&raw).map_err(|e| ReplicationError::CertificatePinning {
                asset_key: asset_key.to_string(),
                reason: e.to_string(),
            })?;

        config.pinned_certificate = Some(certificate);
        Logger::info("REPLICATOR_PIN_CERTIFICATE", &[("asset", asset_key)]);
        Ok(())
    }

    /// Set the continuity flag. A no-op when unconfigured.
    pub fn set_continuous(&mut self, continuous: bool) {
        let Some(config) = self.config.as_mut() else {
            Logger::warn("REPLICATOR_NOT_CONFIGURED", &[("op", "set_continuous")]);
            return;
        };
        config.continuous = continuous;
    }

    /// Build a replicator from the current configuration snapshot.
    ///
    /// A no-op when unconfigured. A previously built instance is
    /// replaced, not stopped.
    pub fn build(&mut self) {
        let Some(config) = self.config.as_ref() else {
            Logger::warn("REPLICATOR_NOT_CONFIGURED", &[("op", "build")]);
            return;
        };
        if self.replicator.is_some() {
            Logger::warn("REPLICATOR_REBUILD", &[("endpoint", &config.endpoint)]);
        }
        self.replicator = Some(Replicator::new(config.clone()));
        Logger::info("REPLICATOR_BUILD", &[("endpoint", &config.endpoint)]);
    }

    /// Begin sync activity. A no-op when nothing is built.
    pub fn start(&mut self) {
        let Some(replicator) = self.replicator.as_mut() else {
            Logger::warn("REPLICATOR_NOT_BUILT", &[("op", "start")]);
            return;
        };
        replicator.start();
        Logger::info(
            "REPLICATOR_START",
            &[("endpoint", &replicator.config().endpoint)],
        );
    }

    /// Halt sync activity. Idempotent; a no-op when nothing is built.
    pub fn stop(&mut self) {
        let Some(replicator) = self.replicator.as_mut() else {
            Logger::warn("REPLICATOR_NOT_BUILT", &[("op", "stop")]);
            return;
        };
        replicator.stop();
        Logger::info(
            "REPLICATOR_STOP",
            &[("endpoint", &replicator.config().endpoint)],
        );
    }

    /// Returns the built replicator, if any
    pub fn current(&self) -> Option<&Replicator> {
        self.replicator.as_ref()
    }

    /// Returns the pending configuration, if any
    pub fn config(&self) -> Option<&ReplicatorConfig> {
        self.config.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirectoryAssets;
    use crate::engine::ReplicatorState;
    use tempfile::TempDir;

    fn configured() -> ReplicatorController {
        let mut controller = ReplicatorController::new();
        controller.set_endpoint("wss://sync.example/db", Some("store1"));
        controller
    }

    #[test]
    fn test_endpoint_requires_default_database() {
        let mut controller = ReplicatorController::new();
        controller.set_endpoint("wss://sync.example/db", None);
        assert!(controller.config().is_none());
    }

    #[test]
    fn test_endpoint_resets_prior_settings() {
        let mut controller = configured();
        controller.set_direction("PUSH");
        controller.set_auth("user", "pass");
        controller.set_continuous(true);

        controller.set_endpoint("wss://other.example/db", Some("store1"));
        let config = controller.config().unwrap();
        assert_eq!(config.direction, Direction::Pull);
        assert_eq!(config.authenticator, Authenticator::None);
        assert!(!config.continuous);
        assert_eq!(config.endpoint, "wss://other.example/db");
    }

    #[test]
    fn test_direction_round_trips_canonical_tokens() {
        let mut controller = configured();
        assert_eq!(controller.set_direction("PUSH"), "PUSH");
        assert_eq!(controller.set_direction("PULL"), "PULL");
        assert_eq!(controller.set_direction("PUSH_AND_PULL"), "PUSH_AND_PULL");
        assert_eq!(controller.set_direction("bogus"), "PULL");
    }

    #[test]
    fn test_direction_unconfigured_yields_empty_string() {
        let mut controller = ReplicatorController::new();
        assert_eq!(controller.set_direction("PUSH"), "");
    }

    #[test]
    fn test_auth_overwrites_session_auth_and_back() {
        let mut controller = configured();

        controller.set_session_auth("token-1");
        assert!(matches!(
            controller.config().unwrap().authenticator,
            Authenticator::Session { .. }
        ));

        controller.set_auth("user", "pass");
        assert!(matches!(
            controller.config().unwrap().authenticator,
            Authenticator::Basic { .. }
        ));

        controller.set_session_auth("token-2");
        assert!(matches!(
            controller.config().unwrap().authenticator,
            Authenticator::Session { .. }
        ));
    }

    #[test]
    fn test_empty_session_token_is_ignored() {
        let mut controller = configured();
        controller.set_auth("user", "pass");
        controller.set_session_auth("");
        assert!(matches!(
            controller.config().unwrap().authenticator,
            Authenticator::Basic { .. }
        ));
    }

    #[test]
    fn test_pinning_missing_asset_fails_and_leaves_unpinned() {
        let dir = TempDir::new().unwrap();
        let assets = DirectoryAssets::new(dir.path());

        let mut controller = configured();
        let err = controller
            .set_pinned_certificate("bad-key", &assets)
            .unwrap_err();
        assert!(matches!(err, ReplicationError::CertificatePinning { .. }));
        assert!(controller.config().unwrap().pinned_certificate.is_none());
    }

    #[test]
    fn test_pinning_installs_certificate() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sync.pem"), b"\x30\x82\x01\x0a").unwrap();
        let assets = DirectoryAssets::new(dir.path());

        let mut controller = configured();
        controller.set_pinned_certificate("sync.pem", &assets).unwrap();
        assert!(controller.config().unwrap().pinned_certificate.is_some());
    }

    #[test]
    fn test_pinning_unconfigured_is_silent() {
        let dir = TempDir::new().unwrap();
        let assets = DirectoryAssets::new(dir.path());

        let mut controller = ReplicatorController::new();
        controller.set_pinned_certificate("bad-key", &assets).unwrap();
        assert!(controller.config().is_none());
    }

    #[test]
    fn test_build_without_endpoint_is_noop() {
        let mut controller = ReplicatorController::new();
        controller.build();
        assert!(controller.current().is_none());
    }

    #[test]
    fn test_build_start_stop_cycle() {
        let mut controller = configured();
        controller.set_direction("PUSH_AND_PULL");
        controller.set_continuous(true);
        controller.build();

        let built = controller.current().unwrap();
        assert_eq!(built.state(), ReplicatorState::Idle);
        assert_eq!(built.config().direction, Direction::PushAndPull);
        assert!(built.config().continuous);

        controller.start();
        assert_eq!(controller.current().unwrap().state(), ReplicatorState::Running);

        controller.stop();
        assert_eq!(controller.current().unwrap().state(), ReplicatorState::Stopped);
    }

    #[test]
    fn test_stop_before_start_is_noop() {
        let mut controller = ReplicatorController::new();
        controller.stop();
        assert!(controller.current().is_none());

        let mut built = configured();
        built.build();
        built.stop();
        assert_eq!(built.current().unwrap().state(), ReplicatorState::Stopped);
    }

    #[test]
    fn test_setters_after_build_take_effect_on_next_build() {
        let mut controller = configured();
        controller.build();
        controller.set_direction("PUSH");

        // Built snapshot is unaffected until rebuilt
        assert_eq!(controller.current().unwrap().config().direction, Direction::Pull);
        controller.build();
        assert_eq!(controller.current().unwrap().config().direction, Direction::Push);
    }
}
