//! Auth configuration and shared request state.

use std::sync::Arc;

use secrecy::SecretString;

use super::stage::StageTokenIssuer;
use crate::storage::{CredentialStore, NonceLedger};

const DEFAULT_PASSWORD_OK_TTL_SECONDS: i64 = 5 * 60;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 4 * 60 * 60;
const DEFAULT_NONCE_TTL_SECONDS: i64 = 10 * 60;
const DEFAULT_MAX_VOICE_ATTEMPTS: i32 = 3;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    password_ok_ttl_seconds: i64,
    session_ttl_seconds: i64,
    nonce_ttl_seconds: i64,
    max_voice_attempts: i32,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            password_ok_ttl_seconds: DEFAULT_PASSWORD_OK_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            nonce_ttl_seconds: DEFAULT_NONCE_TTL_SECONDS,
            max_voice_attempts: DEFAULT_MAX_VOICE_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_password_ok_ttl_seconds(mut self, seconds: i64) -> Self {
        self.password_ok_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_nonce_ttl_seconds(mut self, seconds: i64) -> Self {
        self.nonce_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_max_voice_attempts(mut self, attempts: i32) -> Self {
        self.max_voice_attempts = attempts;
        self
    }

    #[must_use]
    pub fn password_ok_ttl_seconds(&self) -> i64 {
        self.password_ok_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn nonce_ttl_seconds(&self) -> i64 {
        self.nonce_ttl_seconds
    }

    #[must_use]
    pub fn max_voice_attempts(&self) -> i32 {
        self.max_voice_attempts
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a request handler needs: configuration, the token issuer, and
/// the injected store implementations. No process-wide singletons; the state
/// is passed explicitly.
pub struct AuthState {
    config: AuthConfig,
    issuer: StageTokenIssuer,
    credentials: Arc<dyn CredentialStore>,
    nonces: Arc<dyn NonceLedger>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        secret: SecretString,
        credentials: Arc<dyn CredentialStore>,
        nonces: Arc<dyn NonceLedger>,
    ) -> Self {
        Self {
            config,
            issuer: StageTokenIssuer::new(secret),
            credentials,
            nonces,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn issuer(&self) -> &StageTokenIssuer {
        &self.issuer
    }

    pub(crate) fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    pub(crate) fn nonces(&self) -> &dyn NonceLedger {
        self.nonces.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_and_overrides() {
        let config = AuthConfig::new();
        assert_eq!(
            config.password_ok_ttl_seconds(),
            DEFAULT_PASSWORD_OK_TTL_SECONDS
        );
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.nonce_ttl_seconds(), DEFAULT_NONCE_TTL_SECONDS);
        assert_eq!(config.max_voice_attempts(), DEFAULT_MAX_VOICE_ATTEMPTS);

        let config = config
            .with_password_ok_ttl_seconds(60)
            .with_session_ttl_seconds(120)
            .with_nonce_ttl_seconds(30)
            .with_max_voice_attempts(5);
        assert_eq!(config.password_ok_ttl_seconds(), 60);
        assert_eq!(config.session_ttl_seconds(), 120);
        assert_eq!(config.nonce_ttl_seconds(), 30);
        assert_eq!(config.max_voice_attempts(), 5);
    }
}
