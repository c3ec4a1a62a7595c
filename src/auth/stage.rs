//! Signed, expiring stage tokens.
//!
//! A stage token is the only capability a client holds between steps of the
//! authentication sequence. The server keeps no per-token state beyond the
//! signing secret, so a minted token stays valid for its full TTL; there is
//! no revocation list.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication stage carried in the token claims. Verification pattern
/// matches on this tag before permitting stage-specific operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    PasswordOk,
    Authenticated,
}

#[derive(Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StageClaims {
    /// Subject: the user id the token was minted for.
    pub sub: Uuid,
    pub stage: Stage,
    pub iat: i64,
    pub exp: i64,
}

/// Verification outcome, distinguishing an expired-but-well-formed token
/// from a malformed or forged one so callers can give a specific diagnostic.
#[derive(Debug, Eq, PartialEq)]
pub enum TokenError {
    Expired,
    Invalid,
}

#[derive(Clone)]
pub struct StageTokenIssuer {
    secret: SecretString,
}

impl StageTokenIssuer {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Mint a signed token binding the user to a stage for `ttl_seconds`.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn mint(&self, user_id: Uuid, stage: Stage, ttl_seconds: i64) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = StageClaims {
            sub: user_id,
            stage,
            iat: now,
            exp: now + ttl_seconds,
        };
        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|err| anyhow::anyhow!("failed to sign stage token: {err}"))
    }

    /// Check signature integrity and expiry.
    ///
    /// # Errors
    /// [`TokenError::Expired`] for a well-formed token past its expiry,
    /// [`TokenError::Invalid`] for anything malformed, forged, or otherwise
    /// unacceptable.
    pub fn verify(&self, token: &str) -> Result<StageClaims, TokenError> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<StageClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
