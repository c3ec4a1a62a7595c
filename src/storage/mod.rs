//! Durable storage abstractions for users and login nonces.
//!
//! The auth state machine only sees these traits; the Postgres implementation
//! lives in [`postgres`] and an in-memory implementation used by tests in
//! [`memory`]. Both must provide per-user atomic read-modify-write so
//! concurrent verification attempts never lose a failure-counter update.

use async_trait::async_trait;
use rand::{rngs::OsRng, Rng};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Nonce alphabet and length: 16 chars of `[a-z0-9]` is ~82 bits of entropy.
const NONCE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const NONCE_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate user")]
    DuplicateUser,
    #[error("storage backend failure: {0}")]
    Unavailable(anyhow::Error),
}

/// A registered user as stored: proofs only, never plaintext.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_proof: String,
    pub voice_proof: String,
    pub failed_attempts: i32,
}

/// Durable mapping from username to proofs and the failure counter.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create a user; fails with [`StoreError::DuplicateUser`] if the
    /// username is taken.
    async fn create(
        &self,
        username: &str,
        password_proof: &str,
        voice_proof: &str,
    ) -> Result<Uuid, StoreError>;

    async fn find(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Atomic per-user increment of the failure counter.
    async fn increment_failures(&self, user_id: Uuid) -> Result<(), StoreError>;

    /// Atomic per-user reset of the failure counter to zero.
    async fn reset_failures(&self, user_id: Uuid) -> Result<(), StoreError>;
}

/// Durable per-user set of outstanding one-time challenge nonces.
#[async_trait]
pub trait NonceLedger: Send + Sync {
    /// Generate and persist a fresh nonce for the user, returning it.
    async fn issue(&self, user_id: Uuid) -> Result<String, StoreError>;

    /// True iff an unconsumed, unexpired nonce exists for exactly this user.
    /// Lookups are scoped by user so a nonce leaked for one user can never be
    /// replayed against another.
    async fn exists(&self, user_id: Uuid, nonce: &str) -> Result<bool, StoreError>;

    /// Delete every outstanding nonce for the user. Called once after a
    /// successful verification so sibling nonces from parallel logins cannot
    /// be reused.
    async fn consume_all(&self, user_id: Uuid) -> Result<(), StoreError>;
}

/// Generate a nonce value. The raw value goes back to the client and is also
/// persisted verbatim; it is single-use, not a secret proof.
pub(crate) fn generate_nonce() -> String {
    let mut rng = OsRng;
    (0..NONCE_LENGTH)
        .map(|_| {
            let index = rng.gen_range(0..NONCE_ALPHABET.len());
            NONCE_ALPHABET[index] as char
        })
        .collect()
}
