//! In-memory credential store and nonce ledger.
//!
//! Backs the test suite; mirrors the Postgres semantics including the lazy
//! nonce age limit.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{generate_nonce, CredentialStore, NonceLedger, StoreError, UserRecord};

struct NonceEntry {
    user_id: Uuid,
    nonce: String,
    issued_at: Instant,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    usernames: HashMap<String, Uuid>,
    nonces: Vec<NonceEntry>,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    nonce_ttl: Duration,
}

impl MemoryStore {
    #[must_use]
    pub fn new(nonce_ttl: Duration) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            nonce_ttl,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create(
        &self,
        username: &str,
        password_proof: &str,
        voice_proof: &str,
    ) -> Result<Uuid, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.usernames.contains_key(username) {
            return Err(StoreError::DuplicateUser);
        }
        let id = Uuid::new_v4();
        tables.usernames.insert(username.to_string(), id);
        tables.users.insert(
            id,
            UserRecord {
                id,
                username: username.to_string(),
                password_proof: password_proof.to_string(),
                voice_proof: voice_proof.to_string(),
                failed_attempts: 0,
            },
        );
        Ok(id)
    }

    async fn find(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.lock().await;
        let record = tables
            .usernames
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned();
        Ok(record)
    }

    async fn increment_failures(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.get_mut(&user_id) {
            user.failed_attempts += 1;
        }
        Ok(())
    }

    async fn reset_failures(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.get_mut(&user_id) {
            user.failed_attempts = 0;
        }
        Ok(())
    }
}

#[async_trait]
impl NonceLedger for MemoryStore {
    async fn issue(&self, user_id: Uuid) -> Result<String, StoreError> {
        let nonce = generate_nonce();
        let mut tables = self.tables.lock().await;
        tables.nonces.push(NonceEntry {
            user_id,
            nonce: nonce.clone(),
            issued_at: Instant::now(),
        });
        Ok(nonce)
    }

    async fn exists(&self, user_id: Uuid, nonce: &str) -> Result<bool, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.nonces.iter().any(|entry| {
            entry.user_id == user_id
                && entry.nonce == nonce
                && entry.issued_at.elapsed() < self.nonce_ttl
        }))
    }

    async fn consume_all(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.nonces.retain(|entry| entry.user_id != user_id);
        Ok(())
    }
}
