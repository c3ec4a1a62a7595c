//! Postgres-backed credential store and nonce ledger.
//!
//! Counter updates and nonce consumption are single SQL statements, so
//! per-user atomicity comes from the database itself.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::{generate_nonce, CredentialStore, NonceLedger, StoreError, UserRecord};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    nonce_ttl_seconds: i64,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool, nonce_ttl_seconds: i64) -> Self {
        Self {
            pool,
            nonce_ttl_seconds,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(anyhow::Error::new(err))
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create(
        &self,
        username: &str,
        password_proof: &str,
        voice_proof: &str,
    ) -> Result<Uuid, StoreError> {
        let query = r"
            INSERT INTO users (username, password_proof, voice_proof)
            VALUES ($1, $2, $3)
            RETURNING id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .bind(password_proof)
            .bind(voice_proof)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::DuplicateUser
                } else {
                    unavailable(err)
                }
            })?;

        Ok(row.get("id"))
    }

    async fn find(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = r"
            SELECT id, username, password_proof, voice_proof, failed_attempts
            FROM users
            WHERE username = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(unavailable)?;

        Ok(row.map(|row| UserRecord {
            id: row.get("id"),
            username: row.get("username"),
            password_proof: row.get("password_proof"),
            voice_proof: row.get("voice_proof"),
            failed_attempts: row.get("failed_attempts"),
        }))
    }

    async fn increment_failures(&self, user_id: Uuid) -> Result<(), StoreError> {
        let query = "UPDATE users SET failed_attempts = failed_attempts + 1 WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn reset_failures(&self, user_id: Uuid) -> Result<(), StoreError> {
        let query = "UPDATE users SET failed_attempts = 0 WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

#[async_trait]
impl NonceLedger for PgStore {
    async fn issue(&self, user_id: Uuid) -> Result<String, StoreError> {
        let nonce = generate_nonce();
        let query = "INSERT INTO nonces (user_id, nonce) VALUES ($1, $2)";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(user_id)
            .bind(&nonce)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(unavailable)?;
        Ok(nonce)
    }

    async fn exists(&self, user_id: Uuid, nonce: &str) -> Result<bool, StoreError> {
        // Age limit is enforced lazily here; stale rows are ignored rather
        // than pruned by a background task.
        let query = r"
            SELECT EXISTS(
                SELECT 1 FROM nonces
                WHERE user_id = $1
                  AND nonce = $2
                  AND created_at > NOW() - ($3 * INTERVAL '1 second')
            ) AS valid
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .bind(nonce)
            .bind(self.nonce_ttl_seconds)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .map_err(unavailable)?;
        Ok(row.get("valid"))
    }

    async fn consume_all(&self, user_id: Uuid) -> Result<(), StoreError> {
        let query = "DELETE FROM nonces WHERE user_id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}
