//! One-way proof primitive for passwords and voice phrases.
//!
//! Only the derived proof string is ever stored; comparison goes through
//! [`verify_proof`] so plaintext never touches the database.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Derive a proof from a plaintext secret using Argon2id with a fresh salt.
pub fn hash_proof(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to derive proof: {err}"))?;
    Ok(hash.to_string())
}

/// Verify a plaintext secret against a stored proof. Returns false for both
/// mismatches and unparseable proofs.
#[must_use]
pub fn verify_proof(plain: &str, proof: &str) -> bool {
    PasswordHash::new(proof)
        .and_then(|parsed| Argon2::default().verify_password(plain.as_bytes(), &parsed))
        .is_ok()
}
