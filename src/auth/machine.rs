//! The authentication state machine.
//!
//! Each operation advances one attempt through the stages
//! `UNAUTH -> PASSWORD_OK -> AUTHENTICATED`. Ordering invariants:
//!
//! - A `PASSWORD_OK` stage token is required before the voice challenge; an
//!   `AUTHENTICATED` token is required for protected resources.
//! - The lockout ceiling is checked before the nonce and the transcript, so a
//!   locked-out caller is rejected uniformly and cannot use nonce validity as
//!   an oracle.
//! - All outstanding nonces for a user are consumed on success, never before.

use serde::Serialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::{
    error::AuthError,
    normalize::normalize,
    proof::{hash_proof, verify_proof},
    stage::{Stage, StageClaims, TokenError},
    state::AuthState,
};

/// Issued at the end of a successful password login.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginGrant {
    /// Stage token scoped to `PASSWORD_OK`; short-lived.
    pub temp_token: String,
    /// One-time challenge to echo in the spoken phrase.
    pub nonce: String,
}

/// Issued at the end of a successful voice verification.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionGrant {
    /// Stage token scoped to `AUTHENTICATED`; long-lived.
    pub session_token: String,
}

/// Register a new user. Succeeds with no token; the user logs in separately.
///
/// # Errors
/// `MissingFields` for empty arguments, `DuplicateUser` if the username is
/// taken, `StoreUnavailable` on backend failure.
#[instrument(skip_all, fields(username = %username))]
pub async fn register(
    state: &AuthState,
    username: &str,
    password: &str,
    voice_phrase: &str,
) -> Result<(), AuthError> {
    if username.is_empty() || password.is_empty() || voice_phrase.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let password_proof = hash_proof(password).map_err(AuthError::StoreUnavailable)?;
    let voice_proof = hash_proof(&normalize(voice_phrase)).map_err(AuthError::StoreUnavailable)?;

    let user_id = state
        .credentials()
        .create(username, &password_proof, &voice_proof)
        .await?;

    debug!(%user_id, "user registered");

    Ok(())
}

/// First factor: verify the password, issue a nonce, and mint a `PASSWORD_OK`
/// stage token. Transition `UNAUTH -> PASSWORD_OK`.
///
/// # Errors
/// `InvalidCredentials` for both unknown users and wrong passwords; nothing
/// is issued in either case.
#[instrument(skip_all, fields(username = %username))]
pub async fn login(
    state: &AuthState,
    username: &str,
    password: &str,
) -> Result<LoginGrant, AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let Some(user) = state.credentials().find(username).await? else {
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_proof(password, &user.password_proof) {
        return Err(AuthError::InvalidCredentials);
    }

    let nonce = state.nonces().issue(user.id).await?;
    let temp_token = state
        .issuer()
        .mint(
            user.id,
            Stage::PasswordOk,
            state.config().password_ok_ttl_seconds(),
        )
        .map_err(AuthError::StoreUnavailable)?;

    debug!(user_id = %user.id, "password verified, challenge issued");

    Ok(LoginGrant { temp_token, nonce })
}

/// Second factor: check the stage token, the lockout ceiling, the nonce, and
/// the normalized transcript, in that order. Transition
/// `PASSWORD_OK -> AUTHENTICATED` on success.
///
/// A mismatch consumes one attempt; hitting the ceiling does not.
#[instrument(skip_all, fields(username = %username))]
pub async fn verify_challenge(
    state: &AuthState,
    username: &str,
    transcript: &str,
    temp_token: &str,
    nonce: &str,
) -> Result<SessionGrant, AuthError> {
    if username.is_empty() || transcript.is_empty() || temp_token.is_empty() || nonce.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let claims = verify_stage(state, temp_token)?;
    if claims.stage != Stage::PasswordOk {
        return Err(AuthError::InvalidToken);
    }

    let Some(user) = state.credentials().find(username).await? else {
        return Err(AuthError::UserNotFound);
    };

    // The token must have been minted for this user, not merely be valid.
    if claims.sub != user.id {
        return Err(AuthError::InvalidToken);
    }

    // Lockout precedes the nonce and transcript checks and does not consume
    // an attempt.
    if user.failed_attempts >= state.config().max_voice_attempts() {
        return Err(AuthError::TooManyAttempts);
    }

    if !state.nonces().exists(user.id, nonce).await? {
        return Err(AuthError::InvalidNonce);
    }

    // The spoken phrase must echo the challenge nonce; a replayed recording
    // of the bare phrase cannot contain a nonce issued after it was made.
    let phrase = strip_nonce(&normalize(transcript), nonce);
    let matched = phrase
        .as_deref()
        .is_some_and(|phrase| verify_proof(phrase, &user.voice_proof));

    if !matched {
        state.credentials().increment_failures(user.id).await?;
        return Err(AuthError::VoicePhraseMismatch);
    }

    state.credentials().reset_failures(user.id).await?;
    state.nonces().consume_all(user.id).await?;

    let session_token = state
        .issuer()
        .mint(
            user.id,
            Stage::Authenticated,
            state.config().session_ttl_seconds(),
        )
        .map_err(AuthError::StoreUnavailable)?;

    debug!(user_id = %user.id, "voice challenge passed");

    Ok(SessionGrant { session_token })
}

/// Gate for protected resources: the bearer must hold an `AUTHENTICATED`
/// stage token.
///
/// # Errors
/// `TokenExpired` / `InvalidToken` for bad tokens, `NotFullyAuthenticated`
/// for a well-formed token at the wrong stage.
pub fn validate_session(state: &AuthState, token: &str) -> Result<StageClaims, AuthError> {
    let claims = verify_stage(state, token)?;
    if claims.stage != Stage::Authenticated {
        return Err(AuthError::NotFullyAuthenticated);
    }
    Ok(claims)
}

fn verify_stage(state: &AuthState, token: &str) -> Result<StageClaims, AuthError> {
    state.issuer().verify(token).map_err(|err| match err {
        TokenError::Expired => AuthError::TokenExpired,
        TokenError::Invalid => AuthError::InvalidToken,
    })
}

/// Remove the echoed nonce from a normalized transcript, returning the
/// remaining phrase. `None` if the transcript never echoed the nonce.
/// Nonces are lowercase alphanumeric, so they survive normalization intact.
fn strip_nonce(transcript: &str, nonce: &str) -> Option<String> {
    let mut found = false;
    let words: Vec<&str> = transcript
        .split_whitespace()
        .filter(|word| {
            if *word == nonce {
                found = true;
                false
            } else {
                true
            }
        })
        .collect();

    found.then(|| words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::strip_nonce;

    #[test]
    fn strip_nonce_removes_echoed_challenge() {
        assert_eq!(
            strip_nonce("open sesame k7f2m9q1x4c8b3z6", "k7f2m9q1x4c8b3z6"),
            Some("open sesame".to_string())
        );
    }

    #[test]
    fn strip_nonce_accepts_nonce_anywhere_in_phrase() {
        assert_eq!(
            strip_nonce("k7f2m9q1x4c8b3z6 open sesame", "k7f2m9q1x4c8b3z6"),
            Some("open sesame".to_string())
        );
    }

    #[test]
    fn strip_nonce_requires_the_echo() {
        assert_eq!(strip_nonce("open sesame", "k7f2m9q1x4c8b3z6"), None);
    }

    #[test]
    fn strip_nonce_ignores_partial_matches() {
        assert_eq!(
            strip_nonce("open sesamek7f2m9q1x4c8b3z6", "k7f2m9q1x4c8b3z6"),
            None
        );
    }
}
