//! Domain errors surfaced by the auth state machine.

use thiserror::Error;

use crate::storage::StoreError;

/// Every caller-visible outcome of the auth operations. Display strings are
/// the user-facing messages; the transport layer maps variants to status
/// codes. `StoreUnavailable` is the exception: it is logged internally and
/// surfaced as a generic server failure.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing fields")]
    MissingFields,
    #[error("Username taken")]
    DuplicateUser,
    /// Deliberately identical for unknown-user and wrong-password so the
    /// response cannot be used for username enumeration.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid nonce")]
    InvalidNonce,
    #[error("Too many attempts")]
    TooManyAttempts,
    #[error("Voice phrase mismatch")]
    VoicePhraseMismatch,
    #[error("Missing auth")]
    MissingAuth,
    #[error("Malformed auth")]
    MalformedAuth,
    #[error("Not fully authenticated")]
    NotFullyAuthenticated,
    #[error("storage unavailable: {0}")]
    StoreUnavailable(anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUser => Self::DuplicateUser,
            StoreError::Unavailable(err) => Self::StoreUnavailable(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_duplicate_maps_to_duplicate_user() {
        let err = AuthError::from(StoreError::DuplicateUser);
        assert!(matches!(err, AuthError::DuplicateUser));
    }

    #[test]
    fn store_failure_maps_to_store_unavailable() {
        let err = AuthError::from(StoreError::Unavailable(anyhow::anyhow!("down")));
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
    }

    #[test]
    fn user_facing_messages() {
        assert_eq!(AuthError::MissingFields.to_string(), "Missing fields");
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid credentials"
        );
        assert_eq!(AuthError::TooManyAttempts.to_string(), "Too many attempts");
    }
}
