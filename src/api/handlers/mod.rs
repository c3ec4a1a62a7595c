pub mod dashboard;
pub mod health;
pub mod login;
pub mod register;
pub mod verify;

// common functions for the handlers
use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::error;

use crate::auth::AuthError;

/// Map a domain error to a transport response. `StoreUnavailable` is logged
/// and collapsed to a generic server failure so storage internals never leak.
pub(crate) fn error_response(err: &AuthError) -> (StatusCode, Json<Value>) {
    let status = match err {
        AuthError::MissingFields => StatusCode::BAD_REQUEST,
        AuthError::DuplicateUser => StatusCode::CONFLICT,
        AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
        AuthError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    };

    let message = if matches!(err, AuthError::StoreUnavailable(_)) {
        error!("backend failure: {err}");
        "Server error".to_string()
    } else {
        err.to_string()
    };

    (status, Json(json!({ "error": message })))
}

/// Pull the bearer token out of the Authorization header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(AuthError::MissingAuth);
    };
    let value = value.to_str().map_err(|_| AuthError::MalformedAuth)?;
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token.to_string()),
        _ => Err(AuthError::MalformedAuth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingAuth)
        ));
    }

    #[test]
    fn bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MalformedAuth)
        ));
    }

    #[test]
    fn bearer_token_extra_parts() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer abc extra"),
        );
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MalformedAuth)
        ));
    }

    #[test]
    fn bearer_token_extracts_value() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc");
    }

    #[test]
    fn error_response_statuses() {
        let (status, _) = error_response(&AuthError::MissingFields);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = error_response(&AuthError::DuplicateUser);
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = error_response(&AuthError::TooManyAttempts);
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        let (status, _) = error_response(&AuthError::InvalidNonce);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, body) =
            error_response(&AuthError::StoreUnavailable(anyhow::anyhow!("down")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0["error"], "Server error");
    }
}
