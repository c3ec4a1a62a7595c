//! Handler-level tests: domain outcomes map to the right HTTP statuses.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use secrecy::SecretString;

use paroli::api::handlers::{
    dashboard::dashboard,
    login::{login, LoginRequest},
    register::{register, RegisterRequest},
    verify::{verify_voice, VerifyVoiceRequest},
};
use paroli::auth::{self, AuthConfig, AuthState};
use paroli::storage::MemoryStore;

fn auth_state() -> Arc<AuthState> {
    let store = Arc::new(MemoryStore::new(Duration::from_secs(600)));
    Arc::new(AuthState::new(
        AuthConfig::new(),
        SecretString::from("test-secret"),
        store.clone(),
        store,
    ))
}

#[tokio::test]
async fn register_statuses() {
    let state = auth_state();

    let response = register(Extension(state.clone()), None).await.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = RegisterRequest {
        username: "alice".to_string(),
        password: "pw1".to_string(),
        voice_phrase: "open sesame".to_string(),
    };
    let response = register(Extension(state.clone()), Some(Json(request)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = RegisterRequest {
        username: "alice".to_string(),
        password: "other".to_string(),
        voice_phrase: "other".to_string(),
    };
    let response = register(Extension(state), Some(Json(request)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_rejects_bad_credentials_with_unauthorized() {
    let state = auth_state();
    auth::register(&state, "alice", "pw1", "open sesame")
        .await
        .unwrap();

    let request = LoginRequest {
        username: "alice".to_string(),
        password: "wrong".to_string(),
    };
    let response = login(Extension(state), Some(Json(request)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_voice_statuses() {
    let state = auth_state();
    auth::register(&state, "alice", "pw1", "open sesame")
        .await
        .unwrap();
    let grant = auth::login(&state, "alice", "pw1").await.unwrap();

    let request = VerifyVoiceRequest {
        username: "alice".to_string(),
        voice_text: format!("open sesame {}", grant.nonce),
        temp_token: grant.temp_token.clone(),
        nonce: "wrong-nonce".to_string(),
    };
    let response = verify_voice(Extension(state.clone()), Some(Json(request)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Exhaust the attempt ceiling, then expect 429.
    for _ in 0..3 {
        let transcript = format!("wrong phrase {}", grant.nonce);
        auth::verify_challenge(&state, "alice", &transcript, &grant.temp_token, &grant.nonce)
            .await
            .unwrap_err();
    }
    let request = VerifyVoiceRequest {
        username: "alice".to_string(),
        voice_text: format!("open sesame {}", grant.nonce),
        temp_token: grant.temp_token.clone(),
        nonce: grant.nonce.clone(),
    };
    let response = verify_voice(Extension(state), Some(Json(request)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn dashboard_statuses() {
    let state = auth_state();
    auth::register(&state, "alice", "pw1", "open sesame")
        .await
        .unwrap();
    let grant = auth::login(&state, "alice", "pw1").await.unwrap();

    // No Authorization header.
    let response = dashboard(Extension(state.clone()), HeaderMap::new())
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Malformed header.
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    let response = dashboard(Extension(state.clone()), headers)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // PASSWORD_OK bearer is not enough.
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", grant.temp_token)).unwrap(),
    );
    let response = dashboard(Extension(state.clone()), headers)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Fully authenticated bearer passes.
    let transcript = format!("open sesame {}", grant.nonce);
    let session =
        auth::verify_challenge(&state, "alice", &transcript, &grant.temp_token, &grant.nonce)
            .await
            .unwrap();
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", session.session_token)).unwrap(),
    );
    let response = dashboard(Extension(state), headers).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
}
