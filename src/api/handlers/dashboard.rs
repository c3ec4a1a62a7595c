use axum::{
    extract::Extension, http::HeaderMap, http::StatusCode, response::IntoResponse, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

use super::{bearer_token, error_response};
use crate::auth::{self, AuthState};

// Representative protected resource: any handler can gate access the same way.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Bearer is fully authenticated"),
        (status = 401, description = "Missing, malformed, or wrong-stage bearer"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn dashboard(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(err) => return error_response(&err).into_response(),
    };

    match auth::validate_session(&state, &token) {
        Ok(_claims) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "message": "Welcome to your dashboard!" })),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}
