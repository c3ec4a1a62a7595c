use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::error_response;
use crate::auth::machine::SessionGrant;
use crate::auth::{self, AuthState};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyVoiceRequest {
    pub username: String,
    /// Transcript of the spoken phrase; must contain the issued nonce.
    pub voice_text: String,
    pub temp_token: String,
    pub nonce: String,
}

#[utoipa::path(
    post,
    path = "/api/verify-voice",
    request_body = VerifyVoiceRequest,
    responses(
        (status = 200, description = "Voice challenge passed; session token issued", body = SessionGrant),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Bad token, nonce, or phrase"),
        (status = 429, description = "Too many attempts"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn verify_voice(
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyVoiceRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return error_response(&auth::AuthError::MissingFields).into_response();
    };

    match auth::verify_challenge(
        &state,
        &request.username,
        &request.voice_text,
        &request.temp_token,
        &request.nonce,
    )
    .await
    {
        Ok(grant) => (StatusCode::OK, Json(grant)).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}
