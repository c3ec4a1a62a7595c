use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::error_response;
use crate::auth::machine::LoginGrant;
use crate::auth::{self, AuthState};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Password verified; temp token and nonce issued", body = LoginGrant),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return error_response(&auth::AuthError::MissingFields).into_response();
    };

    match auth::login(&state, &request.username, &request.password).await {
        Ok(grant) => (StatusCode::OK, Json(grant)).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}
