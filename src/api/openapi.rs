//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use super::handlers;
use crate::auth::machine::{LoginGrant, SessionGrant};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "paroli",
        description = "Voice challenge authentication service"
    ),
    paths(
        handlers::health::health,
        handlers::register::register,
        handlers::login::login,
        handlers::verify::verify_voice,
        handlers::dashboard::dashboard,
    ),
    components(schemas(
        handlers::register::RegisterRequest,
        handlers::login::LoginRequest,
        handlers::verify::VerifyVoiceRequest,
        LoginGrant,
        SessionGrant,
    )),
    tags(
        (name = "auth", description = "Password and voice challenge authentication"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
