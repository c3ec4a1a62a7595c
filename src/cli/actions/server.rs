use crate::{api, auth::AuthConfig, cli::actions::Action};
use anyhow::Result;
use secrecy::SecretString;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            secret,
            frontend_url,
            temp_token_ttl_seconds,
            session_token_ttl_seconds,
            nonce_ttl_seconds,
            max_voice_attempts,
        } => {
            let config = AuthConfig::new()
                .with_password_ok_ttl_seconds(temp_token_ttl_seconds)
                .with_session_ttl_seconds(session_token_ttl_seconds)
                .with_nonce_ttl_seconds(nonce_ttl_seconds)
                .with_max_voice_attempts(max_voice_attempts);

            api::new(port, dsn, SecretString::from(secret), config, frontend_url).await?;
        }
    }

    Ok(())
}
