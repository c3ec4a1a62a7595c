pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        secret: String,
        frontend_url: String,
        temp_token_ttl_seconds: i64,
        session_token_ttl_seconds: i64,
        nonce_ttl_seconds: i64,
        max_voice_attempts: i32,
    },
}
