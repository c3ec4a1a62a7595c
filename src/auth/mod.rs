//! Two-factor authentication core: password first, then a spoken phrase that
//! must echo a server-issued one-time nonce.
//!
//! The state machine in [`machine`] drives an attempt through
//! `UNAUTH -> PASSWORD_OK -> AUTHENTICATED`; each transition is gated by a
//! signed stage token so no step can be skipped.

pub mod error;
pub mod machine;
pub mod normalize;
pub mod proof;
pub mod stage;
pub mod state;

pub use error::AuthError;
pub use machine::{login, register, validate_session, verify_challenge, LoginGrant, SessionGrant};
pub use normalize::normalize;
pub use stage::{Stage, StageTokenIssuer};
pub use state::{AuthConfig, AuthState};
