//! Session domain module.
//!
//! A session pairs a connecting user with a single-use secret for exactly
//! one verification round trip. Sessions are created by the join flow right
//! before a method is invoked and are never persisted or reused.
//!
//! # Types
//!
//! - `AuthorizationSession` - Closed set of session variants
//! - `LoginSession` / `RegistrationSession` - Secret-carrying attempts
//! - `LoginResult` / `RegistrationResult` - Method outcome tags

mod outcome;
mod secret;

pub use outcome::{LoginResult, RegistrationResult};
pub use secret::generate_secret;

use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::UserId;

/// A login attempt: the user plus a fresh single-use token.
#[derive(Debug)]
pub struct LoginSession {
    user: UserId,
    token: SecretString,
}

impl LoginSession {
    /// Starts a login attempt with a freshly generated token of `token_length` characters.
    pub fn start(user: UserId, token_length: usize) -> Self {
        Self {
            user,
            token: generate_secret(token_length),
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// The single-use token. Opaque to the engine.
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// A registration attempt: the user plus a fresh single-use code shown to them.
#[derive(Debug)]
pub struct RegistrationSession {
    user: UserId,
    code: SecretString,
}

impl RegistrationSession {
    /// Starts a registration attempt with a freshly generated code of `code_length` characters.
    pub fn start(user: UserId, code_length: usize) -> Self {
        Self {
            user,
            code: generate_secret(code_length),
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// The single-use code the user relays through the out-of-band channel.
    pub fn code(&self) -> &str {
        self.code.expose_secret()
    }
}

/// Session yielded by a finished join flow.
#[derive(Debug)]
pub enum AuthorizationSession {
    /// No verification took place (accepted by policy, or refused).
    Empty,
    Login(LoginSession),
    Registration(RegistrationSession),
}

impl AuthorizationSession {
    /// Returns true for the `Empty` variant.
    pub fn is_empty(&self) -> bool {
        matches!(self, AuthorizationSession::Empty)
    }

    /// Returns the user this session belongs to, if any.
    pub fn user(&self) -> Option<&UserId> {
        match self {
            AuthorizationSession::Empty => None,
            AuthorizationSession::Login(session) => Some(session.user()),
            AuthorizationSession::Registration(session) => Some(session.user()),
        }
    }
}
