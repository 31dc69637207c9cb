//! Verification Method Port - Interface for out-of-band identity checks.
//!
//! A verification method proves who a connecting user is through some
//! channel outside the service (a chat bot, an e-mail link, a confirmation
//! command). The join flow only sees the capability set below and the
//! four outcome tags; whatever a method does in between is its own business.
//!
//! # Contract
//!
//! - `eligible_for_registration` and `is_registered` are side-effect-free
//!   queries that must answer promptly.
//! - `login` and `register` may suspend for an unbounded round trip and must
//!   return exactly one outcome or fail. Failures propagate to the flow
//!   supervisor unmodified.
//! - Methods register an undo action in the given `CompensationScope` for
//!   each transient artifact they create.
//! - Methods are shared by all concurrent flows and handle their own
//!   internal synchronization.
//!
//! # Example
//!
//! ```ignore
//! struct AlwaysYes;
//!
//! #[async_trait]
//! impl VerificationMethod for AlwaysYes {
//!     async fn eligible_for_registration(&self, _: &UserId) -> Result<bool, MethodError> {
//!         Ok(true)
//!     }
//!     async fn login(&self, _: &LoginSession, _: &CompensationScope) -> Result<LoginResult, MethodError> {
//!         Ok(LoginResult::Success)
//!     }
//!     // ... other methods
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ConfigError, MethodScope};
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::session::{LoginResult, LoginSession, RegistrationResult, RegistrationSession};

use super::CompensationScope;

/// Port for a pluggable verification backend.
#[async_trait]
pub trait VerificationMethod: Send + Sync {
    /// Prepares the method against its own configuration scope.
    ///
    /// Called once at startup, before the method is shared.
    async fn initialize(&mut self, scope: &MethodScope) -> Result<(), MethodError>;

    /// Releases resources held by the method.
    async fn shutdown(&self) -> Result<(), MethodError>;

    /// Whether the user may register through this method.
    async fn eligible_for_registration(&self, user: &UserId) -> Result<bool, MethodError>;

    /// Whether the user has previously registered through this method.
    async fn is_registered(&self, user: &UserId) -> Result<bool, MethodError>;

    /// Verifies a returning user.
    async fn login(
        &self,
        session: &LoginSession,
        compensation: &CompensationScope,
    ) -> Result<LoginResult, MethodError>;

    /// Verifies and enrolls a new user.
    async fn register(
        &self,
        session: &RegistrationSession,
        compensation: &CompensationScope,
    ) -> Result<RegistrationResult, MethodError>;
}

/// Errors raised by verification method implementations.
#[derive(Debug, Error)]
pub enum MethodError {
    /// Method configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The method has not been initialized.
    #[error("method not initialized")]
    NotInitialized,

    /// The out-of-band channel could not be reached.
    #[error("channel unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// A wait inside the method exceeded its deadline.
    #[error("timed out after {seconds}s")]
    Timeout {
        /// Configured limit.
        seconds: u64,
    },

    /// A host collaborator failed while the method was using it.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] DomainError),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MethodError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        MethodError::Unavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        MethodError::Internal(message.into())
    }
}
