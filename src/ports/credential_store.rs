//! Credential store port - the authority that finally records admission.
//!
//! The join flow asks it once for the initial decision ("is this user
//! already registered?") and calls it once more on a successful login or
//! registration. Failures are not handled specially; they escape the flow
//! like any other error.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Port for the host's credential store.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Whether the user already holds a credential.
    async fn is_registered(&self, user: &UserId) -> Result<bool, DomainError>;

    /// Creates a credential for a freshly registered user and admits them.
    async fn create_credential_and_admit(&self, user: &UserId) -> Result<(), DomainError>;

    /// Admits a user whose identity was verified.
    async fn mark_admitted(&self, user: &UserId) -> Result<(), DomainError>;
}
