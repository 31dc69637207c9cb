//! In-memory credential store for testing and single-process hosts.
//!
//! Registering a user stores a random password for them; nothing survives
//! a restart.

use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::session::generate_secret;
use crate::ports::CredentialStore;

const PASSWORD_LENGTH: usize = 16;

/// In-memory credential store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    credentials: Arc<RwLock<HashMap<UserId, SecretString>>>,
    admitted: Arc<RwLock<HashSet<UserId>>>,
    failing: bool,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds credentials for `users`.
    pub fn with_registered(users: impl IntoIterator<Item = UserId>) -> Self {
        let credentials = users
            .into_iter()
            .map(|user| (user, generate_secret(PASSWORD_LENGTH)))
            .collect();
        Self {
            credentials: Arc::new(RwLock::new(credentials)),
            ..Self::default()
        }
    }

    /// Makes every call fail, to exercise collaborator failures.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub async fn has_credential(&self, user: &UserId) -> bool {
        self.credentials.read().await.contains_key(user)
    }

    pub async fn is_admitted(&self, user: &UserId) -> bool {
        self.admitted.read().await.contains(user)
    }

    pub async fn credential_count(&self) -> usize {
        self.credentials.read().await.len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.failing {
            return Err(DomainError::new(
                ErrorCode::CredentialStoreError,
                "Credential store unavailable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn is_registered(&self, user: &UserId) -> Result<bool, DomainError> {
        self.check_available()?;
        Ok(self.has_credential(user).await)
    }

    async fn create_credential_and_admit(&self, user: &UserId) -> Result<(), DomainError> {
        self.check_available()?;
        self.credentials
            .write()
            .await
            .insert(user.clone(), generate_secret(PASSWORD_LENGTH));
        self.admitted.write().await.insert(user.clone());
        tracing::debug!(user = %user, "Credential created");
        Ok(())
    }

    async fn mark_admitted(&self, user: &UserId) -> Result<(), DomainError> {
        self.check_available()?;
        self.admitted.write().await.insert(user.clone());
        Ok(())
    }
}
