//! Method registry - the configured verification methods, in order.
//!
//! Built once at startup: every configured entry is instantiated through
//! its kind's factory, then all entries initialize concurrently against
//! their own configuration scope. An entry that cannot be built or fails to
//! initialize is logged and left out; the others load regardless.
//!
//! After loading the registry is read-only and shared by every flow.

mod barrier;
mod factories;

pub use barrier::{initialization_barrier, spawn_initialization, InitializationBarrier, InitializationSignal};
pub use factories::{MethodFactories, MethodFactory};

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;

use crate::config::{MethodConfig, MethodScope, TextCatalog};
use crate::ports::{MethodError, VerificationMethod};

/// A named, initialized verification method with its configuration scope.
#[derive(Clone)]
pub struct MethodEntry {
    name: String,
    method: Arc<dyn VerificationMethod>,
    scope: MethodScope,
}

impl MethodEntry {
    /// Wraps an already initialized method.
    pub fn new(name: impl Into<String>, method: Arc<dyn VerificationMethod>, scope: MethodScope) -> Self {
        Self {
            name: name.into(),
            method,
            scope,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &dyn VerificationMethod {
        self.method.as_ref()
    }

    pub fn scope(&self) -> &MethodScope {
        &self.scope
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry").field("name", &self.name).finish()
    }
}

/// A method that was built but not yet initialized.
struct PendingEntry {
    name: String,
    method: Box<dyn VerificationMethod>,
    scope: MethodScope,
}

/// Ordered, read-only set of loaded methods.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    entries: Vec<MethodEntry>,
}

impl MethodRegistry {
    /// Creates a registry from entries that are already initialized.
    pub fn new(entries: Vec<MethodEntry>) -> Self {
        Self { entries }
    }

    /// Builds and initializes every configured method.
    ///
    /// Unknown kinds and initialization failures are logged and excluded.
    pub async fn load(
        configs: &[MethodConfig],
        factories: &MethodFactories,
        root_texts: Arc<TextCatalog>,
    ) -> Self {
        let mut pending: Vec<PendingEntry> = configs
            .iter()
            .filter_map(|config| match factories.build(&config.kind) {
                Some(method) => Some(PendingEntry {
                    name: config.name.clone(),
                    method,
                    scope: config.scope(Arc::clone(&root_texts)),
                }),
                None => {
                    tracing::warn!(
                        method = %config.name,
                        kind = %config.kind,
                        known = ?factories.kinds(),
                        "Unknown verification method kind, skipping"
                    );
                    None
                }
            })
            .collect();

        let results = join_all(
            pending
                .iter_mut()
                .map(|entry| entry.method.initialize(&entry.scope)),
        )
        .await;

        let entries: Vec<MethodEntry> = pending
            .into_iter()
            .zip(results)
            .filter_map(|(entry, result)| match result {
                Ok(()) => Some(MethodEntry {
                    name: entry.name,
                    method: Arc::from(entry.method),
                    scope: entry.scope,
                }),
                Err(e) => {
                    tracing::warn!(method = %entry.name, error = %e, "Verification method failed to initialize, skipping");
                    None
                }
            })
            .collect();

        tracing::info!(
            loaded = entries.len(),
            configured = configs.len(),
            "Verification methods ready"
        );

        Self { entries }
    }

    /// Entries in configuration order.
    pub fn entries(&self) -> &[MethodEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(MethodEntry::name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shuts every method down concurrently.
    ///
    /// One failure does not stop the others; all failures are returned.
    pub async fn shutdown(&self) -> Vec<(String, MethodError)> {
        let results = join_all(self.entries.iter().map(|entry| entry.method.shutdown())).await;

        self.entries
            .iter()
            .zip(results)
            .filter_map(|(entry, result)| {
                result.err().map(|e| {
                    tracing::warn!(method = %entry.name, error = %e, "Verification method failed to shut down");
                    (entry.name.clone(), e)
                })
            })
            .collect()
    }
}
