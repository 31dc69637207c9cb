//! Named method factories.
//!
//! Every backend registers itself explicitly under a kind name at startup.
//! Configuration refers to that name; nothing is resolved by reflection.

use std::collections::HashMap;
use std::fmt;

use crate::ports::VerificationMethod;

/// Builds a fresh, uninitialized method instance.
pub type MethodFactory = Box<dyn Fn() -> Box<dyn VerificationMethod> + Send + Sync>;

/// Registry of method factories keyed by kind.
#[derive(Default)]
pub struct MethodFactories {
    factories: HashMap<String, MethodFactory>,
}

impl MethodFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `kind`, replacing any previous one.
    pub fn register<F, M>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: VerificationMethod + 'static,
    {
        let factory: MethodFactory =
            Box::new(move || -> Box<dyn VerificationMethod> { Box::new(factory()) });
        self.factories.insert(kind.into(), factory);
        self
    }

    /// Builder-style `register`.
    pub fn with<F, M>(mut self, kind: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: VerificationMethod + 'static,
    {
        self.register(kind, factory);
        self
    }

    /// Instantiates the method registered under `kind`.
    pub fn build(&self, kind: &str) -> Option<Box<dyn VerificationMethod>> {
        self.factories.get(kind).map(|factory| factory())
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for MethodFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodFactories")
            .field("kinds", &self.kinds())
            .finish()
    }
}
