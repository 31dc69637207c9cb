//! Verification method configuration

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::{ConfigError, ValidationError};
use super::texts::{TextCatalog, Translations};

/// One configured verification method.
///
/// Methods are listed in order; that order is the order candidates are
/// evaluated and presented in.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodConfig {
    /// Unique name shown to users and matched against their choice
    pub name: String,

    /// Factory identifier the implementation is registered under
    pub kind: String,

    /// Method-specific settings, opaque to the engine
    #[serde(default)]
    pub settings: Map<String, Value>,

    /// Text overrides, falling back to the root texts
    #[serde(default)]
    pub texts: HashMap<String, String>,
}

impl MethodConfig {
    /// Builds the scope handed to the method implementation.
    pub fn scope(&self, root_texts: Arc<TextCatalog>) -> MethodScope {
        MethodScope {
            name: self.name.clone(),
            settings: self.settings.clone(),
            texts: Arc::new(TextCatalog::child(root_texts, self.texts.clone())),
        }
    }
}

/// Validates the ordered method list.
pub fn validate_methods(methods: &[MethodConfig]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for method in methods {
        if method.name.trim().is_empty() {
            return Err(ValidationError::EmptyMethodName);
        }
        if method.kind.trim().is_empty() {
            return Err(ValidationError::MissingMethodKind(method.name.clone()));
        }
        if !seen.insert(method.name.as_str()) {
            return Err(ValidationError::DuplicateMethod(method.name.clone()));
        }
    }
    Ok(())
}

/// A method's own configuration scope.
#[derive(Debug, Clone)]
pub struct MethodScope {
    name: String,
    settings: Map<String, Value>,
    texts: Arc<TextCatalog>,
}

impl MethodScope {
    /// Creates a scope directly (for tests and hosts that build methods by hand).
    pub fn new(name: impl Into<String>, settings: Map<String, Value>, texts: Arc<TextCatalog>) -> Self {
        Self {
            name: name.into(),
            settings,
            texts,
        }
    }

    /// The configured method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a setting by dotted path.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let mut parts = key.split('.');
        let mut current = match parts.next().and_then(|first| self.settings.get(first)) {
            Some(value) => value,
            None => return Ok(None),
        };
        for part in parts {
            current = match current.get(part) {
                Some(value) => value,
                None => return Ok(None),
            };
        }
        serde_json::from_value(current.clone())
            .map(Some)
            .map_err(|e| ConfigError::invalid_value(self.qualified(key), e.to_string()))
    }

    /// Looks up a setting that must be present.
    pub fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        self.get(key)?
            .ok_or_else(|| ConfigError::missing_key(self.qualified(key), std::any::type_name::<T>()))
    }

    /// Translations over this method's texts, seeded with nothing.
    pub fn translations(&self) -> Translations {
        Translations::new(Arc::clone(&self.texts))
    }

    fn qualified(&self, key: &str) -> String {
        format!("methods.{}.settings.{}", self.name, key)
    }
}
