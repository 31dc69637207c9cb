//! Localized text templates.
//!
//! Templates use `$[placeholder]` substitution. Lookups fall back from a
//! method's own catalog to the root catalog when a key is absent locally.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::error::ConfigError;

// Matches "$[player]", "$[error-message]", etc.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\[(.*?)\]").unwrap());

/// Replaces every `$[key]` in `template` with its value from `values`.
///
/// Placeholders without a value are left verbatim.
pub fn translate(template: &str, values: &HashMap<String, String>) -> String {
    if values.is_empty() {
        return template.to_string();
    }

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// A scope of text templates with an optional parent scope.
#[derive(Debug, Clone, Default)]
pub struct TextCatalog {
    entries: HashMap<String, String>,
    parent: Option<Arc<TextCatalog>>,
}

impl TextCatalog {
    /// Creates a root catalog.
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self {
            entries,
            parent: None,
        }
    }

    /// Creates a catalog that falls back to `parent`.
    pub fn child(parent: Arc<TextCatalog>, entries: HashMap<String, String>) -> Self {
        Self {
            entries,
            parent: Some(parent),
        }
    }

    /// Finds the raw template for `key`, walking up the parent chain.
    pub fn lookup(&self, key: &str) -> Result<&str, ConfigError> {
        if let Some(raw) = self.entries.get(key) {
            return Ok(raw);
        }
        match &self.parent {
            Some(parent) => parent.lookup(key),
            None => Err(ConfigError::missing_key(format!("texts.{}", key), "text")),
        }
    }
}

/// A text catalog bound to a set of placeholder values.
#[derive(Debug, Clone)]
pub struct Translations {
    catalog: Arc<TextCatalog>,
    context: HashMap<String, String>,
}

impl Translations {
    pub fn new(catalog: Arc<TextCatalog>) -> Self {
        Self {
            catalog,
            context: HashMap::new(),
        }
    }

    /// Adds or replaces a placeholder value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Renders the template stored under `key`.
    pub fn of(&self, key: &str) -> Result<String, ConfigError> {
        let raw = self.catalog.lookup(key)?;
        Ok(translate(raw, &self.context))
    }
}
