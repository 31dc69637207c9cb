//! Application configuration module
//!
//! Configuration is layered with the `config` crate:
//!
//! 1. the embedded defaults (`default.toml`),
//! 2. an optional TOML file (`interactive-login.toml`, or the path in
//!    `INTERACTIVE_LOGIN_CONFIG`),
//! 3. environment variables with the `INTERACTIVE_LOGIN` prefix, nested
//!    values separated by `__`.
//!
//! # Example
//!
//! ```no_run
//! use interactive_login::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Listening for /{}", config.command.label);
//! ```

mod command;
mod error;
mod logging;
mod methods;
mod policy;
mod session;
mod texts;

pub use command::CommandConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use methods::{validate_methods, MethodConfig, MethodScope};
pub use policy::{NoMethodsPolicy, PolicyConfig};
pub use session::SessionConfig;
pub use texts::{translate, TextCatalog, Translations};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("default.toml");
const CONFIG_PATH_VAR: &str = "INTERACTIVE_LOGIN_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "interactive-login.toml";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub command: CommandConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub session: SessionConfig,

    /// Root text templates
    #[serde(default)]
    pub texts: HashMap<String, String>,

    /// Verification methods, in evaluation order
    #[serde(default)]
    pub methods: Vec<MethodConfig>,
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment
    ///
    /// Loads `.env` first when present. The file is optional.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or the merged values
    /// do not deserialize into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from(&path, false)
    }

    /// Load configuration using a specific file
    pub fn load_from(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                config::Environment::with_prefix("INTERACTIVE_LOGIN")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Parse configuration from a TOML document layered over the defaults
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.command.validate()?;
        self.policy.validate()?;
        self.session.validate()?;
        validate_methods(&self.methods)?;
        Ok(())
    }

    /// The root text catalog every method scope falls back to.
    pub fn root_texts(&self) -> Arc<TextCatalog> {
        Arc::new(TextCatalog::new(self.texts.clone()))
    }
}
