//! Gate policy configuration

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::{ConfigError, ValidationError};

/// What to do with a user no verification method can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMethodsPolicy {
    /// Disconnect the user.
    Kick,
    /// Let the user stay unauthenticated.
    Stay,
}

impl FromStr for NoMethodsPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kick" => Ok(NoMethodsPolicy::Kick),
            "stay" => Ok(NoMethodsPolicy::Stay),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for NoMethodsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMethodsPolicy::Kick => write!(f, "kick"),
            NoMethodsPolicy::Stay => write!(f, "stay"),
        }
    }
}

/// Policy configuration
///
/// `no-methods` is kept raw and resolved every time a flow gets stuck,
/// so a bad value surfaces as a configuration error in that flow.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Either `kick` or `stay`
    #[serde(rename = "no-methods", alias = "no_methods", default = "default_no_methods")]
    pub no_methods: String,

    /// Seconds to wait for a method's verification, 0 waits forever
    #[serde(
        rename = "authorization-timeout",
        alias = "authorization_timeout",
        default = "default_authorization_timeout"
    )]
    pub authorization_timeout_secs: u64,
}

impl PolicyConfig {
    /// Resolves the raw no-methods value.
    pub fn no_methods_policy(&self) -> Result<NoMethodsPolicy, ConfigError> {
        self.no_methods.parse()
    }

    /// Timeout for a single verification wait, `None` when disabled.
    pub fn authorization_timeout(&self) -> Option<Duration> {
        match self.authorization_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Validate policy configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.no_methods_policy().is_err() {
            return Err(ValidationError::UnknownNoMethodsPolicy(
                self.no_methods.clone(),
            ));
        }
        Ok(())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            no_methods: default_no_methods(),
            authorization_timeout_secs: default_authorization_timeout(),
        }
    }
}

fn default_no_methods() -> String {
    "kick".to_string()
}

fn default_authorization_timeout() -> u64 {
    0
}
