//! Session secret configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Lengths of generated single-use secrets
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(
        rename = "login-token-length",
        alias = "login_token_length",
        default = "default_login_token_length"
    )]
    pub login_token_length: usize,

    #[serde(
        rename = "registration-code-length",
        alias = "registration_code_length",
        default = "default_registration_code_length"
    )]
    pub registration_code_length: usize,
}

impl SessionConfig {
    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.login_token_length == 0 {
            return Err(ValidationError::InvalidSecretLength("login token"));
        }
        if self.registration_code_length == 0 {
            return Err(ValidationError::InvalidSecretLength("registration code"));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_token_length: default_login_token_length(),
            registration_code_length: default_registration_code_length(),
        }
    }
}

fn default_login_token_length() -> usize {
    32
}

fn default_registration_code_length() -> usize {
    48
}
