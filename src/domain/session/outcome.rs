//! Outcome tags returned by verification methods.

use serde::{Deserialize, Serialize};

/// Outcome of a method's `login` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginResult {
    Success,
    Unauthorized,
}

/// Outcome of a method's `register` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationResult {
    Success,
    Abort,
}
