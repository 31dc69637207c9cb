//! Errors that escape a join flow.

use thiserror::Error;

use crate::application::command_stream::StreamError;
use crate::config::ConfigError;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::MethodError;

/// Everything that can end a flow abnormally.
///
/// No variant is recovered inside the flow; each one reaches the
/// supervisor, which compensates and notifies the user.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Unknown policy value or missing text/setting.
    #[error("{0}")]
    Configuration(#[from] ConfigError),

    /// The user's typed choice matched no candidate.
    #[error("no candidate named '{choice}' (candidates: {})", .candidates.join(", "))]
    SelectionNotFound {
        choice: String,
        candidates: Vec<String>,
    },

    /// A verification round trip took longer than the configured limit.
    #[error("{method} did not answer within {seconds}s")]
    Timeout { method: String, seconds: u64 },

    /// A verification method failed.
    #[error("{method}: {source}")]
    Method {
        method: String,
        #[source]
        source: MethodError,
    },

    /// The credential store or the user gateway failed.
    #[error("{0}")]
    Collaborator(#[from] DomainError),

    #[error("{0}")]
    Stream(#[from] StreamError),

    /// The method registry never finished loading.
    #[error("verification methods are not available")]
    RegistryUnavailable,
}

impl FlowError {
    pub fn method(method: impl Into<String>, source: MethodError) -> Self {
        FlowError::Method {
            method: method.into(),
            source,
        }
    }

    /// Stable, user-visible label for the error type.
    pub fn category(&self) -> &'static str {
        match self {
            FlowError::Configuration(_) => "ConfigurationError",
            FlowError::SelectionNotFound { .. } => "SelectionError",
            FlowError::Timeout { .. } => "TimeoutError",
            FlowError::Method { .. } => "MethodError",
            FlowError::Collaborator(_) => "CollaboratorError",
            FlowError::Stream(_) => "StreamError",
            FlowError::RegistryUnavailable => "RegistryUnavailable",
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            FlowError::Configuration(_) => ErrorCode::ConfigurationInvalid,
            FlowError::SelectionNotFound { .. } => ErrorCode::SelectionNotFound,
            FlowError::Timeout { .. } => ErrorCode::Timeout,
            FlowError::Method { .. } => ErrorCode::MethodFailed,
            FlowError::Collaborator(e) => e.code,
            FlowError::Stream(_) => ErrorCode::StreamClosed,
            FlowError::RegistryUnavailable => ErrorCode::RegistryUnavailable,
        }
    }
}
