//! Join flow - the state machine every connecting user is driven through.
//!
//! # States
//!
//! ```text
//!            is_registered?
//!          yes /       \ no
//!         Login ──0──► Register ──0──► Stuck ──kick──► Refuse ─► Done(Empty)
//!           │             │              └───stay───► Accept ─► Done(Empty)
//!   Unauthorized        Abort ──► Stuck
//!           ▼             │
//!         Refuse       Success ─► Done(Registration)
//!           Success ─► Done(Login)
//! ```
//!
//! `0` marks the zero-candidates edge.

mod error;
mod machine;
mod messages;
mod selection;
mod state;

pub use error::FlowError;
pub use machine::JoinFlow;
pub use messages::{error_message, method_choice_message, registration_code_message};
pub use selection::find_candidate;
pub use state::{FlowState, Transition};

use std::sync::Arc;
use std::time::Duration;

use crate::application::command_stream::CommandStream;
use crate::config::{AppConfig, TextCatalog};
use crate::ports::{CredentialStore, UserGateway};

/// Process-wide values every flow reads.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// Label of the command users answer prompts with.
    pub command_label: String,
    /// Raw no-methods policy, resolved each time a flow gets stuck.
    pub no_methods: String,
    /// Limit on each verification round trip; `None` waits forever.
    pub authorization_timeout: Option<Duration>,
    pub login_token_length: usize,
    pub registration_code_length: usize,
}

impl FlowSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            command_label: config.command.label.clone(),
            no_methods: config.policy.no_methods.clone(),
            authorization_timeout: config.policy.authorization_timeout(),
            login_token_length: config.session.login_token_length,
            registration_code_length: config.session.registration_code_length,
        }
    }
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            command_label: "interactive-login".to_string(),
            no_methods: "kick".to_string(),
            authorization_timeout: None,
            login_token_length: 32,
            registration_code_length: 48,
        }
    }
}

/// Collaborators shared by all flows.
#[derive(Clone)]
pub struct FlowDependencies {
    pub credentials: Arc<dyn CredentialStore>,
    pub gateway: Arc<dyn UserGateway>,
    pub commands: CommandStream,
    pub settings: Arc<FlowSettings>,
    /// Root text catalog.
    pub texts: Arc<TextCatalog>,
}

impl FlowDependencies {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        gateway: Arc<dyn UserGateway>,
        commands: CommandStream,
        settings: FlowSettings,
        texts: Arc<TextCatalog>,
    ) -> Self {
        Self {
            credentials,
            gateway,
            commands,
            settings: Arc::new(settings),
            texts,
        }
    }
}

impl std::fmt::Debug for FlowDependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowDependencies")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
