use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use super::messages::{error_message, method_choice_message};
use super::selection::find_candidate;
use super::state::{FlowState, Transition};
use super::{FlowDependencies, FlowError};
use crate::application::registry::{MethodEntry, MethodRegistry};
use crate::application::timeout::{with_authorization_timeout, TimedOut};
use crate::config::{NoMethodsPolicy, Translations};
use crate::domain::foundation::UserId;
use crate::domain::session::{
    AuthorizationSession, LoginResult, LoginSession, RegistrationResult, RegistrationSession,
};
use crate::ports::{CompensationScope, MethodError};

/// Drives one user from connection to a terminal decision.
///
/// Holds no per-user state; the same `JoinFlow` can run any number of
/// users concurrently.
#[derive(Debug, Clone)]
pub struct JoinFlow {
    registry: Arc<MethodRegistry>,
    deps: FlowDependencies,
}

impl JoinFlow {
    pub fn new(registry: Arc<MethodRegistry>, deps: FlowDependencies) -> Self {
        Self { registry, deps }
    }

    /// Runs the whole flow for `user`.
    pub async fn run(
        &self,
        user: &UserId,
        compensation: &CompensationScope,
    ) -> Result<AuthorizationSession, FlowError> {
        let initial = self.initial_state(user).await?;
        self.drive(initial, user, compensation).await
    }

    /// `Login` for users the credential store knows, `Register` otherwise.
    pub async fn initial_state(&self, user: &UserId) -> Result<FlowState, FlowError> {
        if self.deps.credentials.is_registered(user).await? {
            Ok(FlowState::Login)
        } else {
            Ok(FlowState::Register)
        }
    }

    /// Applies transitions from `state` until the flow is done.
    pub async fn drive(
        &self,
        mut state: FlowState,
        user: &UserId,
        compensation: &CompensationScope,
    ) -> Result<AuthorizationSession, FlowError> {
        loop {
            match self.step(&state, user, compensation).await? {
                Transition::Step(next) => {
                    debug!(from = %state, to = %next, "Flow transition");
                    state = next;
                }
                Transition::Done(session) => {
                    debug!(from = %state, empty = session.is_empty(), "Flow done");
                    return Ok(session);
                }
            }
        }
    }

    /// Computes the single transition out of `state`.
    pub async fn step(
        &self,
        state: &FlowState,
        user: &UserId,
        compensation: &CompensationScope,
    ) -> Result<Transition, FlowError> {
        match state {
            FlowState::Register => self.register(user, compensation).await,
            FlowState::Login => self.login(user, compensation).await,
            FlowState::Stuck { reason } => self.stuck(reason),
            FlowState::Accept => {
                info!(user = %user, "{} was not eligible for registration, but policy allows their stay", user);
                Ok(Transition::Done(AuthorizationSession::Empty))
            }
            FlowState::Refuse { reason } => {
                self.deps
                    .gateway
                    .disconnect(user, error_message(reason))
                    .await?;
                Ok(Transition::Done(AuthorizationSession::Empty))
            }
        }
    }

    async fn register(
        &self,
        user: &UserId,
        compensation: &CompensationScope,
    ) -> Result<Transition, FlowError> {
        let mut candidates = Vec::new();
        for entry in self.registry.entries() {
            let eligible = entry
                .method()
                .eligible_for_registration(user)
                .await
                .map_err(|e| FlowError::method(entry.name(), e))?;
            if eligible {
                candidates.push(entry);
            }
        }

        if candidates.is_empty() {
            let reason = self.translations(user).of("no-methods-kick")?;
            return Ok(Transition::Step(FlowState::stuck(reason)));
        }

        let entry = self
            .choose(user, &candidates, "registration-options-prefix")
            .await?;
        let session =
            RegistrationSession::start(user.clone(), self.deps.settings.registration_code_length);
        let outcome = self
            .verify(entry, entry.method().register(&session, compensation))
            .await?;

        match outcome {
            RegistrationResult::Success => {
                self.deps.credentials.create_credential_and_admit(user).await?;
                info!(user = %user, method = %entry.name(), "Registered {} using {}", user, entry.name());
                Ok(Transition::Done(AuthorizationSession::Registration(session)))
            }
            RegistrationResult::Abort => {
                let reason = self.translations(user).of("login-aborted-kick")?;
                Ok(Transition::Step(FlowState::stuck(reason)))
            }
        }
    }

    async fn login(
        &self,
        user: &UserId,
        compensation: &CompensationScope,
    ) -> Result<Transition, FlowError> {
        let mut candidates = Vec::new();
        for entry in self.registry.entries() {
            let registered = entry
                .method()
                .is_registered(user)
                .await
                .map_err(|e| FlowError::method(entry.name(), e))?;
            if registered {
                candidates.push(entry);
            }
        }

        if candidates.is_empty() {
            return Ok(Transition::Step(FlowState::Register));
        }

        let entry = self.choose(user, &candidates, "login-options-prefix").await?;
        let session = LoginSession::start(user.clone(), self.deps.settings.login_token_length);
        let outcome = self
            .verify(entry, entry.method().login(&session, compensation))
            .await?;

        match outcome {
            LoginResult::Success => {
                self.deps.credentials.mark_admitted(user).await?;
                Ok(Transition::Done(AuthorizationSession::Login(session)))
            }
            LoginResult::Unauthorized => {
                let reason = entry
                    .scope()
                    .translations()
                    .with("player", user.as_str())
                    .with("method", entry.name())
                    .of("unauthorized")?;
                Ok(Transition::Step(FlowState::refuse(reason)))
            }
        }
    }

    fn stuck(&self, reason: &str) -> Result<Transition, FlowError> {
        let policy: NoMethodsPolicy = self.deps.settings.no_methods.parse()?;
        match policy {
            NoMethodsPolicy::Kick => Ok(Transition::Step(FlowState::refuse(reason))),
            NoMethodsPolicy::Stay => Ok(Transition::Step(FlowState::Accept)),
        }
    }

    /// Picks one of `candidates`, asking the user when there is more than one.
    async fn choose<'a>(
        &self,
        user: &UserId,
        candidates: &[&'a MethodEntry],
        prefix_key: &str,
    ) -> Result<&'a MethodEntry, FlowError> {
        if let [only] = candidates {
            return Ok(*only);
        }

        let label = &self.deps.settings.command_label;
        let names: Vec<&str> = candidates.iter().map(|entry| entry.name()).collect();

        // Subscribe before prompting so a quick reply is not missed.
        let subscription = self.deps.commands.subscribe();
        let prompt = method_choice_message(&self.translations(user), prefix_key, &names, label)?;
        self.deps.gateway.send_message(user, prompt).await?;

        let choice = subscription.next_from(user, label).await?.joined_args();
        match find_candidate(candidates, &choice) {
            Some(entry) => Ok(entry),
            None => Err(FlowError::SelectionNotFound {
                choice,
                candidates: names.iter().map(|name| name.to_string()).collect(),
            }),
        }
    }

    /// Awaits a method's verification call under the authorization timeout.
    async fn verify<T, F>(&self, entry: &MethodEntry, call: F) -> Result<T, FlowError>
    where
        F: Future<Output = Result<T, MethodError>>,
    {
        match with_authorization_timeout(self.deps.settings.authorization_timeout, call).await {
            Ok(result) => result.map_err(|e| FlowError::method(entry.name(), e)),
            Err(TimedOut { after }) => Err(FlowError::Timeout {
                method: entry.name().to_string(),
                seconds: after.as_secs(),
            }),
        }
    }

    fn translations(&self, user: &UserId) -> Translations {
        Translations::new(Arc::clone(&self.deps.texts)).with("player", user.as_str())
    }
}
