//! Chat confirmation method.
//!
//! Proves identity by having the user echo the session secret back through
//! the command stream: `/<label> <confirm-word> <secret>`. Logins get a
//! clickable link that runs the command; registrations show the code with
//! a copy link and wait for the user to type it.
//!
//! # Settings
//!
//! | key                 | type       | default     |
//! |---------------------|------------|-------------|
//! | `confirm-word`      | string     | `"confirm"` |
//! | `wait-timeout`      | seconds    | `0` (none)  |
//! | `registration-open` | bool       | `true`      |
//! | `registered-users`  | [string]   | `[]`        |

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use crate::application::command_stream::{CommandStream, CommandSubscription};
use crate::application::flow::registration_code_message;
use crate::application::timeout::{with_authorization_timeout, TimedOut};
use crate::config::{MethodScope, Translations};
use crate::domain::command::CommandInvocation;
use crate::domain::foundation::UserId;
use crate::domain::message::{ClickAction, Message, TextStyle};
use crate::domain::session::{LoginResult, LoginSession, RegistrationResult, RegistrationSession};
use crate::ports::{CompensationScope, MethodError, UserGateway, VerificationMethod};

/// Factory kind this method registers under.
pub const KIND: &str = "chat-confirm";

const DEFAULT_CONFIRM_WORD: &str = "confirm";

/// What a user is currently being asked to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingPrompt {
    Login,
    Registration,
}

#[derive(Debug, Clone)]
struct Settings {
    scope: MethodScope,
    confirm_word: String,
    wait_timeout: Option<Duration>,
    registration_open: bool,
}

/// Verification through a confirmation command.
pub struct ChatConfirmMethod {
    commands: CommandStream,
    gateway: Arc<dyn UserGateway>,
    label: String,
    settings: Option<Settings>,
    registered: Arc<RwLock<HashSet<UserId>>>,
    pending: Arc<RwLock<HashMap<UserId, PendingPrompt>>>,
}

impl ChatConfirmMethod {
    pub fn new(commands: CommandStream, gateway: Arc<dyn UserGateway>, label: impl Into<String>) -> Self {
        Self {
            commands,
            gateway,
            label: label.into(),
            settings: None,
            registered: Arc::new(RwLock::new(HashSet::new())),
            pending: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A factory producing fresh instances wired to the same collaborators.
    pub fn factory(
        commands: CommandStream,
        gateway: Arc<dyn UserGateway>,
        label: impl Into<String>,
    ) -> impl Fn() -> ChatConfirmMethod + Send + Sync + 'static {
        let label = label.into();
        move || ChatConfirmMethod::new(commands.clone(), Arc::clone(&gateway), label.clone())
    }

    /// Prompts waiting for an answer.
    pub async fn pending_prompts(&self) -> HashMap<UserId, PendingPrompt> {
        self.pending.read().await.clone()
    }

    fn settings(&self) -> Result<&Settings, MethodError> {
        self.settings.as_ref().ok_or(MethodError::NotInitialized)
    }

    fn translations(settings: &Settings, user: &UserId) -> Translations {
        settings.scope.translations().with("player", user.as_str())
    }

    /// Records the prompt and defers its withdrawal.
    async fn open_prompt(&self, user: &UserId, prompt: PendingPrompt, compensation: &CompensationScope) {
        self.pending.write().await.insert(user.clone(), prompt);

        let pending = Arc::clone(&self.pending);
        let user = user.clone();
        compensation.defer(move || async move {
            if pending.write().await.remove(&user).is_some() {
                tracing::debug!(user = %user, "Withdrew pending confirmation prompt");
            }
        });
    }

    async fn close_prompt(&self, user: &UserId) {
        self.pending.write().await.remove(user);
    }

    /// Waits for `/<label> <confirm-word> ...` from `user` and returns its secret argument.
    async fn await_confirmation(
        &self,
        settings: &Settings,
        user: &UserId,
        subscription: CommandSubscription,
    ) -> Result<String, MethodError> {
        let label = self.label.as_str();
        let word = settings.confirm_word.as_str();
        let answer = subscription.first_matching(|invocation: &CommandInvocation| {
            invocation.sender == *user
                && invocation.label == label
                && invocation.args.first().map(String::as_str) == Some(word)
        });

        let invocation = match with_authorization_timeout(settings.wait_timeout, answer).await {
            Ok(received) => received.map_err(|e| MethodError::unavailable(e.to_string()))?,
            Err(TimedOut { after }) => {
                return Err(MethodError::Timeout {
                    seconds: after.as_secs(),
                })
            }
        };

        Ok(invocation.args.get(1).cloned().unwrap_or_default())
    }
}

fn secrets_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

impl std::fmt::Debug for ChatConfirmMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfirmMethod")
            .field("label", &self.label)
            .field("initialized", &self.settings.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VerificationMethod for ChatConfirmMethod {
    async fn initialize(&mut self, scope: &MethodScope) -> Result<(), MethodError> {
        let confirm_word = scope
            .get::<String>("confirm-word")?
            .unwrap_or_else(|| DEFAULT_CONFIRM_WORD.to_string());
        let wait_timeout = scope
            .get::<u64>("wait-timeout")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let registration_open = scope.get::<bool>("registration-open")?.unwrap_or(true);

        let preset: Vec<String> = scope.get("registered-users")?.unwrap_or_default();
        let preset = preset
            .into_iter()
            .map(UserId::new)
            .collect::<Result<HashSet<_>, _>>()
            .map_err(|e| MethodError::internal(format!("registered-users: {}", e)))?;
        self.registered.write().await.extend(preset);

        tracing::info!(method = %scope.name(), confirm_word = %confirm_word, "Chat confirmation ready");

        self.settings = Some(Settings {
            scope: scope.clone(),
            confirm_word,
            wait_timeout,
            registration_open,
        });
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), MethodError> {
        let abandoned = {
            let mut pending = self.pending.write().await;
            let count = pending.len();
            pending.clear();
            count
        };
        if abandoned > 0 {
            tracing::warn!(abandoned, "Shutting down with unanswered confirmation prompts");
        }
        Ok(())
    }

    async fn eligible_for_registration(&self, user: &UserId) -> Result<bool, MethodError> {
        let settings = self.settings()?;
        Ok(settings.registration_open && !self.registered.read().await.contains(user))
    }

    async fn is_registered(&self, user: &UserId) -> Result<bool, MethodError> {
        self.settings()?;
        Ok(self.registered.read().await.contains(user))
    }

    async fn login(
        &self,
        session: &LoginSession,
        compensation: &CompensationScope,
    ) -> Result<LoginResult, MethodError> {
        let settings = self.settings()?;
        let user = session.user();
        let texts = Self::translations(settings, user);

        let subscription = self.commands.subscribe();
        self.open_prompt(user, PendingPrompt::Login, compensation).await;

        let prompt = Message::new()
            .text(texts.of("confirm-login-message")?)
            .text(" ")
            .link(
                texts.of("confirm-login-link")?,
                Some(texts.of("confirm-login-tooltip")?),
                ClickAction::RunCommand(format!(
                    "/{} {} {}",
                    self.label,
                    settings.confirm_word,
                    session.token()
                )),
            );
        self.gateway.send_message(user, prompt).await?;

        let provided = self.await_confirmation(settings, user, subscription).await?;
        self.close_prompt(user).await;

        if secrets_match(session.token(), &provided) {
            Ok(LoginResult::Success)
        } else {
            tracing::warn!(user = %user, "Login confirmation did not match");
            Ok(LoginResult::Unauthorized)
        }
    }

    async fn register(
        &self,
        session: &RegistrationSession,
        compensation: &CompensationScope,
    ) -> Result<RegistrationResult, MethodError> {
        let settings = self.settings()?;
        let user = session.user();
        let texts = Self::translations(settings, user);

        let subscription = self.commands.subscribe();
        self.open_prompt(user, PendingPrompt::Registration, compensation).await;

        let prompt = registration_code_message(&texts, session.code())?
            .line_break()
            .text(texts.of("confirm-registration-message")?);
        self.gateway.send_message(user, prompt).await?;

        let provided = self.await_confirmation(settings, user, subscription).await?;
        self.close_prompt(user).await;

        if !secrets_match(session.code(), &provided) {
            return Ok(RegistrationResult::Abort);
        }

        self.registered.write().await.insert(user.clone());
        self.gateway
            .send_message(
                user,
                Message::new().styled(texts.of("registration-confirmed")?, TextStyle::Bold),
            )
            .await?;
        Ok(RegistrationResult::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::RecordingGateway;
    use crate::config::AppConfig;
    use serde_json::json;

    const LABEL: &str = "interactive-login";

    struct Fixture {
        commands: CommandStream,
        gateway: RecordingGateway,
        method: ChatConfirmMethod,
    }

    async fn fixture(settings: serde_json::Value) -> Fixture {
        let commands = CommandStream::new(16);
        let gateway = RecordingGateway::new();
        let mut method = ChatConfirmMethod::new(commands.clone(), Arc::new(gateway.clone()), LABEL);
        let settings = match settings {
            serde_json::Value::Object(map) => map,
            _ => Default::default(),
        };
        let scope = MethodScope::new(
            "chat",
            settings,
            AppConfig::from_toml("").unwrap().root_texts(),
        );
        method.initialize(&scope).await.unwrap();
        Fixture {
            commands,
            gateway,
            method,
        }
    }

    fn steve() -> UserId {
        UserId::new("Steve").unwrap()
    }

    /// Runs the command the first link in the latest message points at.
    async fn click_link(fixture: &Fixture, user: &UserId) {
        let messages = fixture.gateway.wait_for_messages(user, 1).await;
        let command = messages
            .last()
            .unwrap()
            .actions()
            .find_map(|action| match action {
                ClickAction::RunCommand(line) => Some(line.clone()),
                _ => None,
            })
            .unwrap();
        fixture
            .commands
            .publish(CommandInvocation::parse(user.clone(), &command).unwrap());
    }

    fn confirm(user: &UserId, secret: &str) -> CommandInvocation {
        CommandInvocation::new(
            user.clone(),
            LABEL,
            vec!["confirm".to_string(), secret.to_string()],
        )
    }

    #[tokio::test]
    async fn login_succeeds_when_link_is_clicked() {
        let fixture = fixture(json!({ "registered-users": ["Steve"] })).await;
        let user = steve();
        let session = LoginSession::start(user.clone(), 16);
        let compensation = CompensationScope::new();

        assert!(fixture.method.is_registered(&user).await.unwrap());
        let (result, ()) = tokio::join!(
            fixture.method.login(&session, &compensation),
            click_link(&fixture, &user)
        );

        assert_eq!(result.unwrap(), LoginResult::Success);
        assert!(fixture.method.pending_prompts().await.is_empty());
    }

    #[tokio::test]
    async fn login_with_wrong_secret_is_unauthorized() {
        let fixture = fixture(json!({})).await;
        let user = steve();
        let session = LoginSession::start(user.clone(), 16);
        let compensation = CompensationScope::new();

        let answer = async {
            fixture.gateway.wait_for_messages(&user, 1).await;
            fixture.commands.publish(confirm(&user, "guess"));
        };
        let (result, ()) = tokio::join!(fixture.method.login(&session, &compensation), answer);

        assert_eq!(result.unwrap(), LoginResult::Unauthorized);
    }

    #[tokio::test]
    async fn registration_requires_typed_code() {
        let fixture = fixture(json!({})).await;
        let user = steve();
        let session = RegistrationSession::start(user.clone(), 12);
        let compensation = CompensationScope::new();

        assert!(fixture.method.eligible_for_registration(&user).await.unwrap());
        let answer = async {
            let prompt = fixture.gateway.wait_for_messages(&user, 1).await;
            assert!(prompt[0]
                .actions()
                .any(|a| *a == ClickAction::CopyToClipboard(session.code().to_string())));
            fixture.commands.publish(confirm(&user, session.code()));
        };
        let (result, ()) = tokio::join!(fixture.method.register(&session, &compensation), answer);

        assert_eq!(result.unwrap(), RegistrationResult::Success);
        assert!(fixture.method.is_registered(&user).await.unwrap());
        assert!(!fixture.method.eligible_for_registration(&user).await.unwrap());
        assert_eq!(fixture.gateway.messages_for(&user).await.len(), 2);
    }

    #[tokio::test]
    async fn wrong_registration_code_aborts() {
        let fixture = fixture(json!({})).await;
        let user = steve();
        let session = RegistrationSession::start(user.clone(), 12);
        let compensation = CompensationScope::new();

        let answer = async {
            fixture.gateway.wait_for_messages(&user, 1).await;
            fixture.commands.publish(confirm(&user, "nope"));
        };
        let (result, ()) = tokio::join!(fixture.method.register(&session, &compensation), answer);

        assert_eq!(result.unwrap(), RegistrationResult::Abort);
        assert!(!fixture.method.is_registered(&user).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_prompt_times_out_and_compensates() {
        let fixture = fixture(json!({ "wait-timeout": 10 })).await;
        let user = steve();
        let session = LoginSession::start(user.clone(), 16);
        let compensation = CompensationScope::new();

        let result = fixture.method.login(&session, &compensation).await;

        assert!(matches!(result, Err(MethodError::Timeout { seconds: 10 })));
        assert_eq!(
            fixture.method.pending_prompts().await.get(&user),
            Some(&PendingPrompt::Login)
        );

        assert_eq!(compensation.drain().await, 1);
        assert!(fixture.method.pending_prompts().await.is_empty());
    }

    #[tokio::test]
    async fn closed_registration_is_not_eligible() {
        let fixture = fixture(json!({ "registration-open": false })).await;
        assert!(!fixture.method.eligible_for_registration(&steve()).await.unwrap());
    }

    #[tokio::test]
    async fn uninitialized_method_refuses_calls() {
        let method = ChatConfirmMethod::new(
            CommandStream::new(4),
            Arc::new(RecordingGateway::new()),
            LABEL,
        );
        assert!(matches!(
            method.is_registered(&steve()).await,
            Err(MethodError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn malformed_setting_fails_initialization() {
        let mut method = ChatConfirmMethod::new(
            CommandStream::new(4),
            Arc::new(RecordingGateway::new()),
            LABEL,
        );
        let mut settings = serde_json::Map::new();
        settings.insert("wait-timeout".to_string(), json!("soon"));
        let scope = MethodScope::new("chat", settings, AppConfig::from_toml("").unwrap().root_texts());

        assert!(matches!(
            method.initialize(&scope).await,
            Err(MethodError::Configuration(_))
        ));
    }

    #[test]
    fn secrets_compare_exactly() {
        assert!(secrets_match("abc", "abc"));
        assert!(!secrets_match("abc", "abd"));
        assert!(!secrets_match("abc", "abcd"));
        assert!(!secrets_match("abc", ""));
    }
}
