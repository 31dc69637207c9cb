//! Integration tests for the join gate.
//!
//! These tests drive the whole stack the way a host does:
//! 1. Configuration is parsed, methods are built through their factories
//! 2. The registry loads in the background and releases the barrier
//! 3. The supervisor spawns one flow per connecting user
//! 4. Users answer prompts through the command stream
//!
//! Uses the in-memory adapters, no external services.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use interactive_login::adapters::methods::{chat_confirm, ChatConfirmMethod};
use interactive_login::adapters::{
    InMemoryCredentialStore, RecordingGateway, ScriptedCall, ScriptedMethod,
};
use interactive_login::application::{
    initialization_barrier, spawn_initialization, CommandStream, FlowDependencies, FlowResolution,
    FlowSettings, FlowSupervisor, MethodFactories,
};
use interactive_login::config::AppConfig;
use interactive_login::domain::command::CommandInvocation;
use interactive_login::domain::foundation::UserId;
use interactive_login::domain::message::ClickAction;
use interactive_login::domain::session::{AuthorizationSession, LoginResult, RegistrationResult};

// =============================================================================
// Test Infrastructure
// =============================================================================

const LABEL: &str = "interactive-login";

/// A host with in-memory collaborators.
struct Gate {
    config: AppConfig,
    credentials: InMemoryCredentialStore,
    gateway: RecordingGateway,
    commands: CommandStream,
}

impl Gate {
    /// `methods` lists `(name, kind)` pairs in configuration order.
    fn new(policy: &str, methods: &[(&str, &str)]) -> Self {
        let mut document = format!("[policy]\n{}\n", policy);
        for (name, kind) in methods {
            document.push_str(&format!("\n[[methods]]\nname = \"{}\"\nkind = \"{}\"\n", name, kind));
        }
        Self {
            config: AppConfig::from_toml(&document).unwrap(),
            credentials: InMemoryCredentialStore::new(),
            gateway: RecordingGateway::new(),
            commands: CommandStream::new(64),
        }
    }

    fn with_registered(mut self, users: &[&UserId]) -> Self {
        self.credentials = InMemoryCredentialStore::with_registered(users.iter().map(|u| (*u).clone()));
        self
    }

    fn start(&self, factories: MethodFactories) -> FlowSupervisor {
        let (signal, barrier) = initialization_barrier();
        spawn_initialization(
            self.config.methods.clone(),
            factories,
            self.config.root_texts(),
            signal,
        );
        FlowSupervisor::new(
            FlowDependencies::new(
                Arc::new(self.credentials.clone()),
                Arc::new(self.gateway.clone()),
                self.commands.clone(),
                FlowSettings::from_config(&self.config),
                self.config.root_texts(),
            ),
            barrier,
        )
    }

    /// Waits for the `count`-th message to `user`, then sends `/interactive-login <args>`.
    async fn answer(&self, user: &UserId, count: usize, args: &str) {
        self.gateway.wait_for_messages(user, count).await;
        self.commands.publish(CommandInvocation::new(
            user.clone(),
            LABEL,
            args.split_whitespace().map(str::to_string).collect(),
        ));
    }
}

fn user(name: &str) -> UserId {
    UserId::new(name).unwrap()
}

fn scripted(kind: &str, method: &ScriptedMethod) -> MethodFactories {
    let method = method.clone();
    MethodFactories::new().with(kind, move || method.clone())
}

async fn resolve(handle: tokio::task::JoinHandle<FlowResolution>) -> FlowResolution {
    tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("flow did not finish")
        .expect("flow task panicked")
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[tokio::test]
async fn unknown_user_registers_through_single_method() {
    let gate = Gate::new("", &[("discord", "scripted")]);
    let method = ScriptedMethod::new();
    let supervisor = gate.start(scripted("scripted", &method));
    let steve = user("Steve");

    let resolution = resolve(supervisor.on_connect(steve.clone())).await;

    assert!(matches!(
        resolution.session(),
        Some(AuthorizationSession::Registration(_))
    ));
    assert!(gate.credentials.has_credential(&steve).await);
    assert!(gate.credentials.is_admitted(&steve).await);
    assert_eq!(method.register_calls(), 1);
    assert!(gate.gateway.events().await.is_empty());
}

#[tokio::test]
async fn known_user_picks_second_method() {
    let steve = user("Steve");
    let gate = Gate::new("", &[("methodA", "a"), ("methodB", "b")]).with_registered(&[&steve]);
    let method_a = ScriptedMethod::new().registered(true);
    let method_b = ScriptedMethod::new().registered(true);
    let factories = MethodFactories::new()
        .with("a", {
            let m = method_a.clone();
            move || m.clone()
        })
        .with("b", {
            let m = method_b.clone();
            move || m.clone()
        });
    let supervisor = gate.start(factories);

    let handle = supervisor.on_connect(steve.clone());
    gate.answer(&steve, 1, "methodB").await;
    let resolution = resolve(handle).await;

    assert!(matches!(resolution.session(), Some(AuthorizationSession::Login(_))));
    assert_eq!(method_a.login_calls(), 0);
    assert_eq!(method_b.login_calls(), 1);
    assert!(gate.credentials.is_admitted(&steve).await);
}

#[tokio::test]
async fn unauthorized_login_disconnects_naming_method() {
    let steve = user("Steve");
    let gate = Gate::new("", &[("discord", "scripted")]).with_registered(&[&steve]);
    let method = ScriptedMethod::new()
        .registered(true)
        .login_result(LoginResult::Unauthorized);
    let supervisor = gate.start(scripted("scripted", &method));

    let resolution = resolve(supervisor.on_connect(steve.clone())).await;

    assert!(matches!(resolution.session(), Some(AuthorizationSession::Empty)));
    let disconnects = gate.gateway.disconnects_for(&steve).await;
    assert_eq!(disconnects.len(), 1);
    assert!(disconnects[0].to_plain_text().contains("discord"));
    assert!(!gate.credentials.is_admitted(&steve).await);
}

#[tokio::test]
async fn stay_policy_admits_without_methods() {
    let gate = Gate::new("no-methods = \"stay\"", &[("discord", "scripted")]);
    let method = ScriptedMethod::new().eligible(false);
    let supervisor = gate.start(scripted("scripted", &method));
    let steve = user("Steve");

    let resolution = resolve(supervisor.on_connect(steve.clone())).await;

    assert!(matches!(resolution.session(), Some(AuthorizationSession::Empty)));
    assert!(!gate.credentials.has_credential(&steve).await);
    assert!(!gate.gateway.is_disconnected(&steve).await);
    assert_eq!(method.register_calls(), 0);
}

// =============================================================================
// Policies and fallbacks
// =============================================================================

#[tokio::test]
async fn kick_policy_disconnects_without_methods() {
    let gate = Gate::new("no-methods = \"kick\"", &[]);
    let supervisor = gate.start(MethodFactories::new());
    let steve = user("Steve");

    let resolution = resolve(supervisor.on_connect(steve.clone())).await;

    assert!(resolution.is_completed());
    let disconnects = gate.gateway.disconnects_for(&steve).await;
    assert_eq!(
        disconnects[0].to_plain_text(),
        "Steve, there is no way for you to register on this server."
    );
}

#[tokio::test]
async fn unknown_policy_is_a_configuration_error() {
    let gate = Gate::new("no-methods = \"ban\"", &[]);
    let supervisor = gate.start(MethodFactories::new());
    let steve = user("Steve");

    let resolution = resolve(supervisor.on_connect(steve.clone())).await;

    assert_eq!(resolution.error().unwrap().category(), "ConfigurationError");
    assert!(!gate.gateway.is_disconnected(&steve).await);
    assert_eq!(gate.gateway.messages_for(&steve).await.len(), 1);
}

#[tokio::test]
async fn known_user_without_registered_method_falls_through_to_registration() {
    let steve = user("Steve");
    let gate = Gate::new("", &[("discord", "scripted")]).with_registered(&[&steve]);
    let method = ScriptedMethod::new().registered(false);
    let supervisor = gate.start(scripted("scripted", &method));

    let resolution = resolve(supervisor.on_connect(steve.clone())).await;

    assert!(matches!(
        resolution.session(),
        Some(AuthorizationSession::Registration(_))
    ));
    assert_eq!(method.login_calls(), 0);
    assert_eq!(method.register_calls(), 1);
}

#[tokio::test]
async fn aborted_registration_is_kicked() {
    let gate = Gate::new("", &[("discord", "scripted")]);
    let method = ScriptedMethod::new().register_result(RegistrationResult::Abort);
    let supervisor = gate.start(scripted("scripted", &method));
    let steve = user("Steve");

    resolve(supervisor.on_connect(steve.clone())).await;

    let disconnects = gate.gateway.disconnects_for(&steve).await;
    assert_eq!(
        disconnects[0].to_plain_text(),
        "Steve, your registration was aborted."
    );
}

#[tokio::test]
async fn broken_method_is_excluded_at_startup() {
    let gate = Gate::new("", &[("broken", "broken"), ("discord", "scripted")]);
    let healthy = ScriptedMethod::new();
    let factories = scripted("scripted", &healthy)
        .with("broken", || ScriptedMethod::new().failing_initialize());
    let supervisor = gate.start(factories);
    let steve = user("Steve");

    let resolution = resolve(supervisor.on_connect(steve.clone())).await;

    // Only one candidate left, so no prompt is needed.
    assert!(resolution.is_completed());
    assert_eq!(healthy.register_calls(), 1);
    assert!(gate.gateway.messages_for(&steve).await.is_empty());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn mistyped_choice_notifies_without_disconnect() {
    let gate = Gate::new("", &[("methodA", "scripted"), ("methodB", "scripted")]);
    let method = ScriptedMethod::new();
    let supervisor = gate.start(scripted("scripted", &method));
    let steve = user("Steve");

    let handle = supervisor.on_connect(steve.clone());
    gate.answer(&steve, 1, "methodC").await;
    let resolution = resolve(handle).await;

    assert_eq!(resolution.error().unwrap().category(), "SelectionError");
    let messages = gate.gateway.messages_for(&steve).await;
    assert_eq!(messages.len(), 2);
    assert!(messages[1].to_plain_text().contains("SelectionError"));
    assert!(!gate.gateway.is_disconnected(&steve).await);
    assert_eq!(method.register_calls(), 0);
}

#[tokio::test]
async fn failing_method_is_compensated() {
    let gate = Gate::new("", &[("discord", "scripted")]);
    let counter = Arc::new(AtomicUsize::new(0));
    let method = ScriptedMethod::new()
        .failing("bot offline")
        .compensating(Arc::clone(&counter));
    let supervisor = gate.start(scripted("scripted", &method));
    let steve = user("Steve");

    let resolution = resolve(supervisor.on_connect(steve.clone())).await;

    assert_eq!(resolution.error().unwrap().category(), "MethodError");
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(!gate.credentials.has_credential(&steve).await);
}

#[tokio::test]
async fn successful_flow_is_not_compensated() {
    let gate = Gate::new("", &[("discord", "scripted")]);
    let counter = Arc::new(AtomicUsize::new(0));
    let method = ScriptedMethod::new().compensating(Arc::clone(&counter));
    let supervisor = gate.start(scripted("scripted", &method));

    let resolution = resolve(supervisor.on_connect(user("Steve"))).await;

    assert!(resolution.is_completed());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_method_times_out_and_is_compensated() {
    let gate = Gate::new("authorization-timeout = 5", &[("discord", "scripted")]);
    let counter = Arc::new(AtomicUsize::new(0));
    let method = ScriptedMethod::new()
        .with_delay(Duration::from_secs(60))
        .compensating(Arc::clone(&counter));
    let supervisor = gate.start(scripted("scripted", &method));
    let steve = user("Steve");

    let resolution = supervisor.on_connect(steve.clone()).await.unwrap();

    assert_eq!(resolution.error().unwrap().category(), "TimeoutError");
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(!gate.credentials.has_credential(&steve).await);
    assert!(!gate.gateway.is_disconnected(&steve).await);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_flows_do_not_cross_talk() {
    let gate = Gate::new("", &[("methodA", "scripted"), ("methodB", "scripted")]);
    let method = ScriptedMethod::new();
    let supervisor = gate.start(scripted("scripted", &method));
    let (steve, alex) = (user("Steve"), user("Alex"));

    let steve_flow = supervisor.on_connect(steve.clone());
    let alex_flow = supervisor.on_connect(alex.clone());

    // Answer in the opposite order of connecting.
    gate.answer(&alex, 1, "methodA").await;
    gate.answer(&steve, 1, "methodB").await;

    assert!(resolve(steve_flow).await.is_completed());
    assert!(resolve(alex_flow).await.is_completed());

    let registered: Vec<UserId> = method
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            ScriptedCall::Register { user, .. } => Some(user),
            _ => None,
        })
        .collect();
    assert_eq!(registered.len(), 2);
    assert!(registered.contains(&steve));
    assert!(registered.contains(&alex));
    assert_eq!(gate.credentials.credential_count().await, 2);
}

#[tokio::test]
async fn concurrent_sessions_get_distinct_secrets() {
    let gate = Gate::new("", &[("discord", "scripted")]);
    let method = ScriptedMethod::new();
    let supervisor = gate.start(scripted("scripted", &method));

    let handles: Vec<_> = (0..20)
        .map(|i| supervisor.on_connect(user(&format!("player{}", i))))
        .collect();
    for handle in handles {
        assert!(resolve(handle).await.is_completed());
    }

    let codes: std::collections::HashSet<String> = method
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            ScriptedCall::Register { code, .. } => Some(code),
            _ => None,
        })
        .collect();
    assert_eq!(codes.len(), 20);
    assert!(codes.iter().all(|code| code.len() == 48));
}

// =============================================================================
// Chat confirmation through the engine
// =============================================================================

#[tokio::test]
async fn chat_confirm_registration_round_trip() {
    let gate = Gate::new("", &[("chat", chat_confirm::KIND)]);
    let factories = MethodFactories::new().with(
        chat_confirm::KIND,
        ChatConfirmMethod::factory(gate.commands.clone(), Arc::new(gate.gateway.clone()), LABEL),
    );
    let supervisor = gate.start(factories);
    let steve = user("Steve");

    let handle = supervisor.on_connect(steve.clone());
    let prompt = gate.gateway.wait_for_messages(&steve, 1).await;
    let code = prompt[0]
        .actions()
        .find_map(|action| match action {
            ClickAction::CopyToClipboard(code) => Some(code.clone()),
            _ => None,
        })
        .unwrap();
    gate.commands.publish(CommandInvocation::new(
        steve.clone(),
        LABEL,
        vec!["confirm".to_string(), code],
    ));
    let resolution = resolve(handle).await;

    assert!(matches!(
        resolution.session(),
        Some(AuthorizationSession::Registration(_))
    ));
    assert!(gate.credentials.is_admitted(&steve).await);
}
