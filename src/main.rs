//! Console host for the join gate.
//!
//! Reads one instruction per line from stdin:
//!
//! ```text
//! join Steve                      # Steve connects
//! Steve /interactive-login alpha  # Steve runs a command
//! quit
//! ```
//!
//! Messages to users are printed to stdout, logs go to stderr.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use interactive_login::adapters::methods::{chat_confirm, ChatConfirmMethod};
use interactive_login::adapters::{ConsoleGateway, InMemoryCredentialStore};
use interactive_login::application::{
    initialization_barrier, spawn_initialization, CommandStream, FlowDependencies, FlowResolution,
    FlowSettings, FlowSupervisor, MethodFactories,
};
use interactive_login::config::AppConfig;
use interactive_login::domain::command::CommandInvocation;
use interactive_login::domain::foundation::UserId;
use interactive_login::ports::UserGateway;

fn init_tracing(filter: EnvFilter, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(config.logging.env_filter(), config.logging.json);
    config.validate()?;

    let commands = CommandStream::new(config.command.capacity);
    let gateway: Arc<dyn UserGateway> = Arc::new(ConsoleGateway::new());
    let label = config.command.label.clone();

    let factories = MethodFactories::new().with(
        chat_confirm::KIND,
        ChatConfirmMethod::factory(commands.clone(), Arc::clone(&gateway), label.clone()),
    );

    let (signal, barrier) = initialization_barrier();
    let loading = spawn_initialization(
        config.methods.clone(),
        factories,
        config.root_texts(),
        signal,
    );

    let supervisor = FlowSupervisor::new(
        FlowDependencies::new(
            Arc::new(InMemoryCredentialStore::new()),
            gateway,
            commands.clone(),
            FlowSettings::from_config(&config),
            config.root_texts(),
        ),
        barrier,
    );

    tracing::info!(label = %label, methods = config.methods.len(), "Join gate started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }

        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        if head == "join" {
            match UserId::new(rest.trim()) {
                Ok(user) => {
                    let handle = supervisor.on_connect(user.clone());
                    tokio::spawn(async move {
                        match handle.await {
                            Ok(FlowResolution::Completed(session)) => {
                                tracing::info!(user = %user, verified = !session.is_empty(), "Join flow completed")
                            }
                            Ok(FlowResolution::Failed(_)) => {}
                            Err(e) => tracing::error!(user = %user, error = %e, "Join flow task aborted"),
                        }
                    });
                }
                Err(e) => eprintln!("{}", e),
            }
            continue;
        }

        let invocation = UserId::new(head)
            .ok()
            .and_then(|user| CommandInvocation::parse(user, rest));
        match invocation {
            Some(invocation) => {
                commands.publish(invocation);
            }
            None => eprintln!("usage: join <user> | <user> /<command> [args...] | quit"),
        }
    }

    let registry = loading.await?;
    let failures = registry.shutdown().await;
    tracing::info!(failures = failures.len(), "Join gate stopped");
    Ok(())
}
