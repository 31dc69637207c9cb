//! Console user gateway: prints plain-text renderings to stdout.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::message::Message;
use crate::ports::UserGateway;

/// Gateway for the console host.
#[derive(Debug, Clone, Default)]
pub struct ConsoleGateway;

impl ConsoleGateway {
    pub fn new() -> Self {
        Self
    }

    /// Formats a line as printed to the console.
    pub fn render(user: &UserId, message: &Message) -> String {
        message
            .to_plain_text()
            .lines()
            .map(|line| format!("[{}] {}", user, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl UserGateway for ConsoleGateway {
    async fn send_message(&self, user: &UserId, message: Message) -> Result<(), DomainError> {
        println!("{}", Self::render(user, &message));
        Ok(())
    }

    async fn disconnect(&self, user: &UserId, message: Message) -> Result<(), DomainError> {
        println!("{}", Self::render(user, &message));
        println!("[{}] -- disconnected --", user);
        tracing::info!(user = %user, "User disconnected");
        Ok(())
    }
}
