//! User gateway port - how the engine talks back to connected users.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::message::Message;

/// Port for messaging and disconnecting users.
///
/// Message content arrives already localized.
#[async_trait]
pub trait UserGateway: Send + Sync {
    /// Shows a message to the user.
    async fn send_message(&self, user: &UserId, message: Message) -> Result<(), DomainError>;

    /// Disconnects the user, showing them the message as the reason.
    async fn disconnect(&self, user: &UserId, message: Message) -> Result<(), DomainError>;
}
