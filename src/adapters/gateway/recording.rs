//! Recording user gateway.
//!
//! Keeps every message and disconnect in order so tests can assert on what
//! users saw. Waiters can block until a given number of messages arrived.
//! A disconnected user is gone: later messages and disconnects fail with
//! `UserNotConnected` and are not recorded.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::message::Message;
use crate::ports::UserGateway;

/// Something the engine did to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Message { user: UserId, message: Message },
    Disconnect { user: UserId, message: Message },
}

impl GatewayEvent {
    pub fn user(&self) -> &UserId {
        match self {
            GatewayEvent::Message { user, .. } | GatewayEvent::Disconnect { user, .. } => user,
        }
    }
}

/// Gateway that records instead of delivering.
#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    events: Arc<RwLock<Vec<GatewayEvent>>>,
    changed: Arc<Notify>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events, oldest first.
    pub async fn events(&self) -> Vec<GatewayEvent> {
        self.events.read().await.clone()
    }

    /// Messages sent to `user`, oldest first.
    pub async fn messages_for(&self, user: &UserId) -> Vec<Message> {
        self.events
            .read()
            .await
            .iter()
            .filter_map(|event| match event {
                GatewayEvent::Message { user: to, message } if to == user => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Disconnect reasons shown to `user`.
    pub async fn disconnects_for(&self, user: &UserId) -> Vec<Message> {
        self.events
            .read()
            .await
            .iter()
            .filter_map(|event| match event {
                GatewayEvent::Disconnect { user: to, message } if to == user => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn is_disconnected(&self, user: &UserId) -> bool {
        !self.disconnects_for(user).await.is_empty()
    }

    /// Waits until at least `count` messages were sent to `user`.
    pub async fn wait_for_messages(&self, user: &UserId, count: usize) -> Vec<Message> {
        loop {
            let notified = self.changed.notified();
            let messages = self.messages_for(user).await;
            if messages.len() >= count {
                return messages;
            }
            notified.await;
        }
    }

    async fn record(&self, event: GatewayEvent) -> Result<(), DomainError> {
        let mut events = self.events.write().await;
        let user = event.user();
        let gone = events
            .iter()
            .any(|seen| matches!(seen, GatewayEvent::Disconnect { user: to, .. } if to == user));
        if gone {
            return Err(DomainError::new(
                ErrorCode::UserNotConnected,
                format!("{} is no longer connected", user),
            ));
        }
        events.push(event);
        drop(events);
        self.changed.notify_waiters();
        Ok(())
    }
}

#[async_trait]
impl UserGateway for RecordingGateway {
    async fn send_message(&self, user: &UserId, message: Message) -> Result<(), DomainError> {
        self.record(GatewayEvent::Message {
            user: user.clone(),
            message,
        })
        .await
    }

    async fn disconnect(&self, user: &UserId, message: Message) -> Result<(), DomainError> {
        self.record(GatewayEvent::Disconnect {
            user: user.clone(),
            message,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    #[tokio::test]
    async fn events_are_kept_per_user() {
        let gateway = RecordingGateway::new();

        gateway
            .send_message(&user("Steve"), Message::new().text("hi"))
            .await
            .unwrap();
        gateway
            .disconnect(&user("Alex"), Message::new().text("bye"))
            .await
            .unwrap();

        assert_eq!(gateway.events().await.len(), 2);
        assert_eq!(gateway.messages_for(&user("Steve")).await.len(), 1);
        assert!(gateway.messages_for(&user("Alex")).await.is_empty());
        assert!(gateway.is_disconnected(&user("Alex")).await);
        assert!(!gateway.is_disconnected(&user("Steve")).await);
    }

    #[tokio::test]
    async fn wait_for_messages_wakes_on_send() {
        let gateway = RecordingGateway::new();
        let waiter = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.wait_for_messages(&user("Steve"), 1).await })
        };

        tokio::task::yield_now().await;
        gateway
            .send_message(&user("Steve"), Message::new().text("hello"))
            .await
            .unwrap();

        let messages = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(messages[0].to_plain_text(), "hello");
    }

    #[tokio::test]
    async fn disconnected_user_cannot_be_reached() {
        let gateway = RecordingGateway::new();
        gateway
            .disconnect(&user("Steve"), Message::new().text("bye"))
            .await
            .unwrap();

        let err = gateway
            .send_message(&user("Steve"), Message::new().text("still there?"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotConnected);
        assert_eq!(err.to_string(), "[USER_NOT_CONNECTED] Steve is no longer connected");

        let err = gateway
            .disconnect(&user("Steve"), Message::new().text("bye again"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotConnected);
        assert_eq!(gateway.events().await.len(), 1);
    }
}
