//! Command stream - one broadcast channel of user command invocations.
//!
//! The host's command dispatch boundary publishes every invocation once,
//! without blocking. Any number of flows subscribe, each with its own
//! filter; a subscription only observes invocations published after it
//! was taken, resolves on its first match and is then dropped.
//!
//! # Architecture
//!
//! ```text
//! host dispatch ──publish──► broadcast ──► flow(Steve): sender == Steve && args != []
//!                                     ├──► flow(Alex):  sender == Alex  && args != []
//!                                     └──► method:      sender == Alex  && args[0] == "confirm"
//! ```

use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::command::CommandInvocation;
use crate::domain::foundation::UserId;

/// Errors raised while waiting on the command stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Every publisher is gone; no invocation can arrive anymore.
    #[error("command stream closed")]
    Closed,
}

/// Publishing side of the command stream. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CommandStream {
    sender: broadcast::Sender<CommandInvocation>,
}

impl CommandStream {
    /// Creates a stream buffering up to `capacity` invocations per slow subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an invocation to every current subscriber.
    ///
    /// Never blocks. Returns how many subscribers will see it.
    pub fn publish(&self, invocation: CommandInvocation) -> usize {
        // No subscribers is fine: nobody is waiting for a command right now.
        self.sender.send(invocation).unwrap_or(0)
    }

    /// Starts observing invocations published from now on.
    pub fn subscribe(&self) -> CommandSubscription {
        CommandSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A one-shot view of the command stream.
#[derive(Debug)]
pub struct CommandSubscription {
    receiver: broadcast::Receiver<CommandInvocation>,
}

impl CommandSubscription {
    /// Waits for the first invocation accepted by `predicate`.
    ///
    /// Non-matching invocations are skipped. If the subscription fell
    /// behind the buffer, the missed invocations are logged and waiting
    /// continues with the oldest one still buffered.
    pub async fn first_matching<F>(mut self, mut predicate: F) -> Result<CommandInvocation, StreamError>
    where
        F: FnMut(&CommandInvocation) -> bool,
    {
        loop {
            match self.receiver.recv().await {
                Ok(invocation) if predicate(&invocation) => return Ok(invocation),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Command subscriber lagged behind, invocations dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(StreamError::Closed),
            }
        }
    }

    /// Waits for the next `/<label> <args...>` from `user` with at least one argument.
    pub async fn next_from(self, user: &UserId, label: &str) -> Result<CommandInvocation, StreamError> {
        self.first_matching(|invocation| {
            invocation.sender == *user && invocation.label == label && !invocation.args.is_empty()
        })
        .await
    }
}
