//! Compensation scope - per-flow registry of deferred undo actions.
//!
//! Verification methods register an action for every transient artifact
//! they create (a prompt message, a pending confirmation). The flow
//! supervisor drains the scope when the flow fails: every pending action
//! runs concurrently and the drain returns once all of them have finished.
//!
//! Draining clears the list, so draining twice runs each action once.
//! Nothing stops a method from deferring new actions after a drain.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use futures::future::{join_all, BoxFuture, FutureExt};

type Compensation = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Ordered list of pending compensations owned by one flow.
#[derive(Default)]
pub struct CompensationScope {
    pending: Mutex<Vec<Compensation>>,
}

impl CompensationScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action to run if the flow fails.
    pub fn defer<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(move || action().boxed()));
    }

    /// Number of actions waiting to run.
    pub fn pending(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Runs every pending action concurrently and waits for all of them.
    ///
    /// Returns how many actions ran.
    pub async fn drain(&self) -> usize {
        // Taken under the lock, run without it.
        let actions = std::mem::take(
            &mut *self
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let count = actions.len();
        join_all(actions.into_iter().map(|action| action())).await;
        count
    }
}

impl std::fmt::Debug for CompensationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompensationScope")
            .field("pending", &self.pending())
            .finish()
    }
}
