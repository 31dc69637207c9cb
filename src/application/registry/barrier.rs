//! Initialization barrier - no flow starts before the registry is loaded.
//!
//! A single-fire signal backed by a `watch` channel. Every flow waits on
//! the barrier; once the signal fires all current and future waiters pass
//! straight through.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{MethodFactories, MethodRegistry};
use crate::application::flow::FlowError;
use crate::config::{MethodConfig, TextCatalog};

/// Creates a connected signal/barrier pair.
pub fn initialization_barrier() -> (InitializationSignal, InitializationBarrier) {
    let (sender, receiver) = watch::channel(None);
    (
        InitializationSignal { sender },
        InitializationBarrier { receiver },
    )
}

/// Firing side of the barrier. Consumed when fired.
#[derive(Debug)]
pub struct InitializationSignal {
    sender: watch::Sender<Option<Arc<MethodRegistry>>>,
}

impl InitializationSignal {
    /// Releases every waiter with the loaded registry.
    pub fn complete(self, registry: Arc<MethodRegistry>) {
        self.sender.send_replace(Some(registry));
    }
}

/// Waiting side of the barrier. Cheap to clone.
#[derive(Debug, Clone)]
pub struct InitializationBarrier {
    receiver: watch::Receiver<Option<Arc<MethodRegistry>>>,
}

impl InitializationBarrier {
    /// Waits until the registry is loaded.
    ///
    /// Fails with `RegistryUnavailable` if the signal was dropped unfired.
    pub async fn wait(&self) -> Result<Arc<MethodRegistry>, FlowError> {
        let mut receiver = self.receiver.clone();
        let ready = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| FlowError::RegistryUnavailable)?;
        ready.as_ref().map(Arc::clone).ok_or(FlowError::RegistryUnavailable)
    }

    /// Whether the registry has been loaded.
    pub fn is_ready(&self) -> bool {
        self.receiver.borrow().is_some()
    }
}

/// Loads the registry in the background and fires `signal` when done.
pub fn spawn_initialization(
    configs: Vec<MethodConfig>,
    factories: MethodFactories,
    root_texts: Arc<TextCatalog>,
    signal: InitializationSignal,
) -> JoinHandle<Arc<MethodRegistry>> {
    tokio::spawn(async move {
        let registry = Arc::new(MethodRegistry::load(&configs, &factories, root_texts).await);
        signal.complete(Arc::clone(&registry));
        registry
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::methods::ScriptedMethod;
    use std::collections::HashMap;
    use std::time::Duration;

    #[tokio::test]
    async fn waiters_block_until_completed() {
        let (signal, barrier) = initialization_barrier();
        assert!(!barrier.is_ready());

        let waiter = {
            let barrier = barrier.clone();
            tokio::spawn(async move { barrier.wait().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        signal.complete(Arc::new(MethodRegistry::default()));

        let registry = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(registry.is_empty());
        assert!(barrier.is_ready());
    }

    #[tokio::test]
    async fn late_waiters_pass_immediately() {
        let (signal, barrier) = initialization_barrier();
        signal.complete(Arc::new(MethodRegistry::default()));

        assert!(barrier.wait().await.is_ok());
        assert!(barrier.clone().wait().await.is_ok());
    }

    #[tokio::test]
    async fn dropped_signal_reports_unavailable() {
        let (signal, barrier) = initialization_barrier();
        drop(signal);

        assert!(matches!(
            barrier.wait().await,
            Err(FlowError::RegistryUnavailable)
        ));
    }

    #[tokio::test]
    async fn spawn_initialization_fires_barrier() {
        let (signal, barrier) = initialization_barrier();
        let configs = vec![MethodConfig {
            name: "scripted".to_string(),
            kind: "scripted".to_string(),
            settings: Default::default(),
            texts: HashMap::new(),
        }];
        let factories = MethodFactories::new().with("scripted", ScriptedMethod::new);

        let handle = spawn_initialization(configs, factories, Arc::new(TextCatalog::default()), signal);
        let registry = barrier.wait().await.unwrap();

        assert_eq!(registry.names(), vec!["scripted"]);
        assert!(Arc::ptr_eq(&registry, &handle.await.unwrap()));
    }
}
