//! Flow supervisor - one task per connecting user.
//!
//! The supervisor owns the per-user lifecycle: wait for the registry
//! barrier, run the join flow inside a fresh compensation scope, and be the
//! single place where escaped errors are handled.
//!
//! # Failure policy
//!
//! On an error the scope is drained, the error is logged with its full
//! detail, and the user is shown a generic error message. The user is not
//! disconnected and the flow is not retried. A flow that finishes normally
//! leaves its compensations undrained.

use std::collections::HashMap;

use tokio::task::JoinHandle;
use tracing::{error, info_span, warn, Instrument};

use super::flow::{error_message, FlowDependencies, FlowError, JoinFlow};
use super::registry::InitializationBarrier;
use crate::config::translate;
use crate::domain::foundation::{FlowId, UserId};
use crate::domain::session::AuthorizationSession;
use crate::ports::CompensationScope;

/// How a supervised flow ended.
#[derive(Debug)]
pub enum FlowResolution {
    /// The flow reached `Done`.
    Completed(AuthorizationSession),
    /// An error escaped the flow and was handled.
    Failed(FlowError),
}

impl FlowResolution {
    pub fn is_completed(&self) -> bool {
        matches!(self, FlowResolution::Completed(_))
    }

    pub fn session(&self) -> Option<&AuthorizationSession> {
        match self {
            FlowResolution::Completed(session) => Some(session),
            FlowResolution::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FlowError> {
        match self {
            FlowResolution::Completed(_) => None,
            FlowResolution::Failed(err) => Some(err),
        }
    }
}

/// Spawns and supervises join flows.
#[derive(Debug, Clone)]
pub struct FlowSupervisor {
    deps: FlowDependencies,
    barrier: InitializationBarrier,
}

impl FlowSupervisor {
    pub fn new(deps: FlowDependencies, barrier: InitializationBarrier) -> Self {
        Self { deps, barrier }
    }

    /// Starts an independent flow for a freshly connected user.
    pub fn on_connect(&self, user: UserId) -> JoinHandle<FlowResolution> {
        let supervisor = self.clone();
        let flow_id = FlowId::new();
        let span = info_span!("join_flow", flow_id = %flow_id, user = %user);
        tokio::spawn(async move { supervisor.supervise(&user).await }.instrument(span))
    }

    /// Runs one user's flow to completion in the current task.
    pub async fn supervise(&self, user: &UserId) -> FlowResolution {
        let compensation = CompensationScope::new();
        match self.run_flow(user, &compensation).await {
            Ok(session) => FlowResolution::Completed(session),
            Err(err) => {
                self.handle_failure(user, &compensation, &err).await;
                FlowResolution::Failed(err)
            }
        }
    }

    async fn run_flow(
        &self,
        user: &UserId,
        compensation: &CompensationScope,
    ) -> Result<AuthorizationSession, FlowError> {
        let registry = self.barrier.wait().await?;
        JoinFlow::new(registry, self.deps.clone())
            .run(user, compensation)
            .await
    }

    async fn handle_failure(&self, user: &UserId, compensation: &CompensationScope, err: &FlowError) {
        let compensated = compensation.drain().await;

        error!(
            user = %user,
            category = err.category(),
            code = %err.code(),
            compensated,
            error = ?err,
            "Join flow failed: {}",
            err
        );

        let notice = error_message(&self.error_text(user, err));
        if let Err(e) = self.deps.gateway.send_message(user, notice).await {
            warn!(user = %user, error = %e, "Could not notify user about failed flow");
        }
    }

    fn error_text(&self, user: &UserId, err: &FlowError) -> String {
        let values = HashMap::from([
            ("player".to_string(), user.to_string()),
            ("error-type".to_string(), err.category().to_string()),
            ("error-message".to_string(), err.to_string()),
        ]);
        match self.deps.texts.lookup("error-message") {
            Ok(template) => translate(template, &values),
            Err(_) => format!("{}: {}", err.category(), err),
        }
    }
}
