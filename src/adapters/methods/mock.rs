//! Scripted verification method for testing.
//!
//! Answers every call from a fixed script, so flows can be driven through
//! any path without an out-of-band channel.
//!
//! # Features
//!
//! - Fixed query answers and outcomes
//! - Simulated delays for timeout testing
//! - A shared query log to observe ordering across methods
//! - Error injection on queries, verification, initialize and shutdown
//! - Compensation registration, counted when drained
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let method = ScriptedMethod::new()
//!     .registered(true)
//!     .login_result(LoginResult::Unauthorized);
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::MethodScope;
use crate::domain::foundation::UserId;
use crate::domain::session::{LoginResult, LoginSession, RegistrationResult, RegistrationSession};
use crate::ports::{CompensationScope, MethodError, VerificationMethod};

/// A recorded call into a `ScriptedMethod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedCall {
    Initialize { scope: String },
    EligibleForRegistration(UserId),
    IsRegistered(UserId),
    Login { user: UserId, token: String },
    Register { user: UserId, code: String },
    Shutdown,
}

/// Log shared between scripted methods, one `<name>-start`/`<name>-end` pair per query.
pub type QueryLog = Arc<Mutex<Vec<String>>>;

/// Verification method answering from a script. Clones share call history.
#[derive(Debug, Clone)]
pub struct ScriptedMethod {
    eligible: bool,
    registered: bool,
    login_result: LoginResult,
    register_result: RegistrationResult,
    delay: Duration,
    query_delay: Duration,
    query_log: Option<(String, QueryLog)>,
    verify_failure: Option<String>,
    query_failure: Option<String>,
    fail_initialize: bool,
    fail_shutdown: bool,
    compensations: Option<Arc<AtomicUsize>>,
    calls: Arc<Mutex<Vec<ScriptedCall>>>,
}

impl Default for ScriptedMethod {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedMethod {
    /// Eligible for everyone, registered for nobody, every outcome `Success`.
    pub fn new() -> Self {
        Self {
            eligible: true,
            registered: false,
            login_result: LoginResult::Success,
            register_result: RegistrationResult::Success,
            delay: Duration::ZERO,
            query_delay: Duration::ZERO,
            query_log: None,
            verify_failure: None,
            query_failure: None,
            fail_initialize: false,
            fail_shutdown: false,
            compensations: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn eligible(mut self, eligible: bool) -> Self {
        self.eligible = eligible;
        self
    }

    pub fn registered(mut self, registered: bool) -> Self {
        self.registered = registered;
        self
    }

    pub fn login_result(mut self, result: LoginResult) -> Self {
        self.login_result = result;
        self
    }

    pub fn register_result(mut self, result: RegistrationResult) -> Self {
        self.register_result = result;
        self
    }

    /// Sets simulated latency for `login` and `register`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets simulated latency for the eligibility and registration queries.
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    /// Appends `<name>-start` and `<name>-end` to `log` around every query.
    pub fn logging_queries(mut self, name: impl Into<String>, log: QueryLog) -> Self {
        self.query_log = Some((name.into(), log));
        self
    }

    /// Makes `login` and `register` fail with `Unavailable`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.verify_failure = Some(message.into());
        self
    }

    /// Makes the eligibility and registration queries fail.
    pub fn failing_queries(mut self, message: impl Into<String>) -> Self {
        self.query_failure = Some(message.into());
        self
    }

    pub fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    pub fn failing_shutdown(mut self) -> Self {
        self.fail_shutdown = true;
        self
    }

    /// Defers one compensation per verification call; each run bumps `counter`.
    pub fn compensating(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.compensations = Some(counter);
        self
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn login_calls(&self) -> usize {
        self.count(|call| matches!(call, ScriptedCall::Login { .. }))
    }

    pub fn register_calls(&self) -> usize {
        self.count(|call| matches!(call, ScriptedCall::Register { .. }))
    }

    /// Eligibility and registration queries together.
    pub fn query_calls(&self) -> usize {
        self.count(|call| {
            matches!(
                call,
                ScriptedCall::EligibleForRegistration(_) | ScriptedCall::IsRegistered(_)
            )
        })
    }

    pub fn shutdown_calls(&self) -> usize {
        self.count(|call| matches!(call, ScriptedCall::Shutdown))
    }

    fn count(&self, predicate: impl Fn(&ScriptedCall) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    fn record(&self, call: ScriptedCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn log_query(&self, mark: &str) {
        if let Some((name, log)) = &self.query_log {
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(format!("{}-{}", name, mark));
        }
    }

    async fn query(&self, answer: bool) -> Result<bool, MethodError> {
        self.log_query("start");
        if !self.query_delay.is_zero() {
            sleep(self.query_delay).await;
        }
        self.log_query("end");

        match &self.query_failure {
            Some(message) => Err(MethodError::unavailable(message.clone())),
            None => Ok(answer),
        }
    }

    async fn verification_round_trip(&self, compensation: &CompensationScope) -> Result<(), MethodError> {
        if let Some(counter) = &self.compensations {
            let counter = Arc::clone(counter);
            compensation.defer(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match &self.verify_failure {
            Some(message) => Err(MethodError::unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VerificationMethod for ScriptedMethod {
    async fn initialize(&mut self, scope: &MethodScope) -> Result<(), MethodError> {
        self.record(ScriptedCall::Initialize {
            scope: scope.name().to_string(),
        });
        if self.fail_initialize {
            return Err(MethodError::internal("scripted initialization failure"));
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), MethodError> {
        self.record(ScriptedCall::Shutdown);
        if self.fail_shutdown {
            return Err(MethodError::internal("scripted shutdown failure"));
        }
        Ok(())
    }

    async fn eligible_for_registration(&self, user: &UserId) -> Result<bool, MethodError> {
        self.record(ScriptedCall::EligibleForRegistration(user.clone()));
        self.query(self.eligible).await
    }

    async fn is_registered(&self, user: &UserId) -> Result<bool, MethodError> {
        self.record(ScriptedCall::IsRegistered(user.clone()));
        self.query(self.registered).await
    }

    async fn login(
        &self,
        session: &LoginSession,
        compensation: &CompensationScope,
    ) -> Result<LoginResult, MethodError> {
        self.record(ScriptedCall::Login {
            user: session.user().clone(),
            token: session.token().to_string(),
        });
        self.verification_round_trip(compensation).await?;
        Ok(self.login_result)
    }

    async fn register(
        &self,
        session: &RegistrationSession,
        compensation: &CompensationScope,
    ) -> Result<RegistrationResult, MethodError> {
        self.record(ScriptedCall::Register {
            user: session.user().clone(),
            code: session.code().to_string(),
        });
        self.verification_round_trip(compensation).await?;
        Ok(self.register_result)
    }
}
