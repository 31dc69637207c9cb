//! Flow states and transition results.

use std::fmt;

use crate::domain::session::AuthorizationSession;

/// Vocabulary of the join flow.
///
/// `Login` can fall through to `Register`, never the other way round, so
/// every flow ends after a handful of transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Register,
    Login,
    /// No usable method; resolved by the no-methods policy.
    Stuck { reason: String },
    Accept,
    /// Disconnect with an already localized reason.
    Refuse { reason: String },
}

impl FlowState {
    pub fn stuck(reason: impl Into<String>) -> Self {
        FlowState::Stuck {
            reason: reason.into(),
        }
    }

    pub fn refuse(reason: impl Into<String>) -> Self {
        FlowState::Refuse {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::Register => write!(f, "register"),
            FlowState::Login => write!(f, "login"),
            FlowState::Stuck { .. } => write!(f, "stuck"),
            FlowState::Accept => write!(f, "accept"),
            FlowState::Refuse { .. } => write!(f, "refuse"),
        }
    }
}

/// Result of one transition.
#[derive(Debug)]
pub enum Transition {
    /// Continue in the given state.
    Step(FlowState),
    /// The flow is over.
    Done(AuthorizationSession),
}
