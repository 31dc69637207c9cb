//! Application layer - the join engine.
//!
//! - `registry` - Loads the configured verification methods once at startup
//! - `command_stream` - Broadcast of user command invocations
//! - `flow` - The join-flow state machine
//! - `supervisor` - One supervised task per connecting user
//! - `timeout` - Bounded waits for verification round trips

pub mod command_stream;
pub mod flow;
pub mod registry;
pub mod supervisor;
pub mod timeout;

pub use command_stream::{CommandStream, CommandSubscription, StreamError};
pub use flow::{FlowDependencies, FlowError, FlowSettings, FlowState, JoinFlow, Transition};
pub use registry::{
    initialization_barrier, spawn_initialization, InitializationBarrier, InitializationSignal,
    MethodEntry, MethodFactories, MethodRegistry,
};
pub use supervisor::{FlowResolution, FlowSupervisor};
pub use timeout::{with_authorization_timeout, TimedOut};
