//! Domain layer containing the join gate's value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors)
//! - `session` - Login/registration sessions, secrets, method outcomes
//! - `command` - Command invocations delivered by the host
//! - `message` - Renderable user-facing messages

pub mod command;
pub mod foundation;
pub mod message;
pub mod session;
