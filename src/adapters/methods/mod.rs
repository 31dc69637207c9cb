//! Verification method implementations.
//!
//! - `ChatConfirmMethod` - confirmation through the command stream
//! - `ScriptedMethod` - scripted answers for tests and demos

pub mod chat_confirm;
mod mock;

pub use chat_confirm::ChatConfirmMethod;
pub use mock::{QueryLog, ScriptedCall, ScriptedMethod};
