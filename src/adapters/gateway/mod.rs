//! User gateway adapters.
//!
//! - `RecordingGateway` - keeps every message and disconnect, for tests
//! - `ConsoleGateway` - prints messages for the console host

mod console;
mod recording;

pub use console::ConsoleGateway;
pub use recording::{GatewayEvent, RecordingGateway};
