//! Adapters - Implementations of port interfaces.
//!
//! - `credentials` - Credential store implementations (in-memory)
//! - `gateway` - User gateways (recording, console)
//! - `methods` - Verification methods (chat confirmation, scripted)

pub mod credentials;
pub mod gateway;
pub mod methods;

pub use credentials::InMemoryCredentialStore;
pub use gateway::{ConsoleGateway, GatewayEvent, RecordingGateway};
pub use methods::{ChatConfirmMethod, ScriptedCall, ScriptedMethod};
