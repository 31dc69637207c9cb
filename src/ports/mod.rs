//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the join engine and the outside world. Adapters implement these ports.
//!
//! - `VerificationMethod` - Pluggable out-of-band identity check
//! - `CompensationScope` - Per-flow undo actions methods register into
//! - `CredentialStore` - Records registration and admission
//! - `UserGateway` - Messages and disconnects users

mod compensation;
mod credential_store;
mod user_gateway;
mod verification_method;

pub use compensation::CompensationScope;
pub use credential_store::CredentialStore;
pub use user_gateway::UserGateway;
pub use verification_method::{MethodError, VerificationMethod};
