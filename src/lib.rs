//! Interactive Login - a join gate for multi-user services
//!
//! Every connecting user is driven through a join flow: pick one of the
//! configured verification methods (automatically, or by asking the user),
//! let it prove the user's identity out of band, then admit or refuse.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
