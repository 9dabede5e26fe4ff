//! Error handling
//!
//! Domain-specific error types for the hub.

pub mod types;

pub use types::{HubError, ProtocolError, RegistryError};
