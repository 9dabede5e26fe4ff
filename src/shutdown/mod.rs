//! Coordinated shutdown
//!
//! Two-phase stop of the whole client group: broadcast, then bounded
//! acknowledgement collection.

pub mod coordinator;

pub use coordinator::{ShutdownCoordinator, ShutdownState};
