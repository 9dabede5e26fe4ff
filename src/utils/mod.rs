//! Utility functions
//!
//! Shared helpers for the hub.

pub mod logging;
