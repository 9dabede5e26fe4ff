//! Wire protocol
//!
//! Line framing, reserved literals, and the hub's reply strings.

pub mod message;
pub mod responses;

pub use message::{ACK_PREFIX, EXIT_SIGNAL, Inbound, Registration, SHUTDOWN_COMMAND, classify};
pub use responses::{
    message_format_error, message_too_long, name_taken, registration_format_error, unknown_target,
};
