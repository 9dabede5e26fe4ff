//! Hub reply lines
//!
//! Error replies sent back to the offending client only. Every reply
//! starts with a bracketed tag so it cannot be mistaken for forwarded
//! content.

/// Reply to a registration line that does not parse.
pub fn registration_format_error() -> String {
    "[error] registration must be 'name;ip:port'".to_string()
}

/// Reply to a registration attempt under a name that is already in use.
pub fn name_taken(name: &str) -> String {
    format!("[rejected] name '{}' is already in use, connect with another name", name)
}

/// Reply when a directed message names no registered client.
pub fn unknown_target(target: &str) -> String {
    format!("[error] target '{}' not found", target)
}

/// Reply to an in-session message with no destination separator.
pub fn message_format_error() -> String {
    "[error] messages must be 'target;content'".to_string()
}

/// Reply to a line exceeding the configured length cap.
pub fn message_too_long(limit: usize) -> String {
    format!("[error] message exceeds {} bytes", limit)
}
