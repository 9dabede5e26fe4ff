//! Message parsing
//!
//! One newline-terminated line is one protocol message. The first line of
//! a connection is the registration handshake; every later line is either
//! a reserved command or a directed message.

use crate::error::ProtocolError;

/// Shutdown request, accepted from any registered client.
pub const SHUTDOWN_COMMAND: &str = "CMD;shutdown";

/// Termination signal the hub broadcasts to every client.
pub const EXIT_SIGNAL: &str = "EXIT";

/// Prefix of the acknowledgement a client sends back after `EXIT`.
pub const ACK_PREFIX: &str = "ACK;EXIT_RECEIVED";

/// Parsed registration handshake line (`name;ip:port`).
///
/// The address is self-reported by the client and informational only;
/// routing always goes through the live connection.
#[derive(Debug, PartialEq)]
pub struct Registration {
    pub name: String,
    pub ip: String,
    pub port: u16,
}

impl Registration {
    /// Parse the first line a client sends on a new connection.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        let (name, addr) = line
            .split_once(';')
            .ok_or_else(|| ProtocolError::MalformedRegistration(line.to_string()))?;
        let (ip, port) = addr
            .split_once(':')
            .ok_or_else(|| ProtocolError::MalformedRegistration(line.to_string()))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ProtocolError::MalformedRegistration(line.to_string()));
        }
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| ProtocolError::InvalidPort(port.trim().to_string()))?;

        Ok(Self {
            name: name.to_string(),
            ip: ip.trim().to_string(),
            port,
        })
    }
}

/// Classification of one in-session message line.
#[derive(Debug, PartialEq)]
pub enum Inbound {
    /// Exact match on the shutdown request literal.
    Shutdown,
    /// Shutdown acknowledgement from a client.
    Ack,
    /// Message addressed to another registered client.
    Directed { target: String, content: String },
    /// No destination separator present.
    Malformed,
}

/// Classify a trimmed message line. Reserved literals win over the
/// directed-message split; the split is on the first `;` only, so content
/// may itself contain `;`.
pub fn classify(message: &str) -> Inbound {
    if message == SHUTDOWN_COMMAND {
        return Inbound::Shutdown;
    }
    if message.starts_with(ACK_PREFIX) {
        return Inbound::Ack;
    }
    match message.split_once(';') {
        Some((target, content)) => Inbound::Directed {
            target: target.to_string(),
            content: content.to_string(),
        },
        None => Inbound::Malformed,
    }
}
