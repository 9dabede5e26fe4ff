//! Error types
//!
//! Defines domain-specific error types for each module of the hub.

use std::fmt;
use std::io;

/// Wire-protocol errors raised while parsing client input
#[derive(Debug)]
pub enum ProtocolError {
    MalformedRegistration(String),
    InvalidPort(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MalformedRegistration(line) => {
                write!(f, "malformed registration '{}': expected 'name;ip:port'", line)
            }
            ProtocolError::InvalidPort(port) => {
                write!(f, "invalid port in registration: '{}'", port)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Registry module errors
#[derive(Debug)]
pub enum RegistryError {
    NameTaken(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NameTaken(name) => {
                write!(f, "name '{}' is already registered", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// General hub error that encompasses startup and runtime failures
#[derive(Debug)]
pub enum HubError {
    Bind(String, io::Error),
    Io(io::Error),
    Config(config::ConfigError),
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubError::Bind(addr, e) => write!(f, "failed to bind {}: {}", addr, e),
            HubError::Io(e) => write!(f, "I/O error: {}", e),
            HubError::Config(e) => write!(f, "configuration error: {}", e),
        }
    }
}

impl std::error::Error for HubError {}

impl From<io::Error> for HubError {
    fn from(error: io::Error) -> Self {
        HubError::Io(error)
    }
}

impl From<config::ConfigError> for HubError {
    fn from(error: config::ConfigError) -> Self {
        HubError::Config(error)
    }
}
