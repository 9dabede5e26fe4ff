//! Hub configuration
//!
//! Layered configuration: built-in defaults, then an optional `hub.toml`,
//! then `RELAY_HUB_*` environment overrides.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// IP address the listener binds.
    pub bind_address: String,

    /// TCP port the listener binds. 0 picks an ephemeral port.
    pub port: u16,

    /// Longest accepted message line, in bytes.
    pub max_message_len: usize,

    /// How long the shutdown coordinator waits for acknowledgements.
    pub shutdown_timeout_ms: u64,

    /// Poll interval while waiting for acknowledgements.
    pub ack_poll_interval_ms: u64,

    /// Optional log destination; stderr when unset.
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 9000,
            max_message_len: 1024,
            shutdown_timeout_ms: 5000,
            ack_poll_interval_ms: 100,
            log_file: None,
        }
    }
}

impl HubConfig {
    /// Load configuration from defaults, `hub.toml` (if present), and
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = HubConfig::default();
        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("max_message_len", defaults.max_message_len as i64)?
            .set_default("shutdown_timeout_ms", defaults.shutdown_timeout_ms as i64)?
            .set_default("ack_poll_interval_ms", defaults.ack_poll_interval_ms as i64)?
            .add_source(File::with_name("hub").required(false))
            .add_source(Environment::with_prefix("RELAY_HUB"))
            .build()?;

        let config: HubConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }
        if self.max_message_len == 0 {
            return Err(ConfigError::Message(
                "max_message_len must be greater than 0".into(),
            ));
        }
        if self.shutdown_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "shutdown_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.ack_poll_interval_ms == 0 || self.ack_poll_interval_ms > self.shutdown_timeout_ms {
            return Err(ConfigError::Message(
                "ack_poll_interval_ms must be between 1 and shutdown_timeout_ms".into(),
            ));
        }
        Ok(())
    }

    /// Listener socket address as `host:port`.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Acknowledgement grace period as a Duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Acknowledgement poll interval as a Duration.
    pub fn ack_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ack_poll_interval_ms)
    }
}
