//! Client record
//!
//! Per-client data stored in the registry for the lifetime of a
//! connection.

use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// A registered client as tracked by the hub.
///
/// Only the live write half is used for routing; the reported address
/// comes from the client's own registration line and is informational.
#[derive(Clone)]
pub struct ClientRecord {
    name: String,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    reported_ip: String,
    reported_port: u16,
}

impl ClientRecord {
    pub fn new(name: String, writer: OwnedWriteHalf, reported_ip: String, reported_port: u16) -> Self {
        Self {
            name,
            writer: Arc::new(Mutex::new(writer)),
            reported_ip,
            reported_port,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Self-reported `ip:port` from the registration handshake.
    pub fn reported_addr(&self) -> String {
        format!("{}:{}", self.reported_ip, self.reported_port)
    }

    /// Send one protocol line to this client, appending the record
    /// terminator.
    pub async fn send_line(&self, text: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(text.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }

    /// Close the write side of the connection.
    pub async fn close(&self) {
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
    }
}
