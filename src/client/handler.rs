//! Connection handler
//!
//! One task per accepted connection: registration handshake, then the
//! receive loop feeding the router, then teardown. Teardown removes the
//! registry entry on every exit path, clean or not.

use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::client::{ClientRecord, SharedRegistry};
use crate::protocol::{self, Registration};
use crate::router::route_message;
use crate::server::config::HubConfig;
use crate::shutdown::ShutdownCoordinator;

pub async fn handle_client(
    stream: TcpStream,
    peer_addr: SocketAddr,
    registry: SharedRegistry,
    coordinator: Arc<ShutdownCoordinator>,
    config: Arc<HubConfig>,
    cancel: CancellationToken,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    // Registration handshake: the first line must be `name;ip:port`.
    let n = tokio::select! {
        _ = cancel.cancelled() => return,
        read = reader.read_line(&mut line) => match read {
            Ok(n) => n,
            Err(e) => {
                warn!("read from {} failed during registration: {}", peer_addr, e);
                return;
            }
        },
    };
    if n == 0 {
        info!("{} disconnected before registering", peer_addr);
        return;
    }

    let registration = match Registration::parse(&line) {
        Ok(registration) => registration,
        Err(e) => {
            warn!("rejecting {}: {}", peer_addr, e);
            let _ = write_half
                .write_all(format!("{}\n", protocol::registration_format_error()).as_bytes())
                .await;
            let _ = write_half.shutdown().await;
            return;
        }
    };

    let record = ClientRecord::new(
        registration.name.clone(),
        write_half,
        registration.ip,
        registration.port,
    );
    {
        let mut clients = registry.lock().await;
        if let Err(e) = clients.insert(record.clone()) {
            drop(clients);
            warn!("rejecting {}: {}", peer_addr, e);
            let _ = record.send_line(&protocol::name_taken(&registration.name)).await;
            record.close().await;
            return;
        }
        info!(
            "registered '{}' ({}) from {} ({} client(s) connected)",
            record.name(),
            record.reported_addr(),
            peer_addr,
            clients.len()
        );
    }

    // Receive loop: one line in, one routing decision out.
    loop {
        line.clear();
        let n = tokio::select! {
            _ = cancel.cancelled() => break,
            read = reader.read_line(&mut line) => match read {
                Ok(n) => n,
                Err(e) => {
                    error!("read from '{}' failed: {}", record.name(), e);
                    break;
                }
            },
        };
        if n == 0 {
            info!("connection closed by '{}'", record.name());
            break;
        }

        let message = line.trim();
        if message.len() > config.max_message_len {
            let _ = record
                .send_line(&protocol::message_too_long(config.max_message_len))
                .await;
            continue;
        }
        info!("received from '{}': {}", record.name(), message);
        route_message(&record, message, &registry, &coordinator).await;
    }

    // Teardown: the entry may already be gone if the coordinator drained
    // the registry first.
    let removed = registry.lock().await.remove(record.name());
    if let Some(removed) = removed {
        info!("removed '{}' ({})", removed.name(), removed.reported_addr());
        removed.close().await;
    }
}
