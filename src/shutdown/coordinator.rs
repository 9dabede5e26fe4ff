//! Shutdown coordinator
//!
//! Clients own hardware (serial ports, cameras, audio devices) that needs
//! flushing before they exit, so a bare TCP close is not enough signal:
//! the hub broadcasts `EXIT` and holds the group open until every client
//! acknowledges or the grace timeout runs out.

use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use crate::client::SharedRegistry;
use crate::protocol::EXIT_SIGNAL;

/// Coordinator lifecycle. Forward-only; the first shutdown request wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShutdownState {
    Idle,
    Broadcasting,
    AwaitingAcks,
    Halted,
}

pub struct ShutdownCoordinator {
    state: Mutex<ShutdownState>,
    pending: Mutex<HashSet<String>>,
    cancel: CancellationToken,
    ack_timeout: Duration,
    poll_interval: Duration,
}

impl ShutdownCoordinator {
    pub fn new(cancel: CancellationToken, ack_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            state: Mutex::new(ShutdownState::Idle),
            pending: Mutex::new(HashSet::new()),
            cancel,
            ack_timeout,
            poll_interval,
        }
    }

    pub async fn state(&self) -> ShutdownState {
        *self.state.lock().await
    }

    /// Start the broadcast/acknowledge sequence on a task of its own, so
    /// every handler loop keeps running and late acknowledgements are
    /// still recorded. Only the first call does anything.
    pub async fn initiate(self: Arc<Self>, registry: SharedRegistry) {
        {
            let mut state = self.state.lock().await;
            if *state != ShutdownState::Idle {
                info!("shutdown already in progress, ignoring repeat request");
                return;
            }
            *state = ShutdownState::Broadcasting;
        }
        tokio::spawn(async move { self.run(registry).await });
    }

    /// Record one client's `EXIT` acknowledgement.
    pub async fn record_ack(&self, name: &str) {
        let mut pending = self.pending.lock().await;
        if pending.remove(name) {
            info!("shutdown ack from '{}' ({} outstanding)", name, pending.len());
        } else {
            warn!("unexpected shutdown ack from '{}'", name);
        }
    }

    async fn run(&self, registry: SharedRegistry) {
        // Snapshot the registry; clients connecting after this point are
        // not part of the shutdown bookkeeping.
        let records = registry.lock().await.records();
        {
            let mut pending = self.pending.lock().await;
            for record in &records {
                pending.insert(record.name().to_string());
            }
        }

        info!("broadcasting {} to {} client(s)", EXIT_SIGNAL, records.len());
        for record in &records {
            if let Err(e) = record.send_line(EXIT_SIGNAL).await {
                // Best effort: a dead client cannot acknowledge, so drop
                // it from the bookkeeping and keep broadcasting.
                warn!("{} broadcast to '{}' failed: {}", EXIT_SIGNAL, record.name(), e);
                self.pending.lock().await.remove(record.name());
            }
        }
        *self.state.lock().await = ShutdownState::AwaitingAcks;

        let deadline = Instant::now() + self.ack_timeout;
        loop {
            if self.pending.lock().await.is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                break;
            }
            sleep(self.poll_interval).await;
        }

        let missing: Vec<String> = self.pending.lock().await.iter().cloned().collect();
        if missing.is_empty() {
            info!("all clients acknowledged, halting hub");
        } else {
            warn!(
                "halting after {:?} without acks from: {}",
                self.ack_timeout,
                missing.join(", ")
            );
        }
        *self.state.lock().await = ShutdownState::Halted;

        let remaining = registry.lock().await.drain();
        for record in remaining {
            record.close().await;
        }
        self.cancel.cancel();
    }
}
