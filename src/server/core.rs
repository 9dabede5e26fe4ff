//! Hub core
//!
//! Listener lifecycle: bind, accept until the termination token fires,
//! then close every remaining client connection.

use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::client::{ClientRegistry, SharedRegistry, handle_client};
use crate::error::HubError;
use crate::server::config::HubConfig;
use crate::shutdown::ShutdownCoordinator;

pub struct Hub {
    registry: SharedRegistry,
    coordinator: Arc<ShutdownCoordinator>,
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<HubConfig>,
    cancel: CancellationToken,
}

impl Hub {
    /// Bind the listening socket. A bind failure is fatal to startup.
    pub async fn bind(config: HubConfig) -> Result<Self, HubError> {
        let addr = config.socket_addr();
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("failed to bind {}: {}", addr, e);
                return Err(HubError::Bind(addr, e));
            }
        };
        let local_addr = listener.local_addr()?;
        info!("hub listening on {}", local_addr);

        let cancel = CancellationToken::new();
        let coordinator = Arc::new(ShutdownCoordinator::new(
            cancel.clone(),
            config.shutdown_timeout(),
            config.ack_poll_interval(),
        ));

        Ok(Self {
            registry: Arc::new(Mutex::new(ClientRegistry::new())),
            coordinator,
            listener,
            local_addr,
            config: Arc::new(config),
            cancel,
        })
    }

    /// Address actually bound, useful when the configured port is 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Token observed by every loop in the hub. Cancelling it stops the
    /// hub immediately, without the broadcast/acknowledge sequence.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Accept connections until the termination token fires, spawning one
    /// handler task per connection.
    pub async fn run(self) -> Result<(), HubError> {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        info!("connection from {}", peer_addr);
                        let registry = Arc::clone(&self.registry);
                        let coordinator = Arc::clone(&self.coordinator);
                        let config = Arc::clone(&self.config);
                        let cancel = self.cancel.clone();
                        tokio::spawn(async move {
                            handle_client(stream, peer_addr, registry, coordinator, config, cancel)
                                .await;
                        });
                    }
                    Err(e) => {
                        error!("error accepting connection: {}", e);
                    }
                },
            }
        }

        // The coordinator drains the registry on a protocol shutdown; the
        // exit-watch path reaches here with entries still present.
        let remaining = self.registry.lock().await.drain();
        for record in remaining {
            info!("closing connection to '{}'", record.name());
            record.close().await;
        }
        info!("hub halted");
        Ok(())
    }
}
