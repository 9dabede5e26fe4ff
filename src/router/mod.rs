//! Message router
//!
//! Decides what happens to each line a registered client sends: forward
//! to a named peer, reply with an error, or hand off to the shutdown
//! coordinator. No inbound line is silently dropped.

use log::{info, warn};
use std::sync::Arc;

use crate::client::{ClientRecord, SharedRegistry};
use crate::protocol::{self, Inbound};
use crate::shutdown::ShutdownCoordinator;

/// What the router did with one inbound message.
#[derive(Debug, PartialEq)]
pub enum RouteOutcome {
    Forwarded,
    Replied,
    AckRecorded,
    ShutdownRequested,
}

/// Route one trimmed message from `sender`. Never fails: every error mode
/// ends in a logged event or a reply on the sender's own connection.
pub async fn route_message(
    sender: &ClientRecord,
    message: &str,
    registry: &SharedRegistry,
    coordinator: &Arc<ShutdownCoordinator>,
) -> RouteOutcome {
    match protocol::classify(message) {
        Inbound::Shutdown => {
            info!("shutdown requested by '{}'", sender.name());
            Arc::clone(coordinator).initiate(Arc::clone(registry)).await;
            RouteOutcome::ShutdownRequested
        }
        Inbound::Ack => {
            coordinator.record_ack(sender.name()).await;
            RouteOutcome::AckRecorded
        }
        Inbound::Directed { target, content } => {
            let record = registry.lock().await.get(&target);
            match record {
                Some(record) => {
                    // Forward the payload byte-for-byte; a broken target
                    // socket must not take the sender down with it.
                    match record.send_line(&content).await {
                        Ok(()) => info!("forwarded {} -> {}: {}", sender.name(), target, content),
                        Err(e) => warn!("forward {} -> {} failed: {}", sender.name(), target, e),
                    }
                    RouteOutcome::Forwarded
                }
                None => {
                    reply(sender, &protocol::unknown_target(&target)).await;
                    RouteOutcome::Replied
                }
            }
        }
        Inbound::Malformed => {
            reply(sender, &protocol::message_format_error()).await;
            RouteOutcome::Replied
        }
    }
}

async fn reply(sender: &ClientRecord, text: &str) {
    if let Err(e) = sender.send_line(text).await {
        warn!("reply to '{}' failed: {}", sender.name(), e);
    }
}
