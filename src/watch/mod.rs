//! Operator exit watch
//!
//! Local stop control independent of the wire protocol: a `q`/`quit` line
//! on stdin or Ctrl-C cancels the hub's termination token directly,
//! bypassing the broadcast/acknowledge sequence. For operator-initiated
//! abrupt stops, not orderly multi-process shutdown.

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio_util::sync::CancellationToken;

pub async fn watch_for_exit(cancel: CancellationToken) {
    info!("type 'q' + Enter (or press Ctrl-C) to stop the hub");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            pressed = signal::ctrl_c() => {
                match pressed {
                    Ok(()) => info!("Ctrl-C received, stopping hub"),
                    Err(e) => warn!("Ctrl-C handler failed: {}", e),
                }
                cancel.cancel();
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
                        info!("operator exit requested, stopping hub");
                        cancel.cancel();
                        break;
                    }
                }
                // Stdin is gone (e.g. detached terminal); Ctrl-C stays
                // the only local trigger.
                Ok(None) | Err(_) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = signal::ctrl_c() => {
                            info!("Ctrl-C received, stopping hub");
                            cancel.cancel();
                        }
                    }
                    break;
                }
            },
        }
    }
}
