//! Relay Hub - Entry Point
//!
//! TCP message relay for a small group of named experiment-control
//! processes: clients register a unique name, address each other by it,
//! and stop together through an acknowledged shutdown broadcast.

use log::{error, info};

use relay_hub::utils::logging::setup_logging;
use relay_hub::watch::watch_for_exit;
use relay_hub::{Hub, HubConfig};

#[tokio::main]
async fn main() {
    let config = match HubConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(1);
        }
    };

    setup_logging(config.log_file.as_deref());

    info!("launching relay hub...");

    let hub = match Hub::bind(config).await {
        Ok(hub) => hub,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    tokio::spawn(watch_for_exit(hub.cancel_token()));

    // Exit explicitly: the watch task may still hold a blocking stdin
    // read that would otherwise stall runtime shutdown.
    match hub.run().await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!("hub terminated with error: {}", e);
            std::process::exit(1);
        }
    }
}
