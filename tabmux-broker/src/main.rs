//! tabmux broker - Shared connection status daemon
//!
//! One broker process coordinates every open tab of the application:
//! it keeps the single "websocket active" flag and relays payloads
//! between tabs so only one of them needs a live realtime connection.

mod config;
mod connection;
mod registry;
mod router;
mod status;

use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

use tabmux_utils::{LogConfig, Result};

use config::BrokerConfig;
use connection::run_accept_loop;
use router::Broker;

/// Run the broker daemon
async fn run_daemon() -> Result<()> {
    info!("tabmux broker starting");

    let config = BrokerConfig::load_and_validate()?;
    let socket = config.resolve_socket_path();

    let (broker, handle) = Broker::new(config.event_queue_depth);
    let broker_task = broker.spawn();

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received");
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                error!("Failed to listen for ctrl-c: {}", e);
            }
        }
    });

    run_accept_loop(socket, handle, config.reply_queue_depth, shutdown_rx).await?;

    // All shared state lives in the broker task and vanishes with it
    broker_task.abort();
    info!("tabmux broker stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tabmux_utils::init_logging_with_config(LogConfig::broker())?;
    run_daemon().await
}
