//! Host Bridge demo binary
//!
//! Wires an in-memory host to the correlation bridge and the persistent
//! WebSocket connection, then runs until Ctrl-C.

use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use host_bridge::{
    adapters::{
        ActiveWebSocketAdapter, CommandHandlerMap, FetchCustomFaceHandler, HostEventForwarder,
        InMemoryHostService, TungsteniteConnector,
    },
    adapters::commands::FETCH_FAV_EMOJI_LIST,
    application::EventCorrelationBridge,
    config::{AppConfig, LoggingConfig},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging)?;

    tracing::info!(
        url = %config.connection.url,
        reconnect_delay_ms = config.connection.reconnect_delay_ms,
        heartbeat_interval_ms = config.connection.heartbeat_interval_ms,
        default_timeout_ms = config.bridge.default_timeout_ms,
        "Starting host bridge"
    );

    let host = Arc::new(InMemoryHostService::new());
    host.register_value(FETCH_FAV_EMOJI_LIST, json!({ "emojiInfoList": [] }));

    let bridge = Arc::new(EventCorrelationBridge::with_config(
        host.clone(),
        &config.bridge,
    ));

    let commands =
        CommandHandlerMap::new().with_handler(Arc::new(FetchCustomFaceHandler::new(bridge.clone())));
    tracing::info!(actions = ?commands.action_names(), "Registered command handlers");

    let adapter = ActiveWebSocketAdapter::new_shared(
        config.connection.clone(),
        Arc::new(TungsteniteConnector::new()),
        Arc::new(commands),
    );
    HostEventForwarder::new_shared(adapter.clone(), config.connection.self_id).register(host.as_ref());

    adapter.open();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    bridge.evict_all();
    adapter.close();
    adapter.closed().await;

    tracing::info!("Host bridge stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = tracing_subscriber::registry().with(logging.env_filter()?);
    if logging.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}
