// Framework bootstrap for the raid server runtime.

use crate::domain::RaidTuning;
use crate::frameworks::config;
use crate::interface_adapters::net::{room_update_serializer, ws_handler};
use crate::interface_adapters::state::{AppState, ConnectionDirectory, MonotonicClock};
use crate::use_cases::{GameEvent, RaidEngine, RoomUpdate, world_task};

use axum::{Router, routing::get};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, mpsc};

pub fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the raid WebSocket on an already bound listener.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    // input_tx/rx: every connection's intents go to the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);

    // update_tx: typed room updates, serialized once and fanned out per room.
    let (update_tx, update_rx) = mpsc::channel::<RoomUpdate>(config::UPDATE_CHANNEL_CAPACITY);

    let connections = Arc::new(ConnectionDirectory::new());

    let tick_interval = config::tick_interval();
    let reset_delay = config::room_reset_delay();
    tracing::debug!(
        tick_interval_ms = tick_interval.as_millis(),
        room_reset_delay_ms = reset_delay.as_millis(),
        "raid engine configured"
    );

    let engine = RaidEngine::new(
        MonotonicClock::new(),
        StdRng::from_entropy(),
        RaidTuning::default(),
        reset_delay,
    );

    // The process lives as long as the server, so nothing ever fires this.
    let shutdown = Arc::new(Notify::new());
    tokio::spawn(world_task(
        input_rx,
        update_tx,
        engine,
        tick_interval,
        shutdown,
    ));
    tokio::spawn(room_update_serializer(
        update_rx,
        connections.clone(),
        config::ROOM_BROADCAST_CAPACITY,
    ));

    Arc::new(AppState {
        input_tx,
        connections,
        connection_queue_capacity: config::CONNECTION_QUEUE_CAPACITY,
    })
}
