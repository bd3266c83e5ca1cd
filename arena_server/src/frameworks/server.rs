// Framework bootstrap for the arena server runtime.

use crate::domain::SimConfig;
use crate::frameworks::config;
use crate::interface_adapters::net::{world_update_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameEvent, WorldUpdate, world_task};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tracing_subscriber::EnvFilter;

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();
    install_panic_hook();
}

// `RUST_LOG` picks the filter (default `info`); `LOG_FORMAT=json` for structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => subscriber.json().with_current_span(true).init(),
        _ => subscriber.compact().init(),
    }
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string);
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?location, ?backtrace, "arena server panicked");
    }));
}

fn sim_config() -> SimConfig {
    SimConfig {
        width: config::world_width(),
        height: config::world_height(),
        seed: config::sim_seed(),
        ..SimConfig::default()
    }
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let shutdown = Arc::new(Notify::new());
    let state = build_state(sim_config(), shutdown.clone());

    // Start the Web Server
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    });
    shutdown.notify_one();
    served
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

fn build_state(sim: SimConfig, shutdown: Arc<Notify>) -> Arc<AppState> {
    // input_tx/rx: All client inputs go to the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);

    // world_tx/rx: World updates are broadcast to the serializer.
    let (world_tx, world_rx) =
        broadcast::channel::<WorldUpdate>(config::WORLD_BROADCAST_CAPACITY);

    // world_bytes_tx/rx: Serialized world updates shared across all clients.
    let (world_bytes_tx, _world_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::WORLD_BROADCAST_CAPACITY);
    let (world_latest_tx, _world_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));

    tracing::debug!(
        width = sim.width,
        height = sim.height,
        seed = sim.seed,
        tick_ms = config::TICK_INTERVAL.as_millis() as u64,
        "arena configured"
    );

    // Spawn the world task; it owns the simulation outright.
    tokio::spawn(world_task(
        input_rx,
        world_tx,
        sim,
        config::TICK_INTERVAL,
        shutdown,
    ));

    // Spawn the world update serializer task in the adapter layer.
    tokio::spawn(world_update_serializer(
        world_rx,
        world_bytes_tx.clone(),
        world_latest_tx.clone(),
    ));

    Arc::new(AppState {
        input_tx,
        world_bytes_tx,
        world_latest_tx,
    })
}
