use anyhow::Context;
use axum::Router;
use axum::routing::get;
use clap::Parser;
use peerlink_server::{IdleReaper, RoomRegistry, SignalingRouter, health, room_lookup, ws_handler};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Signaling relay for two-party peerlink calls.
#[derive(Parser)]
#[command(name = "peerlink-server", version)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Seconds between stale-room sweeps; also the staleness window.
    #[arg(long, default_value_t = 300)]
    reap_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let registry = RoomRegistry::new();
    let router = SignalingRouter::new(registry.clone());

    IdleReaper::new(registry, Duration::from_secs(args.reap_interval_secs)).spawn();

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/room/{id}", get(room_lookup))
        .route("/health", get(health))
        .with_state(router);

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "peerlink signaling server listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
