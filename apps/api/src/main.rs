mod catalog;
mod config;
mod engine;
mod errors;
mod grading;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SimLab API v{}", env!("CARGO_PKG_VERSION"));

    // Challenge content is static; load it once
    let catalog = Catalog::builtin();
    info!("Loaded {} SQL challenges", catalog.challenges().len());

    match config.query_timeout() {
        Some(limit) => info!("Query timeout: {} ms", limit.as_millis()),
        None => info!("Query timeout disabled"),
    }
    info!("Session capacity: {}", config.max_sessions);

    let state = AppState::new(config.clone(), catalog);
    match state.sessions.clone().spawn_idle_sweeper() {
        Some(_) => info!("Idle sessions expire after {} s", config.session_idle_secs),
        None => info!("Idle session expiry disabled"),
    }

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
