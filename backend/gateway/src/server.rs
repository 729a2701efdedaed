//! Health HTTP server and its shared state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use studybot_commands::CommandGate;
use studybot_core::ConnectionStatus;

use crate::health_api;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub started: Instant,
    pub status: Arc<ConnectionStatus>,
    pub gate: Arc<CommandGate>,
}

impl GatewayState {
    pub fn new(status: Arc<ConnectionStatus>, gate: Arc<CommandGate>) -> Self {
        Self { started: Instant::now(), status, gate }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_api::get_health))
        .route("/ping", get(health_api::ping))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the health endpoints until the task is dropped.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Health check server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
