//! Health check endpoints.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
    /// `Connected` once the Discord gateway reported ready.
    pub bot_status: String,
    pub processed_messages: usize,
    pub active_commands: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub pong: bool,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Handler for `GET /`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    let stats = state.gate.stats();
    Json(HealthReport {
        status: "Bot is running!".into(),
        uptime_seconds: state.uptime().as_secs(),
        timestamp: Utc::now(),
        bot_status: state.status.label().into(),
        processed_messages: stats.processed_messages,
        active_commands: stats.active_commands,
    })
}

/// Handler for `GET /ping`
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { pong: true, timestamp: Utc::now().timestamp_millis() })
}
