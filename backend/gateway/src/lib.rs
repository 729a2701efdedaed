//! Studybot health HTTP server
//!
//! Reports process uptime, Discord connection state and admission-gate
//! counters for uptime monitors.

pub mod health_api;
pub mod server;

pub use health_api::{HealthReport, PingResponse};
pub use server::{build_router, start_server, GatewayState};
