//! Info and health handlers shared by every HTTP transport.

use crate::mcp::SERVER_NAME;
use crate::server::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    /// Service name
    pub name: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Transport being served
    pub transport: String,
    /// Routes mounted on this listener
    pub endpoints: Vec<&'static str>,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Always `"healthy"` while the process serves requests
    pub status: &'static str,
    /// Service name
    pub service: &'static str,
    /// Seconds since startup
    pub uptime_seconds: u64,
}

/// Handle GET / endpoint.
pub async fn handle_root(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    let transport = state.transport();
    Json(ServiceInfo {
        name: SERVER_NAME,
        version: env!("CARGO_PKG_VERSION"),
        transport: transport.to_string(),
        endpoints: super::endpoints(transport),
    })
}

/// Handle GET /health endpoint.
pub async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        service: SERVER_NAME,
        uptime_seconds: state.uptime_seconds(),
    })
}
