//! HTTP server implementation using axum.
//!
//! The router always carries the info and health routes. The SSE and REST
//! routes are mounted according to the configured transport.

use crate::config::Transport;
use crate::error::ServerError;
use crate::server::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod rest;
pub mod sse;

/// Create HTTP router for the transport recorded in `state`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let transport = state.transport();

    let mut router = Router::new()
        .route("/", get(handlers::handle_root))
        .route("/health", get(handlers::handle_health));

    if transport.serves_sse() {
        router = router.route("/sse", post(sse::handle_sse));
    }

    if transport.serves_rest() {
        router = router
            .route("/countries", get(rest::handle_countries))
            .route("/metadata", get(rest::handle_metadata))
            .route("/events", get(rest::handle_events))
            .route("/products", get(rest::handle_products));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Paths served for `transport`, as listed by the info route.
pub fn endpoints(transport: Transport) -> Vec<&'static str> {
    let mut paths = vec!["/", "/health"];
    if transport.serves_sse() {
        paths.push("/sse");
    }
    if transport.serves_rest() {
        paths.extend(["/countries", "/metadata", "/events", "/products"]);
    }
    paths
}

/// Start HTTP server.
///
/// # Errors
///
/// Returns `ServerError` if the server fails to bind or encounters a runtime error.
pub async fn start_server(bind_addr: SocketAddr, state: Arc<AppState>) -> Result<(), ServerError> {
    let transport = state.transport();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|source| ServerError::HttpBindFailed {
            addr: bind_addr,
            source,
        })?;

    tracing::info!("HTTP server ({transport}) listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Shutdown(format!("HTTP server error: {e}")))?;

    Ok(())
}
