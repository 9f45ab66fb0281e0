//! Server state management and orchestration.
//!
//! One forwarder is built at startup and shared by whichever transport the
//! configuration selects.

use crate::config::{ProxyConfig, Transport};
use crate::error::ServerError;
use crate::mcp::McpDispatcher;
use sentinel_eor_forwarder::{Forward, Forwarder};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Shared application state for every transport.
#[derive(Clone)]
pub struct AppState {
    /// Upstream forwarder (shared by MCP and REST)
    forwarder: Arc<dyn Forward>,

    /// MCP dispatcher over the same forwarder
    dispatcher: Arc<McpDispatcher>,

    /// Transport being served
    transport: Transport,

    /// Server start time (for health reporting)
    started_at: SystemTime,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("transport", &self.transport)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the upstream URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &ProxyConfig) -> Result<Self, ServerError> {
        let forwarder_config = config.forwarder_config()?;

        tracing::info!(
            "Forwarding to {} (timeout {:?})",
            forwarder_config.base_url(),
            forwarder_config.timeout()
        );

        let forwarder = Forwarder::new(forwarder_config)?;
        Ok(Self::with_forwarder(Arc::new(forwarder), config.transport))
    }

    /// Create application state around an existing forwarder.
    #[must_use]
    pub fn with_forwarder(forwarder: Arc<dyn Forward>, transport: Transport) -> Self {
        let dispatcher = Arc::new(McpDispatcher::new(forwarder.clone()));
        Self {
            forwarder,
            dispatcher,
            transport,
            started_at: SystemTime::now(),
        }
    }

    /// Get the upstream forwarder.
    #[must_use]
    pub fn forwarder(&self) -> &dyn Forward {
        self.forwarder.as_ref()
    }

    /// Get the MCP dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Arc<McpDispatcher> {
        &self.dispatcher
    }

    /// Get the transport being served.
    #[must_use]
    pub const fn transport(&self) -> Transport {
        self.transport
    }

    /// Get server uptime in seconds.
    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.started_at)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Server orchestration.
pub struct Server {
    /// Shared application state
    state: Arc<AppState>,
    /// Proxy configuration
    config: ProxyConfig,
}

impl Server {
    /// Create new server with configuration.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the forwarder cannot be built.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let state = AppState::new(&config)?;

        tracing::info!("Server initialized for {} transport", config.transport);

        Ok(Self {
            state: Arc::new(state),
            config,
        })
    }

    /// Run the selected transport.
    ///
    /// The stdio transport runs until stdin closes. HTTP transports run
    /// until interrupted or the listener fails.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if binding fails or the stdio stream breaks.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting Sentinel Asia EOR proxy");

        if !self.config.transport.is_http() {
            tracing::info!("Serving MCP over stdio");
            crate::stdio::serve(
                self.state.dispatcher().clone(),
                tokio::io::stdin(),
                tokio::io::stdout(),
            )
            .await?;
            tracing::info!("stdin closed, stopping server");
            return Ok(());
        }

        let bind_addr = self.config.bind_addr();
        let http_state = self.state.clone();

        let http_server =
            tokio::spawn(async move { crate::http::start_server(bind_addr, http_state).await });

        tokio::select! {
            result = http_server => {
                match result {
                    Ok(outcome) => outcome,
                    Err(e) => Err(ServerError::Shutdown(format!("HTTP server task failed: {e}"))),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|e| {
                    ServerError::Shutdown(format!("Failed to listen for shutdown signal: {e}"))
                })?;
                tracing::info!("Shutdown signal received, stopping server");
                Ok(())
            }
        }
    }

    /// Get shared application state (for testing).
    #[cfg(test)]
    #[must_use]
    pub const fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}
