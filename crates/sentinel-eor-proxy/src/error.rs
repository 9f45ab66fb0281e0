//! Error types for the EOR proxy.
//!
//! All errors use thiserror for consistent error handling across the codebase.

use sentinel_eor_forwarder::ForwardError;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Upstream base URL is not usable
    #[error("Invalid upstream URL '{url}': {reason}")]
    InvalidUpstreamUrl {
        /// The rejected URL
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Upstream timeout out of range
    #[error("Invalid upstream timeout: {0} seconds (must be at least 1)")]
    InvalidTimeout(u64),
}

/// Server runtime errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind HTTP server
    #[error("Failed to bind HTTP server to {addr}: {source}")]
    HttpBindFailed {
        /// Address that failed to bind
        addr: std::net::SocketAddr,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Forwarder could not be constructed
    #[error("Forwarder error: {0}")]
    Forwarder(#[from] ForwardError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Server shutdown error
    #[error("Server shutdown error: {0}")]
    Shutdown(String),
}

/// Errors raised by the stdio transport itself.
///
/// Per-request failures are never reported here; they are answered on the
/// wire as JSON-RPC errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// I/O error on the transport stream
    #[error("Protocol I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response could not be serialized
    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::InvalidTimeout(0);
        assert_eq!(
            err.to_string(),
            "Invalid upstream timeout: 0 seconds (must be at least 1)"
        );

        let err = ConfigError::InvalidUpstreamUrl {
            url: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid upstream URL 'nope': relative URL without a base"
        );
    }

    #[test]
    fn test_server_error_conversion() {
        let server_err: ServerError = ConfigError::InvalidTimeout(0).into();
        assert!(server_err.to_string().contains("Invalid upstream timeout"));

        let server_err: ServerError = ForwardError::MissingParameter("url").into();
        assert!(server_err.to_string().contains("URL parameter is required"));
    }
}
