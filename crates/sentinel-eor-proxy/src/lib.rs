//! Sentinel Asia EOR proxy.
//!
//! Exposes the four Emergency Observation Request API operations
//! (`get_countries`, `get_metadata`, `get_events`, `get_products`) through
//! several inbound transports that all share one forwarder:
//! - MCP over stdio (newline-delimited JSON-RPC)
//! - MCP over HTTP POST answered as server-sent events
//! - Plain REST routes
//!
//! # Architecture
//!
//! - `server`: shared state and transport selection
//! - `config`: CLI/environment configuration and validation
//! - `mcp`: JSON-RPC messages, tool catalog and dispatch
//! - `stdio`: line-framed stdio transport
//! - `http`: axum router with SSE, REST, info and health routes
//!
//! # Example
//!
//! ```no_run
//! use sentinel_eor_proxy::{ProxyConfig, Server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Logs must go to stderr; stdout carries the stdio protocol
//!     tracing_subscriber::fmt().with_writer(std::io::stderr).init();
//!
//!     let config = ProxyConfig::from_args();
//!     config.validate()?;
//!
//!     let server = Server::new(config)?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod server;
pub mod stdio;

// Re-exports for public API
pub use config::{LogFormat, ProxyConfig, Transport};
pub use error::{ConfigError, ProtocolError, ServerError};
pub use mcp::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpDispatcher};
pub use server::{AppState, Server};
