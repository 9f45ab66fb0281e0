//! Proxy configuration management.
//!
//! Configuration comes from CLI arguments with environment-variable
//! fallbacks, then is validated before the server starts.
//!
//! # Configuration Sources
//!
//! - CLI arguments (`--transport`, `--upstream-url`, `--bind`, ...)
//! - Environment variables (`EOR_PROXY_TRANSPORT`, `EOR_UPSTREAM_URL`, ...)
//! - `PORT`, which hosting platforms set to pick the listening port
//! - Default values
//!
//! # Example
//!
//! ```no_run
//! use sentinel_eor_proxy::ProxyConfig;
//!
//! let config = ProxyConfig::from_args();
//! config.validate().expect("Invalid configuration");
//!
//! println!("Transport: {}", config.transport);
//! println!("Upstream: {}", config.upstream_url);
//! println!("HTTP listener: {}", config.bind_addr());
//! ```

use crate::error::ConfigError;
use clap::{Parser, ValueEnum};
use sentinel_eor_forwarder::{DEFAULT_BASE_URL, ForwarderConfig};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Inbound transport to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout
    Stdio,
    /// JSON-RPC over HTTP POST answered as server-sent events
    Sse,
    /// Plain REST routes
    Rest,
    /// SSE and REST on one HTTP listener
    Http,
}

impl Transport {
    /// Whether this transport listens on HTTP.
    pub const fn is_http(self) -> bool {
        !matches!(self, Self::Stdio)
    }

    /// Whether the `/sse` JSON-RPC route is mounted.
    pub const fn serves_sse(self) -> bool {
        matches!(self, Self::Sse | Self::Http)
    }

    /// Whether the REST routes are mounted.
    pub const fn serves_rest(self) -> bool {
        matches!(self, Self::Rest | Self::Http)
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::Rest => "rest",
            Self::Http => "http",
        })
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Proxy configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sentinel-eor-proxy",
    about = "MCP and REST proxy for the Sentinel Asia Emergency Observation Request API",
    version
)]
pub struct ProxyConfig {
    /// Inbound transport
    #[arg(
        long,
        value_enum,
        env = "EOR_PROXY_TRANSPORT",
        default_value_t = Transport::Stdio
    )]
    pub transport: Transport,

    /// Base URL of the upstream EOR API
    #[arg(long, env = "EOR_UPSTREAM_URL", default_value = DEFAULT_BASE_URL)]
    pub upstream_url: String,

    /// Upstream request timeout in seconds
    #[arg(long, env = "EOR_UPSTREAM_TIMEOUT", default_value_t = 30)]
    pub timeout_secs: u64,

    /// HTTP bind address (sse, rest and http transports)
    #[arg(long, env = "EOR_PROXY_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Port override for the HTTP bind address
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Log output format (logs always go to stderr)
    #[arg(
        long,
        value_enum,
        env = "EOR_PROXY_LOG_FORMAT",
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,
}

impl ProxyConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Effective HTTP bind address, with `port` applied.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        let mut addr = self.bind;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        addr
    }

    /// Upstream request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Forwarder configuration derived from this proxy configuration.
    pub fn forwarder_config(&self) -> Result<ForwarderConfig, ConfigError> {
        ForwarderConfig::new(&self.upstream_url)
            .map(|config| config.with_timeout(self.timeout()))
            .map_err(|e| ConfigError::InvalidUpstreamUrl {
                url: self.upstream_url.clone(),
                reason: e.to_string(),
            })
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The upstream URL is not an absolute http(s) URL
    /// - The timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(self.timeout_secs));
        }

        self.forwarder_config()?;
        Ok(())
    }
}
