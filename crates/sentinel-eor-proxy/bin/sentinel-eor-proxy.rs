//! Sentinel Asia EOR proxy binary entry point.
//!
//! This is a thin wrapper around the sentinel-eor-proxy library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging on stderr
//! 3. Validates configuration
//! 4. Starts the selected transport
//!
//! For library usage, see the sentinel-eor-proxy crate documentation.

use anyhow::Result;
use sentinel_eor_proxy::{LogFormat, ProxyConfig, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ProxyConfig::from_args();

    // stdout belongs to the stdio transport, so every log line goes to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    tracing::info!(
        "Configuration loaded: transport={}, upstream={}, timeout={}s",
        config.transport,
        config.upstream_url,
        config.timeout_secs
    );
    if config.transport.is_http() {
        tracing::info!("HTTP bind address: {}", config.bind_addr());
    }

    config.validate()?;

    let server = Server::new(config)?;
    server.run().await?;

    Ok(())
}
