//! HTTP forwarder for the upstream EOR API.

use crate::error::{ForwardError, Result, UpstreamErrorKind};
use crate::operation::Operation;
use crate::params::QueryParameters;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

/// Upstream API used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://reder-test-o5k8.onrender.com";

/// Per-request upstream timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent upstream unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("sentinel-eor-proxy/", env!("CARGO_PKG_VERSION"));

static CRYPTO_PROVIDER: Once = Once::new();

/// Install the ring crypto provider for rustls.
///
/// reqwest is built without a bundled provider, so one must be installed
/// before the first client is constructed. Safe to call repeatedly.
pub fn ensure_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Err means another provider is already installed, which is fine.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Forwarder configuration.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    base_url: Url,
    timeout: Duration,
    user_agent: String,
}

impl ForwarderConfig {
    /// Configuration targeting `base_url` with default timeout and user agent.
    pub fn new(base_url: &str) -> Result<Self> {
        let invalid = |reason: &str| ForwardError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base"));
        }

        Ok(Self {
            base_url: url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Configuration targeting [`DEFAULT_BASE_URL`].
    pub fn upstream_default() -> Result<Self> {
        Self::new(DEFAULT_BASE_URL)
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the user agent sent upstream.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Upstream base URL.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// User agent sent upstream.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Full URL for `operation` with `params` as the query string.
    ///
    /// No `?` is appended when `params` is empty.
    pub fn endpoint_url(&self, operation: Operation, params: &QueryParameters) -> Result<Url> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| ForwardError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .push(operation.as_str());

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params.iter());
        }

        Ok(url)
    }
}

/// Forwards one operation to upstream and returns its JSON body.
///
/// Transports depend on this trait rather than on [`Forwarder`] so tests can
/// substitute doubles.
#[async_trait]
pub trait Forward: Send + Sync {
    /// Issue `operation` with `params` and return upstream's JSON verbatim.
    async fn forward(&self, operation: Operation, params: &QueryParameters) -> Result<Value>;
}

/// reqwest-backed [`Forward`] implementation.
///
/// Makes exactly one GET per call. Nothing is retried.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    config: ForwarderConfig,
}

impl Forwarder {
    /// Build a forwarder and its HTTP client.
    pub fn new(config: ForwarderConfig) -> Result<Self> {
        ensure_crypto_provider();

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self { client, config })
    }

    /// Build a forwarder around an existing reqwest client.
    pub const fn with_client(client: Client, config: ForwarderConfig) -> Self {
        Self { client, config }
    }

    /// Active configuration.
    pub const fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    fn check_required(operation: Operation, params: &QueryParameters) -> Result<()> {
        match operation
            .required_parameters()
            .find(|name| !params.contains(name))
        {
            Some(missing) => Err(ForwardError::MissingParameter(missing)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Forward for Forwarder {
    async fn forward(&self, operation: Operation, params: &QueryParameters) -> Result<Value> {
        Self::check_required(operation, params)?;

        let url = self.config.endpoint_url(operation, params)?;
        debug!("Forwarding {} to {}", operation, url);

        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                warn!("Upstream request for {operation} failed: {e}");
                ForwardError::Transport(e)
            })?;

        let status = response.status();
        trace!("Upstream status for {operation}: {status}");

        if !status.is_success() {
            let kind = UpstreamErrorKind::from_status(status);
            warn!(
                "Upstream returned {} for {}: {}",
                status.as_u16(),
                operation,
                kind.message()
            );
            return Err(ForwardError::Upstream { status, kind });
        }

        let body = response.bytes().await.map_err(ForwardError::Transport)?;
        let value = serde_json::from_slice(&body).map_err(ForwardError::Decode)?;

        debug!("Upstream {} returned {} bytes", operation, body.len());
        Ok(value)
    }
}
