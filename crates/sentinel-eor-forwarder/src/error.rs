//! Error types for forwarded requests.
//!
//! Errors fall into three tiers, reported by [`ForwardError::class`]:
//! client input (caught before any network traffic), upstream HTTP status,
//! and infrastructure failures (connection, timeout, malformed body).

use reqwest::StatusCode;
use thiserror::Error;

/// Classification of a non-2xx upstream status.
///
/// Only 400, 404 and 500 carry a specific meaning; every other non-success
/// status lands in [`UpstreamErrorKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamErrorKind {
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    ServerError,
    /// Any other non-2xx status
    Unknown,
}

impl UpstreamErrorKind {
    /// Map an upstream status code to its kind.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::INTERNAL_SERVER_ERROR => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Fixed human-readable message for this kind.
    pub const fn message(self) -> &'static str {
        match self {
            Self::BadRequest => "invalid request parameters",
            Self::NotFound => "data not found",
            Self::ServerError => "internal server error",
            Self::Unknown => "unknown error",
        }
    }
}

/// Coarse error classification used by transports to pick a wire status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller supplied unusable input; upstream was never contacted
    ClientInput,
    /// Upstream answered with a non-2xx status
    Upstream(UpstreamErrorKind),
    /// Network, timeout or body decoding failure
    Infrastructure,
}

/// Errors produced while forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// A parameter the operation requires was absent or empty
    #[error("{} parameter is required", .0.to_ascii_uppercase())]
    MissingParameter(&'static str),

    /// Upstream returned a non-success status
    #[error("API error {}: {}", .status.as_u16(), .kind.message())]
    Upstream {
        /// Status code returned by upstream
        status: StatusCode,
        /// Classification of the status
        kind: UpstreamErrorKind,
    },

    /// Connection, timeout or other transport failure
    #[error("Request error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Upstream body was not valid JSON
    #[error("Request error: invalid JSON body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Configured base URL is unusable
    #[error("Invalid upstream base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ForwardError {
    /// Build an upstream error from a raw status code.
    pub fn from_status(status: StatusCode) -> Self {
        Self::Upstream {
            status,
            kind: UpstreamErrorKind::from_status(status),
        }
    }

    /// Classify this error into its tier.
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::MissingParameter(_) => ErrorClass::ClientInput,
            Self::Upstream { kind, .. } => ErrorClass::Upstream(*kind),
            Self::Transport(_) | Self::Decode(_) | Self::InvalidBaseUrl { .. } | Self::Client(_) => {
                ErrorClass::Infrastructure
            }
        }
    }

    /// Whether the request was rejected before contacting upstream.
    pub const fn is_client_input(&self) -> bool {
        matches!(self, Self::MissingParameter(_))
    }

    /// Upstream status code, when upstream produced one.
    pub const fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias for forwarder operations.
pub type Result<T> = std::result::Result<T, ForwardError>;
