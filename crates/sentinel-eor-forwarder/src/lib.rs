//! Request forwarder for the Sentinel Asia EOR API.
//!
//! This crate holds the single piece of shared logic behind every transport
//! of the EOR proxy: turning a logical [`Operation`] plus its
//! [`QueryParameters`] into one outbound HTTP GET against the upstream API,
//! and mapping the outcome onto the [`ForwardError`] taxonomy.
//!
//! # Architecture
//!
//! - `operation`: the four upstream operations and their parameter sets
//! - `params`: ordered query parameters that never carry empty values
//! - `forwarder`: the [`Forward`] seam and its reqwest-backed [`Forwarder`]
//! - `error`: client-input, upstream-status and infrastructure errors
//!
//! # Example
//!
//! ```no_run
//! use sentinel_eor_forwarder::{Forward, Forwarder, ForwarderConfig, Operation, QueryParameters};
//!
//! # async fn run() -> Result<(), sentinel_eor_forwarder::ForwardError> {
//! let forwarder = Forwarder::new(ForwarderConfig::upstream_default()?)?;
//!
//! let params = QueryParameters::events(Some("JPN,PHL"), None, None);
//! let events = forwarder.forward(Operation::GetEvents, &params).await?;
//!
//! println!("{events:#}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod forwarder;
pub mod operation;
pub mod params;

pub use error::{ErrorClass, ForwardError, Result, UpstreamErrorKind};
pub use forwarder::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, Forward, Forwarder, ForwarderConfig,
    ensure_crypto_provider,
};
pub use operation::{Operation, ParameterSpec, UnknownOperation};
pub use params::QueryParameters;
