//! REST handlers, one route per upstream operation.
//!
//! Query-string values pass through to the forwarder; parameters the
//! operation does not declare are dropped. Upstream JSON is returned as-is.

use crate::server::AppState;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sentinel_eor_forwarder::{
    ErrorClass, Forward, ForwardError, Operation, QueryParameters, UpstreamErrorKind,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

type QueryMap = HashMap<String, String>;

/// Query string as extracted, with malformed input kept for `AppError`.
type QueryInput = Result<Query<QueryMap>, QueryRejection>;

async fn forward(
    state: &AppState,
    operation: Operation,
    query: QueryInput,
) -> Result<Json<Value>, AppError> {
    tracing::debug!("Handling REST request for {operation}");

    let Query(query) = query?;

    let params =
        QueryParameters::for_operation(operation, |name| query.get(name).map(String::as_str));
    let body = state.forwarder().forward(operation, &params).await?;
    Ok(Json(body))
}

/// Handle GET /countries endpoint.
///
/// # Errors
///
/// Returns `AppError` if forwarding fails.
pub async fn handle_countries(
    State(state): State<Arc<AppState>>,
    query: QueryInput,
) -> Result<Json<Value>, AppError> {
    forward(&state, Operation::GetCountries, query).await
}

/// Handle GET /metadata endpoint.
///
/// # Errors
///
/// Returns `AppError` if forwarding fails.
pub async fn handle_metadata(
    State(state): State<Arc<AppState>>,
    query: QueryInput,
) -> Result<Json<Value>, AppError> {
    forward(&state, Operation::GetMetadata, query).await
}

/// Handle GET /events endpoint.
///
/// Accepts `countryiso3s`, `start_date` and `end_date`, all optional.
///
/// # Errors
///
/// Returns `AppError` if forwarding fails.
pub async fn handle_events(
    State(state): State<Arc<AppState>>,
    query: QueryInput,
) -> Result<Json<Value>, AppError> {
    forward(&state, Operation::GetEvents, query).await
}

/// Handle GET /products endpoint.
///
/// # Errors
///
/// Returns `AppError` if `url` is missing or forwarding fails.
pub async fn handle_products(
    State(state): State<Arc<AppState>>,
    query: QueryInput,
) -> Result<Json<Value>, AppError> {
    forward(&state, Operation::GetProducts, query).await
}

/// Application-level error type for REST handlers.
#[derive(Debug)]
pub enum AppError {
    /// Query string could not be decoded (400)
    Query(QueryRejection),
    /// Forwarding failed
    Forward(ForwardError),
}

impl AppError {
    /// HTTP status reported to the caller.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::Forward(err) => match err.class() {
                ErrorClass::ClientInput | ErrorClass::Upstream(UpstreamErrorKind::BadRequest) => {
                    StatusCode::BAD_REQUEST
                }
                ErrorClass::Upstream(UpstreamErrorKind::NotFound) => StatusCode::NOT_FOUND,
                ErrorClass::Upstream(UpstreamErrorKind::ServerError) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                ErrorClass::Upstream(UpstreamErrorKind::Unknown) | ErrorClass::Infrastructure => {
                    StatusCode::BAD_GATEWAY
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            Self::Query(rejection) => rejection.body_text(),
            Self::Forward(err) => err.to_string(),
        };

        if status.is_server_error() {
            tracing::warn!("REST request failed ({status}): {detail}");
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Query(rejection)
    }
}

impl From<ForwardError> for AppError {
    fn from(err: ForwardError) -> Self {
        Self::Forward(err)
    }
}
