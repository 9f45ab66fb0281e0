//! JSON-RPC over HTTP POST, answered as a server-sent event stream.

use crate::server::AppState;
use axum::{
    body::Bytes,
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::{self, Stream};
use std::sync::Arc;

/// Handle POST /sse endpoint.
///
/// The stream carries one `data:` event with the JSON-RPC response, or no
/// event when the body was a notification. Malformed bodies are answered
/// in-band with a parse error.
pub async fn handle_sse(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    tracing::debug!("Handling SSE request ({} bytes)", body.len());

    let response = state.dispatcher().handle_message(&body).await;
    Sse::new(stream::iter(
        response.map(|response| Event::default().json_data(response)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Transport;
    use async_trait::async_trait;
    use axum::response::IntoResponse;
    use sentinel_eor_forwarder::{Forward, Operation, QueryParameters};
    use serde_json::{Value, json};

    struct Fixed;

    #[async_trait]
    impl Forward for Fixed {
        async fn forward(
            &self,
            _operation: Operation,
            _params: &QueryParameters,
        ) -> sentinel_eor_forwarder::Result<Value> {
            Ok(json!([{ "iso3": "JPN" }]))
        }
    }

    async fn body_of(raw: &'static [u8]) -> String {
        let state = Arc::new(AppState::with_forwarder(Arc::new(Fixed), Transport::Sse));
        let response = handle_sse(State(state), Bytes::from_static(raw))
            .await
            .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn event_payloads(body: &str) -> Vec<Value> {
        body.lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .map(|data| serde_json::from_str(data).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_single_event_per_request() {
        let body = body_of(br#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"get_countries"}}"#).await;
        let events = event_payloads(&body);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["id"], 1);
        let text = events[0]["result"]["content"][0]["text"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!([{ "iso3": "JPN" }]));
    }

    #[tokio::test]
    async fn test_parse_error_is_in_band() {
        let events = event_payloads(&body_of(b"{oops").await);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["error"]["code"], -32700);
        assert_eq!(events[0]["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_notification_has_no_event() {
        let body = body_of(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).await;
        assert!(event_payloads(&body).is_empty());
    }
}
