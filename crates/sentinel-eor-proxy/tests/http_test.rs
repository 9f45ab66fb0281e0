//! Integration tests for the HTTP transports.
//!
//! These tests start a real HTTP server in front of a mock upstream and make
//! actual requests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use sentinel_eor_proxy::{AppState, LogFormat, ProxyConfig, Transport};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start test HTTP server on random port, forwarding to `upstream`.
async fn start_test_server(upstream: &MockServer, transport: Transport) -> SocketAddr {
    // Install ring crypto provider for reqwest (idempotent)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = ProxyConfig {
        transport,
        upstream_url: upstream.uri(),
        timeout_secs: 5,
        bind: "127.0.0.1:0".parse().expect("Failed to parse bind address"),
        port: None,
        log_format: LogFormat::Text,
    };

    let state = Arc::new(AppState::new(&config).expect("Failed to initialize AppState"));
    let app = sentinel_eor_proxy::http::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind HTTP listener");
    let addr = listener
        .local_addr()
        .expect("Failed to get listener address");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("HTTP server failed to run");
    });

    addr
}

/// Read a response body as JSON.
async fn json_body(response: reqwest::Response) -> Value {
    let text = response.text().await.expect("Failed to read response body");
    serde_json::from_str(&text).expect("Body should be JSON")
}

#[tokio::test]
async fn test_rest_events_returns_upstream_json() {
    let upstream = MockServer::start().await;
    let events = json!([{
        "name": "Typhoon X",
        "disaster_type": "Typhoon",
        "occurrence_date": "2024-09-01",
        "country_iso3": "PHL",
        "glide": "TC-2024-000123-PHL"
    }]);
    Mock::given(method("GET"))
        .and(path("/get_events"))
        .and(query_param("countryiso3s", "JPN,PHL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events.clone()))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_test_server(&upstream, Transport::Rest).await;
    let response = reqwest::Client::new()
        .get(format!("http://{addr}/events?countryiso3s=JPN,PHL"))
        .send()
        .await
        .expect("Failed to send GET request to test server");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, events);
}

#[tokio::test]
async fn test_rest_products_without_url_is_bad_request() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&upstream)
        .await;

    let addr = start_test_server(&upstream, Transport::Rest).await;
    let response = reqwest::get(format!("http://{addr}/products"))
        .await
        .expect("Failed to send GET request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body, json!({ "detail": "URL parameter is required" }));
}

#[tokio::test]
async fn test_rest_upstream_statuses() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_metadata"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/get_countries"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&upstream)
        .await;

    let addr = start_test_server(&upstream, Transport::Rest).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/metadata"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "API error 404: data not found");

    let response = client
        .get(format!("http://{addr}/countries"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "API error 503: unknown error");
}

#[tokio::test]
async fn test_rest_non_json_upstream_body_is_bad_gateway() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_countries"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_test_server(&upstream, Transport::Rest).await;
    let response = reqwest::get(format!("http://{addr}/countries"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    let detail = body["detail"].as_str().expect("detail should be a string");
    assert!(detail.starts_with("Request error: "), "unexpected detail: {detail}");
}

#[tokio::test]
async fn test_rest_routes_absent_in_sse_mode() {
    let upstream = MockServer::start().await;
    let addr = start_test_server(&upstream, Transport::Sse).await;

    let response = reqwest::get(format!("http://{addr}/countries"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sse_tool_call() {
    let upstream = MockServer::start().await;
    let countries = json!([{ "name": "Japan", "iso3": "JPN" }]);
    Mock::given(method("GET"))
        .and(path("/get_countries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(countries.clone()))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_test_server(&upstream, Transport::Http).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/sse"))
        .header("content-type", "application/json")
        .body(
            json!({
                "jsonrpc": "2.0",
                "id": 42,
                "method": "tools/call",
                "params": { "name": "get_countries", "arguments": {} }
            })
            .to_string(),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .expect("Response should have content-type header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let body = response.text().await.unwrap();
    let data = body
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("Stream should carry one data event");
    let message: Value = serde_json::from_str(data).unwrap();

    assert_eq!(message["id"], 42);
    let text = message["result"]["content"][0]["text"].as_str().unwrap();
    assert_eq!(serde_json::from_str::<Value>(text).unwrap(), countries);
}

#[tokio::test]
async fn test_sse_tools_list_and_parse_error() {
    let upstream = MockServer::start().await;
    let addr = start_test_server(&upstream, Transport::Sse).await;
    let client = reqwest::Client::new();

    let body = client
        .post(format!("http://{addr}/sse"))
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("get_products"));

    let body = client
        .post(format!("http://{addr}/sse"))
        .body("not json")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("-32700"));
}

#[tokio::test]
async fn test_info_and_health() {
    let upstream = MockServer::start().await;
    let addr = start_test_server(&upstream, Transport::Http).await;
    let client = reqwest::Client::new();

    let info = json_body(
        client
            .get(format!("http://{addr}/"))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(info["name"], "Sentinel Asia EOR API Server");
    assert_eq!(info["transport"], "http");
    assert_eq!(info["endpoints"].as_array().unwrap().len(), 7);

    let response = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health = json_body(response).await;
    assert_eq!(health["status"], "healthy");
    assert!(health["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_cors_is_permissive() {
    let upstream = MockServer::start().await;
    let addr = start_test_server(&upstream, Transport::Rest).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/health"))
        .header("origin", "https://example.org")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
