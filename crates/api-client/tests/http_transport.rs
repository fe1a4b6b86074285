//! Tests of the default `reqwest` transport against a mock HTTP server.

use restmap::prelude::*;
use restmap::transport::X_REQUEST_ID;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn params(value: serde_json::Value) -> Params {
    value.as_object().cloned().unwrap_or_default()
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(
        ClientOptions::new(server.uri())
            .with_method("getUser", "GET /users/{id}")
            .with_method("createPost", "POST /users/{id}/posts?draft={draft}")
            .with_method("ping", "GET /ping")
            .with_header("Authorization", "Bearer token")
            .with_rate_limit(None),
    )
    .unwrap()
}

#[tokio::test]
async fn get_sends_path_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .and(query_param("expand", "posts"))
        .and(header("Authorization", "Bearer token"))
        .and(header_exists(X_REQUEST_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server)
        .call("getUser", &params(json!({"id": 42, "expand": "posts"})))
        .await
        .unwrap();

    assert_eq!(user, json!({"id": 42}));
}

#[tokio::test]
async fn post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/7/posts"))
        .and(query_param("draft", "true"))
        .and(body_json(json!({"title": "Hello", "draft": true})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"created": true})))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server)
        .call(
            "createPost",
            &params(json!({"id": 7, "title": "Hello", "draft": true})),
        )
        .await
        .unwrap();

    assert_eq!(created, json!({"created": true}));
}

#[tokio::test]
async fn error_status_carries_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let err = client(&server)
        .call("getUser", &params(json!({"id": 1})))
        .await
        .unwrap_err();

    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, json!({"error": "not found"}));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn text_response_type_skips_parsing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"pong":true}"#))
        .mount(&server)
        .await;
    let client = client(&server);

    let parsed = client.call("ping", &Params::new()).await.unwrap();
    assert_eq!(parsed, json!({"pong": true}));

    let text = client
        .invoke(
            "ping",
            &Params::new(),
            &CallOptions::new().with_response_type(ResponseType::Text),
        )
        .await
        .unwrap();
    assert_eq!(text, json!(r#"{"pong":true}"#));
}

#[tokio::test]
async fn caller_request_id_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header(X_REQUEST_ID, "fixed-id"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server)
        .invoke(
            "ping",
            &Params::new(),
            &CallOptions::new().with_header("x-request-id", "fixed-id"),
        )
        .await
        .unwrap();

    assert_eq!(result, serde_json::Value::Null);
}

#[tokio::test]
async fn transport_reports_response_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-served-by", "mock"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let response = transport
        .send(TransportRequest {
            method: "GET".to_string(),
            url: format!("{}/ping", server.uri()),
            headers: BTreeMap::new(),
            body: None,
            response_type: ResponseType::Json,
            raw_response: false,
        })
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(
        response.headers.get("x-served-by").map(String::as_str),
        Some("mock")
    );
    assert_eq!(response.data, serde_json::Value::Null);
}

#[tokio::test]
async fn invalid_verb_is_rejected_before_sending() {
    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let err = transport
        .send(TransportRequest {
            method: "BAD VERB".to_string(),
            url: "http://127.0.0.1:1/".to_string(),
            headers: BTreeMap::new(),
            body: None,
            response_type: ResponseType::Json,
            raw_response: false,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport(ref m) if m.contains("BAD VERB")));
}

#[tokio::test]
async fn rate_limited_client_still_dispatches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("pong")))
        .expect(3)
        .mount(&server)
        .await;

    let client = ApiClient::new(
        ClientOptions::new(server.uri())
            .with_method("ping", "GET /ping")
            .with_rate_limit(Some(RateLimitConfig::max_rps(2))),
    )
    .unwrap();

    for _ in 0..3 {
        assert_eq!(client.call("ping", &Params::new()).await.unwrap(), json!("pong"));
    }
}
