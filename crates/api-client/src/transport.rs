//! HTTP transport collaborator
//!
//! The engine never opens sockets itself. It composes a [`TransportRequest`]
//! and hands it to a [`Transport`]; [`ReqwestTransport`] is the default
//! implementation backed by `reqwest`.

use crate::error::{ApiError, ApiResult};
use crate::params::ResponseType;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Request correlation ID header
pub const X_REQUEST_ID: &str = "X-Request-ID";

/// Fully composed request handed to the transport
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Upper-cased HTTP verb
    pub method: String,
    /// Absolute URL including the query string
    pub url: String,
    /// Merged headers
    pub headers: BTreeMap<String, String>,
    /// JSON body, present for write verbs only
    pub body: Option<Value>,
    /// How the payload should be decoded
    pub response_type: ResponseType,
    /// Skip payload parsing entirely
    pub raw_response: bool,
}

/// Response returned by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: BTreeMap<String, String>,
    /// Decoded payload
    pub data: Value,
}

impl TransportResponse {
    /// Check if the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends composed requests over the wire
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return its response, whatever the status
    async fn send(&self, request: TransportRequest) -> ApiResult<TransportResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: TransportRequest) -> ApiResult<TransportResponse> {
        (**self).send(request).await
    }
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Create a transport with a request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] when the underlying client cannot be built.
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("restmap/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self { inner })
    }

    /// Wrap an existing `reqwest` client
    #[must_use]
    pub fn with_client(inner: Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: TransportRequest) -> ApiResult<TransportResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ApiError::transport(format!("Invalid HTTP method: {}", request.method)))?;

        let mut builder = self.inner.request(method, &request.url);

        let has_request_id = request
            .headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(X_REQUEST_ID));
        let request_id = if has_request_id {
            None
        } else {
            let id = Uuid::new_v4().to_string();
            builder = builder.header(X_REQUEST_ID, &id);
            Some(id)
        };

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::transport(format!("Invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::transport(format!("Invalid header value: {e}")))?;
            builder = builder.header(name, value);
        }

        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = builder.send().await?;
        let status = response.status().as_u16();

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let text = response.text().await?;
        let data = decode_payload(text, request.response_type, request.raw_response);

        debug!(
            request_id = request_id.as_deref().unwrap_or("caller-supplied"),
            status = status,
            elapsed_ms = start.elapsed().as_millis(),
            "Transport round trip finished"
        );

        Ok(TransportResponse {
            status,
            headers,
            data,
        })
    }
}

/// Decode a payload per the requested response type
///
/// JSON payloads that are empty become `null` and payloads that fail to parse
/// are kept as strings.
pub(crate) fn decode_payload(text: String, response_type: ResponseType, raw: bool) -> Value {
    if raw || response_type == ResponseType::Text {
        return Value::String(text);
    }
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json() {
        let data = decode_payload(r#"{"a":1}"#.to_string(), ResponseType::Json, false);
        assert_eq!(data, json!({"a": 1}));
    }

    #[test]
    fn test_decode_empty_and_invalid() {
        assert_eq!(
            decode_payload("  ".to_string(), ResponseType::Json, false),
            Value::Null
        );
        assert_eq!(
            decode_payload("not json".to_string(), ResponseType::Json, false),
            json!("not json")
        );
    }

    #[test]
    fn test_decode_text_and_raw() {
        assert_eq!(
            decode_payload(r#"{"a":1}"#.to_string(), ResponseType::Text, false),
            json!(r#"{"a":1}"#)
        );
        assert_eq!(
            decode_payload("[1]".to_string(), ResponseType::Json, true),
            json!("[1]")
        );
    }

    #[test]
    fn test_is_success() {
        let mut response = TransportResponse {
            status: 204,
            headers: BTreeMap::new(),
            data: Value::Null,
        };
        assert!(response.is_success());
        response.status = 302;
        assert!(!response.is_success());
    }

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }
}
