//! Call parameters and per-call options

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat, insertion-ordered parameter map supplied per call
pub type Params = serde_json::Map<String, Value>;

/// How the transport should decode the response payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Parse the payload as JSON
    #[default]
    Json,
    /// Keep the payload as a string
    Text,
}

/// Options supplied alongside the parameters of a single call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOptions {
    /// Headers layered over the client headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Overrides the client response type
    pub response_type: Option<ResponseType>,
    /// Free-form values for request transformers
    #[serde(default)]
    pub extra: Params,
}

impl CallOptions {
    /// Create empty call options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Builder-style method to set the response type
    #[must_use]
    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Builder-style method to attach an extra value
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Render a parameter value as it appears in a URL
///
/// Strings are used verbatim, `null` becomes empty, and arrays or objects are
/// rendered as compact JSON.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("abc")), "abc");
        assert_eq!(render_value(&json!(1)), "1");
        assert_eq!(render_value(&json!(1.5)), "1.5");
        assert_eq!(render_value(&json!(false)), "false");
        assert_eq!(render_value(&Value::Null), "");
        assert_eq!(render_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_call_options_builder() {
        let opts = CallOptions::new()
            .with_header("X-Trace", "1")
            .with_response_type(ResponseType::Text)
            .with_extra("page", 2);

        assert_eq!(opts.headers.get("X-Trace").map(String::as_str), Some("1"));
        assert_eq!(opts.response_type, Some(ResponseType::Text));
        assert_eq!(opts.extra.get("page"), Some(&json!(2)));
    }

    #[test]
    fn test_call_options_deserialize() {
        let opts: CallOptions =
            serde_json::from_str(r#"{"headers": {"A": "b"}, "responseType": "text"}"#).unwrap();
        assert_eq!(opts.response_type, Some(ResponseType::Text));
        assert!(opts.extra.is_empty());
    }
}
