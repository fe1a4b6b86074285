//! Construction-time configuration for generated clients
//!
//! [`ClientOptions`] carries everything a client needs: the base URL, one
//! descriptor per method, shared headers, required fields, pick-lists and the
//! transform hooks. The data-only part can also be declared in JSON as a
//! [`ClientDefinition`].

use crate::error::{ApiError, ApiResult};
use crate::params::ResponseType;
use crate::transform::{ErrorHandler, RequestTransform, ResponseTransform, TransformSpec};
use restmap_core::rate_limit::RateLimitConfig;
use restmap_core::validation::RequiredFields;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default throughput ceiling, in requests per second
const DEFAULT_MAX_RPS: u32 = 7;

/// Rate limit options as declared in a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateLimitOptions {
    /// `{ "maxRPS": n }`
    PerSecond {
        /// Requests per second
        #[serde(rename = "maxRPS")]
        max_rps: u32,
    },
    /// `{ "maxRequests": n, "perMilliseconds": ms }`
    Window {
        /// Requests per window
        #[serde(rename = "maxRequests")]
        max_requests: u32,
        /// Window length in milliseconds
        #[serde(rename = "perMilliseconds")]
        per_milliseconds: u64,
    },
}

impl From<RateLimitOptions> for RateLimitConfig {
    fn from(options: RateLimitOptions) -> Self {
        match options {
            RateLimitOptions::PerSecond { max_rps } => RateLimitConfig::max_rps(max_rps),
            RateLimitOptions::Window {
                max_requests,
                per_milliseconds,
            } => RateLimitConfig::per_window(max_requests, per_milliseconds),
        }
    }
}

/// Serializable, data-only client declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDefinition {
    /// Prefix of every request URL
    pub base_url: String,
    /// Method name to `"<VERB> <URI>"` descriptor
    pub methods: BTreeMap<String, String>,
    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Method name to required parameter names
    #[serde(default)]
    pub required: HashMap<String, Vec<String>>,
    /// Method name to allowed query keys
    #[serde(default)]
    pub query: HashMap<String, Vec<String>>,
    /// Method name to allowed body keys
    #[serde(default)]
    pub body: HashMap<String, Vec<String>>,
    /// Keep payloads undecoded
    #[serde(default)]
    pub raw_response: bool,
    /// Default response type
    #[serde(default)]
    pub response_type: Option<ResponseType>,
    /// Throughput ceiling of the default transport
    #[serde(default)]
    pub rate_limit_options: Option<RateLimitOptions>,
    /// Request timeout of the default transport, in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Prefix of every request URL
    pub base_url: String,
    /// Method name to `"<VERB> <URI>"` descriptor
    pub methods: BTreeMap<String, String>,
    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Required parameters per method
    pub required: RequiredFields,
    /// Allowed query keys per method
    pub query: HashMap<String, Vec<String>>,
    /// Allowed body keys per method
    pub body: HashMap<String, Vec<String>>,
    /// Runs before the request is composed
    pub transform_request: TransformSpec<RequestTransform>,
    /// Turns the response into the call result
    pub transform_response: TransformSpec<ResponseTransform>,
    /// Recovers or rewrites failures
    pub error_handler: TransformSpec<ErrorHandler>,
    /// Keep payloads undecoded
    pub raw_response: bool,
    /// Default response type
    pub response_type: ResponseType,
    /// Throughput ceiling of the default transport, `None` to disable
    pub rate_limit: Option<RateLimitConfig>,
    /// Request timeout of the default transport
    pub timeout: Duration,
}

impl ClientOptions {
    /// Create options for `base_url` with no methods
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            methods: BTreeMap::new(),
            headers: BTreeMap::new(),
            required: RequiredFields::new(),
            query: HashMap::new(),
            body: HashMap::new(),
            transform_request: TransformSpec::Absent,
            transform_response: TransformSpec::Absent,
            error_handler: TransformSpec::Absent,
            raw_response: false,
            response_type: ResponseType::Json,
            rate_limit: Some(RateLimitConfig::max_rps(DEFAULT_MAX_RPS)),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build options from a typed definition
    #[must_use]
    pub fn from_definition(definition: ClientDefinition) -> Self {
        let mut options = Self::new(definition.base_url);
        options.methods = definition.methods;
        options.headers = definition.headers;
        options.required = RequiredFields::from(definition.required);
        options.query = definition.query;
        options.body = definition.body;
        options.raw_response = definition.raw_response;
        if let Some(response_type) = definition.response_type {
            options.response_type = response_type;
        }
        if let Some(rate_limit) = definition.rate_limit_options {
            options.rate_limit = Some(rate_limit.into());
        }
        if let Some(secs) = definition.timeout_secs {
            options.timeout = Duration::from_secs(secs);
        }
        options
    }

    /// Build options from an untyped JSON declaration
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when `baseUrl` is missing or empty, when
    /// `methods` is missing or not an object, when `headers`, `required`,
    /// `query` or `body` is present but not an object, when a header value is
    /// not a scalar, or when a transform hook is declared. Hooks are functions
    /// and can only be attached with the builder methods.
    pub fn from_value(value: Value) -> ApiResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(ApiError::config("Client options must be an object"));
        };

        match map.get("baseUrl") {
            Some(Value::String(url)) if !url.is_empty() => {}
            _ => return Err(ApiError::config("Missing baseUrl option")),
        }

        if !map.get("methods").is_some_and(Value::is_object) {
            return Err(ApiError::config("Invalid methods list"));
        }

        let object_checks = [
            ("headers", "Headers must be object"),
            ("required", "Required fields config must be an object"),
            ("query", "Query params pick options should be an object"),
            ("body", "Body params pick options should be an object"),
        ];
        for (key, message) in object_checks {
            if map.get(key).is_some_and(|v| !v.is_null() && !v.is_object()) {
                return Err(ApiError::config(message));
            }
        }

        let hook_checks = [
            ("transformRequest", "transformRequest must be object or function"),
            ("transformResponse", "transformResponse must be an object or function"),
            ("errorHandler", "errorHandler must be object or function"),
        ];
        for (key, message) in hook_checks {
            if map.get(key).is_some_and(|v| !v.is_null()) {
                return Err(ApiError::config(message));
            }
        }

        if let Some(Value::Object(headers)) = map.get_mut("headers") {
            stringify_header_values(headers)?;
        }

        map.retain(|_, v| !v.is_null());
        let definition: ClientDefinition = serde_json::from_value(Value::Object(map))
            .map_err(|e| ApiError::config(format!("Invalid client options: {e}")))?;

        Ok(Self::from_definition(definition))
    }

    /// Builder-style method to register a method
    #[must_use]
    pub fn with_method(mut self, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        self.methods.insert(name.into(), descriptor.into());
        self
    }

    /// Builder-style method to add a shared header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Builder-style method to declare required parameters of a method
    #[must_use]
    pub fn with_required<I, S>(mut self, method: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = self.required.with_method(method, fields);
        self
    }

    /// Builder-style method to restrict the query keys of a method
    #[must_use]
    pub fn with_query_pick<I, S>(mut self, method: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query
            .insert(method.into(), keys.into_iter().map(Into::into).collect());
        self
    }

    /// Builder-style method to restrict the body keys of a method
    #[must_use]
    pub fn with_body_pick<I, S>(mut self, method: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body
            .insert(method.into(), keys.into_iter().map(Into::into).collect());
        self
    }

    /// Builder-style method to set the request transformer
    #[must_use]
    pub fn with_transform_request(mut self, spec: TransformSpec<RequestTransform>) -> Self {
        self.transform_request = spec;
        self
    }

    /// Builder-style method to set the response transformer
    #[must_use]
    pub fn with_transform_response(mut self, spec: TransformSpec<ResponseTransform>) -> Self {
        self.transform_response = spec;
        self
    }

    /// Builder-style method to set the error handler
    #[must_use]
    pub fn with_error_handler(mut self, spec: TransformSpec<ErrorHandler>) -> Self {
        self.error_handler = spec;
        self
    }

    /// Builder-style method to keep payloads undecoded
    #[must_use]
    pub fn with_raw_response(mut self, raw: bool) -> Self {
        self.raw_response = raw;
        self
    }

    /// Builder-style method to set the default response type
    #[must_use]
    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Builder-style method to set or disable the rate limit
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimitConfig>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Builder-style method to set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for an empty base URL, a blank method
    /// name, an unusable rate limit or a zero timeout.
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("Missing baseUrl option"));
        }

        if let Some(name) = self.methods.keys().find(|name| name.trim().is_empty()) {
            return Err(ApiError::config(format!("Invalid method name: {name:?}")));
        }

        if let Some(ref rate_limit) = self.rate_limit {
            rate_limit.validate().map_err(ApiError::config)?;
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}

/// Render numeric and boolean header values as strings
fn stringify_header_values(headers: &mut serde_json::Map<String, Value>) -> ApiResult<()> {
    for (name, value) in headers.iter_mut() {
        let rendered = match value {
            Value::String(_) => continue,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                return Err(ApiError::config(format!(
                    "Header {name} must be a string, number or boolean"
                )));
            }
        };
        *value = Value::String(rendered);
    }
    Ok(())
}
