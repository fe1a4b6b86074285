//! Per-method request templates built from endpoint descriptors
//!
//! A descriptor is `"<VERB> <URI>"`, for example `"post /users/{id}"`. Each
//! registered method owns one immutable [`RequestTemplate`] created when the
//! client is constructed.

use crate::config::ClientOptions;
use crate::error::{ApiError, ApiResult};
use crate::uri::UriSchema;
use std::collections::BTreeMap;

/// Verbs that carry their parameters in the query string and send no body
const READ_METHODS: [&str; 3] = ["GET", "HEAD", "OPTIONS"];

/// Immutable request template for one registered method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    base_url: String,
    http_method: String,
    uri: UriSchema,
    headers: BTreeMap<String, String>,
    query_pick: Option<Vec<String>>,
    body_pick: Option<Vec<String>>,
}

impl RequestTemplate {
    /// Build the template for `method_name` from its descriptor
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the descriptor is not exactly a verb
    /// and a URI separated by whitespace.
    pub fn build(descriptor: &str, method_name: &str, options: &ClientOptions) -> ApiResult<Self> {
        let tokens: Vec<&str> = descriptor.split_whitespace().collect();

        let [verb, uri] = tokens.as_slice() else {
            return Err(ApiError::config(format!(
                "Invalid rest endpoint declaration - {descriptor}"
            )));
        };

        Ok(Self {
            base_url: options.base_url.clone(),
            http_method: verb.to_uppercase(),
            uri: UriSchema::parse(uri),
            headers: options.headers.clone(),
            query_pick: options.query.get(method_name).cloned(),
            body_pick: options.body.get(method_name).cloned(),
        })
    }

    /// Base URL every request URL starts with
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upper-cased HTTP verb
    #[must_use]
    pub fn http_method(&self) -> &str {
        &self.http_method
    }

    /// Parsed URI template
    #[must_use]
    pub fn uri(&self) -> &UriSchema {
        &self.uri
    }

    /// Client-level headers
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Allow-list of query keys, if configured for this method
    #[must_use]
    pub fn query_pick(&self) -> Option<&[String]> {
        self.query_pick.as_deref()
    }

    /// Allow-list of body keys, if configured for this method
    #[must_use]
    pub fn body_pick(&self) -> Option<&[String]> {
        self.body_pick.as_deref()
    }

    /// Whether this verb sends a body and takes its query from placeholders only
    #[must_use]
    pub fn is_write(&self) -> bool {
        !READ_METHODS.contains(&self.http_method.as_str())
    }
}
