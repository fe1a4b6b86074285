//! Client construction
//!
//! [`ApiClient`] validates its options, builds one [`RequestTemplate`] per
//! descriptor and keeps the resulting [`ApiMethod`] handles in a read-only
//! table. Cloning the client is cheap and every clone shares that table.

use crate::config::ClientOptions;
use crate::error::{ApiError, ApiResult};
use crate::invoker::ApiMethod;
use crate::middleware::RateLimitedTransport;
use crate::params::{CallOptions, Params};
use crate::template::RequestTemplate;
use crate::transport::{ReqwestTransport, Transport};
use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Client generated from a table of endpoint descriptors
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: Arc<str>,
    methods: Arc<BTreeMap<String, ApiMethod>>,
}

impl ApiClient {
    /// Create a client backed by the default `reqwest` transport
    ///
    /// The transport is throttled with `options.rate_limit` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for invalid options or descriptors, or
    /// [`ApiError::Request`] when the HTTP client cannot be built.
    pub fn new(options: ClientOptions) -> ApiResult<Self> {
        options.validate()?;

        let http = ReqwestTransport::new(options.timeout)?;
        let transport: Arc<dyn Transport> = match options.rate_limit.clone() {
            Some(rate_limit) => Arc::new(RateLimitedTransport::new(http, rate_limit)?),
            None => Arc::new(http),
        };

        Self::with_transport(options, transport)
    }

    /// Create a client from an untyped JSON declaration
    ///
    /// # Errors
    ///
    /// See [`ClientOptions::from_value`] and [`ApiClient::new`].
    pub fn from_value(value: Value) -> ApiResult<Self> {
        Self::new(ClientOptions::from_value(value)?)
    }

    /// Create a client that sends through `transport`
    ///
    /// `options.rate_limit` and `options.timeout` are not applied; wrap the
    /// transport in [`RateLimitedTransport`] to throttle it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for invalid options or descriptors.
    #[instrument(skip_all, fields(base_url = %options.base_url))]
    pub fn with_transport(options: ClientOptions, transport: Arc<dyn Transport>) -> ApiResult<Self> {
        options.validate()?;

        let required = Arc::new(options.required.clone());
        let methods = options
            .methods
            .iter()
            .map(|(name, descriptor)| {
                let template = RequestTemplate::build(descriptor, name, &options)?;
                let method = ApiMethod::new(
                    name,
                    template,
                    &options,
                    Arc::clone(&required),
                    Arc::clone(&transport),
                );
                Ok((name.clone(), method))
            })
            .collect::<ApiResult<BTreeMap<_, _>>>()?;

        debug!(methods = methods.len(), "Client is instantiated");

        Ok(Self {
            base_url: Arc::from(options.base_url.as_str()),
            methods: Arc::new(methods),
        })
    }

    /// Base URL every request starts with
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle for a registered method
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&ApiMethod> {
        self.methods.get(name)
    }

    /// Names of every registered method, sorted
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Call a method by name with default options
    pub fn call(&self, name: &str, params: &Params) -> BoxFuture<'static, ApiResult<Value>> {
        self.invoke(name, params, &CallOptions::default())
    }

    /// Call a method by name
    ///
    /// An unknown name resolves to [`ApiError::UnknownMethod`].
    pub fn invoke(
        &self,
        name: &str,
        params: &Params,
        options: &CallOptions,
    ) -> BoxFuture<'static, ApiResult<Value>> {
        match self.methods.get(name) {
            Some(method) => method.call_with(params, options),
            None => future::ready(Err(ApiError::UnknownMethod(name.to_string()))).boxed(),
        }
    }
}
