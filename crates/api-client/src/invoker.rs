//! Generated method handles and the per-call pipeline
//!
//! A call moves through validation, request transformation, dispatch and
//! response transformation. Any failure after validation is offered to the
//! method's error handler, which may turn it into a successful result.
//!
//! [`ApiMethod::call`] is synchronous up to the point it returns a future:
//! required fields are checked and the inputs are copied before it returns,
//! so the caller is free to mutate its parameter map immediately. No error is
//! ever raised synchronously; a validation failure comes back as a future
//! that resolves to [`ApiError::Validation`] without touching the transport.

use crate::config::ClientOptions;
use crate::error::{ApiError, ApiResult};
use crate::params::{CallOptions, Params, ResponseType};
use crate::projection::{project_body, project_url};
use crate::template::RequestTemplate;
use crate::transform::{
    ErrorHandler, RequestParts, RequestTransform, ResponseContext, ResponseTransform,
};
use crate::transport::{Transport, TransportRequest};
use futures::future::{self, BoxFuture, FutureExt};
use restmap_core::validation::RequiredFields;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

struct MethodInner {
    name: String,
    template: RequestTemplate,
    required: Arc<RequiredFields>,
    transform_request: RequestTransform,
    transform_response: ResponseTransform,
    error_handler: Option<ErrorHandler>,
    response_type: ResponseType,
    raw_response: bool,
    transport: Arc<dyn Transport>,
}

/// Callable handle for one registered method
#[derive(Clone)]
pub struct ApiMethod {
    inner: Arc<MethodInner>,
}

impl std::fmt::Debug for ApiMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMethod")
            .field("name", &self.inner.name)
            .field("template", &self.inner.template)
            .finish_non_exhaustive()
    }
}

impl ApiMethod {
    /// Resolve the hooks for `name` once and bind them to its template
    pub(crate) fn new(
        name: &str,
        template: RequestTemplate,
        options: &ClientOptions,
        required: Arc<RequiredFields>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            inner: Arc::new(MethodInner {
                name: name.to_string(),
                template,
                required,
                transform_request: options
                    .transform_request
                    .resolve_or(name, RequestTransform::identity),
                transform_response: options
                    .transform_response
                    .resolve_or(name, ResponseTransform::body),
                error_handler: options.error_handler.resolve(name),
                response_type: options.response_type,
                raw_response: options.raw_response,
                transport,
            }),
        }
    }

    /// Method name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Request template built from the descriptor
    #[must_use]
    pub fn template(&self) -> &RequestTemplate {
        &self.inner.template
    }

    /// Call with default options
    pub fn call(&self, params: &Params) -> BoxFuture<'static, ApiResult<Value>> {
        self.call_with(params, &CallOptions::default())
    }

    /// Call with per-call options
    pub fn call_with(
        &self,
        params: &Params,
        options: &CallOptions,
    ) -> BoxFuture<'static, ApiResult<Value>> {
        debug!(method = %self.inner.name, "Method called");

        let validation = self
            .inner
            .required
            .check(&self.inner.name, |field| params.contains_key(field));
        if !validation.is_valid() {
            warn!(
                method = %self.inner.name,
                missing = ?validation.fields(),
                "Required params missing"
            );
            return future::ready(Err(ApiError::Validation {
                method: self.inner.name.clone(),
                missing: validation.fields(),
            }))
            .boxed();
        }

        let inner = Arc::clone(&self.inner);
        let params = params.clone();
        let options = options.clone();

        async move {
            let result = inner.execute(params, options).await;
            match (result, &inner.error_handler) {
                (Err(err), Some(handler)) => {
                    debug!(method = %inner.name, error = %err, "Routing failure to error handler");
                    handler.apply(err).await
                }
                (result, _) => result,
            }
        }
        .boxed()
    }
}

impl MethodInner {
    async fn execute(&self, params: Params, options: CallOptions) -> ApiResult<Value> {
        let original_params = params.clone();
        let computed = RequestParts {
            body: project_body(&self.template, &params),
            params,
            options,
        };

        let parts = match self.transform_request.apply(computed.clone()).await? {
            Some(replaced) => replaced,
            None => computed,
        };

        let url = project_url(&self.template, &parts.params);
        let request = TransportRequest {
            method: self.template.http_method().to_string(),
            url,
            headers: merge_headers(self.template.headers(), parts.options.headers),
            body: self
                .template
                .is_write()
                .then(|| Value::Object(parts.body)),
            response_type: parts.options.response_type.unwrap_or(self.response_type),
            raw_response: self.raw_response,
        };

        debug!(
            method = %self.name,
            http_method = %request.method,
            url = %request.url,
            "Request started"
        );
        let start = Instant::now();
        let response = self.transport.send(request).await?;
        debug!(
            method = %self.name,
            status = response.status,
            elapsed_ms = start.elapsed().as_millis(),
            "Request finished"
        );

        if !response.is_success() {
            return Err(ApiError::status_error(response.status, response.data));
        }

        self.transform_response
            .apply(ResponseContext {
                response,
                original_params,
                params: parts.params,
            })
            .await
    }
}

/// Layer call headers over template headers, matching names case-insensitively
fn merge_headers(
    base: &BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = base.clone();
    for (name, value) in overrides {
        merged.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        merged.insert(name, value);
    }
    merged
}
