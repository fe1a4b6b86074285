//! Request/response transformers and error handlers
//!
//! Each hook is configured as a [`TransformSpec`]: absent, one function for
//! every method, or a per-method table. [`TransformSpec::resolve`] picks the
//! function governing a given method and is shared by all three hook kinds;
//! only the fallback differs.

use crate::error::{ApiError, ApiResult};
use crate::params::{CallOptions, Params};
use crate::transport::TransportResponse;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::{ready, Future};
use std::sync::Arc;

/// Working values handed to a request transformer
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParts {
    /// Call parameters, used for the path and query string
    pub params: Params,
    /// Body computed from the parameters before the transformer ran
    pub body: Params,
    /// Per-call options
    pub options: CallOptions,
}

/// Values handed to a response transformer
#[derive(Debug, Clone)]
pub struct ResponseContext {
    /// Raw transport response
    pub response: TransportResponse,
    /// Parameters as the caller supplied them
    pub original_params: Params,
    /// Parameters after the request transformer ran
    pub params: Params,
}

type RequestFn = dyn Fn(RequestParts) -> BoxFuture<'static, ApiResult<Option<RequestParts>>> + Send + Sync;
type ResponseFn = dyn Fn(ResponseContext) -> BoxFuture<'static, ApiResult<Value>> + Send + Sync;
type ErrorFn = dyn Fn(ApiError) -> BoxFuture<'static, ApiResult<Value>> + Send + Sync;

/// Rewrites parameters, body and options before dispatch
///
/// Returning `Ok(None)` keeps the values as computed; `Ok(Some(parts))`
/// replaces all three.
#[derive(Clone)]
pub struct RequestTransform(Arc<RequestFn>);

impl RequestTransform {
    /// Wrap an async transformer
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestParts) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Option<RequestParts>>> + Send + 'static,
    {
        Self(Arc::new(move |parts: RequestParts| f(parts).boxed()))
    }

    /// Wrap a synchronous transformer
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(RequestParts) -> ApiResult<Option<RequestParts>> + Send + Sync + 'static,
    {
        Self::new(move |parts| ready(f(parts)))
    }

    /// Leaves every value as computed
    #[must_use]
    pub fn identity() -> Self {
        Self::from_fn(|_| Ok(None))
    }

    pub(crate) async fn apply(&self, parts: RequestParts) -> ApiResult<Option<RequestParts>> {
        (self.0)(parts).await
    }
}

/// Turns the transport response into the call result
#[derive(Clone)]
pub struct ResponseTransform(Arc<ResponseFn>);

impl ResponseTransform {
    /// Wrap an async transformer
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(ResponseContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Value>> + Send + 'static,
    {
        Self(Arc::new(move |ctx: ResponseContext| f(ctx).boxed()))
    }

    /// Wrap a synchronous transformer
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(ResponseContext) -> ApiResult<Value> + Send + Sync + 'static,
    {
        Self::new(move |ctx| ready(f(ctx)))
    }

    /// Returns the response payload unchanged
    #[must_use]
    pub fn body() -> Self {
        Self::from_fn(|ctx| Ok(ctx.response.data))
    }

    pub(crate) async fn apply(&self, ctx: ResponseContext) -> ApiResult<Value> {
        (self.0)(ctx).await
    }
}

/// Receives a failed call and may recover it into a result
#[derive(Clone)]
pub struct ErrorHandler(Arc<ErrorFn>);

impl ErrorHandler {
    /// Wrap an async handler
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(ApiError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Value>> + Send + 'static,
    {
        Self(Arc::new(move |err: ApiError| f(err).boxed()))
    }

    /// Wrap a synchronous handler
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(ApiError) -> ApiResult<Value> + Send + Sync + 'static,
    {
        Self::new(move |err| ready(f(err)))
    }

    pub(crate) async fn apply(&self, err: ApiError) -> ApiResult<Value> {
        (self.0)(err).await
    }
}

macro_rules! opaque_debug {
    ($($name:ident),*) => {
        $(impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(..)"))
            }
        })*
    };
}

opaque_debug!(RequestTransform, ResponseTransform, ErrorHandler);

/// Configuration of one hook kind
#[derive(Debug, Clone)]
pub enum TransformSpec<T> {
    /// Not configured
    Absent,
    /// Applies to every method
    Global(T),
    /// Applies to the listed methods only
    PerMethod(HashMap<String, T>),
}

impl<T> Default for TransformSpec<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T: Clone> TransformSpec<T> {
    /// Function governing `method`, if any
    #[must_use]
    pub fn resolve(&self, method: &str) -> Option<T> {
        match self {
            Self::Absent => None,
            Self::Global(f) => Some(f.clone()),
            Self::PerMethod(table) => table.get(method).cloned(),
        }
    }

    /// Function governing `method`, or `default` when none is configured
    pub fn resolve_or(&self, method: &str, default: impl FnOnce() -> T) -> T {
        self.resolve(method).unwrap_or_else(default)
    }

    /// Add a function for one method, turning a non-table spec into a table
    ///
    /// A global function is replaced by the table.
    #[must_use]
    pub fn with_method(self, method: impl Into<String>, f: T) -> Self {
        let mut table = match self {
            Self::PerMethod(table) => table,
            Self::Absent | Self::Global(_) => HashMap::new(),
        };
        table.insert(method.into(), f);
        Self::PerMethod(table)
    }

    /// Whether nothing is configured
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}
