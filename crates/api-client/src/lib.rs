//! Declarative REST clients from endpoint descriptors
//!
//! This crate turns a base URL and a table of terse descriptors such as
//! `"GET /users/{id}"` into callable methods. Each call maps its parameters
//! onto the path, query string and body, runs the configured transform hooks
//! and sends the request through a pluggable transport.
//!
//! # Features
//!
//! - **Descriptor mini-language**: `"<VERB> <PATH>[?<QUERY>]"` with `{name}` placeholders
//! - **Parameter projection**: path substitution, query defaults and pick-lists
//! - **Transform hooks**: global or per-method request/response transformers and error handlers
//! - **Required fields**: calls missing a declared field fail before any I/O
//! - **Rate limiting**: the default transport is throttled with a token bucket
//!
//! # Example
//!
//! ```rust,no_run
//! use restmap::{ApiClient, ClientOptions, Params};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(
//!         ClientOptions::new("https://api.example.com")
//!             .with_method("getUser", "GET /users/{id}")
//!             .with_method("createPost", "POST /users/{id}/posts")
//!             .with_required("createPost", ["title"]),
//!     )?;
//!
//!     let mut params = Params::new();
//!     params.insert("id".into(), json!(42));
//!     let user = client.call("getUser", &params).await?;
//!     println!("{user}");
//!
//!     params.insert("title".into(), json!("Hello"));
//!     let create_post = client.method("createPost").ok_or("createPost is not registered")?;
//!     let post = create_post.call(&params).await?;
//!     println!("{post}");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod invoker;
pub mod middleware;
pub mod params;
pub mod projection;
pub mod template;
pub mod transform;
pub mod transport;
pub mod uri;

pub use client::ApiClient;
pub use config::{ClientDefinition, ClientOptions, RateLimitOptions};
pub use error::{ApiError, ApiResult};
pub use invoker::ApiMethod;
pub use params::{CallOptions, Params, ResponseType};
pub use transform::{
    ErrorHandler, RequestParts, RequestTransform, ResponseContext, ResponseTransform,
    TransformSpec,
};
pub use transport::{Transport, TransportRequest, TransportResponse};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::ApiClient;
    pub use crate::config::ClientOptions;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::middleware::{RateLimitConfig, RateLimitedTransport};
    pub use crate::params::{CallOptions, Params, ResponseType};
    pub use crate::transform::{
        ErrorHandler, RequestParts, RequestTransform, ResponseContext, ResponseTransform,
        TransformSpec,
    };
    pub use crate::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
}
