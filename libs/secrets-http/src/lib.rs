#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP transport for the Secrets Manager SDK
//!
//! A hyper-based client wrapped in a tower stack:
//! - TLS via rustls (HTTPS only unless insecure HTTP is explicitly allowed)
//! - Per-attempt timeout and a total deadline spanning all retries
//! - Retries with exponential backoff, jitter and `Retry-After` support,
//!   gated on request idempotency
//! - Default `User-Agent` and `Accept` headers
//! - An optional auth layer slot that sits inside the retry loop
//! - Transparent response decompression
//!
//! # Example
//!
//! ```ignore
//! use secrets_http::HttpClient;
//! use std::time::Duration;
//!
//! let client = HttpClient::builder()
//!     .total_timeout(Duration::from_secs(30))
//!     .build()?;
//!
//! let resp = client
//!     .get("https://instance.example.com/api/v2/secret_groups")
//!     .send()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
mod tls;

pub use builder::{HttpClientBuilder, InnerService};
pub use client::HttpClient;
pub use config::{
    DEFAULT_USER_AGENT, ExponentialBackoff, HttpClientConfig, MERGE_PATCH_CONTENT_TYPE,
    RetryConfig, RetryTrigger, TlsRootConfig, TransportSecurity, is_idempotent_method,
    is_idempotent_request,
};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{
    DefaultHeadersLayer, DefaultHeadersService, RETRY_ATTEMPT_HEADER, RetryLayer, RetryService,
};
pub use request::RequestBuilder;
pub use response::{ERROR_BODY_PREVIEW_LIMIT, HttpResponse, ResponseBody, parse_retry_after};
