#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Bearer authentication for the Secrets Manager SDK
//!
//! Every request to the service carries `Authorization: Bearer <token>`.
//! Tokens come from a [`TokenProvider`]:
//!
//! - [`IamAuthenticator`] exchanges an API key at the IAM identity service and
//!   refreshes the resulting token in the background before it expires.
//! - [`StaticTokenProvider`] hands out a caller-supplied token unchanged.
//!
//! [`HttpClientBuilderExt::with_token_provider`] installs the provider inside
//! the retry loop of a [`secrets_http::HttpClient`], so every attempt asks
//! the provider for a token.
//!
//! ```ignore
//! use secrets_auth::{HttpClientBuilderExt, IamAuthenticator, IamConfig};
//!
//! let iam = IamAuthenticator::new(IamConfig::new(apikey)).await?;
//! let client = secrets_http::HttpClient::builder()
//!     .with_token_provider(std::sync::Arc::new(iam))
//!     .build()?;
//! ```

pub mod builder_ext;
pub mod error;
pub mod http_error;
pub mod iam;
pub mod layer;
pub mod provider;
pub mod secret_string;

pub use builder_ext::HttpClientBuilderExt;
pub use error::TokenError;
pub use iam::{DEFAULT_IAM_URL, IamAuthenticator, IamConfig};
pub use layer::BearerAuthLayer;
pub use provider::{StaticTokenProvider, TokenProvider};
pub use secret_string::SecretString;
