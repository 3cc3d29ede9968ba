#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Secrets Manager client
//!
//! Typed operations over every endpoint of the Secrets Manager v2 API:
//! - [`SecretsManagerClient`]: one async method per endpoint, each taking an
//!   options record and returning a [`DetailedResponse`]
//! - [`pipeline`]: renders operations into HTTP requests and classifies
//!   responses into [`SecretsManagerError`]
//! - [`pager`]: lazy, restartable walks over offset-paginated listings
//! - [`config`]: service properties from the environment and an
//!   `IBM_CREDENTIALS_FILE` credentials file
//!
//! Retries, timeouts and authentication belong to the [`secrets_http`] and
//! [`secrets_auth`] stack the client is built on.
//!
//! # Example
//!
//! ```ignore
//! use secrets_manager_client::{CallOptions, SecretsManagerClient, secrets::GetSecretOptions};
//!
//! // SECRETS_MANAGER_URL, SECRETS_MANAGER_APIKEY, ...
//! let client = SecretsManagerClient::from_env().await?;
//!
//! let secret = client
//!     .get_secret(&GetSecretOptions::new(id), &CallOptions::default())
//!     .await?
//!     .result;
//! println!("{} {:?}", secret.secret_type(), secret.name());
//! ```

mod client;
pub mod config;
mod error;
pub mod operations;
pub mod pager;
pub mod pipeline;

pub use client::{
    SecretsManagerClient, configurations, groups, locks, notifications, secrets, versions,
};
pub use config::{AuthType, ConfigError, ServiceProperties};
pub use pager::{OffsetPager, Page, PagedList};
pub use pipeline::{CONFIGURATION_TYPE_HEADER, CallOptions, DetailedResponse};

pub use secrets_manager_sdk as sdk;
pub use secrets_manager_sdk::SecretsManagerError;
