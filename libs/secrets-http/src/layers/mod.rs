//! Tower layers composing the client stack
//!
//! - [`DefaultHeadersLayer`] adds `User-Agent` and `Accept` when absent
//! - [`RetryLayer`] retries with exponential backoff, jitter and a total deadline

mod default_headers;
mod retry;

pub use default_headers::{DefaultHeadersLayer, DefaultHeadersService};
pub use retry::{RETRY_ATTEMPT_HEADER, RetryLayer, RetryService};
