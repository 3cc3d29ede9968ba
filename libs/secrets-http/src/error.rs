use std::time::Duration;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Classification of URL validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    /// URL could not be parsed
    ParseError,
    /// URL has no host
    MissingAuthority,
    /// URL has no scheme
    MissingScheme,
}

/// Transport-level error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Single request attempt timed out
    #[error("Request attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The per-call deadline elapsed (covers all retries and backoff sleeps)
    #[error("Operation deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// The connection could not be established; nothing reached the server
    #[error("Connect error: {0}")]
    Connect(#[source] BoxError),

    /// Transport error after the connection was established
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("TLS error: {0}")]
    Tls(#[source] BoxError),

    /// Credentials could not be obtained for the request
    #[error("Credential acquisition failed: {0}")]
    Auth(#[source] BoxError),

    #[error("Response body too large: limit {limit} bytes, got {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    /// HTTP non-2xx status
    #[error("HTTP {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
        content_type: Option<String>,
        retry_after: Option<Duration>,
    },

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Form encoding failed: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// Request queue is full
    #[error("Service overloaded: request queue is full")]
    Overloaded,

    /// Background worker died or channel closed
    #[error("Service unavailable: internal failure")]
    ServiceClosed,

    /// Invalid URL. Match on `kind`; `reason` is for logs only.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    #[error("URL scheme '{scheme}' not allowed: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl HttpError {
    /// True when the request never left the client.
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_))
    }

    /// True for per-attempt timeouts and per-call deadline expiry.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::DeadlineExceeded(_))
    }
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            HttpError::Connect(Box::new(err))
        } else {
            HttpError::Transport(Box::new(err))
        }
    }
}
