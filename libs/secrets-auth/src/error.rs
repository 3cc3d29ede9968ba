use thiserror::Error;

/// Token acquisition failures.
///
/// No variant ever carries an API key or token value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenError {
    /// Transport or status failure talking to the token endpoint. The text
    /// comes from [`format_http_error`](crate::http_error::format_http_error).
    #[error("{0}")]
    Http(String),

    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// The identity service returned a `token_type` other than `Bearer`.
    #[error("unsupported token type: {0}")]
    UnsupportedTokenType(String),

    #[error("authenticator config error: {0}")]
    ConfigError(String),

    /// The cached token expired and the background refresh has not caught up.
    #[error("token unavailable: {0}")]
    Unavailable(String),
}
