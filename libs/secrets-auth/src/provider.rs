use async_trait::async_trait;

use crate::error::TokenError;
use crate::secret_string::SecretString;

/// Source of bearer tokens for outbound requests.
///
/// Called before every HTTP attempt. Implementations own caching and
/// refresh; callers keep no credential state of their own.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current bearer token value, without the `Bearer ` prefix.
    ///
    /// # Errors
    /// Returns [`TokenError`] when no usable token can be produced.
    async fn token(&self) -> Result<SecretString, TokenError>;

    /// Drop any cached token so the next [`token`](Self::token) call fetches
    /// a fresh one. No-op for providers without a cache.
    async fn invalidate(&self) {}
}

/// Hands out one fixed token.
///
/// Used for the `bearerToken` auth type, where the caller obtained the token
/// elsewhere and takes responsibility for its lifetime.
#[derive(Clone, Debug)]
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    /// # Errors
    /// `ConfigError` when the token is blank.
    pub fn new(token: SecretString) -> Result<Self, TokenError> {
        if token.is_empty() {
            return Err(TokenError::ConfigError(
                "bearer token must not be empty".into(),
            ));
        }
        Ok(Self { token })
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<SecretString, TokenError> {
        Ok(self.token.clone())
    }
}
