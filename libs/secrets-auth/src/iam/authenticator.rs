use std::fmt;
use std::sync::Arc;

use aliri_clock::DurationSecs;
use aliri_tokens::backoff::ErrorBackoffConfig;
use aliri_tokens::jitter::RandomEarlyJitter;
use aliri_tokens::{TokenStatus, TokenWatcher};
use arc_swap::ArcSwap;
use async_trait::async_trait;

use super::config::IamConfig;
use super::source::IamTokenSource;
use crate::error::TokenError;
use crate::provider::TokenProvider;
use crate::secret_string::SecretString;

struct WatcherSlot {
    watcher: TokenWatcher,
}

/// [`TokenProvider`] backed by the IAM API-key exchange.
///
/// Construction fetches the first token, so a wrong key or unreachable
/// identity service fails fast. After that an `aliri_tokens` watcher refreshes
/// in the background and [`token`](TokenProvider::token) is a lock-free read.
///
/// Cheap to clone; clones share the watcher.
#[derive(Clone)]
pub struct IamAuthenticator {
    slot: Arc<ArcSwap<WatcherSlot>>,
    config: Arc<IamConfig>,
}

impl fmt::Debug for IamAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamAuthenticator")
            .field("auth_url", &self.config.auth_url)
            .finish_non_exhaustive()
    }
}

impl IamAuthenticator {
    /// # Errors
    /// `ConfigError` for a blank key or malformed `auth_url`; `Http` when the
    /// initial exchange fails.
    pub async fn new(config: IamConfig) -> Result<Self, TokenError> {
        config.validate()?;
        let watcher = spawn_watcher(&config).await?;
        Ok(Self {
            slot: Arc::new(ArcSwap::from_pointee(WatcherSlot { watcher })),
            config: Arc::new(config),
        })
    }

    /// Current token without awaiting.
    ///
    /// # Errors
    /// `Unavailable` when the cached token expired before the background
    /// refresh replaced it.
    pub fn current(&self) -> Result<SecretString, TokenError> {
        let guard = self.slot.load();
        let borrowed = guard.watcher.token();
        if matches!(borrowed.token_status(), TokenStatus::Expired) {
            return Err(TokenError::Unavailable(
                "IAM token expired, refresh pending".into(),
            ));
        }
        Ok(SecretString::new(borrowed.access_token().as_str()))
    }
}

#[async_trait]
impl TokenProvider for IamAuthenticator {
    async fn token(&self) -> Result<SecretString, TokenError> {
        self.current()
    }

    /// Replace the watcher with a freshly spawned one. On failure the old
    /// watcher stays in place.
    async fn invalidate(&self) {
        match spawn_watcher(&self.config).await {
            Ok(watcher) => self.slot.store(Arc::new(WatcherSlot { watcher })),
            Err(e) => tracing::warn!("IAM token invalidation: refetch failed: {e}"),
        }
    }
}

async fn spawn_watcher(config: &IamConfig) -> Result<TokenWatcher, TokenError> {
    let source = IamTokenSource::new(config)?;
    let jitter = RandomEarlyJitter::new(DurationSecs(config.jitter_max.as_secs()));
    let backoff =
        ErrorBackoffConfig::new(config.min_refresh_period, config.min_refresh_period * 30, 2);

    TokenWatcher::spawn_from_token_source(source, jitter, backoff).await
}
