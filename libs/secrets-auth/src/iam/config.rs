use std::fmt;
use std::time::Duration;
use url::Url;

use crate::error::TokenError;
use crate::secret_string::SecretString;

/// Public IAM identity endpoint.
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";

/// Settings for [`IamAuthenticator`](super::IamAuthenticator).
///
/// `Debug` redacts the API key.
#[derive(Clone)]
pub struct IamConfig {
    pub apikey: SecretString,

    /// Base URL of the identity service; `/identity/token` is appended.
    pub auth_url: String,

    /// How long before expiry the token goes stale and gets refreshed
    /// (default: 10 min).
    pub refresh_offset: Duration,

    /// Upper bound of the random early-refresh jitter (default: 1 min).
    pub jitter_max: Duration,

    /// Lower bound between refresh attempts after a failure (default: 10 s).
    pub min_refresh_period: Duration,

    /// Lifetime assumed when the response omits `expires_in` (default: 1 h).
    pub default_ttl: Duration,

    /// HTTP settings for the token client; `None` means
    /// [`HttpClientConfig::token_endpoint`](secrets_http::HttpClientConfig::token_endpoint).
    pub http_config: Option<secrets_http::HttpClientConfig>,
}

impl IamConfig {
    #[must_use]
    pub fn new(apikey: SecretString) -> Self {
        Self {
            apikey,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Full token endpoint derived from `auth_url`.
    ///
    /// # Errors
    /// `ConfigError` when `auth_url` is not an absolute URL.
    pub fn token_endpoint(&self) -> Result<Url, TokenError> {
        let base = self.auth_url.trim_end_matches('/');
        let base = base.strip_suffix("/identity/token").unwrap_or(base);
        Url::parse(&format!("{base}/identity/token"))
            .map_err(|e| TokenError::ConfigError(format!("invalid auth_url: {e}")))
    }

    /// # Errors
    /// `ConfigError` when the API key is blank or `auth_url` does not parse.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.apikey.is_empty() {
            return Err(TokenError::ConfigError("apikey must not be empty".into()));
        }
        self.token_endpoint().map(|_| ())
    }
}

impl Default for IamConfig {
    fn default() -> Self {
        Self {
            apikey: SecretString::new(""),
            auth_url: DEFAULT_IAM_URL.to_owned(),
            refresh_offset: Duration::from_secs(600),
            jitter_max: Duration::from_secs(60),
            min_refresh_period: Duration::from_secs(10),
            default_ttl: Duration::from_secs(3600),
            http_config: None,
        }
    }
}

impl fmt::Debug for IamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamConfig")
            .field("apikey", &"[REDACTED]")
            .field("auth_url", &self.auth_url)
            .field("refresh_offset", &self.refresh_offset)
            .field("jitter_max", &self.jitter_max)
            .field("min_refresh_period", &self.min_refresh_period)
            .field("default_ttl", &self.default_ttl)
            .field("http_config", &self.http_config)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn token_endpoint_is_appended_once() {
        let cfg = IamConfig::new(SecretString::new("k"));
        assert_eq!(
            cfg.token_endpoint().unwrap().as_str(),
            "https://iam.cloud.ibm.com/identity/token"
        );

        let cfg = cfg.with_auth_url("https://iam.test.cloud.ibm.com/identity/token/");
        assert_eq!(
            cfg.token_endpoint().unwrap().as_str(),
            "https://iam.test.cloud.ibm.com/identity/token"
        );
    }

    #[test]
    fn validate_rejects_blank_key_and_bad_url() {
        assert!(matches!(
            IamConfig::default().validate(),
            Err(TokenError::ConfigError(_))
        ));
        let bad = IamConfig::new(SecretString::new("k")).with_auth_url("not a url");
        assert!(matches!(bad.validate(), Err(TokenError::ConfigError(_))));
    }

    #[test]
    fn debug_redacts_apikey() {
        let cfg = IamConfig::new(SecretString::new("my-api-key-value"));
        let dbg = format!("{cfg:?}");
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("my-api-key-value"));
    }
}
