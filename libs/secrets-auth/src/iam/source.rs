use std::time::Duration;

use aliri_clock::DurationSecs;
use aliri_tokens::sources::AsyncTokenSource;
use aliri_tokens::{AccessToken, IdToken, TokenLifetimeConfig, TokenWithLifetime};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use super::config::IamConfig;
use crate::error::TokenError;
use crate::http_error::format_http_error;
use crate::secret_string::SecretString;

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
const RESPONSE_TYPE: &str = "cloud_iam";

/// Identity service response. Only the fields used for the bearer flow;
/// deliberately not `Serialize`.
#[derive(Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Exchanges the API key for an access token. Driven by the
/// `aliri_tokens` watcher, which handles scheduling, jitter and backoff.
pub struct IamTokenSource {
    client: secrets_http::HttpClient,
    token_endpoint: Url,
    apikey: SecretString,
    default_ttl: Duration,
    refresh_offset: Duration,
    min_refresh_period: Duration,
}

impl IamTokenSource {
    pub fn new(config: &IamConfig) -> Result<Self, TokenError> {
        let token_endpoint = config.token_endpoint()?;
        let http_config = config
            .http_config
            .clone()
            .unwrap_or_else(secrets_http::HttpClientConfig::token_endpoint);
        let client = secrets_http::HttpClientBuilder::with_config(http_config)
            .build()
            .map_err(|e| TokenError::Http(format_http_error(&e, "IAM token")))?;

        Ok(Self {
            client,
            token_endpoint,
            apikey: config.apikey.clone(),
            default_ttl: config.default_ttl,
            refresh_offset: config.refresh_offset,
            min_refresh_period: config.min_refresh_period,
        })
    }
}

#[async_trait]
impl AsyncTokenSource for IamTokenSource {
    type Error = TokenError;

    async fn request_token(&mut self) -> Result<TokenWithLifetime, Self::Error> {
        let apikey = Zeroizing::new(self.apikey.expose().to_owned());
        let fields = [
            ("grant_type", APIKEY_GRANT_TYPE),
            ("apikey", apikey.as_str()),
            ("response_type", RESPONSE_TYPE),
        ];

        let response = self
            .client
            .post(self.token_endpoint.as_str())
            .form(&fields)
            .map_err(|e| TokenError::Http(format_http_error(&e, "IAM token")))?
            .send()
            .await
            .map_err(|e| TokenError::Http(format_http_error(&e, "IAM token")))?;

        let token_resp: IamTokenResponse = response
            .error_for_status()
            .map_err(|e| TokenError::Http(format_http_error(&e, "IAM token")))?
            .json()
            .await
            .map_err(|e| TokenError::Http(format_http_error(&e, "IAM token")))?;

        if token_resp.access_token.is_empty() {
            return Err(TokenError::InvalidResponse("empty access_token".into()));
        }
        if let Some(ref tt) = token_resp.token_type
            && !tt.eq_ignore_ascii_case("bearer")
        {
            return Err(TokenError::UnsupportedTokenType(tt.clone()));
        }

        let lifetime_secs = token_resp
            .expires_in
            .unwrap_or(self.default_ttl.as_secs());
        let (freshness, min_stale) = refresh_params(
            lifetime_secs,
            &self.refresh_offset,
            &self.min_refresh_period,
        );
        tracing::debug!(lifetime_secs, "IAM token acquired");

        let access_token = AccessToken::new(token_resp.access_token);
        Ok(TokenLifetimeConfig::new(freshness, min_stale).create_token(
            &access_token,
            None::<&IdToken>,
            DurationSecs(lifetime_secs),
        ))
    }
}

/// `(freshness_period, min_staleness_period)` for [`TokenLifetimeConfig`].
///
/// The token turns stale `refresh_offset` before expiry, or halfway through
/// its life when the offset is not shorter than the lifetime. The minimum
/// staleness window is capped so stale time never passes expiry.
#[allow(clippy::integer_division, clippy::cast_precision_loss)]
fn refresh_params(
    lifetime_secs: u64,
    refresh_offset: &Duration,
    min_refresh_period: &Duration,
) -> (f64, DurationSecs) {
    if lifetime_secs == 0 {
        return (0.0, DurationSecs(0));
    }

    let offset = refresh_offset.as_secs();
    let desired_delay = if offset < lifetime_secs {
        lifetime_secs - offset
    } else {
        lifetime_secs / 2
    };

    let freshness = (desired_delay as f64) / (lifetime_secs as f64);
    let min_stale = min_refresh_period.as_secs().min(desired_delay);

    (freshness, DurationSecs(min_stale))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_config(server: &MockServer) -> IamConfig {
        IamConfig {
            http_config: Some(secrets_http::HttpClientConfig::for_testing()),
            ..IamConfig::new(SecretString::new("test-apikey")).with_auth_url(server.base_url())
        }
    }

    #[tokio::test]
    async fn exchanges_apikey_with_form_grant() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/identity/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_includes("grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Aapikey")
                .body_includes("apikey=test-apikey")
                .body_includes("response_type=cloud_iam");
            then.status(200).header("content-type", "application/json").body(
                r#"{"access_token":"iam-tok","refresh_token":"r","token_type":"Bearer","expires_in":3600,"expiration":1700003600}"#,
            );
        });

        let mut source = IamTokenSource::new(&test_config(&server)).unwrap();
        let token = source.request_token().await.unwrap();

        assert_eq!(token.access_token().as_str(), "iam-tok");
        assert_eq!(token.lifetime(), DurationSecs(3600));
        mock.assert();
    }

    #[tokio::test]
    async fn missing_expires_in_falls_back_to_default_ttl() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST).path("/identity/token");
            then.status(200).body(r#"{"access_token":"iam-tok"}"#);
        });

        let mut source = IamTokenSource::new(&test_config(&server)).unwrap();
        let token = source.request_token().await.unwrap();
        assert_eq!(token.lifetime(), DurationSecs(3600));
    }

    #[tokio::test]
    async fn rejected_apikey_surfaces_status_only() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST).path("/identity/token");
            then.status(400).body(
                r#"{"errorCode":"BXNIM0415E","errorMessage":"Provided API key could not be found"}"#,
            );
        });

        let mut source = IamTokenSource::new(&test_config(&server)).unwrap();
        let err = source.request_token().await.unwrap_err();
        match err {
            TokenError::Http(msg) => {
                assert!(msg.contains("400"), "{msg}");
                assert!(!msg.contains("BXNIM0415E"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_bearer_token_type_is_rejected() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST).path("/identity/token");
            then.status(200)
                .body(r#"{"access_token":"t","token_type":"mac","expires_in":60}"#);
        });

        let mut source = IamTokenSource::new(&test_config(&server)).unwrap();
        assert!(matches!(
            source.request_token().await,
            Err(TokenError::UnsupportedTokenType(t)) if t == "mac"
        ));
    }

    #[test]
    fn refresh_params_normal_and_short_lived() {
        let (freshness, min_stale) =
            refresh_params(3600, &Duration::from_secs(600), &Duration::from_secs(10));
        assert!((freshness - 3000.0 / 3600.0).abs() < f64::EPSILON);
        assert_eq!(min_stale, DurationSecs(10));

        let (freshness, min_stale) =
            refresh_params(60, &Duration::from_secs(600), &Duration::from_secs(100));
        assert!((freshness - 0.5).abs() < f64::EPSILON);
        assert_eq!(min_stale, DurationSecs(30));

        assert_eq!(
            refresh_params(0, &Duration::from_secs(1), &Duration::from_secs(1)),
            (0.0, DurationSecs(0))
        );
    }
}
