//! Typed operations over every Secrets Manager endpoint.
//!
//! Each operation takes an options record, checks its required fields and
//! returns a [`DetailedResponse`](crate::DetailedResponse). Options are
//! grouped by resource in the submodules.

use std::sync::Arc;

use secrets_auth::{
    HttpClientBuilderExt, IamAuthenticator, IamConfig, StaticTokenProvider, TokenProvider,
};
use secrets_http::{HttpClient, HttpClientBuilder, HttpClientConfig, TransportSecurity};
use secrets_manager_sdk::SecretsManagerError;
use serde_json::{Map, Value};
use url::Url;

use crate::config::{AuthType, ConfigError, ServiceProperties};
use crate::pipeline::Pipeline;

pub mod configurations;
pub mod groups;
pub mod locks;
pub mod notifications;
pub mod secrets;
pub mod versions;

/// Client of one Secrets Manager instance.
///
/// `Clone + Send + Sync`; clones share the HTTP connection pool and the
/// token provider.
///
/// ```ignore
/// let client = SecretsManagerClient::from_env().await?;
/// let created = client
///     .create_secret(&CreateSecretOptions::new(SecretPrototype::Arbitrary(
///         ArbitrarySecretPrototype::new("example-arbitrary-secret", "secret-data"),
///     )))
///     .await?;
/// ```
#[derive(Clone)]
pub struct SecretsManagerClient {
    pipeline: Pipeline,
}

impl SecretsManagerClient {
    /// Client over a configured [`HttpClient`]. Authentication, retries and
    /// timeouts are the HTTP client's.
    ///
    /// # Errors
    /// `InvalidArgument` when `service_url` is not an absolute URL.
    pub fn new(http: HttpClient, service_url: &str) -> Result<Self, SecretsManagerError> {
        Ok(Self {
            pipeline: Pipeline::new(http, service_url)?,
        })
    }

    /// Build from environment variables and the credentials file of the
    /// default service name.
    ///
    /// # Errors
    /// Loader errors, and the errors of [`Self::from_properties`].
    pub async fn from_env() -> Result<Self, ConfigError> {
        Self::from_properties(&ServiceProperties::load()?).await
    }

    /// As [`Self::from_env`], with keys under the `<SERVICE_NAME>_` prefix.
    ///
    /// # Errors
    /// As [`Self::from_env`].
    pub async fn from_service(service_name: &str) -> Result<Self, ConfigError> {
        Self::from_properties(&ServiceProperties::load_for(service_name)?).await
    }

    /// Build the HTTP stack and token provider `properties` describe.
    ///
    /// For `iam` the first token is fetched here, so a wrong API key fails
    /// now rather than on the first operation.
    ///
    /// # Errors
    /// `InsecureTransport` for `DISABLE_SSL` in a release build, `Auth` when
    /// the token provider cannot start, `Http` when the client cannot be
    /// built, `Client` for a malformed service URL.
    pub async fn from_properties(properties: &ServiceProperties) -> Result<Self, ConfigError> {
        let mut http_config = HttpClientConfig::default();
        let mut token_config = HttpClientConfig::token_endpoint();
        if properties.disable_ssl {
            if !cfg!(debug_assertions) {
                return Err(ConfigError::InsecureTransport);
            }
            tracing::warn!(
                url = %properties.url,
                "DISABLE_SSL set; HTTP traffic will NOT be encrypted"
            );
            http_config.transport = TransportSecurity::AllowInsecureHttp;
            token_config.transport = TransportSecurity::AllowInsecureHttp;
        }

        let mut builder = HttpClientBuilder::with_config(http_config);
        if let Some(provider) = token_provider(properties, token_config).await? {
            builder = builder.with_token_provider(provider);
        }
        tracing::debug!(
            url = %properties.url,
            auth_type = %properties.auth_type,
            "secrets manager client configured"
        );
        Ok(Self::new(builder.build()?, &properties.url)?)
    }

    #[must_use]
    pub fn service_url(&self) -> &Url {
        self.pipeline.base_url()
    }

    /// The request pipeline, for endpoints the typed operations do not cover.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

async fn token_provider(
    properties: &ServiceProperties,
    http_config: HttpClientConfig,
) -> Result<Option<Arc<dyn TokenProvider>>, ConfigError> {
    match properties.auth_type {
        AuthType::Iam => {
            let apikey = properties.apikey.clone().ok_or(ConfigError::MissingApiKey)?;
            let config = IamConfig {
                http_config: Some(http_config),
                ..IamConfig::new(apikey).with_auth_url(properties.auth_url.clone())
            };
            Ok(Some(Arc::new(IamAuthenticator::new(config).await?)))
        }
        AuthType::BearerToken => {
            let token = properties
                .bearer_token
                .clone()
                .ok_or(ConfigError::MissingBearerToken)?;
            Ok(Some(Arc::new(StaticTokenProvider::new(token)?)))
        }
        AuthType::NoAuth => Ok(None),
    }
}

/// Reject an empty merge-patch document.
fn require_patch(patch: &Map<String, Value>) -> Result<(), SecretsManagerError> {
    if patch.is_empty() {
        return Err(SecretsManagerError::missing_field("patch"));
    }
    Ok(())
}

/// Encode a record that is not part of a polymorphic family.
fn to_body<T: serde::Serialize>(record: &T, what: &str) -> Result<Value, SecretsManagerError> {
    serde_json::to_value(record).map_err(|e| SecretsManagerError::Encode {
        field: what.to_owned(),
        reason: e.to_string(),
    })
}
