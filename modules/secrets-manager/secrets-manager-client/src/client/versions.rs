//! Secret versions.
//!
//! A version is addressed by its id or by the aliases `current` and
//! `previous`.

use secrets_manager_sdk::SecretsManagerError;
use secrets_manager_sdk::codec;
use secrets_manager_sdk::models::{
    SecretVersion, SecretVersionAction, SecretVersionActionPrototype, SecretVersionMetadata,
    SecretVersionMetadataCollection, SecretVersionMetadataPatch, SecretVersionPrototype,
};
use serde_json::{Map, Value};

use super::{SecretsManagerClient, require_patch};
use crate::operations;
use crate::pipeline::{Call, CallOptions, DetailedResponse};

#[derive(Debug, Clone)]
pub struct CreateSecretVersionOptions {
    pub secret_id: String,
    pub secret_version_prototype: SecretVersionPrototype,
}

impl CreateSecretVersionOptions {
    #[must_use]
    pub fn new(
        secret_id: impl Into<String>,
        secret_version_prototype: SecretVersionPrototype,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_version_prototype,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListSecretVersionsOptions {
    pub secret_id: String,
}

impl ListSecretVersionsOptions {
    #[must_use]
    pub fn new(secret_id: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
        }
    }
}

/// One version of one secret.
#[derive(Debug, Clone, Default)]
pub struct SecretVersionOptions {
    pub secret_id: String,
    pub id: String,
}

impl SecretVersionOptions {
    #[must_use]
    pub fn new(secret_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            id: id.into(),
        }
    }
}

pub type GetSecretVersionOptions = SecretVersionOptions;
pub type GetSecretVersionMetadataOptions = SecretVersionOptions;
pub type DeleteSecretVersionDataOptions = SecretVersionOptions;

#[derive(Debug, Clone, Default)]
pub struct UpdateSecretVersionMetadataOptions {
    pub secret_id: String,
    pub id: String,
    pub patch: Map<String, Value>,
}

impl UpdateSecretVersionMetadataOptions {
    #[must_use]
    pub fn new(
        secret_id: impl Into<String>,
        id: impl Into<String>,
        patch: Map<String, Value>,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            id: id.into(),
            patch,
        }
    }

    /// # Errors
    /// `Encode` when the patch does not serialize to an object.
    pub fn from_patch(
        secret_id: impl Into<String>,
        id: impl Into<String>,
        patch: &SecretVersionMetadataPatch,
    ) -> Result<Self, SecretsManagerError> {
        Ok(Self::new(
            secret_id,
            id,
            codec::derive_patch(patch, &SecretVersionMetadataPatch::default())?,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct CreateSecretVersionActionOptions {
    pub secret_id: String,
    pub id: String,
    pub action: SecretVersionActionPrototype,
}

impl CreateSecretVersionActionOptions {
    #[must_use]
    pub fn new(
        secret_id: impl Into<String>,
        id: impl Into<String>,
        action: SecretVersionActionPrototype,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            id: id.into(),
            action,
        }
    }
}

impl SecretsManagerClient {
    /// Rotate a secret by adding a version. The body carries no
    /// `secret_type`; the secret fixes it.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank secret id or a prototype missing its
    /// material; otherwise the pipeline errors.
    pub async fn create_secret_version(
        &self,
        options: &CreateSecretVersionOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretVersion>, SecretsManagerError> {
        options.secret_version_prototype.validate()?;
        let call = Call::new(&operations::CREATE_SECRET_VERSION)
            .path("secret_id", &options.secret_id)
            .body(codec::encode(&options.secret_version_prototype)?);
        self.pipeline.execute_variant(call, call_options).await
    }

    /// Metadata of every version of a secret. Not paginated.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank secret id; otherwise the pipeline
    /// errors.
    pub async fn list_secret_versions(
        &self,
        options: &ListSecretVersionsOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretVersionMetadataCollection>, SecretsManagerError> {
        let call = Call::new(&operations::LIST_SECRET_VERSIONS)
            .path("secret_id", &options.secret_id);
        let response = self
            .pipeline
            .execute_collection::<SecretVersionMetadata>(call, call_options, "versions")
            .await?;
        Ok(response.map(|(page, versions)| SecretVersionMetadataCollection {
            versions,
            total_count: page.total_count,
        }))
    }

    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn get_secret_version(
        &self,
        options: &GetSecretVersionOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretVersion>, SecretsManagerError> {
        let call = Call::new(&operations::GET_SECRET_VERSION)
            .path("secret_id", &options.secret_id)
            .path("id", &options.id);
        self.pipeline.execute_variant(call, call_options).await
    }

    /// Erase the material of a version. Its metadata stays listed.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn delete_secret_version_data(
        &self,
        options: &DeleteSecretVersionDataOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<()>, SecretsManagerError> {
        let call = Call::new(&operations::DELETE_SECRET_VERSION_DATA)
            .path("secret_id", &options.secret_id)
            .path("id", &options.id);
        self.pipeline.execute_empty(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn get_secret_version_metadata(
        &self,
        options: &GetSecretVersionMetadataOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretVersionMetadata>, SecretsManagerError> {
        let call = Call::new(&operations::GET_SECRET_VERSION_METADATA)
            .path("secret_id", &options.secret_id)
            .path("id", &options.id);
        self.pipeline.execute_variant(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank id or an empty patch; otherwise the
    /// pipeline errors.
    pub async fn update_secret_version_metadata(
        &self,
        options: &UpdateSecretVersionMetadataOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretVersionMetadata>, SecretsManagerError> {
        require_patch(&options.patch)?;
        let call = Call::new(&operations::UPDATE_SECRET_VERSION_METADATA)
            .path("secret_id", &options.secret_id)
            .path("id", &options.id)
            .body(Value::Object(options.patch.clone()));
        self.pipeline.execute_variant(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn create_secret_version_action(
        &self,
        options: &CreateSecretVersionActionOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretVersionAction>, SecretsManagerError> {
        let call = Call::new(&operations::CREATE_SECRET_VERSION_ACTION)
            .path("secret_id", &options.secret_id)
            .path("id", &options.id)
            .body(codec::encode(&options.action)?);
        self.pipeline.execute_variant(call, call_options).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use secrets_http::{HttpClientBuilder, HttpClientConfig};
    use secrets_manager_sdk::models::{ArbitraryVersionPrototype, SecretType};
    use serde_json::json;

    fn client(server: &MockServer) -> SecretsManagerClient {
        let http = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap();
        SecretsManagerClient::new(http, &server.base_url()).unwrap()
    }

    #[tokio::test]
    async fn new_version_body_has_no_discriminator() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/secrets/s-1/versions")
                .json_body(json!({"payload": "rotated"}));
            then.status(201).json_body(json!({
                "secret_type": "arbitrary",
                "id": "v-2",
                "secret_id": "s-1",
                "payload": "rotated"
            }));
        });

        let prototype = SecretVersionPrototype::Arbitrary(ArbitraryVersionPrototype {
            payload: "rotated".into(),
            ..ArbitraryVersionPrototype::default()
        });
        let version = client(&server)
            .create_secret_version(
                &CreateSecretVersionOptions::new("s-1", prototype),
                &CallOptions::default(),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(version.status.as_u16(), 201);
        assert_eq!(version.result.secret_type(), SecretType::Arbitrary);
        assert_eq!(version.result.id(), Some("v-2"));
    }

    #[tokio::test]
    async fn alias_addresses_a_version() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/api/v2/secrets/s-1/versions/previous/secret_data");
            then.status(204);
        });
        client(&server)
            .delete_secret_version_data(
                &SecretVersionOptions::new("s-1", "previous"),
                &CallOptions::default(),
            )
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn listing_keeps_total_count() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/secrets/s-1/versions");
            then.status(200).json_body(json!({
                "versions": [
                    {"secret_type": "arbitrary", "id": "v-2"},
                    {"secret_type": "arbitrary", "id": "v-1"}
                ],
                "total_count": 2
            }));
        });
        let listing = client(&server)
            .list_secret_versions(
                &ListSecretVersionsOptions::new("s-1"),
                &CallOptions::default(),
            )
            .await
            .unwrap()
            .result;
        assert_eq!(listing.total_count, 2);
        assert_eq!(listing.versions[1].id(), Some("v-1"));
    }
}
