//! Secrets and their metadata.

use secrets_manager_sdk::SecretsManagerError;
use secrets_manager_sdk::codec;
use secrets_manager_sdk::models::{
    Secret, SecretAction, SecretActionPrototype, SecretMetadata, SecretMetadataPaginatedCollection,
    SecretMetadataPatch, SecretPrototype, SecretType,
};
use serde_json::{Map, Value};

use super::{SecretsManagerClient, require_patch};
use crate::operations;
use crate::pager::{OffsetPager, Page, PagedList};
use crate::pipeline::{Call, CallOptions, DetailedResponse};

#[derive(Debug, Clone)]
pub struct CreateSecretOptions {
    pub secret_prototype: SecretPrototype,
}

impl CreateSecretOptions {
    #[must_use]
    pub fn new(secret_prototype: SecretPrototype) -> Self {
        Self { secret_prototype }
    }
}

/// Filters of `GET /secrets`. List filters are sent comma-joined.
#[derive(Debug, Clone, Default)]
pub struct ListSecretsOptions {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    /// Field to sort by; prefix with `-` for descending.
    pub sort: Option<String>,
    pub search: Option<String>,
    /// Secret group ids.
    pub groups: Option<Vec<String>>,
    pub secret_types: Option<Vec<SecretType>>,
    /// Only secrets carrying every one of these labels.
    pub match_all_labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct GetSecretOptions {
    pub id: String,
}

impl GetSecretOptions {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Address a secret by group name, type and name instead of id.
#[derive(Debug, Clone)]
pub struct GetSecretByNameTypeOptions {
    pub secret_type: SecretType,
    pub name: String,
    pub secret_group_name: String,
}

impl GetSecretByNameTypeOptions {
    #[must_use]
    pub fn new(
        secret_type: SecretType,
        name: impl Into<String>,
        secret_group_name: impl Into<String>,
    ) -> Self {
        Self {
            secret_type,
            name: name.into(),
            secret_group_name: secret_group_name.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteSecretOptions {
    pub id: String,
}

impl DeleteSecretOptions {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetSecretMetadataOptions {
    pub id: String,
}

impl GetSecretMetadataOptions {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Merge-patch update of a secret's metadata.
///
/// `patch` is sent as is. Build it from a typed [`SecretMetadataPatch`] with
/// [`Self::from_patch`] to send only the fields that were set.
#[derive(Debug, Clone, Default)]
pub struct UpdateSecretMetadataOptions {
    pub id: String,
    pub patch: Map<String, Value>,
}

impl UpdateSecretMetadataOptions {
    #[must_use]
    pub fn new(id: impl Into<String>, patch: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }

    /// # Errors
    /// `Encode` when the patch does not serialize to an object.
    pub fn from_patch(
        id: impl Into<String>,
        patch: &SecretMetadataPatch,
    ) -> Result<Self, SecretsManagerError> {
        Ok(Self::new(id, codec::derive_patch(patch, &patch.empty_like())?))
    }
}

#[derive(Debug, Clone)]
pub struct CreateSecretActionOptions {
    pub id: String,
    pub action: SecretActionPrototype,
}

impl CreateSecretActionOptions {
    #[must_use]
    pub fn new(id: impl Into<String>, action: SecretActionPrototype) -> Self {
        Self {
            id: id.into(),
            action,
        }
    }
}

impl SecretsManagerClient {
    /// Create a secret of the prototype's type.
    ///
    /// # Errors
    /// `InvalidArgument` when the prototype misses a field its type
    /// requires; otherwise the pipeline errors.
    pub async fn create_secret(
        &self,
        options: &CreateSecretOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<Secret>, SecretsManagerError> {
        options.secret_prototype.validate()?;
        let call = Call::new(&operations::CREATE_SECRET)
            .body(codec::encode(&options.secret_prototype)?);
        self.pipeline.execute_variant(call, call_options).await
    }

    /// One page of secret metadata. Items of mixed types decode into their
    /// own variants.
    ///
    /// # Errors
    /// The pipeline errors, element errors carrying their index. `limit` is
    /// not range-checked here; a value outside 1..=200 comes back as the
    /// service's 400.
    pub async fn list_secrets(
        &self,
        options: &ListSecretsOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretMetadataPaginatedCollection>, SecretsManagerError> {
        let secret_types: Option<Vec<&str>> = options
            .secret_types
            .as_ref()
            .map(|types| types.iter().map(|t| t.as_str()).collect());
        let call = Call::new(&operations::LIST_SECRETS)
            .query("offset", options.offset)
            .query("limit", options.limit)
            .query("sort", options.sort.as_deref())
            .query("search", options.search.as_deref())
            .query_list("groups", options.groups.as_deref())
            .query_list("secret_types", secret_types.as_deref())
            .query_list("match_all_labels", options.match_all_labels.as_deref());
        let response = self
            .pipeline
            .execute_collection::<SecretMetadata>(call, call_options, "secrets")
            .await?;
        Ok(response.map(|(page, secrets)| SecretMetadataPaginatedCollection { page, secrets }))
    }

    /// Pager over [`Self::list_secrets`].
    #[must_use]
    pub fn secrets_pager(&self, options: ListSecretsOptions) -> OffsetPager<ListSecretsOptions> {
        OffsetPager::new(self.clone(), options)
    }

    /// A secret with its material.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn get_secret(
        &self,
        options: &GetSecretOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<Secret>, SecretsManagerError> {
        let call = Call::new(&operations::GET_SECRET).path("id", &options.id);
        self.pipeline.execute_variant(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank name or group name; otherwise the
    /// pipeline errors.
    pub async fn get_secret_by_name_type(
        &self,
        options: &GetSecretByNameTypeOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<Secret>, SecretsManagerError> {
        let call = Call::new(&operations::GET_SECRET_BY_NAME_TYPE)
            .path("secret_group_name", &options.secret_group_name)
            .path("secret_type", options.secret_type.as_str())
            .path("name", &options.name);
        self.pipeline.execute_variant(call, call_options).await
    }

    /// Delete a secret and all its versions. Locked secrets are refused by
    /// the service.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn delete_secret(
        &self,
        options: &DeleteSecretOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<()>, SecretsManagerError> {
        let call = Call::new(&operations::DELETE_SECRET).path("id", &options.id);
        self.pipeline.execute_empty(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn get_secret_metadata(
        &self,
        options: &GetSecretMetadataOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretMetadata>, SecretsManagerError> {
        let call = Call::new(&operations::GET_SECRET_METADATA).path("id", &options.id);
        self.pipeline.execute_variant(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank id or an empty patch; otherwise the
    /// pipeline errors.
    pub async fn update_secret_metadata(
        &self,
        options: &UpdateSecretMetadataOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretMetadata>, SecretsManagerError> {
        require_patch(&options.patch)?;
        let call = Call::new(&operations::UPDATE_SECRET_METADATA)
            .path("id", &options.id)
            .body(Value::Object(options.patch.clone()));
        self.pipeline.execute_variant(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn create_secret_action(
        &self,
        options: &CreateSecretActionOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretAction>, SecretsManagerError> {
        let call = Call::new(&operations::CREATE_SECRET_ACTION)
            .path("id", &options.id)
            .body(codec::encode(&options.action)?);
        self.pipeline.execute_variant(call, call_options).await
    }
}

impl PagedList for ListSecretsOptions {
    type Item = SecretMetadata;

    fn offset(&self) -> Option<u32> {
        self.offset
    }

    fn at_offset(&self, offset: Option<u32>) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }

    async fn fetch(
        &self,
        client: &SecretsManagerClient,
    ) -> Result<Page<SecretMetadata>, SecretsManagerError> {
        let response = client.list_secrets(self, &CallOptions::default()).await?;
        Ok(Page {
            info: response.result.page,
            items: response.result.secrets,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use secrets_http::{HttpClientBuilder, HttpClientConfig};
    use serde_json::json;

    fn client(server: &MockServer) -> SecretsManagerClient {
        let http = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap();
        SecretsManagerClient::new(http, &server.base_url()).unwrap()
    }

    #[tokio::test]
    async fn list_sends_filters() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/secrets")
                .query_param("limit", "5")
                .query_param("secret_types", "arbitrary,kv")
                .query_param("match_all_labels", "dev,us-south")
                .query_param("sort", "-created_at")
                .query_param_missing("offset");
            then.status(200).json_body(json!({
                "limit": 5, "offset": 0, "total_count": 2,
                "secrets": [
                    {"secret_type": "arbitrary", "id": "a"},
                    {"secret_type": "kv", "id": "b"}
                ]
            }));
        });

        let options = ListSecretsOptions {
            limit: Some(5),
            sort: Some("-created_at".into()),
            secret_types: Some(vec![SecretType::Arbitrary, SecretType::Kv]),
            match_all_labels: Some(vec!["dev".into(), "us-south".into()]),
            ..ListSecretsOptions::default()
        };
        let listing = client(&server)
            .list_secrets(&options, &CallOptions::default())
            .await
            .unwrap()
            .result;

        mock.assert();
        assert_eq!(listing.page.total_count, 2);
        assert_eq!(listing.secrets[1].secret_type(), SecretType::Kv);
    }

    #[tokio::test]
    async fn out_of_range_limit_is_left_to_the_service() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/secrets")
                .query_param("limit", "0");
            then.status(400).json_body(json!({
                "errors": [{"code": "bad_request", "message": "limit must be between 1 and 200"}],
                "status_code": 400,
                "trace": "7c1e"
            }));
        });
        let options = ListSecretsOptions {
            limit: Some(0),
            ..ListSecretsOptions::default()
        };
        let err = client(&server)
            .list_secrets(&options, &CallOptions::default())
            .await
            .unwrap_err();
        mock.assert();
        assert_eq!(err.status(), Some(400));
        assert!(matches!(err, SecretsManagerError::ServiceError(_)));
    }

    #[tokio::test]
    async fn invalid_prototype_is_not_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/v2/secrets");
            then.status(201);
        });
        let prototype = SecretPrototype::Arbitrary(
            secrets_manager_sdk::models::ArbitrarySecretPrototype::new("name", ""),
        );
        let err = client(&server)
            .create_secret(&CreateSecretOptions::new(prototype), &CallOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: payload must be provided");
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn by_name_type_path() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/secret_groups/default/secret_types/kv/secrets/app-config");
            then.status(200)
                .json_body(json!({"secret_type": "kv", "id": "k", "data": {"a": 1}}));
        });
        let secret = client(&server)
            .get_secret_by_name_type(
                &GetSecretByNameTypeOptions::new(SecretType::Kv, "app-config", "default"),
                &CallOptions::default(),
            )
            .await
            .unwrap()
            .result;
        mock.assert();
        assert_eq!(secret.id(), Some("k"));
    }

    #[tokio::test]
    async fn empty_patch_is_rejected() {
        let server = MockServer::start();
        let err = client(&server)
            .update_secret_metadata(
                &UpdateSecretMetadataOptions::new("id", Map::new()),
                &CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: patch must be provided");
    }
}
