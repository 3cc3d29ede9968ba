//! Secret groups.

use secrets_manager_sdk::SecretsManagerError;
use secrets_manager_sdk::codec;
use secrets_manager_sdk::models::{
    SecretGroup, SecretGroupCollection, SecretGroupPatch, SecretGroupPrototype,
};
use serde_json::{Map, Value};

use super::{SecretsManagerClient, require_patch, to_body};
use crate::operations;
use crate::pipeline::{Call, CallOptions, DetailedResponse};

#[derive(Debug, Clone, Default)]
pub struct CreateSecretGroupOptions {
    pub secret_group: SecretGroupPrototype,
}

impl CreateSecretGroupOptions {
    #[must_use]
    pub fn new(secret_group: SecretGroupPrototype) -> Self {
        Self { secret_group }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetSecretGroupOptions {
    pub id: String,
}

impl GetSecretGroupOptions {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Merge-patch update of a group.
#[derive(Debug, Clone, Default)]
pub struct UpdateSecretGroupOptions {
    pub id: String,
    pub patch: Map<String, Value>,
}

impl UpdateSecretGroupOptions {
    #[must_use]
    pub fn new(id: impl Into<String>, patch: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }

    /// Options carrying only the fields `patch` sets.
    ///
    /// # Errors
    /// `Encode` when the patch does not serialize to an object.
    pub fn from_patch(
        id: impl Into<String>,
        patch: &SecretGroupPatch,
    ) -> Result<Self, SecretsManagerError> {
        Ok(Self::new(
            id,
            codec::derive_patch(patch, &SecretGroupPatch::default())?,
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteSecretGroupOptions {
    pub id: String,
}

impl DeleteSecretGroupOptions {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl SecretsManagerClient {
    /// # Errors
    /// `InvalidArgument` for a blank name; otherwise the pipeline errors.
    pub async fn create_secret_group(
        &self,
        options: &CreateSecretGroupOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretGroup>, SecretsManagerError> {
        if options.secret_group.name.trim().is_empty() {
            return Err(SecretsManagerError::missing_field("name"));
        }
        let call = Call::new(&operations::CREATE_SECRET_GROUP)
            .body(to_body(&options.secret_group, "SecretGroupPrototype")?);
        self.pipeline.execute_json(call, call_options).await
    }

    /// Every group of the instance. The listing is not paginated.
    ///
    /// # Errors
    /// The pipeline errors.
    pub async fn list_secret_groups(
        &self,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretGroupCollection>, SecretsManagerError> {
        let call = Call::new(&operations::LIST_SECRET_GROUPS);
        self.pipeline.execute_json(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn get_secret_group(
        &self,
        options: &GetSecretGroupOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretGroup>, SecretsManagerError> {
        let call = Call::new(&operations::GET_SECRET_GROUP).path("id", &options.id);
        self.pipeline.execute_json(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank id or an empty patch; otherwise the
    /// pipeline errors.
    pub async fn update_secret_group(
        &self,
        options: &UpdateSecretGroupOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretGroup>, SecretsManagerError> {
        require_patch(&options.patch)?;
        let call = Call::new(&operations::UPDATE_SECRET_GROUP)
            .path("id", &options.id)
            .body(Value::Object(options.patch.clone()));
        self.pipeline.execute_json(call, call_options).await
    }

    /// Delete an empty group. A group that still holds secrets is refused by
    /// the service.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn delete_secret_group(
        &self,
        options: &DeleteSecretGroupOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<()>, SecretsManagerError> {
        let call = Call::new(&operations::DELETE_SECRET_GROUP).path("id", &options.id);
        self.pipeline.execute_empty(call, call_options).await
    }
}
