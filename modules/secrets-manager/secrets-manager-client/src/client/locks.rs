//! Secret locks.
//!
//! Locks keep a version from being deleted or rotated away. Bulk creation
//! takes a [`SecretLocksPrototype`] whose `mode` decides what happens to
//! locks of the same name on other versions; bulk deletion takes the lock
//! names in the `name` query parameter.

use secrets_manager_sdk::SecretsManagerError;
use secrets_manager_sdk::models::{
    SecretLock, SecretLockPaginatedCollection, SecretLocks, SecretLocksPrototype,
    SecretsLocksPaginatedCollection,
};

use super::{SecretsManagerClient, to_body};
use crate::operations;
use crate::pager::{OffsetPager, Page, PagedList};
use crate::pipeline::{Call, CallOptions, DetailedResponse};

/// Filters of `GET /secrets_locks`.
#[derive(Debug, Clone, Default)]
pub struct ListSecretsLocksOptions {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    /// Secret group ids.
    pub groups: Option<Vec<String>>,
}

/// Locks of one secret.
#[derive(Debug, Clone, Default)]
pub struct ListSecretLocksOptions {
    pub id: String,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

impl ListSecretLocksOptions {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Locks of one version.
#[derive(Debug, Clone, Default)]
pub struct ListSecretVersionLocksOptions {
    pub secret_id: String,
    pub id: String,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

impl ListSecretVersionLocksOptions {
    #[must_use]
    pub fn new(secret_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Lock the current version of a secret.
#[derive(Debug, Clone, Default)]
pub struct CreateSecretLocksBulkOptions {
    pub id: String,
    pub locks: SecretLocksPrototype,
}

impl CreateSecretLocksBulkOptions {
    #[must_use]
    pub fn new(id: impl Into<String>, locks: SecretLocksPrototype) -> Self {
        Self {
            id: id.into(),
            locks,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateSecretVersionLocksBulkOptions {
    pub secret_id: String,
    pub id: String,
    pub locks: SecretLocksPrototype,
}

impl CreateSecretVersionLocksBulkOptions {
    #[must_use]
    pub fn new(
        secret_id: impl Into<String>,
        id: impl Into<String>,
        locks: SecretLocksPrototype,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            id: id.into(),
            locks,
        }
    }
}

/// Remove locks by name. Without names every lock of the secret goes.
#[derive(Debug, Clone, Default)]
pub struct DeleteSecretLocksBulkOptions {
    pub id: String,
    pub name: Option<Vec<String>>,
}

impl DeleteSecretLocksBulkOptions {
    #[must_use]
    pub fn new(id: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(names),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteSecretVersionLocksBulkOptions {
    pub secret_id: String,
    pub id: String,
    pub name: Option<Vec<String>>,
}

impl DeleteSecretVersionLocksBulkOptions {
    #[must_use]
    pub fn new(secret_id: impl Into<String>, id: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            id: id.into(),
            name: Some(names),
        }
    }
}

fn check_names(names: Option<&[String]>) -> Result<(), SecretsManagerError> {
    if names.is_some_and(|names| names.iter().any(|n| n.trim().is_empty())) {
        return Err(SecretsManagerError::missing_field("name"));
    }
    Ok(())
}

impl SecretsManagerClient {
    /// One page of the locks of every secret, grouped by secret.
    ///
    /// # Errors
    /// The pipeline errors.
    pub async fn list_secrets_locks(
        &self,
        options: &ListSecretsLocksOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretsLocksPaginatedCollection>, SecretsManagerError> {
        let call = Call::new(&operations::LIST_SECRETS_LOCKS)
            .query("offset", options.offset)
            .query("limit", options.limit)
            .query("search", options.search.as_deref())
            .query_list("groups", options.groups.as_deref());
        self.pipeline.execute_json(call, call_options).await
    }

    #[must_use]
    pub fn secrets_locks_pager(
        &self,
        options: ListSecretsLocksOptions,
    ) -> OffsetPager<ListSecretsLocksOptions> {
        OffsetPager::new(self.clone(), options)
    }

    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn list_secret_locks(
        &self,
        options: &ListSecretLocksOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretLockPaginatedCollection>, SecretsManagerError> {
        let call = Call::new(&operations::LIST_SECRET_LOCKS)
            .path("id", &options.id)
            .query("offset", options.offset)
            .query("limit", options.limit)
            .query("sort", options.sort.as_deref())
            .query("search", options.search.as_deref());
        self.pipeline.execute_json(call, call_options).await
    }

    #[must_use]
    pub fn secret_locks_pager(
        &self,
        options: ListSecretLocksOptions,
    ) -> OffsetPager<ListSecretLocksOptions> {
        OffsetPager::new(self.clone(), options)
    }

    /// # Errors
    /// `InvalidArgument` for a blank id; otherwise the pipeline errors.
    pub async fn list_secret_version_locks(
        &self,
        options: &ListSecretVersionLocksOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretLockPaginatedCollection>, SecretsManagerError> {
        let call = Call::new(&operations::LIST_SECRET_VERSION_LOCKS)
            .path("secret_id", &options.secret_id)
            .path("id", &options.id)
            .query("offset", options.offset)
            .query("limit", options.limit)
            .query("sort", options.sort.as_deref())
            .query("search", options.search.as_deref());
        self.pipeline.execute_json(call, call_options).await
    }

    #[must_use]
    pub fn secret_version_locks_pager(
        &self,
        options: ListSecretVersionLocksOptions,
    ) -> OffsetPager<ListSecretVersionLocksOptions> {
        OffsetPager::new(self.clone(), options)
    }

    /// Lock the current version of a secret.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty, blank or duplicated lock list;
    /// `Conflict` when `exclusive` meets a taken name; otherwise the
    /// pipeline errors.
    pub async fn create_secret_locks_bulk(
        &self,
        options: &CreateSecretLocksBulkOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretLocks>, SecretsManagerError> {
        options.locks.validate()?;
        let call = Call::new(&operations::CREATE_SECRET_LOCKS_BULK)
            .path("id", &options.id)
            .body(to_body(&options.locks, "SecretLocksPrototype")?);
        self.pipeline.execute_json(call, call_options).await
    }

    /// # Errors
    /// As [`Self::create_secret_locks_bulk`].
    pub async fn create_secret_version_locks_bulk(
        &self,
        options: &CreateSecretVersionLocksBulkOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretLocks>, SecretsManagerError> {
        options.locks.validate()?;
        let call = Call::new(&operations::CREATE_SECRET_VERSION_LOCKS_BULK)
            .path("secret_id", &options.secret_id)
            .path("id", &options.id)
            .body(to_body(&options.locks, "SecretLocksPrototype")?);
        self.pipeline.execute_json(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank id or lock name; otherwise the pipeline
    /// errors.
    pub async fn delete_secret_locks_bulk(
        &self,
        options: &DeleteSecretLocksBulkOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretLocks>, SecretsManagerError> {
        check_names(options.name.as_deref())?;
        let call = Call::new(&operations::DELETE_SECRET_LOCKS_BULK)
            .path("id", &options.id)
            .query_list("name", options.name.as_deref());
        self.pipeline.execute_json(call, call_options).await
    }

    /// # Errors
    /// As [`Self::delete_secret_locks_bulk`].
    pub async fn delete_secret_version_locks_bulk(
        &self,
        options: &DeleteSecretVersionLocksBulkOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<SecretLocks>, SecretsManagerError> {
        check_names(options.name.as_deref())?;
        let call = Call::new(&operations::DELETE_SECRET_VERSION_LOCKS_BULK)
            .path("secret_id", &options.secret_id)
            .path("id", &options.id)
            .query_list("name", options.name.as_deref());
        self.pipeline.execute_json(call, call_options).await
    }
}

impl PagedList for ListSecretsLocksOptions {
    type Item = SecretLocks;

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
    ) -> Result<Page<SecretLocks>, SecretsManagerError> {
        let collection = client
            .list_secrets_locks(self, &CallOptions::default())
            .await?
            .result;
        Ok(Page {
            info: collection.page,
            items: collection.secrets_locks,
        })
    }
}

impl PagedList for ListSecretLocksOptions {
    type Item = SecretLock;

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
    ) -> Result<Page<SecretLock>, SecretsManagerError> {
        let collection = client
            .list_secret_locks(self, &CallOptions::default())
            .await?
            .result;
        Ok(Page {
            info: collection.page,
            items: collection.locks,
        })
    }
}

impl PagedList for ListSecretVersionLocksOptions {
    type Item = SecretLock;

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
    ) -> Result<Page<SecretLock>, SecretsManagerError> {
        let collection = client
            .list_secret_version_locks(self, &CallOptions::default())
            .await?
            .result;
        Ok(Page {
            info: collection.page,
            items: collection.locks,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use secrets_http::{HttpClientBuilder, HttpClientConfig};
    use secrets_manager_sdk::models::{LockMode, SecretLockPrototype};
    use serde_json::json;

    fn client(server: &MockServer) -> SecretsManagerClient {
        let http = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap();
        SecretsManagerClient::new(http, &server.base_url()).unwrap()
    }

    #[tokio::test]
    async fn bulk_create_sends_mode_in_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/secrets/s-1/locks_bulk")
                .json_body(json!({
                    "locks": [{"name": "lock-example"}],
                    "mode": "exclusive"
                }));
            then.status(201).json_body(json!({
                "secret_id": "s-1",
                "versions": [{"version_id": "v-1", "version_alias": "current", "locks": ["lock-example"]}]
            }));
        });

        let locks = SecretLocksPrototype {
            locks: vec![SecretLockPrototype::new("lock-example")],
            mode: Some(LockMode::Exclusive),
        };
        let response = client(&server)
            .create_secret_locks_bulk(
                &CreateSecretLocksBulkOptions::new("s-1", locks),
                &CallOptions::default(),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(
            response.result.lock_names().collect::<Vec<_>>(),
            vec!["lock-example"]
        );
    }

    #[tokio::test]
    async fn bulk_delete_joins_names() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/api/v2/secrets/s-1/versions/current/locks_bulk")
                .query_param("name", "a,b");
            then.status(200).json_body(json!({"secret_id": "s-1", "versions": []}));
        });
        client(&server)
            .delete_secret_version_locks_bulk(
                &DeleteSecretVersionLocksBulkOptions::new(
                    "s-1",
                    "current",
                    vec!["a".into(), "b".into()],
                ),
                &CallOptions::default(),
            )
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn duplicate_lock_names_are_not_sent() {
        let server = MockServer::start();
        let locks = SecretLocksPrototype {
            locks: vec![SecretLockPrototype::new("x"), SecretLockPrototype::new("x")],
            mode: None,
        };
        let err = client(&server)
            .create_secret_locks_bulk(
                &CreateSecretLocksBulkOptions::new("s-1", locks),
                &CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SecretsManagerError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn secret_locks_pager_walks_pages() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/secrets/s-1/locks")
                .query_param_missing("offset");
            then.status(200).json_body(json!({
                "limit": 1, "offset": 0, "total_count": 2,
                "next": {"href": "/api/v2/secrets/s-1/locks?limit=1&offset=1"},
                "locks": [{"name": "a"}]
            }));
        });
        let second = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/secrets/s-1/locks")
                .query_param("offset", "1");
            then.status(200).json_body(json!({
                "limit": 1, "offset": 1, "total_count": 2,
                "locks": [{"name": "b"}]
            }));
        });

        let options = ListSecretLocksOptions {
            limit: Some(1),
            ..ListSecretLocksOptions::new("s-1")
        };
        let names: Vec<String> = client(&server)
            .secret_locks_pager(options)
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|lock| lock.name)
            .collect();

        first.assert();
        second.assert();
        assert_eq!(names, vec!["a", "b"]);
    }
}
