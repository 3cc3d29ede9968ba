//! Secrets engine configurations.
//!
//! Configurations are addressed by name. The by-name endpoints take the
//! variant in the `X-Sm-Accept-Configuration-Type` header; set `config_type`
//! on the options to send it.

use secrets_manager_sdk::codec;
use secrets_manager_sdk::models::{
    ConfigType, Configuration, ConfigurationAction, ConfigurationActionPrototype,
    ConfigurationMetadata, ConfigurationMetadataPaginatedCollection, ConfigurationPatch,
    ConfigurationPrototype, SignIntermediatePrototype,
};
use secrets_manager_sdk::{SecretsManagerError, pki};
use serde_json::{Map, Value};

use super::{SecretsManagerClient, require_patch};
use crate::operations;
use crate::pager::{OffsetPager, Page, PagedList};
use crate::pipeline::{CONFIGURATION_TYPE_HEADER, Call, CallOptions, DetailedResponse};

#[derive(Debug, Clone)]
pub struct CreateConfigurationOptions {
    pub configuration_prototype: ConfigurationPrototype,
}

impl CreateConfigurationOptions {
    #[must_use]
    pub fn new(configuration_prototype: ConfigurationPrototype) -> Self {
        Self {
            configuration_prototype,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListConfigurationsOptions {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

/// One configuration, by name.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationOptions {
    pub name: String,
    pub config_type: Option<ConfigType>,
}

impl ConfigurationOptions {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_type: None,
        }
    }

    #[must_use]
    pub fn with_config_type(mut self, config_type: ConfigType) -> Self {
        self.config_type = Some(config_type);
        self
    }
}

pub type GetConfigurationOptions = ConfigurationOptions;
pub type DeleteConfigurationOptions = ConfigurationOptions;

#[derive(Debug, Clone, Default)]
pub struct UpdateConfigurationOptions {
    pub name: String,
    pub config_type: Option<ConfigType>,
    pub patch: Map<String, Value>,
}

impl UpdateConfigurationOptions {
    #[must_use]
    pub fn new(name: impl Into<String>, patch: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            config_type: None,
            patch,
        }
    }

    /// Options carrying only the fields `patch` sets, with the type hint
    /// taken from the patch variant.
    ///
    /// # Errors
    /// `Encode` when the patch does not serialize to an object.
    pub fn from_patch(
        name: impl Into<String>,
        patch: &ConfigurationPatch,
    ) -> Result<Self, SecretsManagerError> {
        Ok(Self {
            name: name.into(),
            config_type: Some(patch.config_type()),
            patch: codec::derive_patch(patch, &patch.empty_like())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateConfigurationActionOptions {
    pub name: String,
    pub config_type: Option<ConfigType>,
    pub action: ConfigurationActionPrototype,
}

impl CreateConfigurationActionOptions {
    #[must_use]
    pub fn new(name: impl Into<String>, action: ConfigurationActionPrototype) -> Self {
        Self {
            name: name.into(),
            config_type: None,
            action,
        }
    }

    #[must_use]
    pub fn with_config_type(mut self, config_type: ConfigType) -> Self {
        self.config_type = Some(config_type);
        self
    }
}

fn hint(config_type: Option<ConfigType>) -> Option<&'static str> {
    config_type.map(ConfigType::as_str)
}

impl SecretsManagerClient {
    /// # Errors
    /// `InvalidArgument` when the prototype misses a field its type
    /// requires; otherwise the pipeline errors.
    pub async fn create_configuration(
        &self,
        options: &CreateConfigurationOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<Configuration>, SecretsManagerError> {
        options.configuration_prototype.validate()?;
        let call = Call::new(&operations::CREATE_CONFIGURATION)
            .body(codec::encode(&options.configuration_prototype)?);
        self.pipeline.execute_variant(call, call_options).await
    }

    /// One page of configuration metadata, of mixed types.
    ///
    /// # Errors
    /// The pipeline errors. `limit` is sent as given; the service rejects
    /// values outside 1..=200.
    pub async fn list_configurations(
        &self,
        options: &ListConfigurationsOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<ConfigurationMetadataPaginatedCollection>, SecretsManagerError>
    {
        let call = Call::new(&operations::LIST_CONFIGURATIONS)
            .query("offset", options.offset)
            .query("limit", options.limit)
            .query("sort", options.sort.as_deref())
            .query("search", options.search.as_deref());
        let response = self
            .pipeline
            .execute_collection::<ConfigurationMetadata>(call, call_options, "configurations")
            .await?;
        Ok(response.map(|(page, configurations)| {
            ConfigurationMetadataPaginatedCollection {
                page,
                configurations,
            }
        }))
    }

    #[must_use]
    pub fn configurations_pager(
        &self,
        options: ListConfigurationsOptions,
    ) -> OffsetPager<ListConfigurationsOptions> {
        OffsetPager::new(self.clone(), options)
    }

    /// # Errors
    /// `InvalidArgument` for a blank name; otherwise the pipeline errors.
    pub async fn get_configuration(
        &self,
        options: &GetConfigurationOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<Configuration>, SecretsManagerError> {
        let call = Call::new(&operations::GET_CONFIGURATION)
            .path("name", &options.name)
            .header(CONFIGURATION_TYPE_HEADER, hint(options.config_type));
        self.pipeline.execute_variant(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank name or an empty patch; otherwise the
    /// pipeline errors.
    pub async fn update_configuration(
        &self,
        options: &UpdateConfigurationOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<Configuration>, SecretsManagerError> {
        require_patch(&options.patch)?;
        let call = Call::new(&operations::UPDATE_CONFIGURATION)
            .path("name", &options.name)
            .header(CONFIGURATION_TYPE_HEADER, hint(options.config_type))
            .body(Value::Object(options.patch.clone()));
        self.pipeline.execute_variant(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank name; otherwise the pipeline errors.
    pub async fn delete_configuration(
        &self,
        options: &DeleteConfigurationOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<()>, SecretsManagerError> {
        let call = Call::new(&operations::DELETE_CONFIGURATION)
            .path("name", &options.name)
            .header(CONFIGURATION_TYPE_HEADER, hint(options.config_type));
        self.pipeline.execute_empty(call, call_options).await
    }

    /// # Errors
    /// `InvalidArgument` for a blank name or an action missing its input;
    /// otherwise the pipeline errors.
    pub async fn create_configuration_action(
        &self,
        options: &CreateConfigurationActionOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<ConfigurationAction>, SecretsManagerError> {
        options.action.validate()?;
        let call = Call::new(&operations::CREATE_CONFIGURATION_ACTION)
            .path("name", &options.name)
            .header(CONFIGURATION_TYPE_HEADER, hint(options.config_type))
            .body(codec::encode(&options.action)?);
        self.pipeline.execute_variant(call, call_options).await
    }

    /// Have the root CA `root` sign the intermediate CA `intermediate`.
    ///
    /// Both CAs are read first. Signing is refused locally when the
    /// intermediate is not awaiting a signature or the root cannot issue.
    ///
    /// # Errors
    /// `InvalidArgument` when either name does not resolve to a CA of the
    /// expected level, `PreconditionFailed` from the signing checks,
    /// otherwise the pipeline errors.
    pub async fn sign_intermediate_ca(
        &self,
        root: &str,
        intermediate: &str,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<ConfigurationAction>, SecretsManagerError> {
        let root_config = self
            .get_configuration(
                &ConfigurationOptions::new(root)
                    .with_config_type(ConfigType::PrivateCertConfigurationRootCa),
                call_options,
            )
            .await?
            .result;
        let intermediate_config = self
            .get_configuration(
                &ConfigurationOptions::new(intermediate)
                    .with_config_type(ConfigType::PrivateCertConfigurationIntermediateCa),
                call_options,
            )
            .await?
            .result;

        let Configuration::PrivateCertConfigurationRootCa(root_ca) = &root_config else {
            return Err(SecretsManagerError::invalid_argument(format!(
                "'{root}' is a {}, not a root CA",
                root_config.config_type()
            )));
        };
        let Configuration::PrivateCertConfigurationIntermediateCa(intermediate_ca) =
            &intermediate_config
        else {
            return Err(SecretsManagerError::invalid_argument(format!(
                "'{intermediate}' is a {}, not an intermediate CA",
                intermediate_config.config_type()
            )));
        };
        pki::check_sign_intermediate(&intermediate_ca.metadata, Some(&root_ca.metadata))?;

        tracing::debug!(root, intermediate, "signing intermediate CA");
        let action = CreateConfigurationActionOptions::new(
            root,
            ConfigurationActionPrototype::SignIntermediate(SignIntermediatePrototype::new(
                intermediate,
            )),
        )
        .with_config_type(ConfigType::PrivateCertConfigurationRootCa);
        self.create_configuration_action(&action, call_options).await
    }
}

impl PagedList for ListConfigurationsOptions {
    type Item = ConfigurationMetadata;

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
    ) -> Result<Page<ConfigurationMetadata>, SecretsManagerError> {
        let collection = client
            .list_configurations(self, &CallOptions::default())
            .await?
            .result;
        Ok(Page {
            info: collection.page,
            items: collection.configurations,
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

    fn ca(server: &MockServer, name: &str, config_type: &str, status: &str) {
        let body = json!({
            "config_type": config_type,
            "name": name,
            "common_name": "example.com",
            "status": status
        });
        let path = format!("/api/v2/configurations/{name}");
        server.mock(move |when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(body);
        });
    }

    #[tokio::test]
    async fn sends_type_hint_when_set() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/api/v2/configurations/my-template")
                .header(CONFIGURATION_TYPE_HEADER, "private_cert_configuration_template");
            then.status(204);
        });
        client(&server)
            .delete_configuration(
                &ConfigurationOptions::new("my-template")
                    .with_config_type(ConfigType::PrivateCertConfigurationTemplate),
                &CallOptions::default(),
            )
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn signed_intermediate_is_refused_before_dispatch() {
        let server = MockServer::start();
        ca(&server, "root", "private_cert_configuration_root_ca", "configured");
        ca(
            &server,
            "intermediate",
            "private_cert_configuration_intermediate_ca",
            "configured",
        );
        let action = server.mock(|when, then| {
            when.method(POST).path("/api/v2/configurations/root/actions");
            then.status(201);
        });

        let err = client(&server)
            .sign_intermediate_ca("root", "intermediate", &CallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SecretsManagerError::PreconditionFailed { .. }));
        action.assert_calls(0);
    }

    #[tokio::test]
    async fn signs_pending_intermediate() {
        let server = MockServer::start();
        ca(&server, "root", "private_cert_configuration_root_ca", "configured");
        ca(
            &server,
            "intermediate",
            "private_cert_configuration_intermediate_ca",
            "signing_required",
        );
        let action = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/configurations/root/actions")
                .header(CONFIGURATION_TYPE_HEADER, "private_cert_configuration_root_ca")
                .json_body(json!({
                    "action_type": "private_cert_configuration_action_sign_intermediate",
                    "intermediate_certificate_authority": "intermediate"
                }));
            then.status(201).json_body(json!({
                "action_type": "private_cert_configuration_action_sign_intermediate",
                "intermediate_certificate_authority": "intermediate"
            }));
        });

        let response = client(&server)
            .sign_intermediate_ca("root", "intermediate", &CallOptions::default())
            .await
            .unwrap();

        action.assert();
        assert!(matches!(
            response.result,
            ConfigurationAction::SignIntermediate(ref r)
                if r.intermediate_certificate_authority.as_deref() == Some("intermediate")
        ));
    }

    #[tokio::test]
    async fn root_name_must_be_a_root_ca() {
        let server = MockServer::start();
        ca(&server, "root", "private_cert_configuration_intermediate_ca", "configured");
        ca(
            &server,
            "intermediate",
            "private_cert_configuration_intermediate_ca",
            "signing_required",
        );
        let err = client(&server)
            .sign_intermediate_ca("root", "intermediate", &CallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SecretsManagerError::InvalidArgument(_)));
    }
}
