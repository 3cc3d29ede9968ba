//! End-to-end flows against a mock Secrets Manager instance.

mod common;

use futures_util::TryStreamExt;
use httpmock::prelude::*;
use secrets_manager_client::configurations::{
    ConfigurationOptions, CreateConfigurationOptions, ListConfigurationsOptions,
};
use secrets_manager_client::locks::CreateSecretLocksBulkOptions;
use secrets_manager_client::secrets::{
    CreateSecretOptions, GetSecretOptions, ListSecretsOptions, UpdateSecretMetadataOptions,
};
use secrets_manager_client::{CONFIGURATION_TYPE_HEADER, CallOptions, SecretsManagerError};
use secrets_manager_sdk::models::{
    ArbitrarySecretMetadataPatch, ArbitrarySecretPrototype, CommonMetadataPatch, ConfigType,
    Configuration, ConfigurationPrototype, IntermediateCaPrototype, LockMode,
    PrivateCertificatePrototype, RootCaPrototype, Secret, SecretLockPrototype,
    SecretLocksPrototype, SecretMetadataPatch, SecretPrototype, SecretPrototypeCommon,
    SecretType, TemplatePrototype,
};
use serde_json::json;

const SECRET_ID: &str = "b49ad24d-81d4-5ebc-b9b9-b0937d1c84d5";

#[tokio::test]
async fn create_then_get_arbitrary_secret() {
    common::init_tracing();
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v2/secrets")
            .header("content-type", "application/json")
            .json_body(json!({
                "secret_type": "arbitrary",
                "name": "example-arbitrary-secret",
                "payload": "secret-data"
            }));
        then.status(201).json_body(json!({
            "secret_type": "arbitrary",
            "id": SECRET_ID,
            "name": "example-arbitrary-secret",
            "state": 1,
            "state_description": "active",
            "payload": "secret-data"
        }));
    });
    let get = server.mock(|when, then| {
        when.method(GET).path(format!("/api/v2/secrets/{SECRET_ID}"));
        then.status(200).json_body(json!({
            "secret_type": "arbitrary",
            "id": SECRET_ID,
            "name": "example-arbitrary-secret",
            "state": 1,
            "payload": "secret-data",
            "added_by_a_newer_service": {"ignored": true}
        }));
    });

    let client = common::client(&server);
    let created = client
        .create_secret(
            &CreateSecretOptions::new(SecretPrototype::Arbitrary(ArbitrarySecretPrototype::new(
                "example-arbitrary-secret",
                "secret-data",
            ))),
            &CallOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(created.status.as_u16(), 201);
    let id = created.result.id().unwrap().to_owned();

    let fetched = client
        .get_secret(&GetSecretOptions::new(id), &CallOptions::default())
        .await
        .unwrap()
        .result;

    create.assert();
    get.assert();
    assert_eq!(fetched.secret_type(), SecretType::Arbitrary);
    match fetched {
        Secret::Arbitrary(secret) => {
            assert_eq!(secret.data.payload.as_deref(), Some("secret-data"));
        }
        other => panic!("expected an arbitrary secret, got {}", other.secret_type()),
    }
}

#[tokio::test]
async fn metadata_patch_sends_only_set_fields() {
    let server = MockServer::start();
    let patch = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("/api/v2/secrets/{SECRET_ID}/metadata"))
            .header("content-type", "application/merge-patch+json")
            .json_body(json!({
                "name": "renamed-secret",
                "description": "Extended description for this secret.",
                "labels": ["dev", "us-south"]
            }));
        then.status(200).json_body(json!({
            "secret_type": "arbitrary",
            "id": SECRET_ID,
            "name": "renamed-secret",
            "labels": ["dev", "us-south"]
        }));
    });

    let typed = SecretMetadataPatch::Arbitrary(ArbitrarySecretMetadataPatch {
        common: CommonMetadataPatch {
            name: Some("renamed-secret".into()),
            description: Some(Some("Extended description for this secret.".into())),
            labels: Some(vec!["dev".into(), "us-south".into()]),
            custom_metadata: None,
        },
        ..ArbitrarySecretMetadataPatch::default()
    });
    let options = UpdateSecretMetadataOptions::from_patch(SECRET_ID, &typed).unwrap();
    assert_eq!(options.patch.len(), 3);

    let updated = common::client(&server)
        .update_secret_metadata(&options, &CallOptions::default())
        .await
        .unwrap()
        .result;

    patch.assert();
    assert_eq!(updated.name(), Some("renamed-secret"));
}

/// Three secrets served one per page and all at once.
fn mock_listing(server: &MockServer) {
    let items = [
        json!({"secret_type": "arbitrary", "id": "s-0", "name": "a"}),
        json!({"secret_type": "kv", "id": "s-1", "name": "b"}),
        json!({"secret_type": "username_password", "id": "s-2", "name": "c", "username": "u"}),
    ];
    for (offset, item) in items.iter().enumerate() {
        let mut body = json!({
            "limit": 1,
            "offset": offset,
            "total_count": 3,
            "first": {"href": format!("{}/api/v2/secrets?limit=1", server.base_url())},
            "secrets": [item]
        });
        if offset + 1 < items.len() {
            body["next"] = json!({
                "href": format!("{}/api/v2/secrets?limit=1&offset={}", server.base_url(), offset + 1)
            });
        }
        server.mock(|when, then| {
            let when = when
                .method(GET)
                .path("/api/v2/secrets")
                .query_param("limit", "1");
            if offset == 0 {
                when.query_param_missing("offset");
            } else {
                when.query_param("offset", offset.to_string());
            }
            then.status(200).json_body(body);
        });
    }
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/secrets")
            .query_param("limit", "200");
        then.status(200).json_body(json!({
            "limit": 200,
            "offset": 0,
            "total_count": 3,
            "secrets": items
        }));
    });
}

#[tokio::test]
async fn page_size_does_not_change_the_listing() {
    let server = MockServer::start();
    mock_listing(&server);
    let client = common::client(&server);

    let mut one_by_one = client.secrets_pager(ListSecretsOptions {
        limit: Some(1),
        ..ListSecretsOptions::default()
    });
    let mut pages = 0;
    let mut small = Vec::new();
    while one_by_one.has_next() {
        small.extend(one_by_one.get_next().await.unwrap());
        pages += 1;
    }
    assert_eq!(pages, 3);
    assert!(one_by_one.get_next().await.unwrap().is_empty());

    let large = client
        .secrets_pager(ListSecretsOptions {
            limit: Some(200),
            ..ListSecretsOptions::default()
        })
        .get_all()
        .await
        .unwrap();

    assert_eq!(small, large);
    assert_eq!(
        small.iter().map(|s| s.secret_type()).collect::<Vec<_>>(),
        vec![SecretType::Arbitrary, SecretType::Kv, SecretType::UsernamePassword]
    );
}

#[tokio::test]
async fn pager_stream_yields_every_item() {
    let server = MockServer::start();
    mock_listing(&server);

    let ids: Vec<String> = common::client(&server)
        .secrets_pager(ListSecretsOptions {
            limit: Some(1),
            ..ListSecretsOptions::default()
        })
        .into_stream()
        .map_ok(|secret| secret.id().unwrap_or_default().to_owned())
        .try_collect()
        .await
        .unwrap();

    assert_eq!(ids, vec!["s-0", "s-1", "s-2"]);
}

#[tokio::test]
async fn failed_page_is_retried_at_the_same_offset() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/secrets")
            .query_param_missing("offset");
        then.status(200).json_body(json!({
            "limit": 1, "offset": 0, "total_count": 2,
            "next": {"href": "/api/v2/secrets?limit=1&offset=1"},
            "secrets": [{"secret_type": "arbitrary", "id": "s-0"}]
        }));
    });
    let mut failing = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/secrets")
            .query_param("offset", "1");
        then.status(404).json_body(json!({
            "errors": [{"code": "not_found", "message": "gone"}],
            "status_code": 404,
            "trace": "t-1"
        }));
    });

    let client = common::client(&server);
    let mut pager = client.secrets_pager(ListSecretsOptions {
        limit: Some(1),
        ..ListSecretsOptions::default()
    });
    assert_eq!(pager.get_next().await.unwrap().len(), 1);
    let err = pager.get_next().await.unwrap_err();
    assert!(matches!(err, SecretsManagerError::NotFound(_)));
    assert!(pager.has_next());
    assert_eq!(pager.next_offset(), Some(1));

    failing.delete();
    let recovered = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/secrets")
            .query_param("offset", "1");
        then.status(200).json_body(json!({
            "limit": 1, "offset": 1, "total_count": 2,
            "secrets": [{"secret_type": "kv", "id": "s-1"}]
        }));
    });
    let last = pager.get_next().await.unwrap();
    recovered.assert();
    assert_eq!(last[0].id(), Some("s-1"));
    assert!(!pager.has_next());
}

fn created<'a>(
    server: &'a MockServer,
    config_type: &str,
    name: &str,
    status: &str,
) -> httpmock::Mock<'a> {
    let body = json!({
        "config_type": config_type,
        "name": name,
        "secret_type": "private_cert",
        "status": status
    });
    let config_type = config_type.to_owned();
    let name = name.to_owned();
    server.mock(move |when, then| {
        when.method(POST)
            .path("/api/v2/configurations")
            .body_includes(format!(r#""config_type":"{config_type}""#))
            .body_includes(format!(r#""name":"{name}""#));
        then.status(201).json_body(body);
    })
}

#[tokio::test]
async fn private_ca_workflow() {
    let server = MockServer::start();
    let root_created = created(
        &server,
        "private_cert_configuration_root_ca",
        "example-root-ca",
        "configured",
    );
    let intermediate_created = created(
        &server,
        "private_cert_configuration_intermediate_ca",
        "example-intermediate-ca",
        "signing_required",
    );
    let template_created = created(
        &server,
        "private_cert_configuration_template",
        "example-template",
        "configured",
    );
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/configurations/example-root-ca")
            .header(CONFIGURATION_TYPE_HEADER, "private_cert_configuration_root_ca");
        then.status(200).json_body(json!({
            "config_type": "private_cert_configuration_root_ca",
            "name": "example-root-ca",
            "common_name": "ibm.com",
            "status": "configured"
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/configurations/example-intermediate-ca")
            .header(
                CONFIGURATION_TYPE_HEADER,
                "private_cert_configuration_intermediate_ca",
            );
        then.status(200).json_body(json!({
            "config_type": "private_cert_configuration_intermediate_ca",
            "name": "example-intermediate-ca",
            "common_name": "ibm.com",
            "status": "signing_required",
            "issuer": "example-root-ca"
        }));
    });
    let signed = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v2/configurations/example-root-ca/actions")
            .json_body(json!({
                "action_type": "private_cert_configuration_action_sign_intermediate",
                "intermediate_certificate_authority": "example-intermediate-ca"
            }));
        then.status(201).json_body(json!({
            "action_type": "private_cert_configuration_action_sign_intermediate",
            "intermediate_certificate_authority": "example-intermediate-ca",
            "data": {"certificate": "-----BEGIN CERTIFICATE-----"}
        }));
    });
    let issued = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v2/secrets")
            .body_includes(r#""secret_type":"private_cert""#)
            .body_includes(r#""certificate_template":"example-template""#)
            .body_includes(r#""common_name":"localhost""#);
        then.status(201).json_body(json!({
            "secret_type": "private_cert",
            "id": "c-1",
            "name": "example-private-cert",
            "certificate_template": "example-template",
            "common_name": "localhost"
        }));
    });

    let client = common::client(&server);
    let call = CallOptions::default();
    let create = |prototype| CreateConfigurationOptions::new(prototype);

    let root = client
        .create_configuration(
            &create(ConfigurationPrototype::PrivateCertConfigurationRootCa(
                RootCaPrototype::new("example-root-ca", "ibm.com", "43830h"),
            )),
            &call,
        )
        .await
        .unwrap();
    assert_eq!(root.status.as_u16(), 201);
    assert_eq!(
        root.result.config_type(),
        ConfigType::PrivateCertConfigurationRootCa
    );

    let intermediate = client
        .create_configuration(
            &create(ConfigurationPrototype::PrivateCertConfigurationIntermediateCa(
                IntermediateCaPrototype::internal(
                    "example-intermediate-ca",
                    "ibm.com",
                    "43830h",
                    "example-root-ca",
                ),
            )),
            &call,
        )
        .await
        .unwrap();
    assert!(matches!(
        intermediate.result,
        Configuration::PrivateCertConfigurationIntermediateCa(_)
    ));

    let action = client
        .sign_intermediate_ca("example-root-ca", "example-intermediate-ca", &call)
        .await
        .unwrap();
    assert_eq!(action.status.as_u16(), 201);
    assert_eq!(
        action.result.action_type(),
        "private_cert_configuration_action_sign_intermediate"
    );

    let template = client
        .create_configuration(
            &create(ConfigurationPrototype::PrivateCertConfigurationTemplate(
                TemplatePrototype {
                    name: "example-template".into(),
                    certificate_authority: "example-intermediate-ca".into(),
                    ..TemplatePrototype::default()
                },
            )),
            &call,
        )
        .await
        .unwrap();
    assert_eq!(
        template.result.config_type(),
        ConfigType::PrivateCertConfigurationTemplate
    );

    let certificate = client
        .create_secret(
            &CreateSecretOptions::new(SecretPrototype::PrivateCert(PrivateCertificatePrototype {
                common: SecretPrototypeCommon::named("example-private-cert"),
                certificate_template: "example-template".into(),
                common_name: "localhost".into(),
                ..PrivateCertificatePrototype::default()
            })),
            &call,
        )
        .await
        .unwrap();
    assert_eq!(certificate.status.as_u16(), 201);
    assert_eq!(certificate.result.secret_type(), SecretType::PrivateCert);

    root_created.assert();
    intermediate_created.assert();
    signed.assert();
    template_created.assert();
    issued.assert();
}

#[tokio::test]
async fn bulk_locks_twice_with_remove_previous() {
    let server = MockServer::start();
    let bulk = server.mock(|when, then| {
        when.method(POST)
            .path(format!("/api/v2/secrets/{SECRET_ID}/locks_bulk"))
            .json_body(json!({
                "locks": [{"name": "lock-example", "description": "lock for consumer 1"}],
                "mode": "remove_previous"
            }));
        then.status(201).json_body(json!({
            "secret_id": SECRET_ID,
            "secret_group_id": "default",
            "secret_type": "arbitrary",
            "versions": [{
                "version_id": "v-1",
                "version_alias": "current",
                "locks": ["lock-example"],
                "payload_available": true
            }]
        }));
    });

    let client = common::client(&server);
    let options = CreateSecretLocksBulkOptions::new(
        SECRET_ID,
        SecretLocksPrototype {
            locks: vec![SecretLockPrototype {
                description: Some("lock for consumer 1".into()),
                ..SecretLockPrototype::new("lock-example")
            }],
            mode: Some(LockMode::RemovePrevious),
        },
    );
    let first = client
        .create_secret_locks_bulk(&options, &CallOptions::default())
        .await
        .unwrap();
    let second = client
        .create_secret_locks_bulk(&options, &CallOptions::default())
        .await
        .unwrap();

    bulk.assert_calls(2);
    assert_eq!(first.result, second.result);
    assert_eq!(
        second.result.lock_names().collect::<Vec<_>>(),
        vec!["lock-example"]
    );
}

#[tokio::test]
async fn configuration_is_read_with_its_type_hint() {
    let server = MockServer::start();
    let hinted = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/configurations/example-iam-config")
            .header(CONFIGURATION_TYPE_HEADER, "iam_credentials_configuration");
        then.status(200).json_body(json!({
            "config_type": "iam_credentials_configuration",
            "name": "example-iam-config",
            "secret_type": "iam_credentials",
            "api_key": "redacted"
        }));
    });
    let unhinted = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/configurations/example-iam-config")
            .header_missing(CONFIGURATION_TYPE_HEADER);
        then.status(400).json_body(json!({
            "errors": [{"code": "bad_request", "message": "missing configuration type"}],
            "status_code": 400,
            "trace": "t-2"
        }));
    });

    let client = common::client(&server);
    let config = client
        .get_configuration(
            &ConfigurationOptions::new("example-iam-config")
                .with_config_type(ConfigType::IamCredentialsConfiguration),
            &CallOptions::default(),
        )
        .await
        .unwrap()
        .result;
    assert_eq!(config.config_type(), ConfigType::IamCredentialsConfiguration);
    assert_eq!(config.name(), Some("example-iam-config"));

    let err = client
        .get_configuration(
            &ConfigurationOptions::new("example-iam-config"),
            &CallOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SecretsManagerError::ServiceError(_)));
    assert_eq!(err.problem().and_then(|p| p.trace.as_deref()), Some("t-2"));

    hinted.assert();
    unhinted.assert();
}

#[tokio::test]
async fn empty_page_ends_the_walk_even_with_a_next_link() {
    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method(GET).path("/api/v2/secrets");
        then.status(200).json_body(json!({
            "limit": 5,
            "offset": 0,
            "total_count": 0,
            "secrets": [],
            "next": {"href": "/api/v2/secrets?limit=5&offset=5"}
        }));
    });

    let client = common::client(&server);
    let mut pager = client.secrets_pager(ListSecretsOptions {
        limit: Some(5),
        ..ListSecretsOptions::default()
    });
    assert!(pager.get_next().await.unwrap().is_empty());
    assert!(!pager.has_next());
    assert!(pager.get_all().await.unwrap().is_empty());
    listing.assert_calls(1);

    let all = client
        .secrets_pager(ListSecretsOptions {
            limit: Some(5),
            ..ListSecretsOptions::default()
        })
        .get_all()
        .await
        .unwrap();
    assert!(all.is_empty());
    listing.assert_calls(2);
}

#[tokio::test]
async fn empty_first_page_without_next_link() {
    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method(GET).path("/api/v2/configurations");
        then.status(200).json_body(json!({
            "limit": 200,
            "offset": 0,
            "total_count": 0,
            "configurations": []
        }));
    });

    let configurations: Vec<_> = common::client(&server)
        .configurations_pager(ListConfigurationsOptions::default())
        .into_stream()
        .try_collect()
        .await
        .unwrap();

    assert!(configurations.is_empty());
    listing.assert_calls(1);
}

#[tokio::test]
async fn page_size_limits_are_enforced_by_the_service() {
    let server = MockServer::start();
    let rejected = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/secrets")
            .query_param("limit", "201");
        then.status(400).json_body(json!({
            "errors": [{"code": "bad_request", "message": "limit must be at most 200"}],
            "status_code": 400,
            "trace": "b7d0"
        }));
    });

    let mut pager = common::client(&server).secrets_pager(ListSecretsOptions {
        limit: Some(201),
        ..ListSecretsOptions::default()
    });
    let err = pager.get_next().await.unwrap_err();

    rejected.assert();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.problem().and_then(|p| p.trace.as_deref()), Some("b7d0"));
    assert!(pager.has_next());
}
