//! Endpoint table of the Secrets Manager v2 API.

use http::{Method, StatusCode};

use crate::pipeline::{BodyKind, OperationSpec};

macro_rules! operation {
    ($ident:ident, $name:literal, $method:ident $path:literal, $body:ident => $status:ident) => {
        pub static $ident: OperationSpec = OperationSpec {
            name: $name,
            method: Method::$method,
            path: $path,
            body: BodyKind::$body,
            success: StatusCode::$status,
        };
    };
}

// secret groups
operation!(CREATE_SECRET_GROUP, "create_secret_group", POST "/api/v2/secret_groups", Json => CREATED);
operation!(LIST_SECRET_GROUPS, "list_secret_groups", GET "/api/v2/secret_groups", None => OK);
operation!(GET_SECRET_GROUP, "get_secret_group", GET "/api/v2/secret_groups/{id}", None => OK);
operation!(UPDATE_SECRET_GROUP, "update_secret_group", PATCH "/api/v2/secret_groups/{id}", MergePatch => OK);
operation!(DELETE_SECRET_GROUP, "delete_secret_group", DELETE "/api/v2/secret_groups/{id}", None => NO_CONTENT);

// secrets
operation!(CREATE_SECRET, "create_secret", POST "/api/v2/secrets", Json => CREATED);
operation!(LIST_SECRETS, "list_secrets", GET "/api/v2/secrets", None => OK);
operation!(GET_SECRET, "get_secret", GET "/api/v2/secrets/{id}", None => OK);
operation!(
    GET_SECRET_BY_NAME_TYPE,
    "get_secret_by_name_type",
    GET "/api/v2/secret_groups/{secret_group_name}/secret_types/{secret_type}/secrets/{name}",
    None => OK
);
operation!(DELETE_SECRET, "delete_secret", DELETE "/api/v2/secrets/{id}", None => NO_CONTENT);
operation!(GET_SECRET_METADATA, "get_secret_metadata", GET "/api/v2/secrets/{id}/metadata", None => OK);
operation!(
    UPDATE_SECRET_METADATA,
    "update_secret_metadata",
    PATCH "/api/v2/secrets/{id}/metadata",
    MergePatch => OK
);
operation!(CREATE_SECRET_ACTION, "create_secret_action", POST "/api/v2/secrets/{id}/actions", Json => CREATED);

// secret versions
operation!(
    CREATE_SECRET_VERSION,
    "create_secret_version",
    POST "/api/v2/secrets/{secret_id}/versions",
    Json => CREATED
);
operation!(
    LIST_SECRET_VERSIONS,
    "list_secret_versions",
    GET "/api/v2/secrets/{secret_id}/versions",
    None => OK
);
operation!(
    GET_SECRET_VERSION,
    "get_secret_version",
    GET "/api/v2/secrets/{secret_id}/versions/{id}",
    None => OK
);
operation!(
    DELETE_SECRET_VERSION_DATA,
    "delete_secret_version_data",
    DELETE "/api/v2/secrets/{secret_id}/versions/{id}/secret_data",
    None => NO_CONTENT
);
operation!(
    GET_SECRET_VERSION_METADATA,
    "get_secret_version_metadata",
    GET "/api/v2/secrets/{secret_id}/versions/{id}/metadata",
    None => OK
);
operation!(
    UPDATE_SECRET_VERSION_METADATA,
    "update_secret_version_metadata",
    PATCH "/api/v2/secrets/{secret_id}/versions/{id}/metadata",
    MergePatch => OK
);
operation!(
    CREATE_SECRET_VERSION_ACTION,
    "create_secret_version_action",
    POST "/api/v2/secrets/{secret_id}/versions/{id}/actions",
    Json => CREATED
);

// locks
operation!(LIST_SECRETS_LOCKS, "list_secrets_locks", GET "/api/v2/secrets_locks", None => OK);
operation!(LIST_SECRET_LOCKS, "list_secret_locks", GET "/api/v2/secrets/{id}/locks", None => OK);
operation!(
    LIST_SECRET_VERSION_LOCKS,
    "list_secret_version_locks",
    GET "/api/v2/secrets/{secret_id}/versions/{id}/locks",
    None => OK
);
operation!(
    CREATE_SECRET_LOCKS_BULK,
    "create_secret_locks_bulk",
    POST "/api/v2/secrets/{id}/locks_bulk",
    Json => CREATED
);
operation!(
    CREATE_SECRET_VERSION_LOCKS_BULK,
    "create_secret_version_locks_bulk",
    POST "/api/v2/secrets/{secret_id}/versions/{id}/locks_bulk",
    Json => CREATED
);
operation!(
    DELETE_SECRET_LOCKS_BULK,
    "delete_secret_locks_bulk",
    DELETE "/api/v2/secrets/{id}/locks_bulk",
    None => OK
);
operation!(
    DELETE_SECRET_VERSION_LOCKS_BULK,
    "delete_secret_version_locks_bulk",
    DELETE "/api/v2/secrets/{secret_id}/versions/{id}/locks_bulk",
    None => OK
);

// configurations
operation!(CREATE_CONFIGURATION, "create_configuration", POST "/api/v2/configurations", Json => CREATED);
operation!(LIST_CONFIGURATIONS, "list_configurations", GET "/api/v2/configurations", None => OK);
operation!(GET_CONFIGURATION, "get_configuration", GET "/api/v2/configurations/{name}", None => OK);
operation!(
    UPDATE_CONFIGURATION,
    "update_configuration",
    PATCH "/api/v2/configurations/{name}",
    MergePatch => OK
);
operation!(
    DELETE_CONFIGURATION,
    "delete_configuration",
    DELETE "/api/v2/configurations/{name}",
    None => NO_CONTENT
);
operation!(
    CREATE_CONFIGURATION_ACTION,
    "create_configuration_action",
    POST "/api/v2/configurations/{name}/actions",
    Json => CREATED
);

// notifications registration
operation!(
    CREATE_NOTIFICATIONS_REGISTRATION,
    "create_notifications_registration",
    POST "/api/v2/notifications_registration",
    Json => CREATED
);
operation!(
    GET_NOTIFICATIONS_REGISTRATION,
    "get_notifications_registration",
    GET "/api/v2/notifications_registration",
    None => OK
);
operation!(
    DELETE_NOTIFICATIONS_REGISTRATION,
    "delete_notifications_registration",
    DELETE "/api/v2/notifications_registration",
    None => NO_CONTENT
);
operation!(
    GET_NOTIFICATIONS_REGISTRATION_TEST,
    "get_notifications_registration_test",
    GET "/api/v2/notifications_registration/test",
    None => NO_CONTENT
);

/// Every endpoint, in table order.
pub static ALL: [&OperationSpec; 37] = [
    &CREATE_SECRET_GROUP,
    &LIST_SECRET_GROUPS,
    &GET_SECRET_GROUP,
    &UPDATE_SECRET_GROUP,
    &DELETE_SECRET_GROUP,
    &CREATE_SECRET,
    &LIST_SECRETS,
    &GET_SECRET,
    &GET_SECRET_BY_NAME_TYPE,
    &DELETE_SECRET,
    &UPDATE_SECRET_METADATA,
    &GET_SECRET_METADATA,
    &CREATE_SECRET_ACTION,
    &CREATE_SECRET_VERSION,
    &LIST_SECRET_VERSIONS,
    &GET_SECRET_VERSION,
    &DELETE_SECRET_VERSION_DATA,
    &GET_SECRET_VERSION_METADATA,
    &UPDATE_SECRET_VERSION_METADATA,
    &CREATE_SECRET_VERSION_ACTION,
    &LIST_SECRETS_LOCKS,
    &LIST_SECRET_LOCKS,
    &LIST_SECRET_VERSION_LOCKS,
    &CREATE_SECRET_LOCKS_BULK,
    &CREATE_SECRET_VERSION_LOCKS_BULK,
    &DELETE_SECRET_LOCKS_BULK,
    &DELETE_SECRET_VERSION_LOCKS_BULK,
    &CREATE_CONFIGURATION,
    &LIST_CONFIGURATIONS,
    &GET_CONFIGURATION,
    &UPDATE_CONFIGURATION,
    &DELETE_CONFIGURATION,
    &CREATE_CONFIGURATION_ACTION,
    &CREATE_NOTIFICATIONS_REGISTRATION,
    &GET_NOTIFICATIONS_REGISTRATION,
    &DELETE_NOTIFICATIONS_REGISTRATION,
    &GET_NOTIFICATIONS_REGISTRATION_TEST,
];
