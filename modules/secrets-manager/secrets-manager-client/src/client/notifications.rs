//! Event Notifications registration. An instance has at most one.

use secrets_manager_sdk::SecretsManagerError;
use secrets_manager_sdk::models::{NotificationsRegistration, NotificationsRegistrationPrototype};

use super::{SecretsManagerClient, to_body};
use crate::operations;
use crate::pipeline::{Call, CallOptions, DetailedResponse};

#[derive(Debug, Clone, Default)]
pub struct CreateNotificationsRegistrationOptions {
    pub registration: NotificationsRegistrationPrototype,
}

impl CreateNotificationsRegistrationOptions {
    #[must_use]
    pub fn new(registration: NotificationsRegistrationPrototype) -> Self {
        Self { registration }
    }
}

impl SecretsManagerClient {
    /// # Errors
    /// `InvalidArgument` for a blank instance CRN or source name; otherwise
    /// the pipeline errors.
    pub async fn create_notifications_registration(
        &self,
        options: &CreateNotificationsRegistrationOptions,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<NotificationsRegistration>, SecretsManagerError> {
        options.registration.validate()?;
        let call = Call::new(&operations::CREATE_NOTIFICATIONS_REGISTRATION).body(to_body(
            &options.registration,
            "NotificationsRegistrationPrototype",
        )?);
        self.pipeline.execute_json(call, call_options).await
    }

    /// # Errors
    /// `NotFound` when the instance is not registered; otherwise the
    /// pipeline errors.
    pub async fn get_notifications_registration(
        &self,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<NotificationsRegistration>, SecretsManagerError> {
        let call = Call::new(&operations::GET_NOTIFICATIONS_REGISTRATION);
        self.pipeline.execute_json(call, call_options).await
    }

    /// # Errors
    /// The pipeline errors.
    pub async fn delete_notifications_registration(
        &self,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<()>, SecretsManagerError> {
        let call = Call::new(&operations::DELETE_NOTIFICATIONS_REGISTRATION);
        self.pipeline.execute_empty(call, call_options).await
    }

    /// Ask the service to send a test event to the registered instance.
    ///
    /// # Errors
    /// The pipeline errors.
    pub async fn get_notifications_registration_test(
        &self,
        call_options: &CallOptions,
    ) -> Result<DetailedResponse<()>, SecretsManagerError> {
        let call = Call::new(&operations::GET_NOTIFICATIONS_REGISTRATION_TEST);
        self.pipeline.execute_empty(call, call_options).await
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
    async fn register_and_test() {
        let server = MockServer::start();
        let crn = "crn:v1:bluemix:public:event-notifications:us-south:a/1::";
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/notifications_registration")
                .json_body(json!({
                    "event_notifications_instance_crn": crn,
                    "event_notifications_source_name": "My Secrets Manager"
                }));
            then.status(201)
                .json_body(json!({"event_notifications_instance_crn": crn}));
        });
        let test_event = server.mock(|when, then| {
            when.method(GET).path("/api/v2/notifications_registration/test");
            then.status(204);
        });

        let client = client(&server);
        let registration = client
            .create_notifications_registration(
                &CreateNotificationsRegistrationOptions::new(NotificationsRegistrationPrototype {
                    event_notifications_instance_crn: crn.into(),
                    event_notifications_source_name: "My Secrets Manager".into(),
                    event_notifications_source_description: None,
                }),
                &CallOptions::default(),
            )
            .await
            .unwrap();
        let tested = client
            .get_notifications_registration_test(&CallOptions::default())
            .await
            .unwrap();

        create.assert();
        test_event.assert();
        assert_eq!(
            registration.result.event_notifications_instance_crn.as_deref(),
            Some(crn)
        );
        assert_eq!(tested.status.as_u16(), 204);
    }

    #[tokio::test]
    async fn missing_registration_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/notifications_registration");
            then.status(404).json_body(json!({
                "errors": [{"code": "not_found", "message": "Notifications registration not found"}],
                "status_code": 404,
                "trace": "3f2a9e1c"
            }));
        });
        let err = client(&server)
            .get_notifications_registration(&CallOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(matches!(err, SecretsManagerError::NotFound(_)));
    }
}
