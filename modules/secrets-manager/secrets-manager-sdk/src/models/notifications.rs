use serde::{Deserialize, Serialize};

use crate::error::SecretsManagerError;

/// The tenant's Event Notifications registration. At most one exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsRegistration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_notifications_instance_crn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsRegistrationPrototype {
    pub event_notifications_instance_crn: String,
    pub event_notifications_source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_notifications_source_description: Option<String>,
}

impl NotificationsRegistrationPrototype {
    /// # Errors
    /// `InvalidArgument` when the instance CRN or source name is blank.
    pub fn validate(&self) -> Result<(), SecretsManagerError> {
        if self.event_notifications_instance_crn.trim().is_empty() {
            return Err(SecretsManagerError::missing_field(
                "event_notifications_instance_crn",
            ));
        }
        if self.event_notifications_source_name.trim().is_empty() {
            return Err(SecretsManagerError::missing_field(
                "event_notifications_source_name",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn prototype_requires_source_name() {
        let proto = NotificationsRegistrationPrototype {
            event_notifications_instance_crn: "crn:v1:bluemix:public:event-notifications:us-south:a/x::".into(),
            ..NotificationsRegistrationPrototype::default()
        };
        assert_eq!(
            proto.validate().unwrap_err().to_string(),
            "invalid argument: event_notifications_source_name must be provided"
        );
    }
}
