//! Secret locks.
//!
//! A lock name is unique within its scope (a secret, or one of its versions).
//! Creating a lock whose name already exists is governed by [`LockMode`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::common::{Metadata, Paginated, PageInfo, Timestamp};
use crate::error::SecretsManagerError;

/// Conflict policy of a bulk lock creation.
///
/// Values the client does not know are passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LockMode {
    /// Drop any lock with the same name on previous versions first.
    #[default]
    RemovePrevious,
    /// As `RemovePrevious`, and delete the data of versions left unlocked.
    RemovePreviousAndDelete,
    /// Fail with a conflict when the name is taken.
    Exclusive,
    Other(String),
}

impl LockMode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::RemovePrevious => "remove_previous",
            Self::RemovePreviousAndDelete => "remove_previous_and_delete",
            Self::Exclusive => "exclusive",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for LockMode {
    fn from(value: &str) -> Self {
        match value {
            "remove_previous" => Self::RemovePrevious,
            "remove_previous_and_delete" => Self::RemovePreviousAndDelete,
            "exclusive" => Self::Exclusive,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LockMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LockMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretLock {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_version_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretLockPrototype {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Metadata>,
}

impl SecretLockPrototype {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            attributes: None,
        }
    }
}

/// Body of `POST .../locks_bulk`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretLocksPrototype {
    pub locks: Vec<SecretLockPrototype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<LockMode>,
}

impl SecretLocksPrototype {
    /// # Errors
    /// `InvalidArgument` when the list is empty, a name is blank, or a name
    /// appears twice.
    pub fn validate(&self) -> Result<(), SecretsManagerError> {
        if self.locks.is_empty() {
            return Err(SecretsManagerError::missing_field("locks"));
        }
        let mut seen = std::collections::HashSet::new();
        for lock in &self.locks {
            if lock.name.trim().is_empty() {
                return Err(SecretsManagerError::missing_field("locks[].name"));
            }
            if !seen.insert(lock.name.as_str()) {
                return Err(SecretsManagerError::invalid_argument(format!(
                    "duplicate lock name '{}'",
                    lock.name
                )));
            }
        }
        Ok(())
    }
}

/// Locks held on one version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretVersionLocks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_alias: Option<String>,
    /// Lock names.
    pub locks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_available: Option<bool>,
}

/// Locks held on a secret, grouped by version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretLocks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
    pub versions: Vec<SecretVersionLocks>,
}

impl SecretLocks {
    /// Every lock name across all versions, in response order.
    pub fn lock_names(&self) -> impl Iterator<Item = &str> {
        self.versions
            .iter()
            .flat_map(|v| v.locks.iter().map(String::as_str))
    }
}

/// One page of `GET /secrets_locks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretsLocksPaginatedCollection {
    #[serde(flatten)]
    pub page: PageInfo,
    #[serde(default)]
    pub secrets_locks: Vec<SecretLocks>,
}

impl Paginated for SecretsLocksPaginatedCollection {
    type Item = SecretLocks;

    fn page_info(&self) -> &PageInfo {
        &self.page
    }

    fn into_items(self) -> Vec<SecretLocks> {
        self.secrets_locks
    }
}

/// One page of the locks of a secret or of a version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretLockPaginatedCollection {
    #[serde(flatten)]
    pub page: PageInfo,
    #[serde(default)]
    pub locks: Vec<SecretLock>,
}

impl Paginated for SecretLockPaginatedCollection {
    type Item = SecretLock;

    fn page_info(&self) -> &PageInfo {
        &self.page
    }

    fn into_items(self) -> Vec<SecretLock> {
        self.locks
    }
}

pub type SecretLocksPaginatedCollection = SecretLockPaginatedCollection;
pub type SecretVersionLocksPaginatedCollection = SecretLockPaginatedCollection;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lock_mode_passes_unknown_values_through() {
        assert_eq!(LockMode::from("exclusive"), LockMode::Exclusive);
        let future: LockMode = serde_json::from_value(json!("keep_all")).unwrap();
        assert_eq!(future, LockMode::Other("keep_all".into()));
        assert_eq!(serde_json::to_value(&future).unwrap(), json!("keep_all"));
        assert_eq!(
            serde_json::to_value(LockMode::RemovePreviousAndDelete).unwrap(),
            json!("remove_previous_and_delete")
        );
    }

    #[test]
    fn bulk_body_shape() {
        let body = SecretLocksPrototype {
            locks: vec![SecretLockPrototype::new("lock-example-1")],
            mode: Some(LockMode::RemovePrevious),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"locks": [{"name": "lock-example-1"}], "mode": "remove_previous"})
        );
        assert!(body.validate().is_ok());
    }

    #[test]
    fn bulk_validation() {
        let empty = SecretLocksPrototype::default();
        assert!(empty.validate().is_err());

        let dup = SecretLocksPrototype {
            locks: vec![SecretLockPrototype::new("a"), SecretLockPrototype::new("a")],
            mode: None,
        };
        assert_eq!(
            dup.validate().unwrap_err().to_string(),
            "invalid argument: duplicate lock name 'a'"
        );
    }

    #[test]
    fn decodes_secret_locks() {
        let locks: SecretLocks = serde_json::from_value(json!({
            "secret_id": "s1",
            "secret_group_id": "default",
            "versions": [
                {"version_id": "v2", "version_alias": "current", "locks": ["lock-example-1"]},
                {"version_id": "v1", "version_alias": "previous", "locks": ["lock-example-2"]}
            ]
        }))
        .unwrap();
        assert_eq!(
            locks.lock_names().collect::<Vec<_>>(),
            ["lock-example-1", "lock-example-2"]
        );
    }
}
