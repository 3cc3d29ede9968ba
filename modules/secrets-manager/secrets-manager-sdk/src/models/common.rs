use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Timestamp = DateTime<Utc>;

/// Free-form JSON object used for `custom_metadata` and lock attributes.
pub type Metadata = Map<String, Value>;

/// Serde adapter for `Option<Option<T>>` patch fields.
///
/// `None` is left out of the document, `Some(None)` is written as an explicit
/// `null` (erase the field) and `Some(Some(v))` as the value.
///
/// Use with `#[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]`.
pub mod nullable {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// # Errors
    /// Whatever the serializer reports.
    #[allow(clippy::ref_option)]
    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(Some(v)) => v.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }

    /// # Errors
    /// Whatever the deserializer reports.
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Automatic rotation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_rotate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    /// `day` or `month`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_keys: Option<bool>,
}

/// Link object used in paginated responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub href: String,
}

/// Paging envelope shared by every offset-paginated collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default, alias = "total")]
    pub total_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<PageLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<PageLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<PageLink>,
}

/// Metadata plus material, flattened into one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WithData<M, D> {
    #[serde(flatten)]
    pub metadata: M,
    #[serde(flatten)]
    pub data: D,
}

/// A collection returned page by page.
pub trait Paginated {
    type Item;

    fn page_info(&self) -> &PageInfo;

    fn into_items(self) -> Vec<Self::Item>;
}
