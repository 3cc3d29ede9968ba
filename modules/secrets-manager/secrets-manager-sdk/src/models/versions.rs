//! Secret versions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{Metadata, RotationPolicy, Timestamp, WithData, nullable};
use super::secrets::{
    ArbitraryData, CertificateData, CertificateValidity, CustomCredentialsData,
    IamCredentialsData, KvData, PrivateCertificateData, ServiceCredentialsData,
    UsernamePasswordData,
};
use crate::error::SecretsManagerError;

/// Attributes every version carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionCommon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    /// `current` or `previous`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloaded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_rotated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_custom_metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainVersionMetadata {
    #[serde(flatten)]
    pub common: VersionCommon,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateVersionMetadata {
    #[serde(flatten)]
    pub common: VersionCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity: Option<CertificateValidity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IamCredentialsVersionMetadata {
    #[serde(flatten)]
    pub common: VersionCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id_is_static: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCredentialsVersionMetadata {
    #[serde(flatten)]
    pub common: VersionCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_key: Option<Value>,
}

/// A secret version's attributes without its material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "secret_type", rename_all = "snake_case")]
pub enum SecretVersionMetadata {
    Arbitrary(PlainVersionMetadata),
    ImportedCert(CertificateVersionMetadata),
    PublicCert(CertificateVersionMetadata),
    PrivateCert(CertificateVersionMetadata),
    IamCredentials(IamCredentialsVersionMetadata),
    Kv(PlainVersionMetadata),
    UsernamePassword(PlainVersionMetadata),
    ServiceCredentials(ServiceCredentialsVersionMetadata),
    CustomCredentials(PlainVersionMetadata),
}

/// A secret version including its material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "secret_type", rename_all = "snake_case")]
pub enum SecretVersion {
    Arbitrary(WithData<PlainVersionMetadata, ArbitraryData>),
    ImportedCert(WithData<CertificateVersionMetadata, CertificateData>),
    PublicCert(WithData<CertificateVersionMetadata, CertificateData>),
    PrivateCert(WithData<CertificateVersionMetadata, PrivateCertificateData>),
    IamCredentials(WithData<IamCredentialsVersionMetadata, IamCredentialsData>),
    Kv(WithData<PlainVersionMetadata, KvData>),
    UsernamePassword(WithData<PlainVersionMetadata, UsernamePasswordData>),
    ServiceCredentials(WithData<ServiceCredentialsVersionMetadata, ServiceCredentialsData>),
    CustomCredentials(WithData<PlainVersionMetadata, CustomCredentialsData>),
}

secret_type_family!(SecretVersion, SecretVersion);
secret_type_family!(SecretVersionMetadata, SecretVersionMetadata);

impl SecretVersionMetadata {
    #[must_use]
    pub fn common(&self) -> &VersionCommon {
        match self {
            Self::Arbitrary(m)
            | Self::Kv(m)
            | Self::UsernamePassword(m)
            | Self::CustomCredentials(m) => &m.common,
            Self::ImportedCert(m) | Self::PublicCert(m) | Self::PrivateCert(m) => &m.common,
            Self::IamCredentials(m) => &m.common,
            Self::ServiceCredentials(m) => &m.common,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.common().id.as_deref()
    }
}

impl SecretVersion {
    #[must_use]
    pub fn common(&self) -> &VersionCommon {
        match self {
            Self::Arbitrary(v) => &v.metadata.common,
            Self::ImportedCert(v) | Self::PublicCert(v) => &v.metadata.common,
            Self::PrivateCert(v) => &v.metadata.common,
            Self::IamCredentials(v) => &v.metadata.common,
            Self::Kv(v) => &v.metadata.common,
            Self::UsernamePassword(v) => &v.metadata.common,
            Self::ServiceCredentials(v) => &v.metadata.common,
            Self::CustomCredentials(v) => &v.metadata.common,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.common().id.as_deref()
    }

    #[must_use]
    pub fn secret_id(&self) -> Option<&str> {
        self.common().secret_id.as_deref()
    }
}

/// Response of `GET /secrets/{id}/versions`. Not paginated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretVersionMetadataCollection {
    pub versions: Vec<SecretVersionMetadata>,
    pub total_count: u32,
}

// ---- prototypes ----------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionPrototypeCommon {
    /// Replaces the secret's `custom_metadata`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_custom_metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArbitraryVersionPrototype {
    #[serde(flatten)]
    pub common: VersionPrototypeCommon,
    pub payload: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportedCertificateVersionPrototype {
    #[serde(flatten)]
    pub common: VersionPrototypeCommon,
    pub certificate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

/// Certificate renewal; `rotation.rotate_keys` asks for a fresh key pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateVersionPrototype {
    #[serde(flatten)]
    pub common: VersionPrototypeCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KvVersionPrototype {
    #[serde(flatten)]
    pub common: VersionPrototypeCommon,
    pub data: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsernamePasswordVersionPrototype {
    #[serde(flatten)]
    pub common: VersionPrototypeCommon,
    /// Generated by the service when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegeneratedVersionPrototype {
    #[serde(flatten)]
    pub common: VersionPrototypeCommon,
}

/// Body of `POST /secrets/{id}/versions`.
///
/// The secret already fixes the type, so the body carries no `secret_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SecretVersionPrototype {
    Arbitrary(ArbitraryVersionPrototype),
    ImportedCert(ImportedCertificateVersionPrototype),
    PublicCert(CertificateVersionPrototype),
    PrivateCert(CertificateVersionPrototype),
    IamCredentials(RegeneratedVersionPrototype),
    Kv(KvVersionPrototype),
    UsernamePassword(UsernamePasswordVersionPrototype),
    ServiceCredentials(RegeneratedVersionPrototype),
    CustomCredentials(RegeneratedVersionPrototype),
}

secret_type_family!(SecretVersionPrototype, SecretVersionPrototype);

impl SecretVersionPrototype {
    /// # Errors
    /// `InvalidArgument` naming the first missing field.
    pub fn validate(&self) -> Result<(), SecretsManagerError> {
        match self {
            Self::Arbitrary(p) if p.payload.is_empty() => {
                Err(SecretsManagerError::missing_field("payload"))
            }
            Self::ImportedCert(p) if p.certificate.trim().is_empty() => {
                Err(SecretsManagerError::missing_field("certificate"))
            }
            Self::Kv(p) if p.data.is_empty() => Err(SecretsManagerError::missing_field("data")),
            _ => Ok(()),
        }
    }
}

/// Body of `PATCH /secrets/{id}/versions/{vid}/metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretVersionMetadataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub version_custom_metadata: Option<Option<Metadata>>,
}
