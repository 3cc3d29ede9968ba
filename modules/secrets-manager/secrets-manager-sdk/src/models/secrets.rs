//! Secret resources.
//!
//! Every secret type has a metadata struct (no material) and a data struct
//! (the material). [`Secret`] variants combine the two via
//! [`WithData`](super::common::WithData), and [`SecretMetadata`] variants
//! carry the metadata alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{
    Metadata, Paginated, PageInfo, RotationPolicy, Timestamp, WithData, nullable,
};
use crate::error::SecretsManagerError;
use crate::family::Family;
use crate::state::SecretState;

/// Discriminator values of the secret families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretType {
    Arbitrary,
    ImportedCert,
    PublicCert,
    PrivateCert,
    IamCredentials,
    Kv,
    UsernamePassword,
    ServiceCredentials,
    CustomCredentials,
}

impl SecretType {
    pub const ALL: [SecretType; 9] = [
        Self::Arbitrary,
        Self::ImportedCert,
        Self::PublicCert,
        Self::PrivateCert,
        Self::IamCredentials,
        Self::Kv,
        Self::UsernamePassword,
        Self::ServiceCredentials,
        Self::CustomCredentials,
    ];

    pub const NAMES: [&'static str; 9] = [
        "arbitrary",
        "imported_cert",
        "public_cert",
        "private_cert",
        "iam_credentials",
        "kv",
        "username_password",
        "service_credentials",
        "custom_credentials",
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arbitrary => "arbitrary",
            Self::ImportedCert => "imported_cert",
            Self::PublicCert => "public_cert",
            Self::PrivateCert => "private_cert",
            Self::IamCredentials => "iam_credentials",
            Self::Kv => "kv",
            Self::UsernamePassword => "username_password",
            Self::ServiceCredentials => "service_credentials",
            Self::CustomCredentials => "custom_credentials",
        }
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretType {
    type Err = SecretsManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SecretsManagerError::UnknownVariant {
                family: Family::Secret.to_string(),
                discriminator: s.to_owned(),
            })
    }
}

/// Attributes every secret carries regardless of type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretCommon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloaded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locks_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SecretState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateValidity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_after: Option<Timestamp>,
}

// ---- metadata per type ---------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrarySecretMetadata {
    #[serde(flatten)]
    pub common: SecretCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
}

/// Certificate attributes shared by imported, public and private certificates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity: Option<CertificateValidity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportedCertificateMetadata {
    #[serde(flatten)]
    pub common: SecretCommon,
    #[serde(flatten)]
    pub certificate: CertificateAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediate_included: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_included: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicCertificateMetadata {
    #[serde(flatten)]
    pub common: SecretCommon,
    #[serde(flatten)]
    pub certificate: CertificateAttributes,
    /// Name of the certificate authority configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca: Option<String>,
    /// Name of the DNS provider configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_certs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuance_info: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateCertificateMetadata {
    #[serde(flatten)]
    pub common: SecretCommon,
    #[serde(flatten)]
    pub certificate: CertificateAttributes,
    /// Name of the template the certificate was issued from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_time_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_time_rfc3339: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IamCredentialsMetadata {
    #[serde(flatten)]
    pub common: SecretCommon,
    /// Lease duration, in seconds or with a unit suffix such as `1d`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id_is_static: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reuse_api_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvSecretMetadata {
    #[serde(flatten)]
    pub common: SecretCommon,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsernamePasswordMetadata {
    #[serde(flatten)]
    pub common: SecretCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_rotation_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCredentialsMetadata {
    #[serde(flatten)]
    pub common: SecretCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_service: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomCredentialsMetadata {
    #[serde(flatten)]
    pub common: SecretCommon,
    /// Name of the custom credentials engine configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
}

// ---- material per type ---------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitraryData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateCertificateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuing_ca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_chain: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IamCredentialsData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsernamePasswordData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCredentialsData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomCredentialsData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_content: Option<Metadata>,
}

pub type ArbitrarySecret = WithData<ArbitrarySecretMetadata, ArbitraryData>;
pub type ImportedCertificate = WithData<ImportedCertificateMetadata, CertificateData>;
pub type PublicCertificate = WithData<PublicCertificateMetadata, CertificateData>;
pub type PrivateCertificate = WithData<PrivateCertificateMetadata, PrivateCertificateData>;
pub type IamCredentialsSecret = WithData<IamCredentialsMetadata, IamCredentialsData>;
pub type KvSecret = WithData<KvSecretMetadata, KvData>;
pub type UsernamePasswordSecret = WithData<UsernamePasswordMetadata, UsernamePasswordData>;
pub type ServiceCredentialsSecret = WithData<ServiceCredentialsMetadata, ServiceCredentialsData>;
pub type CustomCredentialsSecret = WithData<CustomCredentialsMetadata, CustomCredentialsData>;

// ---- families ------------------------------------------------------------

/// A secret including its material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "secret_type", rename_all = "snake_case")]
pub enum Secret {
    Arbitrary(ArbitrarySecret),
    ImportedCert(ImportedCertificate),
    PublicCert(PublicCertificate),
    PrivateCert(PrivateCertificate),
    IamCredentials(IamCredentialsSecret),
    Kv(KvSecret),
    UsernamePassword(UsernamePasswordSecret),
    ServiceCredentials(ServiceCredentialsSecret),
    CustomCredentials(CustomCredentialsSecret),
}

/// A secret's attributes without its material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "secret_type", rename_all = "snake_case")]
pub enum SecretMetadata {
    Arbitrary(ArbitrarySecretMetadata),
    ImportedCert(ImportedCertificateMetadata),
    PublicCert(PublicCertificateMetadata),
    PrivateCert(PrivateCertificateMetadata),
    IamCredentials(IamCredentialsMetadata),
    Kv(KvSecretMetadata),
    UsernamePassword(UsernamePasswordMetadata),
    ServiceCredentials(ServiceCredentialsMetadata),
    CustomCredentials(CustomCredentialsMetadata),
}

impl Secret {
    #[must_use]
    pub fn common(&self) -> &SecretCommon {
        match self {
            Self::Arbitrary(s) => &s.metadata.common,
            Self::ImportedCert(s) => &s.metadata.common,
            Self::PublicCert(s) => &s.metadata.common,
            Self::PrivateCert(s) => &s.metadata.common,
            Self::IamCredentials(s) => &s.metadata.common,
            Self::Kv(s) => &s.metadata.common,
            Self::UsernamePassword(s) => &s.metadata.common,
            Self::ServiceCredentials(s) => &s.metadata.common,
            Self::CustomCredentials(s) => &s.metadata.common,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.common().id.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.common().name.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> Option<SecretState> {
        self.common().state
    }

    /// Drop the material, keeping the attributes.
    #[must_use]
    pub fn into_metadata(self) -> SecretMetadata {
        match self {
            Self::Arbitrary(s) => SecretMetadata::Arbitrary(s.metadata),
            Self::ImportedCert(s) => SecretMetadata::ImportedCert(s.metadata),
            Self::PublicCert(s) => SecretMetadata::PublicCert(s.metadata),
            Self::PrivateCert(s) => SecretMetadata::PrivateCert(s.metadata),
            Self::IamCredentials(s) => SecretMetadata::IamCredentials(s.metadata),
            Self::Kv(s) => SecretMetadata::Kv(s.metadata),
            Self::UsernamePassword(s) => SecretMetadata::UsernamePassword(s.metadata),
            Self::ServiceCredentials(s) => SecretMetadata::ServiceCredentials(s.metadata),
            Self::CustomCredentials(s) => SecretMetadata::CustomCredentials(s.metadata),
        }
    }
}

impl SecretMetadata {
    #[must_use]
    pub fn common(&self) -> &SecretCommon {
        match self {
            Self::Arbitrary(m) => &m.common,
            Self::ImportedCert(m) => &m.common,
            Self::PublicCert(m) => &m.common,
            Self::PrivateCert(m) => &m.common,
            Self::IamCredentials(m) => &m.common,
            Self::Kv(m) => &m.common,
            Self::UsernamePassword(m) => &m.common,
            Self::ServiceCredentials(m) => &m.common,
            Self::CustomCredentials(m) => &m.common,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.common().id.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.common().name.as_deref()
    }
}

secret_type_family!(Secret, Secret);

secret_type_family!(SecretMetadata, SecretMetadata);

// ---- prototypes ----------------------------------------------------------

/// Fields every secret prototype accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretPrototypeCommon {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_custom_metadata: Option<Metadata>,
}

impl SecretPrototypeCommon {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArbitrarySecretPrototype {
    #[serde(flatten)]
    pub common: SecretPrototypeCommon,
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
}

impl ArbitrarySecretPrototype {
    #[must_use]
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            common: SecretPrototypeCommon::named(name),
            payload: payload.into(),
            expiration_date: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportedCertificatePrototype {
    #[serde(flatten)]
    pub common: SecretPrototypeCommon,
    pub certificate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicCertificatePrototype {
    #[serde(flatten)]
    pub common: SecretPrototypeCommon,
    pub common_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_algorithm: Option<String>,
    pub ca: String,
    pub dns: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_certs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrivateCertificatePrototype {
    #[serde(flatten)]
    pub common: SecretPrototypeCommon,
    /// Template configuration the certificate is issued from.
    pub certificate_template: String,
    pub common_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_sans: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_sans: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_sans: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_cn_from_sans: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IamCredentialsPrototype {
    #[serde(flatten)]
    pub common: SecretPrototypeCommon,
    pub ttl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse_api_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KvSecretPrototype {
    #[serde(flatten)]
    pub common: SecretPrototypeCommon,
    pub data: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsernamePasswordPrototype {
    #[serde(flatten)]
    pub common: SecretPrototypeCommon,
    pub username: String,
    /// Generated by the service when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceCredentialsPrototype {
    #[serde(flatten)]
    pub common: SecretPrototypeCommon,
    pub source_service: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomCredentialsPrototype {
    #[serde(flatten)]
    pub common: SecretPrototypeCommon,
    pub configuration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
}

/// Body of a create-secret request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "secret_type", rename_all = "snake_case")]
pub enum SecretPrototype {
    Arbitrary(ArbitrarySecretPrototype),
    ImportedCert(ImportedCertificatePrototype),
    PublicCert(PublicCertificatePrototype),
    PrivateCert(PrivateCertificatePrototype),
    IamCredentials(IamCredentialsPrototype),
    Kv(KvSecretPrototype),
    UsernamePassword(UsernamePasswordPrototype),
    ServiceCredentials(ServiceCredentialsPrototype),
    CustomCredentials(CustomCredentialsPrototype),
}

fn require(value: &str, field: &str) -> Result<(), SecretsManagerError> {
    if value.trim().is_empty() {
        return Err(SecretsManagerError::missing_field(field));
    }
    Ok(())
}

impl SecretPrototype {
    #[must_use]
    pub fn common(&self) -> &SecretPrototypeCommon {
        match self {
            Self::Arbitrary(p) => &p.common,
            Self::ImportedCert(p) => &p.common,
            Self::PublicCert(p) => &p.common,
            Self::PrivateCert(p) => &p.common,
            Self::IamCredentials(p) => &p.common,
            Self::Kv(p) => &p.common,
            Self::UsernamePassword(p) => &p.common,
            Self::ServiceCredentials(p) => &p.common,
            Self::CustomCredentials(p) => &p.common,
        }
    }

    /// Check the fields the service requires for this secret type.
    ///
    /// # Errors
    /// `InvalidArgument` naming the first missing field.
    pub fn validate(&self) -> Result<(), SecretsManagerError> {
        require(&self.common().name, "name")?;
        match self {
            Self::Arbitrary(p) => require(&p.payload, "payload"),
            Self::ImportedCert(p) => require(&p.certificate, "certificate"),
            Self::PublicCert(p) => {
                require(&p.common_name, "common_name")?;
                require(&p.ca, "ca")?;
                require(&p.dns, "dns")
            }
            Self::PrivateCert(p) => {
                require(&p.certificate_template, "certificate_template")?;
                require(&p.common_name, "common_name")
            }
            Self::IamCredentials(p) => require(&p.ttl, "ttl"),
            Self::Kv(p) if p.data.is_empty() => Err(SecretsManagerError::missing_field("data")),
            Self::UsernamePassword(p) => require(&p.username, "username"),
            Self::ServiceCredentials(p) if p.source_service.is_null() => {
                Err(SecretsManagerError::missing_field("source_service"))
            }
            Self::CustomCredentials(p) => require(&p.configuration, "configuration"),
            Self::Kv(_) | Self::ServiceCredentials(_) => Ok(()),
        }
    }
}

secret_type_family!(SecretPrototype, SecretPrototype);

// ---- metadata patches ----------------------------------------------------

/// Patchable attributes shared by every secret type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonMetadataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub description: Option<Option<String>>,
    /// Replaces the whole label list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub custom_metadata: Option<Option<Metadata>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpiringMetadataPatch {
    #[serde(flatten)]
    pub common: CommonMetadataPatch,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub expiration_date: Option<Option<Timestamp>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotatingMetadataPatch {
    #[serde(flatten)]
    pub common: CommonMetadataPatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeasedMetadataPatch {
    #[serde(flatten)]
    pub common: CommonMetadataPatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
}

pub type ArbitrarySecretMetadataPatch = ExpiringMetadataPatch;
pub type ImportedCertificateMetadataPatch = CommonMetadataPatch;
pub type PublicCertificateMetadataPatch = RotatingMetadataPatch;
pub type PrivateCertificateMetadataPatch = RotatingMetadataPatch;
pub type IamCredentialsMetadataPatch = LeasedMetadataPatch;
pub type KvSecretMetadataPatch = CommonMetadataPatch;
pub type UsernamePasswordMetadataPatch = ExpiringMetadataPatch;
pub type ServiceCredentialsMetadataPatch = LeasedMetadataPatch;
pub type CustomCredentialsMetadataPatch = LeasedMetadataPatch;

/// Typed partial for `PATCH /secrets/{id}/metadata`.
///
/// The variant selects which fields are available; the body itself carries
/// no `secret_type`. Turn it into a merge-patch document with
/// [`codec::derive_patch`](crate::codec::derive_patch) against
/// [`empty_like`](Self::empty_like).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SecretMetadataPatch {
    Arbitrary(ArbitrarySecretMetadataPatch),
    ImportedCert(ImportedCertificateMetadataPatch),
    PublicCert(PublicCertificateMetadataPatch),
    PrivateCert(PrivateCertificateMetadataPatch),
    IamCredentials(IamCredentialsMetadataPatch),
    Kv(KvSecretMetadataPatch),
    UsernamePassword(UsernamePasswordMetadataPatch),
    ServiceCredentials(ServiceCredentialsMetadataPatch),
    CustomCredentials(CustomCredentialsMetadataPatch),
}

impl SecretMetadataPatch {
    /// The all-unset patch of the same variant.
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self::empty(self.secret_type())
    }

    #[must_use]
    pub fn empty(secret_type: SecretType) -> Self {
        match secret_type {
            SecretType::Arbitrary => Self::Arbitrary(ExpiringMetadataPatch::default()),
            SecretType::ImportedCert => Self::ImportedCert(CommonMetadataPatch::default()),
            SecretType::PublicCert => Self::PublicCert(RotatingMetadataPatch::default()),
            SecretType::PrivateCert => Self::PrivateCert(RotatingMetadataPatch::default()),
            SecretType::IamCredentials => Self::IamCredentials(LeasedMetadataPatch::default()),
            SecretType::Kv => Self::Kv(CommonMetadataPatch::default()),
            SecretType::UsernamePassword => {
                Self::UsernamePassword(ExpiringMetadataPatch::default())
            }
            SecretType::ServiceCredentials => {
                Self::ServiceCredentials(LeasedMetadataPatch::default())
            }
            SecretType::CustomCredentials => {
                Self::CustomCredentials(LeasedMetadataPatch::default())
            }
        }
    }
}

secret_type_family!(SecretMetadataPatch, SecretMetadataPatch);

// ---- collections ---------------------------------------------------------

/// One page of `GET /secrets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretMetadataPaginatedCollection {
    #[serde(flatten)]
    pub page: PageInfo,
    #[serde(default)]
    pub secrets: Vec<SecretMetadata>,
}

impl Paginated for SecretMetadataPaginatedCollection {
    type Item = SecretMetadata;

    fn page_info(&self) -> &PageInfo {
        &self.page
    }

    fn into_items(self) -> Vec<SecretMetadata> {
        self.secrets
    }
}
