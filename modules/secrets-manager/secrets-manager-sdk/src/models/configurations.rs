//! Secret engine configurations.
//!
//! Configurations are addressed by name. By-name endpoints also need the
//! `X-Sm-Accept-Configuration-Type` header set to the [`ConfigType`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::common::{Paginated, PageInfo, Timestamp, WithData};
use crate::error::SecretsManagerError;
use crate::family::Family;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigType {
    IamCredentialsConfiguration,
    PublicCertConfigurationCaLetsEncrypt,
    PublicCertConfigurationDnsClassicInfrastructure,
    PublicCertConfigurationDnsCloudInternetServices,
    PrivateCertConfigurationRootCa,
    PrivateCertConfigurationIntermediateCa,
    PrivateCertConfigurationTemplate,
}

impl ConfigType {
    pub const ALL: [ConfigType; 7] = [
        Self::IamCredentialsConfiguration,
        Self::PublicCertConfigurationCaLetsEncrypt,
        Self::PublicCertConfigurationDnsClassicInfrastructure,
        Self::PublicCertConfigurationDnsCloudInternetServices,
        Self::PrivateCertConfigurationRootCa,
        Self::PrivateCertConfigurationIntermediateCa,
        Self::PrivateCertConfigurationTemplate,
    ];

    pub const NAMES: [&'static str; 7] = [
        "iam_credentials_configuration",
        "public_cert_configuration_ca_lets_encrypt",
        "public_cert_configuration_dns_classic_infrastructure",
        "public_cert_configuration_dns_cloud_internet_services",
        "private_cert_configuration_root_ca",
        "private_cert_configuration_intermediate_ca",
        "private_cert_configuration_template",
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IamCredentialsConfiguration => "iam_credentials_configuration",
            Self::PublicCertConfigurationCaLetsEncrypt => {
                "public_cert_configuration_ca_lets_encrypt"
            }
            Self::PublicCertConfigurationDnsClassicInfrastructure => {
                "public_cert_configuration_dns_classic_infrastructure"
            }
            Self::PublicCertConfigurationDnsCloudInternetServices => {
                "public_cert_configuration_dns_cloud_internet_services"
            }
            Self::PrivateCertConfigurationRootCa => "private_cert_configuration_root_ca",
            Self::PrivateCertConfigurationIntermediateCa => {
                "private_cert_configuration_intermediate_ca"
            }
            Self::PrivateCertConfigurationTemplate => "private_cert_configuration_template",
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigType {
    type Err = SecretsManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SecretsManagerError::UnknownVariant {
                family: Family::Configuration.to_string(),
                discriminator: s.to_owned(),
            })
    }
}

/// Implements `config_type()` and `Polymorphic` for an enum with one
/// variant per configuration type.
macro_rules! config_type_family {
    ($ty:ident, $family:ident) => {
        impl $ty {
            #[must_use]
            pub fn config_type(&self) -> ConfigType {
                match self {
                    Self::IamCredentialsConfiguration(_) => ConfigType::IamCredentialsConfiguration,
                    Self::PublicCertConfigurationCaLetsEncrypt(_) => {
                        ConfigType::PublicCertConfigurationCaLetsEncrypt
                    }
                    Self::PublicCertConfigurationDnsClassicInfrastructure(_) => {
                        ConfigType::PublicCertConfigurationDnsClassicInfrastructure
                    }
                    Self::PublicCertConfigurationDnsCloudInternetServices(_) => {
                        ConfigType::PublicCertConfigurationDnsCloudInternetServices
                    }
                    Self::PrivateCertConfigurationRootCa(_) => {
                        ConfigType::PrivateCertConfigurationRootCa
                    }
                    Self::PrivateCertConfigurationIntermediateCa(_) => {
                        ConfigType::PrivateCertConfigurationIntermediateCa
                    }
                    Self::PrivateCertConfigurationTemplate(_) => {
                        ConfigType::PrivateCertConfigurationTemplate
                    }
                }
            }
        }

        impl $crate::family::Polymorphic for $ty {
            const FAMILY: Family = Family::$family;
            const DISCRIMINATORS: &'static [&'static str] = &ConfigType::NAMES;

            fn discriminator(&self) -> &'static str {
                self.config_type().as_str()
            }
        }
    };
}

/// Attributes shared by all configuration types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationCommon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Secret type the configuration serves, e.g. `private_cert`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IamCredentialsConfigurationMetadata {
    #[serde(flatten)]
    pub common: ConfigurationCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetsEncryptConfigurationMetadata {
    #[serde(flatten)]
    pub common: ConfigurationCommon,
    /// `production` or `staging`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lets_encrypt_environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lets_encrypt_preferred_chain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassicInfrastructureConfigurationMetadata {
    #[serde(flatten)]
    pub common: ConfigurationCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classic_infrastructure_username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudInternetServicesConfigurationMetadata {
    #[serde(flatten)]
    pub common: ConfigurationCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_internet_services_crn: Option<String>,
}

/// Subject and key parameters of a certificate authority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaSubject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_sans: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_sans: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_sans: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_bits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_path_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_cn_from_sans: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permitted_dns_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ou: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

/// Revocation list settings of a certificate authority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrlSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crl_expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crl_disable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crl_distribution_points_encoded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuing_certificates_urls_encoded: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateAuthorityMetadata {
    #[serde(flatten)]
    pub common: ConfigurationCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ttl: Option<String>,
    #[serde(flatten)]
    pub subject: CaSubject,
    #[serde(flatten)]
    pub crl: CrlSettings,
    /// CA lifecycle status, e.g. `signing_required` or `configured`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
    /// `internal` or `external`. Intermediate CAs only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_method: Option<String>,
    /// Name of the signing root CA. Intermediate CAs only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_secret_groups: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_localhost: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_domains_template: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_bare_domains: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_subdomains: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_glob_domains: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_any_name: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_hostnames: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_ip_sans: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_uri_sans: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_other_sans: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_flag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_flag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_signing_flag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_protection_flag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_bits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_usage: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_key_usage: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_csr_common_name: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_csr_sans: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_cn: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_constraints_valid_for_non_ca: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before_duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateMetadata {
    #[serde(flatten)]
    pub common: ConfigurationCommon,
    /// Name of the intermediate or root CA the template issues from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<String>,
    #[serde(flatten)]
    pub rules: TemplateRules,
}

// ---- material ------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IamCredentialsConfigurationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetsEncryptConfigurationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lets_encrypt_private_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassicInfrastructureConfigurationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classic_infrastructure_password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudInternetServicesConfigurationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_internet_services_apikey: Option<String>,
}

/// Certificate material of a CA.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuing_ca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_chain: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_type: Option<String>,
    /// Set on externally signed intermediates awaiting a certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaMaterial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CaData>,
}

// ---- families ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "config_type", rename_all = "snake_case")]
pub enum ConfigurationMetadata {
    IamCredentialsConfiguration(IamCredentialsConfigurationMetadata),
    PublicCertConfigurationCaLetsEncrypt(LetsEncryptConfigurationMetadata),
    PublicCertConfigurationDnsClassicInfrastructure(ClassicInfrastructureConfigurationMetadata),
    PublicCertConfigurationDnsCloudInternetServices(CloudInternetServicesConfigurationMetadata),
    PrivateCertConfigurationRootCa(CertificateAuthorityMetadata),
    PrivateCertConfigurationIntermediateCa(CertificateAuthorityMetadata),
    PrivateCertConfigurationTemplate(TemplateMetadata),
}

/// A configuration including its credentials or CA material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "config_type", rename_all = "snake_case")]
pub enum Configuration {
    IamCredentialsConfiguration(
        WithData<IamCredentialsConfigurationMetadata, IamCredentialsConfigurationData>,
    ),
    PublicCertConfigurationCaLetsEncrypt(
        WithData<LetsEncryptConfigurationMetadata, LetsEncryptConfigurationData>,
    ),
    PublicCertConfigurationDnsClassicInfrastructure(
        WithData<ClassicInfrastructureConfigurationMetadata, ClassicInfrastructureConfigurationData>,
    ),
    PublicCertConfigurationDnsCloudInternetServices(
        WithData<CloudInternetServicesConfigurationMetadata, CloudInternetServicesConfigurationData>,
    ),
    PrivateCertConfigurationRootCa(WithData<CertificateAuthorityMetadata, CaMaterial>),
    PrivateCertConfigurationIntermediateCa(WithData<CertificateAuthorityMetadata, CaMaterial>),
    /// Templates hold no material.
    PrivateCertConfigurationTemplate(TemplateMetadata),
}

config_type_family!(Configuration, Configuration);
config_type_family!(ConfigurationMetadata, ConfigurationMetadata);

impl ConfigurationMetadata {
    #[must_use]
    pub fn common(&self) -> &ConfigurationCommon {
        match self {
            Self::IamCredentialsConfiguration(m) => &m.common,
            Self::PublicCertConfigurationCaLetsEncrypt(m) => &m.common,
            Self::PublicCertConfigurationDnsClassicInfrastructure(m) => &m.common,
            Self::PublicCertConfigurationDnsCloudInternetServices(m) => &m.common,
            Self::PrivateCertConfigurationRootCa(m)
            | Self::PrivateCertConfigurationIntermediateCa(m) => &m.common,
            Self::PrivateCertConfigurationTemplate(m) => &m.common,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.common().name.as_deref()
    }

    /// CA attributes for root and intermediate CAs.
    #[must_use]
    pub fn certificate_authority(&self) -> Option<&CertificateAuthorityMetadata> {
        match self {
            Self::PrivateCertConfigurationRootCa(m)
            | Self::PrivateCertConfigurationIntermediateCa(m) => Some(m),
            _ => None,
        }
    }
}

impl Configuration {
    #[must_use]
    pub fn common(&self) -> &ConfigurationCommon {
        match self {
            Self::IamCredentialsConfiguration(c) => &c.metadata.common,
            Self::PublicCertConfigurationCaLetsEncrypt(c) => &c.metadata.common,
            Self::PublicCertConfigurationDnsClassicInfrastructure(c) => &c.metadata.common,
            Self::PublicCertConfigurationDnsCloudInternetServices(c) => &c.metadata.common,
            Self::PrivateCertConfigurationRootCa(c)
            | Self::PrivateCertConfigurationIntermediateCa(c) => &c.metadata.common,
            Self::PrivateCertConfigurationTemplate(t) => &t.common,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.common().name.as_deref()
    }

    /// CA attributes for root and intermediate CAs.
    #[must_use]
    pub fn certificate_authority(&self) -> Option<&CertificateAuthorityMetadata> {
        match self {
            Self::PrivateCertConfigurationRootCa(c)
            | Self::PrivateCertConfigurationIntermediateCa(c) => Some(&c.metadata),
            _ => None,
        }
    }
}

// ---- prototypes ----------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamCredentialsConfigurationPrototype {
    pub name: String,
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetsEncryptConfigurationPrototype {
    pub name: String,
    pub lets_encrypt_environment: String,
    pub lets_encrypt_private_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lets_encrypt_preferred_chain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicInfrastructureConfigurationPrototype {
    pub name: String,
    pub classic_infrastructure_username: String,
    pub classic_infrastructure_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudInternetServicesConfigurationPrototype {
    pub name: String,
    pub cloud_internet_services_crn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_internet_services_apikey: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCaPrototype {
    pub name: String,
    pub common_name: String,
    pub max_ttl: String,
    #[serde(flatten)]
    pub subject: CaSubject,
    #[serde(flatten)]
    pub crl: CrlSettings,
}

impl RootCaPrototype {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        common_name: impl Into<String>,
        max_ttl: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            common_name: common_name.into(),
            max_ttl: max_ttl.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateCaPrototype {
    pub name: String,
    pub common_name: String,
    pub max_ttl: String,
    /// `internal` signs with `issuer`; `external` produces a CSR.
    pub signing_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(flatten)]
    pub subject: CaSubject,
    #[serde(flatten)]
    pub crl: CrlSettings,
}

impl IntermediateCaPrototype {
    /// An intermediate signed internally by the root CA named `issuer`.
    #[must_use]
    pub fn internal(
        name: impl Into<String>,
        common_name: impl Into<String>,
        max_ttl: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            common_name: common_name.into(),
            max_ttl: max_ttl.into(),
            signing_method: "internal".to_owned(),
            issuer: Some(issuer.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePrototype {
    pub name: String,
    pub certificate_authority: String,
    #[serde(flatten)]
    pub rules: TemplateRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "config_type", rename_all = "snake_case")]
pub enum ConfigurationPrototype {
    IamCredentialsConfiguration(IamCredentialsConfigurationPrototype),
    PublicCertConfigurationCaLetsEncrypt(LetsEncryptConfigurationPrototype),
    PublicCertConfigurationDnsClassicInfrastructure(ClassicInfrastructureConfigurationPrototype),
    PublicCertConfigurationDnsCloudInternetServices(CloudInternetServicesConfigurationPrototype),
    PrivateCertConfigurationRootCa(RootCaPrototype),
    PrivateCertConfigurationIntermediateCa(IntermediateCaPrototype),
    PrivateCertConfigurationTemplate(TemplatePrototype),
}

config_type_family!(ConfigurationPrototype, ConfigurationPrototype);

fn require(value: &str, field: &str) -> Result<(), SecretsManagerError> {
    if value.trim().is_empty() {
        return Err(SecretsManagerError::missing_field(field));
    }
    Ok(())
}

impl ConfigurationPrototype {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::IamCredentialsConfiguration(p) => &p.name,
            Self::PublicCertConfigurationCaLetsEncrypt(p) => &p.name,
            Self::PublicCertConfigurationDnsClassicInfrastructure(p) => &p.name,
            Self::PublicCertConfigurationDnsCloudInternetServices(p) => &p.name,
            Self::PrivateCertConfigurationRootCa(p) => &p.name,
            Self::PrivateCertConfigurationIntermediateCa(p) => &p.name,
            Self::PrivateCertConfigurationTemplate(p) => &p.name,
        }
    }

    /// # Errors
    /// `InvalidArgument` naming the first missing field. An internally
    /// signed intermediate CA also needs an `issuer`.
    pub fn validate(&self) -> Result<(), SecretsManagerError> {
        require(self.name(), "name")?;
        match self {
            Self::IamCredentialsConfiguration(p) => require(&p.api_key, "api_key"),
            Self::PublicCertConfigurationCaLetsEncrypt(p) => {
                require(&p.lets_encrypt_environment, "lets_encrypt_environment")?;
                require(&p.lets_encrypt_private_key, "lets_encrypt_private_key")
            }
            Self::PublicCertConfigurationDnsClassicInfrastructure(p) => {
                require(&p.classic_infrastructure_username, "classic_infrastructure_username")?;
                require(&p.classic_infrastructure_password, "classic_infrastructure_password")
            }
            Self::PublicCertConfigurationDnsCloudInternetServices(p) => {
                require(&p.cloud_internet_services_crn, "cloud_internet_services_crn")
            }
            Self::PrivateCertConfigurationRootCa(p) => {
                require(&p.common_name, "common_name")?;
                require(&p.max_ttl, "max_ttl")
            }
            Self::PrivateCertConfigurationIntermediateCa(p) => {
                require(&p.common_name, "common_name")?;
                require(&p.max_ttl, "max_ttl")?;
                require(&p.signing_method, "signing_method")?;
                if p.signing_method == "internal" {
                    require(p.issuer.as_deref().unwrap_or_default(), "issuer")?;
                }
                Ok(())
            }
            Self::PrivateCertConfigurationTemplate(p) => {
                require(&p.certificate_authority, "certificate_authority")
            }
        }
    }
}

// ---- patches -------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamCredentialsConfigurationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetsEncryptConfigurationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lets_encrypt_environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lets_encrypt_private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lets_encrypt_preferred_chain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicInfrastructureConfigurationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classic_infrastructure_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classic_infrastructure_password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudInternetServicesConfigurationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_internet_services_apikey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_internet_services_crn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateAuthorityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ttl: Option<String>,
    #[serde(flatten)]
    pub crl: CrlSettings,
}

/// Typed partial for `PATCH /configurations/{name}`. Untagged on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigurationPatch {
    IamCredentialsConfiguration(IamCredentialsConfigurationPatch),
    PublicCertConfigurationCaLetsEncrypt(LetsEncryptConfigurationPatch),
    PublicCertConfigurationDnsClassicInfrastructure(ClassicInfrastructureConfigurationPatch),
    PublicCertConfigurationDnsCloudInternetServices(CloudInternetServicesConfigurationPatch),
    PrivateCertConfigurationRootCa(CertificateAuthorityPatch),
    PrivateCertConfigurationIntermediateCa(CertificateAuthorityPatch),
    PrivateCertConfigurationTemplate(TemplateRules),
}

config_type_family!(ConfigurationPatch, ConfigurationPatch);

impl ConfigurationPatch {
    /// The all-unset patch for `config_type`.
    #[must_use]
    pub fn empty(config_type: ConfigType) -> Self {
        match config_type {
            ConfigType::IamCredentialsConfiguration => {
                Self::IamCredentialsConfiguration(IamCredentialsConfigurationPatch::default())
            }
            ConfigType::PublicCertConfigurationCaLetsEncrypt => {
                Self::PublicCertConfigurationCaLetsEncrypt(LetsEncryptConfigurationPatch::default())
            }
            ConfigType::PublicCertConfigurationDnsClassicInfrastructure => {
                Self::PublicCertConfigurationDnsClassicInfrastructure(
                    ClassicInfrastructureConfigurationPatch::default(),
                )
            }
            ConfigType::PublicCertConfigurationDnsCloudInternetServices => {
                Self::PublicCertConfigurationDnsCloudInternetServices(
                    CloudInternetServicesConfigurationPatch::default(),
                )
            }
            ConfigType::PrivateCertConfigurationRootCa => {
                Self::PrivateCertConfigurationRootCa(CertificateAuthorityPatch::default())
            }
            ConfigType::PrivateCertConfigurationIntermediateCa => {
                Self::PrivateCertConfigurationIntermediateCa(CertificateAuthorityPatch::default())
            }
            ConfigType::PrivateCertConfigurationTemplate => {
                Self::PrivateCertConfigurationTemplate(TemplateRules::default())
            }
        }
    }

    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self::empty(self.config_type())
    }
}

/// One page of `GET /configurations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationMetadataPaginatedCollection {
    #[serde(flatten)]
    pub page: PageInfo,
    #[serde(default)]
    pub configurations: Vec<ConfigurationMetadata>,
}

impl Paginated for ConfigurationMetadataPaginatedCollection {
    type Item = ConfigurationMetadata;

    fn page_info(&self) -> &PageInfo {
        &self.page
    }

    fn into_items(self) -> Vec<ConfigurationMetadata> {
        self.configurations
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::family::Polymorphic;
    use serde_json::json;

    #[test]
    fn config_type_names_match_wire() {
        for (t, name) in ConfigType::ALL.iter().zip(ConfigType::NAMES) {
            assert_eq!(t.as_str(), name);
            assert_eq!(serde_json::to_value(t).unwrap(), json!(name));
            assert_eq!(name.parse::<ConfigType>().unwrap(), *t);
        }
    }

    #[test]
    fn root_ca_prototype_encoding() {
        let proto = ConfigurationPrototype::PrivateCertConfigurationRootCa(RootCaPrototype::new(
            "example-root-CA",
            "ibm.com",
            "43830h",
        ));
        assert_eq!(
            serde_json::to_value(&proto).unwrap(),
            json!({
                "config_type": "private_cert_configuration_root_ca",
                "name": "example-root-CA",
                "common_name": "ibm.com",
                "max_ttl": "43830h"
            })
        );
        assert!(proto.validate().is_ok());
        assert_eq!(proto.discriminator(), "private_cert_configuration_root_ca");
    }

    #[test]
    fn internal_intermediate_requires_issuer() {
        let mut proto =
            IntermediateCaPrototype::internal("example-intermediate-CA", "ibm.com", "8760h", "root");
        assert!(
            ConfigurationPrototype::PrivateCertConfigurationIntermediateCa(proto.clone())
                .validate()
                .is_ok()
        );
        proto.issuer = None;
        let err = ConfigurationPrototype::PrivateCertConfigurationIntermediateCa(proto)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: issuer must be provided");
    }

    #[test]
    fn decodes_intermediate_with_material() {
        let config: Configuration = serde_json::from_value(json!({
            "config_type": "private_cert_configuration_intermediate_ca",
            "name": "example-intermediate-CA",
            "secret_type": "private_cert",
            "common_name": "ibm.com",
            "status": "signing_required",
            "signing_method": "internal",
            "issuer": "example-root-CA",
            "crl_disable": false,
            "data": {"csr": "-----BEGIN CERTIFICATE REQUEST-----"}
        }))
        .unwrap();
        assert_eq!(config.name(), Some("example-intermediate-CA"));
        let ca = config.certificate_authority().unwrap();
        assert_eq!(ca.status.as_deref(), Some("signing_required"));
        assert_eq!(ca.issuer.as_deref(), Some("example-root-CA"));
        assert_eq!(ca.crl.crl_disable, Some(false));
    }

    #[test]
    fn patch_is_untagged() {
        let patch = ConfigurationPatch::PrivateCertConfigurationRootCa(CertificateAuthorityPatch {
            max_ttl: Some("8760h".into()),
            ..CertificateAuthorityPatch::default()
        });
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"max_ttl": "8760h"}));
        assert_eq!(serde_json::to_value(patch.empty_like()).unwrap(), json!({}));
    }
}
