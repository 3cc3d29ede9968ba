//! Action commands and their results.
//!
//! Actions are not stored. Each prototype is sent with `POST .../actions` and
//! the service answers with the matching result variant.

use serde::{Deserialize, Serialize};

use super::configurations::CaSubject;
use crate::error::SecretsManagerError;
use crate::family::{Family, Polymorphic};

/// Implements `action_type()` and [`Polymorphic`] from a variant to
/// discriminator table.
macro_rules! action_family {
    ($ty:ident, $family:ident, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const NAMES: &'static [&'static str] = &[$($name),+];

            #[must_use]
            pub fn action_type(&self) -> &'static str {
                match self {
                    $(Self::$variant { .. } => $name,)+
                }
            }
        }

        impl Polymorphic for $ty {
            const FAMILY: Family = Family::$family;
            const DISCRIMINATORS: &'static [&'static str] = Self::NAMES;

            fn discriminator(&self) -> &'static str {
                self.action_type()
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_time_seconds: Option<i64>,
}

// ---- secret actions ------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type")]
pub enum SecretActionPrototype {
    /// Ask the service to check the DNS challenge of a pending public certificate.
    #[serde(rename = "public_cert_action_validate_dns_challenge")]
    ValidateDnsChallenge,
    #[serde(rename = "private_cert_action_revoke_certificate")]
    RevokeCertificate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type")]
pub enum SecretAction {
    #[serde(rename = "public_cert_action_validate_dns_challenge")]
    ValidateDnsChallenge,
    #[serde(rename = "private_cert_action_revoke_certificate")]
    RevokeCertificate(RevocationResult),
}

action_family!(SecretActionPrototype, SecretActionPrototype, {
    ValidateDnsChallenge => "public_cert_action_validate_dns_challenge",
    RevokeCertificate => "private_cert_action_revoke_certificate",
});

action_family!(SecretAction, SecretAction, {
    ValidateDnsChallenge => "public_cert_action_validate_dns_challenge",
    RevokeCertificate => "private_cert_action_revoke_certificate",
});

// ---- version actions -----------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type")]
pub enum SecretVersionActionPrototype {
    #[serde(rename = "private_cert_action_revoke_certificate")]
    RevokeCertificate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type")]
pub enum SecretVersionAction {
    #[serde(rename = "private_cert_action_revoke_certificate")]
    RevokeCertificate(RevocationResult),
}

action_family!(SecretVersionActionPrototype, SecretVersionActionPrototype, {
    RevokeCertificate => "private_cert_action_revoke_certificate",
});

action_family!(SecretVersionAction, SecretVersionAction, {
    RevokeCertificate => "private_cert_action_revoke_certificate",
});

// ---- configuration actions -----------------------------------------------

/// Overrides applied when a CA signs a CSR or an intermediate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_csr_values: Option<bool>,
    #[serde(flatten)]
    pub subject: CaSubject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignedCertificateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuing_ca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_chain: Option<Vec<String>>,
    /// Expiry as a Unix timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignCsrPrototype {
    pub csr: String,
    #[serde(flatten)]
    pub params: SigningParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignIntermediatePrototype {
    /// Name of the intermediate CA configuration to sign.
    pub intermediate_certificate_authority: String,
    #[serde(flatten)]
    pub params: SigningParameters,
}

impl SignIntermediatePrototype {
    #[must_use]
    pub fn new(intermediate: impl Into<String>) -> Self {
        Self {
            intermediate_certificate_authority: intermediate.into(),
            params: SigningParameters::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSignedPrototype {
    /// PEM certificate signed by an external CA.
    pub certificate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type")]
pub enum ConfigurationActionPrototype {
    #[serde(rename = "private_cert_configuration_action_revoke_ca_certificate")]
    RevokeCaCertificate,
    #[serde(rename = "private_cert_configuration_action_sign_csr")]
    SignCsr(SignCsrPrototype),
    #[serde(rename = "private_cert_configuration_action_sign_intermediate")]
    SignIntermediate(SignIntermediatePrototype),
    #[serde(rename = "private_cert_configuration_action_set_signed")]
    SetSigned(SetSignedPrototype),
    #[serde(rename = "private_cert_configuration_action_rotate_crl")]
    RotateCrl,
}

impl ConfigurationActionPrototype {
    /// # Errors
    /// `InvalidArgument` when the action misses its required input.
    pub fn validate(&self) -> Result<(), SecretsManagerError> {
        match self {
            Self::SignCsr(p) if p.csr.trim().is_empty() => {
                Err(SecretsManagerError::missing_field("csr"))
            }
            Self::SignIntermediate(p) if p.intermediate_certificate_authority.trim().is_empty() => {
                Err(SecretsManagerError::missing_field(
                    "intermediate_certificate_authority",
                ))
            }
            Self::SetSigned(p) if p.certificate.trim().is_empty() => {
                Err(SecretsManagerError::missing_field("certificate"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignCsrResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csr: Option<String>,
    #[serde(flatten)]
    pub params: SigningParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SignedCertificateData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignIntermediateResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediate_certificate_authority: Option<String>,
    #[serde(flatten)]
    pub params: SigningParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SignedCertificateData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetSignedResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SignedCertificateData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateCrlResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type")]
pub enum ConfigurationAction {
    #[serde(rename = "private_cert_configuration_action_revoke_ca_certificate")]
    RevokeCaCertificate(RevocationResult),
    #[serde(rename = "private_cert_configuration_action_sign_csr")]
    SignCsr(SignCsrResult),
    #[serde(rename = "private_cert_configuration_action_sign_intermediate")]
    SignIntermediate(SignIntermediateResult),
    #[serde(rename = "private_cert_configuration_action_set_signed")]
    SetSigned(SetSignedResult),
    #[serde(rename = "private_cert_configuration_action_rotate_crl")]
    RotateCrl(RotateCrlResult),
}

action_family!(ConfigurationActionPrototype, ConfigurationActionPrototype, {
    RevokeCaCertificate => "private_cert_configuration_action_revoke_ca_certificate",
    SignCsr => "private_cert_configuration_action_sign_csr",
    SignIntermediate => "private_cert_configuration_action_sign_intermediate",
    SetSigned => "private_cert_configuration_action_set_signed",
    RotateCrl => "private_cert_configuration_action_rotate_crl",
});

action_family!(ConfigurationAction, ConfigurationAction, {
    RevokeCaCertificate => "private_cert_configuration_action_revoke_ca_certificate",
    SignCsr => "private_cert_configuration_action_sign_csr",
    SignIntermediate => "private_cert_configuration_action_sign_intermediate",
    SetSigned => "private_cert_configuration_action_set_signed",
    RotateCrl => "private_cert_configuration_action_rotate_crl",
});
