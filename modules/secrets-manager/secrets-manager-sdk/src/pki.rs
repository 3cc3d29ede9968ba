//! Signing lifecycle of private certificate authorities.
//!
//! Hierarchy: root CA, intermediate CA (signed by a root), template (issues
//! from a CA), issued `private_cert` secret. References between the levels
//! are by configuration name.

use std::fmt;

use crate::error::SecretsManagerError;
use crate::models::configurations::{CertificateAuthorityMetadata, ConfigurationMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningState {
    Unsigned,
    Signed,
    Revoked,
    Expired,
}

impl SigningState {
    /// Map a CA configuration `status`. Statuses outside the signing
    /// lifecycle (such as `pending`) give `None`.
    #[must_use]
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "signing_required" => Some(Self::Unsigned),
            "signed_certificate" | "configured" => Some(Self::Signed),
            "revoked" => Some(Self::Revoked),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    #[must_use]
    pub fn of(ca: &CertificateAuthorityMetadata) -> Option<Self> {
        ca.status.as_deref().and_then(Self::from_status)
    }

    /// State of a root or intermediate CA configuration.
    #[must_use]
    pub fn of_configuration(config: &ConfigurationMetadata) -> Option<Self> {
        config.certificate_authority().and_then(Self::of)
    }

    /// Only a signed CA can sign intermediates or issue certificates.
    #[must_use]
    pub fn can_issue(self) -> bool {
        self == Self::Signed
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unsigned => "unsigned",
            Self::Signed => "signed",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for SigningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Signed internally by a root CA.
    SignIntermediate,
    /// Externally signed certificate uploaded.
    SetSigned,
    Revoke,
    Expire,
}

impl Transition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignIntermediate => "sign",
            Self::SetSigned => "set the signed certificate of",
            Self::Revoke => "revoke",
            Self::Expire => "expire",
        }
    }
}

/// Next state of a CA, or `PreconditionFailed` when the transition is not
/// allowed from `from`.
///
/// # Errors
/// `PreconditionFailed` for any transition outside
/// unsigned -> signed -> (revoked | expired).
pub fn transition(from: SigningState, event: Transition) -> Result<SigningState, SecretsManagerError> {
    match (from, event) {
        (SigningState::Unsigned, Transition::SignIntermediate | Transition::SetSigned) => {
            Ok(SigningState::Signed)
        }
        (SigningState::Signed, Transition::Revoke) => Ok(SigningState::Revoked),
        (SigningState::Signed, Transition::Expire) => Ok(SigningState::Expired),
        (state, event) => Err(SecretsManagerError::precondition(format!(
            "cannot {} a CA that is {state}",
            event.as_str()
        ))),
    }
}

/// Check that `intermediate` may be signed by the root CA `root`.
///
/// `root` is optional: when the caller has not fetched it, only the
/// intermediate's own state is checked.
///
/// # Errors
/// `PreconditionFailed` when the intermediate is not awaiting a signature or
/// the root cannot issue.
pub fn check_sign_intermediate(
    intermediate: &CertificateAuthorityMetadata,
    root: Option<&CertificateAuthorityMetadata>,
) -> Result<(), SecretsManagerError> {
    let name = intermediate.common.name.as_deref().unwrap_or("intermediate CA");
    let Some(state) = SigningState::of(intermediate) else {
        return Err(SecretsManagerError::precondition(format!(
            "{name} has no signing status"
        )));
    };
    transition(state, Transition::SignIntermediate).map_err(|_| {
        SecretsManagerError::precondition(format!("{name} is already {state}"))
    })?;
    if let Some(root) = root {
        let root_state = SigningState::of(root);
        if !root_state.is_some_and(SigningState::can_issue) {
            let root_name = root.common.name.as_deref().unwrap_or("root CA");
            return Err(SecretsManagerError::precondition(format!(
                "{root_name} cannot sign: not in signed state"
            )));
        }
    }
    Ok(())
}
