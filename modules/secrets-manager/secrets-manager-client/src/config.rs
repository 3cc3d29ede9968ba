//! Service properties from the environment and the credentials file.
//!
//! Keys are read under the `<SERVICE>_` prefix (`SECRETS_MANAGER_` by
//! default): `URL`, `AUTH_TYPE`, `APIKEY`, `AUTH_URL`, `BEARER_TOKEN` and
//! `DISABLE_SSL`. When `IBM_CREDENTIALS_FILE` names a file of `KEY=VALUE`
//! lines, its values take precedence over the environment.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use figment::providers::Env;
use secrets_auth::{DEFAULT_IAM_URL, SecretString, TokenError};
use secrets_http::HttpError;
use secrets_manager_sdk::SecretsManagerError;
use thiserror::Error;

/// Service name whose upper-cased form prefixes every key.
pub const DEFAULT_SERVICE_NAME: &str = "secrets_manager";

/// Variable naming the credentials file.
pub const CREDENTIALS_FILE_VAR: &str = "IBM_CREDENTIALS_FILE";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("service URL is not configured (URL)")]
    MissingUrl,

    #[error("auth type iam requires an API key (APIKEY)")]
    MissingApiKey,

    #[error("auth type bearerToken requires a token (BEARER_TOKEN)")]
    MissingBearerToken,

    #[error("unknown auth type '{0}': expected iam, bearerToken or noAuth")]
    UnknownAuthType(String),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("cannot read credentials file {path}: {reason}")]
    CredentialsFile { path: String, reason: String },

    #[error("DISABLE_SSL is only honoured in debug builds")]
    InsecureTransport,

    #[error(transparent)]
    Auth(#[from] TokenError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Client(#[from] SecretsManagerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    /// API key exchanged for a token at the IAM identity service.
    #[default]
    Iam,
    /// Caller-supplied bearer token.
    BearerToken,
    /// No `Authorization` header.
    NoAuth,
}

impl AuthType {
    /// Parse an `AUTH_TYPE` value, case-insensitively.
    ///
    /// # Errors
    /// `UnknownAuthType` for anything but `iam`, `bearerToken` and `noAuth`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "iam" => Ok(Self::Iam),
            "bearertoken" => Ok(Self::BearerToken),
            "noauth" => Ok(Self::NoAuth),
            _ => Err(ConfigError::UnknownAuthType(raw.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Iam => "iam",
            Self::BearerToken => "bearerToken",
            Self::NoAuth => "noAuth",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated settings of one service instance.
///
/// `Debug` leaves out the credentials.
#[derive(Clone)]
pub struct ServiceProperties {
    pub url: String,
    pub auth_type: AuthType,
    pub apikey: Option<SecretString>,
    pub auth_url: String,
    pub bearer_token: Option<SecretString>,
    /// Accept a plain `http://` service URL.
    pub disable_ssl: bool,
    flat: BTreeMap<String, String>,
}

impl fmt::Debug for ServiceProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProperties")
            .field("url", &self.url)
            .field("auth_type", &self.auth_type)
            .field("auth_url", &self.auth_url)
            .field("disable_ssl", &self.disable_ssl)
            .finish_non_exhaustive()
    }
}

impl ServiceProperties {
    /// Load the properties of [`DEFAULT_SERVICE_NAME`].
    ///
    /// # Errors
    /// See [`Self::load_for`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_for(DEFAULT_SERVICE_NAME)
    }

    /// Load and validate the properties of `service_name`.
    ///
    /// # Errors
    /// `CredentialsFile` when the credentials file cannot be read, and the
    /// validation errors of [`Self::from_flat`].
    pub fn load_for(service_name: &str) -> Result<Self, ConfigError> {
        Self::from_flat(load_flat(service_name)?)
    }

    /// Validate a flat `KEY -> value` mapping (keys without the prefix).
    ///
    /// # Errors
    /// `MissingUrl`; `MissingApiKey` for `iam`; `MissingBearerToken` for
    /// `bearerToken`; `UnknownAuthType` and `InvalidValue` for malformed
    /// values.
    pub fn from_flat(flat: BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            flat.get(key)
                .map(String::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let url = get("URL").ok_or(ConfigError::MissingUrl)?.to_owned();
        let apikey = get("APIKEY").map(SecretString::new);
        let bearer_token = get("BEARER_TOKEN").map(SecretString::new);
        let auth_type = match get("AUTH_TYPE") {
            Some(raw) => AuthType::parse(raw)?,
            None if apikey.is_none() && bearer_token.is_some() => AuthType::BearerToken,
            None => AuthType::Iam,
        };
        match auth_type {
            AuthType::Iam if apikey.is_none() => return Err(ConfigError::MissingApiKey),
            AuthType::BearerToken if bearer_token.is_none() => {
                return Err(ConfigError::MissingBearerToken);
            }
            _ => {}
        }
        let disable_ssl = match get("DISABLE_SSL") {
            None => false,
            Some(raw) if raw.eq_ignore_ascii_case("true") => true,
            Some(raw) if raw.eq_ignore_ascii_case("false") => false,
            Some(raw) => {
                return Err(ConfigError::InvalidValue {
                    key: "DISABLE_SSL".to_owned(),
                    value: raw.to_owned(),
                });
            }
        };
        let auth_url = get("AUTH_URL").unwrap_or(DEFAULT_IAM_URL).to_owned();

        Ok(Self {
            url,
            auth_type,
            apikey,
            auth_url,
            bearer_token,
            disable_ssl,
            flat,
        })
    }

    /// Every key found, as read.
    #[must_use]
    pub fn flat(&self) -> &BTreeMap<String, String> {
        &self.flat
    }
}

/// Collect the raw `KEY -> value` mapping for `service_name`.
///
/// Values are kept exactly as written: nothing is parsed as a number, list
/// or table.
///
/// # Errors
/// `CredentialsFile` when the named file cannot be read or parsed.
pub fn load_flat(service_name: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let prefix = format!("{}_", service_name.to_ascii_uppercase());
    let mut flat: BTreeMap<String, String> = Env::prefixed(&prefix)
        .iter()
        .map(|(key, value)| (key.as_str().to_ascii_uppercase(), value))
        .collect();

    if let Some(path) = std::env::var_os(CREDENTIALS_FILE_VAR).filter(|p| !p.is_empty()) {
        flat.extend(read_credentials_file(Path::new(&path), &prefix)?);
    }
    Ok(flat)
}

fn read_credentials_file(
    path: &Path,
    prefix: &str,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let file_error = |reason: String| ConfigError::CredentialsFile {
        path: path.display().to_string(),
        reason,
    };
    let mut values = BTreeMap::new();
    for item in dotenvy::from_path_iter(path).map_err(|e| file_error(e.to_string()))? {
        let (key, value) = item.map_err(|e| file_error(e.to_string()))?;
        if let Some(name) = key.to_ascii_uppercase().strip_prefix(prefix) {
            values.insert(name.to_owned(), value);
        }
    }
    tracing::debug!(
        path = %path.display(),
        keys = values.len(),
        "loaded credentials file"
    );
    Ok(values)
}
