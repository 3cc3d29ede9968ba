//! Error taxonomy for Secrets Manager operations.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Upper bound on the raw body kept in a [`ServiceProblem`].
pub const RAW_BODY_PREVIEW_LIMIT: usize = 4 * 1024;

/// Object an error entry refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorTarget {
    #[serde(rename = "type")]
    pub target_type: String,
    pub name: String,
}

/// One entry of the service's `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ErrorTarget>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    trace: Option<String>,
}

/// Diagnostic attached to every status-derived error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceProblem {
    /// HTTP status of the response.
    pub status: u16,
    pub errors: Vec<ErrorDetail>,
    /// `status_code` as reported inside the body, if any.
    pub status_code: Option<u16>,
    /// Opaque service trace identifier, forwarded unchanged.
    pub trace: Option<String>,
    /// Start of the raw response body.
    pub raw: String,
}

impl ServiceProblem {
    /// Decode an error body. Bodies that are not the documented JSON shape
    /// still produce a problem with an empty `errors` list and the raw text.
    #[must_use]
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let raw = preview(body);
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => Self {
                status,
                errors: parsed.errors,
                status_code: parsed.status_code,
                trace: parsed.trace,
                raw,
            },
            Err(_) => Self {
                status,
                errors: Vec::new(),
                status_code: None,
                trace: None,
                raw,
            },
        }
    }

    /// First error message, or the raw body when the service sent none.
    #[must_use]
    pub fn message(&self) -> &str {
        self.errors
            .first()
            .map(|e| e.message.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or(self.raw.as_str())
    }

    /// First error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.errors.first().map(|e| e.code.as_str())
    }
}

impl std::fmt::Display for ServiceProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code() {
            Some(code) if !code.is_empty() => {
                write!(f, "HTTP {} [{code}]: {}", self.status, self.message())
            }
            _ => write!(f, "HTTP {}: {}", self.status, self.message()),
        }
    }
}

fn preview(body: &[u8]) -> String {
    let end = body.len().min(RAW_BODY_PREVIEW_LIMIT);
    String::from_utf8_lossy(&body[..end]).into_owned()
}

/// Error type for all Secrets Manager operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SecretsManagerError {
    /// Rejected client-side before anything was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// 401, or no token could be obtained.
    #[error("unauthenticated: {message}")]
    Unauthenticated {
        message: String,
        problem: Option<Box<ServiceProblem>>,
    },

    #[error("forbidden: {0}")]
    Forbidden(Box<ServiceProblem>),

    #[error("not found: {0}")]
    NotFound(Box<ServiceProblem>),

    #[error("conflict: {0}")]
    Conflict(Box<ServiceProblem>),

    /// 412, or a state rule checked locally (for example signing a CA that
    /// is already signed).
    #[error("precondition failed: {message}")]
    PreconditionFailed {
        message: String,
        problem: Option<Box<ServiceProblem>>,
    },

    #[error("rate limited: {problem}")]
    RateLimited {
        problem: Box<ServiceProblem>,
        retry_after: Option<Duration>,
    },

    /// Any other non-success status (5xx and unmapped 4xx).
    #[error("service error: {0}")]
    ServiceError(Box<ServiceProblem>),

    /// The per-call deadline elapsed.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("failed to encode field '{field}': {reason}")]
    Encode { field: String, reason: String },

    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("unknown {family} variant '{discriminator}'")]
    UnknownVariant {
        family: String,
        discriminator: String,
    },
}

impl SecretsManagerError {
    /// Classify a non-success response.
    ///
    /// The service `trace` is logged at debug level unchanged.
    #[must_use]
    pub fn from_problem(problem: ServiceProblem, retry_after: Option<Duration>) -> Self {
        tracing::debug!(
            status = problem.status,
            trace = problem.trace.as_deref().unwrap_or(""),
            code = problem.code().unwrap_or(""),
            "service returned error"
        );
        let problem = Box::new(problem);
        match problem.status {
            401 => Self::Unauthenticated {
                message: problem.message().to_owned(),
                problem: Some(problem),
            },
            403 => Self::Forbidden(problem),
            404 => Self::NotFound(problem),
            409 => Self::Conflict(problem),
            412 => Self::PreconditionFailed {
                message: problem.message().to_owned(),
                problem: Some(problem),
            },
            429 => Self::RateLimited {
                problem,
                retry_after,
            },
            _ => Self::ServiceError(problem),
        }
    }

    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    #[must_use]
    pub fn missing_field(field: &str) -> Self {
        Self::InvalidArgument(format!("{field} must be provided"))
    }

    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            message: message.into(),
            problem: None,
        }
    }

    /// HTTP status for errors that came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.problem().map(|p| p.status)
    }

    #[must_use]
    pub fn problem(&self) -> Option<&ServiceProblem> {
        match self {
            Self::Forbidden(p) | Self::NotFound(p) | Self::Conflict(p) | Self::ServiceError(p) => {
                Some(p.as_ref())
            }
            Self::RateLimited { problem, .. } => Some(problem.as_ref()),
            Self::Unauthenticated { problem, .. } | Self::PreconditionFailed { problem, .. } => {
                problem.as_deref()
            }
            _ => None,
        }
    }

    /// Whether the failure belongs to the classes the transport retries.
    ///
    /// Seeing one here means the retry budget was already spent.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Transport(_) => true,
            Self::ServiceError(p) => matches!(p.status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const NOT_FOUND_BODY: &str = r#"{
        "errors": [{
            "code": "secrets_manager.secret_not_found",
            "message": "Secret not found",
            "more_info": "https://cloud.example.com/apidocs",
            "target": {"type": "field", "name": "id"}
        }],
        "status_code": 404,
        "trace": "7d2c8a3e-trace"
    }"#;

    #[test]
    fn decodes_documented_error_shape() {
        let problem = ServiceProblem::from_body(404, NOT_FOUND_BODY.as_bytes());
        assert_eq!(problem.status_code, Some(404));
        assert_eq!(problem.trace.as_deref(), Some("7d2c8a3e-trace"));
        assert_eq!(problem.message(), "Secret not found");
        let target = problem.errors[0].target.as_ref().unwrap();
        assert_eq!(target.target_type, "field");
        assert_eq!(target.name, "id");
    }

    #[test]
    fn non_json_body_is_kept_raw() {
        let problem = ServiceProblem::from_body(502, b"<html>bad gateway</html>");
        assert!(problem.errors.is_empty());
        assert_eq!(problem.message(), "<html>bad gateway</html>");
    }

    #[test]
    fn raw_preview_is_bounded() {
        let body = vec![b'x'; RAW_BODY_PREVIEW_LIMIT * 2];
        let problem = ServiceProblem::from_body(500, &body);
        assert_eq!(problem.raw.len(), RAW_BODY_PREVIEW_LIMIT);
    }

    #[test]
    fn status_mapping() {
        let classify = |status| {
            SecretsManagerError::from_problem(ServiceProblem::from_body(status, b"{}"), None)
        };
        assert!(matches!(classify(401), SecretsManagerError::Unauthenticated { .. }));
        assert!(matches!(classify(403), SecretsManagerError::Forbidden(_)));
        assert!(matches!(classify(404), SecretsManagerError::NotFound(_)));
        assert!(matches!(classify(409), SecretsManagerError::Conflict(_)));
        assert!(matches!(classify(412), SecretsManagerError::PreconditionFailed { .. }));
        assert!(matches!(classify(429), SecretsManagerError::RateLimited { .. }));
        assert!(matches!(classify(400), SecretsManagerError::ServiceError(_)));
        assert!(matches!(classify(503), SecretsManagerError::ServiceError(_)));
    }

    #[test]
    fn helpers_expose_problem() {
        let err = SecretsManagerError::from_problem(
            ServiceProblem::from_body(404, NOT_FOUND_BODY.as_bytes()),
            None,
        );
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.problem().unwrap().code(), Some("secrets_manager.secret_not_found"));
        assert!(!err.is_retriable());
        assert_eq!(
            err.to_string(),
            "not found: HTTP 404 [secrets_manager.secret_not_found]: Secret not found"
        );
    }

    #[test]
    fn retriable_classes() {
        let five = |status| {
            SecretsManagerError::from_problem(ServiceProblem::from_body(status, b""), None)
        };
        assert!(five(503).is_retriable());
        assert!(!five(501).is_retriable());
        assert!(SecretsManagerError::Timeout(Duration::from_secs(1)).is_retriable());
        assert!(!SecretsManagerError::missing_field("id").is_retriable());
        assert_eq!(SecretsManagerError::missing_field("id").status(), None);
    }
}
