use secrets_http::HttpError;
use secrets_manager_sdk::{SecretsManagerError, ServiceProblem};

/// Classify a transport failure into the operation error taxonomy.
///
/// Both the per-attempt timeout and the per-call deadline surface as
/// `Timeout`; request construction failures are caller input problems.
pub fn map_http_error(err: HttpError) -> SecretsManagerError {
    match err {
        HttpError::Timeout(elapsed) | HttpError::DeadlineExceeded(elapsed) => {
            SecretsManagerError::Timeout(elapsed)
        }
        HttpError::Auth(source) => SecretsManagerError::Unauthenticated {
            message: source.to_string(),
            problem: None,
        },
        HttpError::HttpStatus {
            status,
            body_preview,
            retry_after,
            ..
        } => SecretsManagerError::from_problem(
            ServiceProblem::from_body(status.as_u16(), body_preview.as_bytes()),
            retry_after,
        ),
        HttpError::Json(e) => SecretsManagerError::Decode {
            path: "$".to_owned(),
            reason: e.to_string(),
        },
        e @ (HttpError::RequestBuild(_)
        | HttpError::InvalidHeaderName(_)
        | HttpError::InvalidHeaderValue(_)
        | HttpError::InvalidUri { .. }
        | HttpError::InvalidScheme { .. }) => SecretsManagerError::invalid_argument(e.to_string()),
        other => SecretsManagerError::Transport(Box::new(other)),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn deadline_becomes_timeout() {
        let err = map_http_error(HttpError::DeadlineExceeded(Duration::from_secs(2)));
        assert!(matches!(err, SecretsManagerError::Timeout(d) if d == Duration::from_secs(2)));
        assert!(err.is_retriable());
    }

    #[test]
    fn token_failure_is_unauthenticated() {
        let err = map_http_error(HttpError::Auth("IAM token HTTP 400".into()));
        assert!(matches!(
            err,
            SecretsManagerError::Unauthenticated { ref message, problem: None }
                if message == "IAM token HTTP 400"
        ));
    }

    #[test]
    fn status_error_keeps_service_problem() {
        let err = map_http_error(HttpError::HttpStatus {
            status: http::StatusCode::CONFLICT,
            body_preview: r#"{"errors":[{"code":"conflict","message":"lock exists"}],"trace":"t-1"}"#
                .to_owned(),
            content_type: Some("application/json".to_owned()),
            retry_after: None,
        });
        let problem = err.problem().unwrap();
        assert_eq!(problem.status, 409);
        assert_eq!(problem.message(), "lock exists");
        assert_eq!(problem.trace.as_deref(), Some("t-1"));
        assert!(matches!(err, SecretsManagerError::Conflict(_)));
    }

    #[test]
    fn bad_scheme_is_invalid_argument() {
        let err = map_http_error(HttpError::InvalidScheme {
            scheme: "ftp".to_owned(),
            reason: "only http:// and https:// are supported".to_owned(),
        });
        assert!(matches!(err, SecretsManagerError::InvalidArgument(_)));
    }

    #[test]
    fn connect_failure_is_transport() {
        let err = map_http_error(HttpError::Connect("connection refused".into()));
        assert!(matches!(err, SecretsManagerError::Transport(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
