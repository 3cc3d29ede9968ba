use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::time::{Duration, SystemTime};

/// Upper bound on the error body kept in `HttpError::HttpStatus` (8 KiB).
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Boxed, type-erased response body.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// Parse `Retry-After` as delay-seconds or an HTTP-date (RFC 9110 section 10.2.3).
///
/// Negative seconds, unparseable values and dates in the past yield `None`.
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<i64>() {
        return u64::try_from(seconds).ok().map(Duration::from_secs);
    }

    let at = httpdate::parse_http_date(value).ok()?;
    at.duration_since(SystemTime::now()).ok()
}

/// Response whose body has not been read yet
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Turn a non-2xx status into `HttpError::HttpStatus` without reading the body.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` for non-success statuses
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.inner.status().is_success() {
            return Ok(self);
        }
        Err(HttpError::HttpStatus {
            status: self.inner.status(),
            body_preview: String::new(),
            content_type: content_type(self.inner.headers()),
            retry_after: parse_retry_after(self.inner.headers()),
        })
    }

    /// Read the whole body regardless of status, bounded by `max_body_size`.
    ///
    /// # Errors
    /// `BodyTooLarge` past the limit, `Transport` on read failure
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        read_body_limited(self.inner, self.max_body_size).await
    }

    /// Read the body, failing with `HttpStatus` (carrying a body preview) on non-2xx.
    ///
    /// # Errors
    /// `HttpStatus` for non-success statuses, plus the errors of [`Self::bytes`]
    pub async fn checked_bytes(self) -> Result<Bytes, HttpError> {
        let status = self.inner.status();
        if status.is_success() {
            return self.bytes().await;
        }

        let content_type = content_type(self.inner.headers());
        let retry_after = parse_retry_after(self.inner.headers());
        let preview_limit = self.max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
        let body_preview = match read_body_limited(self.inner, preview_limit).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
            Err(e) => return Err(e),
        };
        Err(HttpError::HttpStatus {
            status,
            body_preview,
            content_type,
            retry_after,
        })
    }

    /// # Errors
    /// Errors of [`Self::checked_bytes`], or `Json` if the body does not decode
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = self.checked_bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// # Errors
    /// Errors of [`Self::checked_bytes`]
    pub async fn text(self) -> Result<String, HttpError> {
        let body = self.checked_bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn read_body_limited(
    response: Response<ResponseBody>,
    limit: usize,
) -> Result<Bytes, HttpError> {
    let mut body = std::pin::pin!(response.into_body());
    let mut collected = Vec::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            let actual = collected.len() + chunk.len();
            if actual > limit {
                return Err(HttpError::BodyTooLarge { limit, actual });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::RETRY_AFTER, value.parse().unwrap());
        headers
    }

    fn response(status: u16, body: &'static str) -> HttpResponse {
        let body: ResponseBody = Full::new(Bytes::from_static(body.as_bytes()))
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })
            .boxed();
        HttpResponse {
            inner: Response::builder()
                .status(status)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
            max_body_size: 64,
        }
    }

    #[test]
    fn retry_after_seconds() {
        assert_eq!(
            parse_retry_after(&headers_with(" 12 ")),
            Some(Duration::from_secs(12))
        );
    }

    #[test]
    fn retry_after_rejects_negative_and_garbage() {
        assert_eq!(parse_retry_after(&headers_with("-5")), None);
        assert_eq!(parse_retry_after(&headers_with("soon")), None);
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }

    #[test]
    fn retry_after_http_date() {
        let future = SystemTime::now() + Duration::from_secs(90);
        let headers = headers_with(&httpdate::fmt_http_date(future));
        let delay = parse_retry_after(&headers).unwrap();
        assert!(delay <= Duration::from_secs(90));
        assert!(delay >= Duration::from_secs(85));

        let past = headers_with("Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(parse_retry_after(&past), None);
    }

    #[tokio::test]
    async fn checked_bytes_keeps_error_preview() {
        let err = response(404, r#"{"errors":[]}"#)
            .checked_bytes()
            .await
            .unwrap_err();
        match err {
            HttpError::HttpStatus {
                status,
                body_preview,
                content_type,
                ..
            } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body_preview, r#"{"errors":[]}"#);
                assert_eq!(content_type.as_deref(), Some("application/json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn body_limit_is_enforced() {
        let long = "x".repeat(100);
        let body: ResponseBody = Full::new(Bytes::from(long))
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })
            .boxed();
        let resp = HttpResponse {
            inner: Response::new(body),
            max_body_size: 10,
        };
        assert!(matches!(
            resp.bytes().await,
            Err(HttpError::BodyTooLarge { limit: 10, .. })
        ));
    }

    #[tokio::test]
    async fn json_decodes_success_body() {
        let value: serde_json::Value = response(200, r#"{"ok":true}"#).json().await.unwrap();
        assert_eq!(value["ok"], true);
    }
}
