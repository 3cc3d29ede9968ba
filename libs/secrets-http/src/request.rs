use crate::client::{BufferedService, map_buffer_error, try_acquire_buffer_slot};
use crate::config::{MERGE_PATCH_CONTENT_TYPE, TransportSecurity};
use crate::error::{HttpError, InvalidUriKind};
use crate::response::HttpResponse;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::Request;
use http_body_util::Full;
use serde::Serialize;
use std::time::Duration;
use tower::Service;

#[derive(Clone, Debug)]
enum Body {
    Empty,
    Typed(&'static str, Bytes),
    Raw(Bytes),
}

/// Request under construction
///
/// Header errors are deferred and reported by `json()`/`form()` or `send()`,
/// so calls can be chained without intermediate `?`.
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    method: http::Method,
    url: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Body,
    error: Option<HttpError>,
    transport_security: TransportSecurity,
    client_deadline: Option<Duration>,
    call_deadline: Option<Duration>,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        method: http::Method,
        url: String,
        transport_security: TransportSecurity,
        client_deadline: Option<Duration>,
    ) -> Self {
        Self {
            service,
            max_body_size,
            method,
            url,
            headers: Vec::new(),
            body: Body::Empty,
            error: None,
            transport_security,
            client_deadline,
            call_deadline: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => self.headers.push((name, value)),
            (Err(e), _) => self.error = Some(HttpError::InvalidHeaderName(e)),
            (_, Err(e)) => self.error = Some(HttpError::InvalidHeaderValue(e)),
        }
        self
    }

    pub fn headers<'a>(mut self, headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        for (name, value) in headers {
            self = self.header(name, value);
        }
        self
    }

    /// Deadline for this call across all attempts. The client's total
    /// timeout still applies when it is shorter.
    pub fn timeout(mut self, deadline: Duration) -> Self {
        self.call_deadline = Some(deadline);
        self
    }

    /// # Errors
    /// A deferred header error, or `Json` if serialization fails
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, HttpError> {
        self.typed_json("application/json", body)
    }

    /// JSON body sent as `application/merge-patch+json`.
    ///
    /// # Errors
    /// A deferred header error, or `Json` if serialization fails
    pub fn merge_patch<T: Serialize + ?Sized>(self, patch: &T) -> Result<Self, HttpError> {
        self.typed_json(MERGE_PATCH_CONTENT_TYPE, patch)
    }

    fn typed_json<T: Serialize + ?Sized>(
        mut self,
        content_type: &'static str,
        body: &T,
    ) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        let bytes = serde_json::to_vec(body)?;
        self.body = Body::Typed(content_type, Bytes::from(bytes));
        Ok(self)
    }

    /// # Errors
    /// A deferred header error, or `FormEncode` if encoding fails
    pub fn form(mut self, fields: &[(&str, &str)]) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        let encoded = serde_urlencoded::to_string(fields)?;
        self.body = Body::Typed("application/x-www-form-urlencoded", Bytes::from(encoded));
        Ok(self)
    }

    pub fn body_bytes(mut self, body: Bytes) -> Self {
        self.body = Body::Raw(body);
        self
    }

    fn validate_url(&self) -> Result<http::Uri, HttpError> {
        let invalid = |kind, reason: String| HttpError::InvalidUri {
            url: self.url.clone(),
            kind,
            reason,
        };

        let uri: http::Uri = self
            .url
            .parse()
            .map_err(|e: http::uri::InvalidUri| invalid(InvalidUriKind::ParseError, e.to_string()))?;

        if uri.authority().is_none() {
            return Err(invalid(
                InvalidUriKind::MissingAuthority,
                "missing host".to_owned(),
            ));
        }

        match uri.scheme_str() {
            Some("https") => Ok(uri),
            Some("http") if self.transport_security == TransportSecurity::AllowInsecureHttp => {
                Ok(uri)
            }
            Some("http") => Err(HttpError::InvalidScheme {
                scheme: "http".to_owned(),
                reason: "HTTPS required".to_owned(),
            }),
            Some(scheme) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// are supported".to_owned(),
            }),
            None => Err(invalid(InvalidUriKind::MissingScheme, "missing scheme".to_owned())),
        }
    }

    fn effective_deadline(&self) -> Option<Duration> {
        match (self.call_deadline, self.client_deadline) {
            (Some(call), Some(client)) => Some(call.min(client)),
            (call, client) => call.or(client),
        }
    }

    /// Dispatch the request.
    ///
    /// Returns `Ok` for every HTTP status; use `checked_bytes()`/`json()` or
    /// `error_for_status()` to turn non-2xx into errors.
    ///
    /// # Errors
    /// Validation, transport, timeout and deadline failures
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let uri = self.validate_url()?;
        let deadline = self.effective_deadline();
        let mut builder = Request::builder().method(self.method).uri(uri);

        let has_content_type = self.headers.iter().any(|(name, _)| name == CONTENT_TYPE);
        let body = match self.body {
            Body::Empty => Bytes::new(),
            Body::Raw(bytes) => bytes,
            Body::Typed(content_type, bytes) => {
                if !has_content_type {
                    builder = builder.header(CONTENT_TYPE, content_type);
                }
                bytes
            }
        };
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        let request = builder.body(Full::new(body))?;

        let mut service = self.service;
        let max_body_size = self.max_body_size;
        let exchange = async move {
            try_acquire_buffer_slot(&mut service).await?;
            let inner = service.call(request).await.map_err(map_buffer_error)?;
            Ok::<_, HttpError>(HttpResponse {
                inner,
                max_body_size,
            })
        };

        match deadline {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| HttpError::DeadlineExceeded(limit))?,
            None => exchange.await,
        }
    }
}
