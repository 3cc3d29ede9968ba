use crate::config::{HttpClientConfig, RetryConfig, TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use crate::layers::{DefaultHeadersLayer, RetryLayer};
use crate::response::ResponseBody;
use crate::tls::build_https_connector;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::util::BoxCloneService;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;

/// Type-erased service handed to an auth layer wrapper.
pub type InnerService =
    BoxCloneService<http::Request<Full<Bytes>>, http::Response<ResponseBody>, HttpError>;

type AuthWrap = Box<dyn FnOnce(InnerService) -> InnerService + Send>;

/// Builder for [`crate::HttpClient`]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    auth_layer: Option<AuthWrap>,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self {
            config,
            auth_layer: None,
        }
    }

    /// Timeout for a single attempt
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Budget across all attempts and backoff sleeps
    #[must_use]
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.config.total_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: Option<RetryConfig>) -> Self {
        self.config.retry = retry;
        self
    }

    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    #[must_use]
    pub fn tls_roots(mut self, roots: TlsRootConfig) -> Self {
        self.config.tls_roots = roots;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    /// Accept plain `http://` URLs. Available in debug builds or with the
    /// `allow-insecure-http` feature.
    #[must_use]
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    pub fn allow_insecure_http(mut self) -> Self {
        tracing::warn!(
            target: "secrets_http::security",
            "allow_insecure_http() called; HTTP traffic will NOT be encrypted"
        );
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Insert an auth layer inside the retry loop.
    ///
    /// Stack position: `Retry -> this layer -> Timeout`. Every attempt runs
    /// through it, so a refreshed token is picked up on retry. A second call
    /// replaces the first.
    #[must_use]
    pub fn with_auth_layer(
        mut self,
        wrap: impl FnOnce(InnerService) -> InnerService + Send + 'static,
    ) -> Self {
        self.auth_layer = Some(Box::new(wrap));
        self
    }

    /// Queue size for the background worker; clamped to at least 1.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity.max(1);
        self
    }

    /// Build the client.
    ///
    /// Request flow, outer to inner:
    /// `Buffer -> Retry -> [Auth] -> ErrorMapping -> Timeout -> DefaultHeaders ->
    /// Decompression -> hyper`.
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails or the user agent is invalid
    pub fn build(self) -> Result<crate::HttpClient, HttpError> {
        if self.config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!("insecure HTTP enabled; use only with local mock servers");
        }

        let timeout = self.config.request_timeout;
        let https = build_https_connector(self.config.tls_roots, self.config.transport)?;

        let mut client_builder = Client::builder(TokioExecutor::new());
        // pool_idle_timeout has no effect without a pool timer
        client_builder
            .pool_timer(TokioTimer::new())
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host);
        if let Some(idle) = self.config.pool_idle_timeout {
            client_builder.pool_idle_timeout(idle);
        }
        let hyper_client = client_builder.build::<_, Full<Bytes>>(https);

        let headers_layer = DefaultHeadersLayer::try_new(&self.config.user_agent)?;

        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(headers_layer)
            .layer(DecompressionLayer::new())
            .service(hyper_client)
            .map_response(box_response_body)
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout));

        let mut service: InnerService = service.boxed_clone();

        if let Some(wrap) = self.auth_layer {
            service = wrap(service);
        }

        if let Some(retry) = self.config.retry {
            service = ServiceBuilder::new()
                .layer(RetryLayer::with_total_timeout(
                    retry,
                    self.config.total_timeout,
                ))
                .service(service)
                .boxed_clone();
        }

        let service: crate::client::BufferedService =
            Buffer::new(service, self.config.buffer_capacity.max(1));

        Ok(crate::HttpClient {
            service,
            max_body_size: self.config.max_body_size,
            transport_security: self.config.transport,
            total_timeout: self.config.total_timeout,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Recover typed errors from the boxed tower error.
///
/// hyper-util connect failures become `Connect`, anything unrecognised
/// becomes `Transport`.
fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    let err = match err.downcast::<HttpError>() {
        Ok(http_err) => return *http_err,
        Err(other) => other,
    };
    match err.downcast::<hyper_util::client::legacy::Error>() {
        Ok(hyper_err) => HttpError::from(*hyper_err),
        Err(other) => HttpError::Transport(other),
    }
}

fn box_response_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, body.map_err(Into::into).boxed())
}
