use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::header::{AUTHORIZATION, HeaderName};
use http::{HeaderValue, Request, Response};
use tower::{Layer, Service};

use crate::provider::TokenProvider;
use secrets_http::HttpError;

/// Tower layer that sets `Authorization: Bearer <token>` on each request.
///
/// The provider is asked for a token on every call, so a layer placed inside
/// the retry loop picks up refreshed tokens between attempts.
#[derive(Clone)]
pub struct BearerAuthLayer {
    provider: Arc<dyn TokenProvider>,
    header_name: HeaderName,
}

impl fmt::Debug for BearerAuthLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuthLayer")
            .field("header_name", &self.header_name)
            .finish_non_exhaustive()
    }
}

impl BearerAuthLayer {
    #[must_use]
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            header_name: AUTHORIZATION,
        }
    }

    #[must_use]
    pub fn with_header_name(provider: Arc<dyn TokenProvider>, header_name: HeaderName) -> Self {
        Self {
            provider,
            header_name,
        }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService {
            inner,
            provider: Arc::clone(&self.provider),
            header_name: self.header_name.clone(),
        }
    }
}

/// Created by [`BearerAuthLayer`].
#[derive(Clone)]
pub struct BearerAuthService<S> {
    inner: S,
    provider: Arc<dyn TokenProvider>,
    header_name: HeaderName,
}

impl<S, B, ResBody> Service<Request<B>> for BearerAuthService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>, Error = HttpError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
    B: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = HttpError;
    type Future = Pin<Box<dyn Future<Output = Result<Response<ResBody>, HttpError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let provider = Arc::clone(&self.provider);
        let header_name = self.header_name.clone();

        // The ready service is the one that must be called
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let secret = provider
                .token()
                .await
                .map_err(|e| HttpError::Auth(Box::new(e)))?;
            let raw = zeroize::Zeroizing::new(format!("Bearer {}", secret.expose()));
            let mut value = HeaderValue::from_str(&raw)?;
            value.set_sensitive(true);
            req.headers_mut().insert(header_name, value);

            inner.call(req).await
        })
    }
}
