use crate::error::HttpError;
use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderValue, Request, Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Adds `User-Agent` and `Accept: application/json` unless the request
/// already carries them.
#[derive(Clone)]
pub struct DefaultHeadersLayer {
    user_agent: HeaderValue,
}

impl DefaultHeadersLayer {
    /// # Errors
    /// Returns `HttpError::InvalidHeaderValue` if the user agent is not a valid header value
    pub fn try_new(user_agent: impl AsRef<str>) -> Result<Self, HttpError> {
        let user_agent = HeaderValue::from_str(user_agent.as_ref())?;
        Ok(Self { user_agent })
    }
}

impl<S> Layer<S> for DefaultHeadersLayer {
    type Service = DefaultHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DefaultHeadersService {
            inner,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Clone)]
pub struct DefaultHeadersService<S> {
    inner: S,
    user_agent: HeaderValue,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for DefaultHeadersService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let headers = req.headers_mut();
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, self.user_agent.clone());
        }
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Method, StatusCode};
    use http_body_util::Full;
    use std::future::{Ready, ready};
    use tower::ServiceExt;

    /// Echoes the request headers back as response headers.
    #[derive(Clone)]
    struct EchoHeaders;

    impl Service<Request<Full<Bytes>>> for EchoHeaders {
        type Response = Response<Full<Bytes>>;
        type Error = HttpError;
        type Future = Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
            let mut resp = Response::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::new()))
                .unwrap();
            *resp.headers_mut() = req.headers().clone();
            ready(Ok(resp))
        }
    }

    fn request() -> http::request::Builder {
        Request::builder()
            .method(Method::GET)
            .uri("https://sm.example.com/api/v2/secrets")
    }

    #[tokio::test]
    async fn adds_missing_headers() {
        let svc = DefaultHeadersLayer::try_new("sdk/1.0")
            .unwrap()
            .layer(EchoHeaders);
        let resp = svc
            .oneshot(request().body(Full::new(Bytes::new())).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.headers()[USER_AGENT], "sdk/1.0");
        assert_eq!(resp.headers()[ACCEPT], "application/json");
    }

    #[tokio::test]
    async fn keeps_caller_headers() {
        let svc = DefaultHeadersLayer::try_new("sdk/1.0")
            .unwrap()
            .layer(EchoHeaders);
        let req = request()
            .header(USER_AGENT, "caller/2.0")
            .header(ACCEPT, "text/plain")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = svc.oneshot(req).await.unwrap();

        assert_eq!(resp.headers()[USER_AGENT], "caller/2.0");
        assert_eq!(resp.headers()[ACCEPT], "text/plain");
    }

    #[test]
    fn rejects_invalid_user_agent() {
        assert!(DefaultHeadersLayer::try_new("bad\nagent").is_err());
    }
}
