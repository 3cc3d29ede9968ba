use crate::config::{ExponentialBackoff, RetryConfig, RetryTrigger, is_idempotent_request};
use crate::error::HttpError;
use crate::response::{ResponseBody, parse_retry_after};
use bytes::Bytes;
use http::{HeaderValue, Request, Response};
use http_body_util::{BodyExt, Full};
use rand::Rng;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::Instant;
use tower::{Layer, Service, ServiceExt};

/// Header carrying the retry number (1-indexed) on repeated attempts.
pub const RETRY_ATTEMPT_HEADER: &str = "X-Retry-Attempt";

/// Tower layer that retries failed attempts with exponential backoff and jitter
#[derive(Clone)]
pub struct RetryLayer {
    config: RetryConfig,
    total_timeout: Option<Duration>,
}

impl RetryLayer {
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            total_timeout: None,
        }
    }

    /// Retry layer whose attempts and sleeps all fit within `total_timeout`.
    #[must_use]
    pub fn with_total_timeout(config: RetryConfig, total_timeout: Option<Duration>) -> Self {
        Self {
            config,
            total_timeout,
        }
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryService {
            inner,
            config: self.config.clone(),
            total_timeout: self.total_timeout,
        }
    }
}

/// Retries on `Err(HttpError)` and on retryable statuses.
///
/// A response is returned as `Ok` for every status once retries are
/// exhausted; `Err` is reserved for transport, timeout and deadline failures.
/// Whether a trigger applies depends on [`is_idempotent_request`].
#[derive(Clone)]
pub struct RetryService<S> {
    inner: S,
    config: RetryConfig,
    total_timeout: Option<Duration>,
}

/// Clamp a backoff to the remaining deadline budget.
fn bounded_backoff(
    backoff: Duration,
    deadline: Option<(Instant, Duration)>,
) -> Result<Duration, HttpError> {
    let Some((deadline, budget)) = deadline else {
        return Ok(backoff);
    };
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(HttpError::DeadlineExceeded(budget));
    }
    Ok(backoff.min(remaining))
}

impl<S> Service<Request<Full<Bytes>>> for RetryService<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<ResponseBody>, Error = HttpError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = HttpError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
        // Consume the instance that was poll_ready'd.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let config = self.config.clone();
        let total_timeout = self.total_timeout;

        let (parts, body) = req.into_parts();
        let version = parts.version;
        let extensions = parts.extensions.clone();
        let idempotent = is_idempotent_request(&parts.method, &parts.headers);
        let parts = Arc::new(parts);

        Box::pin(async move {
            let method = parts.method.clone();
            let host = parts
                .uri
                .authority()
                .map_or_else(|| "unknown".to_owned(), ToString::to_string);
            let deadline = total_timeout.map(|t| (Instant::now() + t, t));

            let mut attempt = 0usize;
            loop {
                if let Some((at, budget)) = deadline
                    && Instant::now() >= at
                {
                    return Err(HttpError::DeadlineExceeded(budget));
                }

                let mut req = Request::from_parts((*parts).clone(), body.clone());
                *req.version_mut() = version;
                *req.extensions_mut() = extensions.clone();
                if attempt > 0
                    && let Ok(value) = HeaderValue::try_from(attempt.to_string())
                {
                    req.headers_mut().insert(RETRY_ATTEMPT_HEADER, value);
                }

                let mut svc = inner.clone();
                svc.ready().await?;
                let can_retry = attempt < config.max_retries;

                match svc.call(req).await {
                    Ok(resp) => {
                        let status = resp.status().as_u16();
                        let has_retry_after =
                            resp.headers().contains_key(http::header::RETRY_AFTER);

                        if !can_retry
                            || !config.should_retry_status(status, has_retry_after, idempotent)
                        {
                            return Ok(resp);
                        }

                        let retry_after = if config.ignore_retry_after {
                            None
                        } else {
                            parse_retry_after(resp.headers())
                        };
                        let backoff = retry_after
                            .unwrap_or_else(|| calculate_backoff(&config.backoff, attempt));

                        drain_before_retry(resp, config.retry_response_drain_limit).await;

                        let backoff = bounded_backoff(backoff, deadline)?;
                        tracing::debug!(
                            retry = attempt + 1,
                            max_retries = config.max_retries,
                            status,
                            method = %method,
                            host = %host,
                            backoff_ms = backoff.as_millis(),
                            retry_after_used = retry_after.is_some(),
                            "retrying request after status code"
                        );
                        tokio::time::sleep(backoff).await;
                    }
                    Err(err) => {
                        let trigger = retry_trigger(&err);
                        if !can_retry || !config.should_retry(trigger, idempotent) {
                            return Err(err);
                        }

                        let backoff =
                            bounded_backoff(calculate_backoff(&config.backoff, attempt), deadline)?;
                        tracing::debug!(
                            retry = attempt + 1,
                            max_retries = config.max_retries,
                            error = %err,
                            trigger = ?trigger,
                            method = %method,
                            host = %host,
                            backoff_ms = backoff.as_millis(),
                            "retrying request after error"
                        );
                        tokio::time::sleep(backoff).await;
                    }
                }
                attempt += 1;
            }
        })
    }
}

/// Drain a discarded response so the pooled connection can be reused.
/// Bodies declaring more than `limit` bytes are dropped unread.
async fn drain_before_retry(response: Response<ResponseBody>, limit: usize) {
    let declared = response
        .headers()
        .get(http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());
    if declared.is_some_and(|len| len > limit as u64) {
        tracing::trace!(content_length = ?declared, limit, "skipping drain of large body");
        return;
    }

    let mut body = std::pin::pin!(response.into_body());
    let mut drained = 0usize;
    while let Some(frame) = body.frame().await {
        match frame {
            Ok(frame) => {
                if let Some(chunk) = frame.data_ref() {
                    drained += chunk.len();
                    if drained >= limit {
                        break;
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to drain response body before retry");
                break;
            }
        }
    }
}

fn retry_trigger(err: &HttpError) -> RetryTrigger {
    match err {
        HttpError::Connect(_) => RetryTrigger::ConnectError,
        HttpError::Transport(_) => RetryTrigger::TransportError,
        HttpError::Timeout(_) => RetryTrigger::Timeout,
        _ => RetryTrigger::NonRetryable,
    }
}

/// Backoff for the given zero-based attempt; tolerant of NaN and infinite inputs.
pub fn calculate_backoff(backoff: &ExponentialBackoff, attempt: usize) -> Duration {
    const MAX_BACKOFF_SECS: f64 = 3600.0;

    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let multiplier = if backoff.multiplier.is_finite() && backoff.multiplier >= 0.0 {
        backoff.multiplier
    } else {
        1.0
    };
    let initial = backoff.initial.as_secs_f64();
    let max = backoff.max.as_secs_f64().min(MAX_BACKOFF_SECS);

    let raw = initial * multiplier.powi(exponent);
    let clamped = if raw.is_finite() { raw.clamp(0.0, max) } else { max };
    let mut duration = Duration::from_secs_f64(clamped);

    if backoff.jitter {
        let factor = rand::rng().random_range(0.0..=0.25);
        duration += duration.mul_f64(factor);
    }

    duration.min(Duration::from_secs_f64(max))
}
