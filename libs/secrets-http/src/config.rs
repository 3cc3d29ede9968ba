use std::collections::HashSet;
use std::time::Duration;

/// Default User-Agent string for requests
pub const DEFAULT_USER_AGENT: &str = concat!("secrets-manager-rust-sdk/", env!("CARGO_PKG_VERSION"));

/// Content type of RFC 7396 merge-patch bodies
pub const MERGE_PATCH_CONTENT_TYPE: &str = "application/merge-patch+json";

/// Conditions that trigger a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RetryTrigger {
    /// Connection could not be established (refused, DNS failure, TLS handshake)
    ConnectError,
    /// Transport failure after the request may have reached the server
    TransportError,
    /// Per-attempt timeout
    Timeout,
    /// Specific HTTP status code
    Status(u16),
    /// Specific HTTP status code carrying a `Retry-After` header
    StatusWithRetryAfter(u16),
    /// Never retried (deadline exceeded, closed service, auth failures)
    NonRetryable,
}

impl RetryTrigger {
    pub const TOO_MANY_REQUESTS: Self = Self::Status(429);
    pub const INTERNAL_SERVER_ERROR: Self = Self::Status(500);
    pub const BAD_GATEWAY: Self = Self::Status(502);
    pub const SERVICE_UNAVAILABLE: Self = Self::Status(503);
    pub const GATEWAY_TIMEOUT: Self = Self::Status(504);
}

/// Idempotent methods per RFC 9110: GET, HEAD, PUT, DELETE, OPTIONS, TRACE.
#[must_use]
pub fn is_idempotent_method(method: &http::Method) -> bool {
    matches!(
        *method,
        http::Method::GET
            | http::Method::HEAD
            | http::Method::PUT
            | http::Method::DELETE
            | http::Method::OPTIONS
            | http::Method::TRACE
    )
}

/// Idempotent method, or a PATCH carrying a merge-patch document.
///
/// Applying the same merge-patch twice yields the same resource, so such
/// PATCH requests are retried like PUT.
#[must_use]
pub fn is_idempotent_request(method: &http::Method, headers: &http::HeaderMap) -> bool {
    if is_idempotent_method(method) {
        return true;
    }
    *method == http::Method::PATCH
        && headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with(MERGE_PATCH_CONTENT_TYPE))
}

/// Exponential backoff: `min(initial * multiplier^attempt, max)` plus optional jitter.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Default: 500ms
    pub initial: Duration,
    /// Default: 8s
    pub max: Duration,
    /// Default: 2.0
    pub multiplier: f64,
    /// Adds 0-25% random delay to each backoff (default: true)
    pub jitter: bool,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl ExponentialBackoff {
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            ..Default::default()
        }
    }

    /// 1ms initial, 20ms max, no jitter
    #[must_use]
    pub fn fast() -> Self {
        Self {
            initial: Duration::from_millis(1),
            max: Duration::from_millis(20),
            multiplier: 2.0,
            jitter: false,
        }
    }
}

/// Retry policy
///
/// Two trigger sets decide whether a failed attempt is repeated:
/// - `always_retry`: retried for every request, including POST creates.
///   These are conditions where the service guarantees nothing was applied.
/// - `idempotent_retry`: retried only when [`is_idempotent_request`] holds.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt; total attempts = 1 + `max_retries` (default: 3)
    pub max_retries: usize,

    pub backoff: ExponentialBackoff,

    /// Default: `[ConnectError, Status(429), StatusWithRetryAfter(503)]`
    pub always_retry: HashSet<RetryTrigger>,

    /// Default: `[TransportError, Timeout, Status(500), Status(502), Status(503), Status(504)]`
    pub idempotent_retry: HashSet<RetryTrigger>,

    /// Ignore `Retry-After` and always use the backoff policy (default: false)
    pub ignore_retry_after: bool,

    /// Bytes drained from a retried response so the connection can be reused (default: 64 KiB)
    pub retry_response_drain_limit: usize,
}

/// Default drain limit for response bodies before retry (64 KiB)
pub const DEFAULT_RETRY_RESPONSE_DRAIN_LIMIT: usize = 64 * 1024;

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: ExponentialBackoff::default(),
            always_retry: HashSet::from([
                RetryTrigger::ConnectError,
                RetryTrigger::TOO_MANY_REQUESTS,
                RetryTrigger::StatusWithRetryAfter(503),
            ]),
            idempotent_retry: HashSet::from([
                RetryTrigger::TransportError,
                RetryTrigger::Timeout,
                RetryTrigger::INTERNAL_SERVER_ERROR,
                RetryTrigger::BAD_GATEWAY,
                RetryTrigger::SERVICE_UNAVAILABLE,
                RetryTrigger::GATEWAY_TIMEOUT,
            ]),
            ignore_retry_after: false,
            retry_response_drain_limit: DEFAULT_RETRY_RESPONSE_DRAIN_LIMIT,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Default trigger sets with [`ExponentialBackoff::fast`]
    #[must_use]
    pub fn fast() -> Self {
        Self {
            backoff: ExponentialBackoff::fast(),
            ..Default::default()
        }
    }

    /// Whether `trigger` is retried for a request with the given idempotency.
    #[must_use]
    pub fn should_retry(&self, trigger: RetryTrigger, idempotent: bool) -> bool {
        if self.always_retry.contains(&trigger) {
            return true;
        }
        idempotent && self.idempotent_retry.contains(&trigger)
    }

    /// Status-based decision; a 503 with `Retry-After` matches both
    /// `Status(503)` and `StatusWithRetryAfter(503)`.
    #[must_use]
    pub fn should_retry_status(&self, status: u16, has_retry_after: bool, idempotent: bool) -> bool {
        self.should_retry(RetryTrigger::Status(status), idempotent)
            || (has_retry_after
                && self.should_retry(RetryTrigger::StatusWithRetryAfter(status), idempotent))
    }
}

/// TLS root certificate configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Mozilla's root certificates (webpki-roots)
    #[default]
    WebPki,
    /// OS native root certificate store
    Native,
}

/// Whether the client enforces TLS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// Plain HTTP is accepted. Local mock servers only.
    AllowInsecureHttp,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Timeout for a single attempt (default: 30s)
    pub request_timeout: Duration,

    /// Wall-clock budget across all attempts and backoff sleeps (default: 30s).
    ///
    /// A request may carry its own, shorter deadline; the lesser of the two
    /// applies. Expiry yields `HttpError::DeadlineExceeded`.
    pub total_timeout: Option<Duration>,

    /// Maximum response body size in bytes (default: 10 MB)
    pub max_body_size: usize,

    pub user_agent: String,

    pub retry: Option<RetryConfig>,

    pub transport: TransportSecurity,

    pub tls_roots: TlsRootConfig,

    /// Requests that can be queued for the background worker (default: 1024)
    pub buffer_capacity: usize,

    /// Default: 90s. `None` keeps hyper-util's default.
    pub pool_idle_timeout: Option<Duration>,

    /// Default: 32
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            total_timeout: Some(Duration::from_secs(30)),
            max_body_size: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            retry: Some(RetryConfig::default()),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::default(),
            buffer_capacity: 1024,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }
}

impl HttpClientConfig {
    /// Configuration for IAM token endpoints.
    ///
    /// Token grants are POSTs but repeating one only mints another token, so
    /// transport errors, timeouts, 429 and 5xx are retried for all methods.
    #[must_use]
    pub fn token_endpoint() -> Self {
        Self {
            max_body_size: 1024 * 1024,
            retry: Some(RetryConfig {
                always_retry: HashSet::from([
                    RetryTrigger::ConnectError,
                    RetryTrigger::TransportError,
                    RetryTrigger::Timeout,
                    RetryTrigger::TOO_MANY_REQUESTS,
                    RetryTrigger::INTERNAL_SERVER_ERROR,
                    RetryTrigger::BAD_GATEWAY,
                    RetryTrigger::SERVICE_UNAVAILABLE,
                    RetryTrigger::GATEWAY_TIMEOUT,
                ]),
                idempotent_retry: HashSet::new(),
                ..RetryConfig::default()
            }),
            buffer_capacity: 64,
            pool_idle_timeout: Some(Duration::from_secs(60)),
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }

    /// Plain HTTP allowed, retries off, short timeouts. Mock servers only.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            total_timeout: Some(Duration::from_secs(10)),
            max_body_size: 1024 * 1024,
            retry: None,
            transport: TransportSecurity::AllowInsecureHttp,
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(10)),
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }
}
