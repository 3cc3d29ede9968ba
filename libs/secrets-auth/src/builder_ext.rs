use std::sync::Arc;

use tower::ServiceExt;

use crate::layer::BearerAuthLayer;
use crate::provider::TokenProvider;

/// Adds bearer auth to [`secrets_http::HttpClientBuilder`].
///
/// ```ignore
/// use secrets_auth::HttpClientBuilderExt;
///
/// let client = secrets_http::HttpClientBuilder::new()
///     .with_token_provider(Arc::new(iam))
///     .build()?;
/// ```
pub trait HttpClientBuilderExt {
    /// Inject `Authorization: Bearer <token>` on every attempt.
    #[must_use]
    fn with_token_provider(self, provider: Arc<dyn TokenProvider>) -> Self;
}

impl HttpClientBuilderExt for secrets_http::HttpClientBuilder {
    fn with_token_provider(self, provider: Arc<dyn TokenProvider>) -> Self {
        let layer = BearerAuthLayer::new(provider);
        self.with_auth_layer(move |svc| {
            tower::ServiceBuilder::new()
                .layer(layer)
                .service(svc)
                .boxed_clone()
        })
    }
}
