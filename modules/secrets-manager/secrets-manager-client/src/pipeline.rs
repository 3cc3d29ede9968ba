//! One operation, one HTTP exchange.
//!
//! An [`OperationSpec`] fixes the method, path template, body shape and
//! expected status of an endpoint. A [`Call`] carries the values of one
//! invocation: path segments, query parameters, headers and body. The
//! [`Pipeline`] renders the call into a request, sends it through the
//! retrying, authenticated [`HttpClient`] and classifies the response.

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use secrets_http::{HttpClient, parse_retry_after};
use secrets_manager_sdk::models::PageInfo;
use secrets_manager_sdk::{Polymorphic, SecretsManagerError, ServiceProblem, codec};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::map_http_error;

/// Variant hint the service requires when a configuration is addressed by name.
pub const CONFIGURATION_TYPE_HEADER: &str = "X-Sm-Accept-Configuration-Type";

/// Body shape an endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    None,
    /// `application/json`.
    Json,
    /// `application/merge-patch+json`.
    MergePatch,
}

/// Static description of one endpoint.
#[derive(Debug)]
pub struct OperationSpec {
    pub name: &'static str,
    pub method: Method,
    /// Path below the service URL, with `{name}` placeholders.
    pub path: &'static str,
    pub body: BodyKind,
    pub success: StatusCode,
}

/// Result of an operation with the response status and headers.
#[derive(Debug, Clone)]
pub struct DetailedResponse<T> {
    pub result: T,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl<T> DetailedResponse<T> {
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DetailedResponse<U> {
        DetailedResponse {
            result: f(self.result),
            status: self.status,
            headers: self.headers,
        }
    }

    /// # Errors
    /// Whatever `f` returns.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<DetailedResponse<U>, E> {
        Ok(DetailedResponse {
            result: f(self.result)?,
            status: self.status,
            headers: self.headers,
        })
    }
}

/// Per-call settings.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Deadline across all attempts. The client's total budget still applies
    /// when it is shorter.
    pub timeout: Option<Duration>,
    /// Extra headers sent with this call only.
    pub headers: Vec<(String, String)>,
}

impl CallOptions {
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Values of one invocation of an [`OperationSpec`].
#[derive(Debug)]
#[must_use = "a Call does nothing until passed to Pipeline::execute"]
pub struct Call {
    spec: &'static OperationSpec,
    path_params: Vec<(&'static str, String)>,
    query: Vec<(&'static str, String)>,
    headers: Vec<(&'static str, String)>,
    body: Option<Value>,
}

impl Call {
    pub fn new(spec: &'static OperationSpec) -> Self {
        Self {
            spec,
            path_params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Value of the `{name}` placeholder. Blank values are reported as
    /// missing when the path is rendered.
    pub fn path(mut self, name: &'static str, value: &str) -> Self {
        self.path_params.push((name, value.to_owned()));
        self
    }

    /// Scalar query parameter; `None` is left out.
    pub fn query<V: ToString>(mut self, name: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.query.push((name, value.to_string()));
        }
        self
    }

    /// List query parameter, sent once with comma-joined values. Unset and
    /// empty lists are left out.
    pub fn query_list<S: AsRef<str>>(mut self, name: &'static str, values: Option<&[S]>) -> Self {
        if let Some(values) = values.filter(|v| !v.is_empty()) {
            let joined = values
                .iter()
                .map(<S as AsRef<str>>::as_ref)
                .collect::<Vec<&str>>()
                .join(",");
            self.query.push((name, joined));
        }
        self
    }

    /// Header forwarded verbatim; `None` is left out.
    pub fn header(mut self, name: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.headers.push((name, value.to_owned()));
        }
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Path with every placeholder substituted and percent-encoded.
    ///
    /// # Errors
    /// `InvalidArgument` naming the first placeholder without a value.
    pub fn render_path(&self) -> Result<String, SecretsManagerError> {
        let template = self.spec.path;
        let mut rendered = String::with_capacity(template.len() + 48);
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                return Err(SecretsManagerError::invalid_argument(format!(
                    "malformed path template '{template}'"
                )));
            };
            let name = &after[..close];
            let value = self
                .path_params
                .iter()
                .find(|(param, _)| *param == name)
                .map(|(_, value)| value.as_str())
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| SecretsManagerError::missing_field(name))?;
            rendered.push_str(&urlencoding::encode(value));
            rest = &after[close + 1..];
        }
        rendered.push_str(rest);
        Ok(rendered)
    }
}

/// Renders calls against one service instance and classifies responses.
#[derive(Clone)]
pub struct Pipeline {
    http: HttpClient,
    base_url: Url,
}

impl Pipeline {
    /// # Errors
    /// `InvalidArgument` when `base_url` is not an absolute URL.
    pub fn new(http: HttpClient, base_url: &str) -> Result<Self, SecretsManagerError> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| {
            SecretsManagerError::invalid_argument(format!("invalid service URL '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SecretsManagerError::invalid_argument(format!(
                "invalid service URL '{base_url}'"
            )));
        }
        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of `call`, query included.
    ///
    /// # Errors
    /// `InvalidArgument` for a missing path parameter.
    pub fn url_for(&self, call: &Call) -> Result<Url, SecretsManagerError> {
        let path = call.render_path()?;
        let joined = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));
        let mut url = Url::parse(&joined).map_err(|e| {
            SecretsManagerError::invalid_argument(format!("invalid request URL '{joined}': {e}"))
        })?;
        if !call.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(call.query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send `call` and return the raw body of a success response.
    ///
    /// # Errors
    /// `InvalidArgument` before dispatch, the status-derived variants for a
    /// non-success response, `Timeout` or `Transport` otherwise.
    pub async fn execute(
        &self,
        call: Call,
        options: &CallOptions,
    ) -> Result<DetailedResponse<Bytes>, SecretsManagerError> {
        let spec = call.spec;
        let url = self.url_for(&call)?;
        tracing::debug!(
            operation = spec.name,
            method = %spec.method,
            path = url.path(),
            "dispatching operation"
        );

        let mut request = self.http.request(spec.method.clone(), url.as_str());
        for (name, value) in &call.headers {
            request = request.header(name, value);
        }
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        request = match spec.body {
            BodyKind::None => request,
            BodyKind::Json => request
                .json(require_body(&call)?)
                .map_err(map_http_error)?,
            BodyKind::MergePatch => request
                .merge_patch(require_body(&call)?)
                .map_err(map_http_error)?,
        };

        let response = request.send().await.map_err(map_http_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_http_error)?;

        if !status.is_success() {
            let problem = ServiceProblem::from_body(status.as_u16(), &body);
            return Err(SecretsManagerError::from_problem(
                problem,
                parse_retry_after(&headers),
            ));
        }
        if status != spec.success {
            tracing::debug!(
                operation = spec.name,
                expected = spec.success.as_u16(),
                status = status.as_u16(),
                "unexpected success status"
            );
        }
        Ok(DetailedResponse {
            result: body,
            status,
            headers,
        })
    }

    /// Send `call` and decode a record of a polymorphic family.
    ///
    /// # Errors
    /// As [`Self::execute`], plus `UnknownVariant` and `Decode`.
    pub async fn execute_variant<T>(
        &self,
        call: Call,
        options: &CallOptions,
    ) -> Result<DetailedResponse<T>, SecretsManagerError>
    where
        T: Polymorphic + DeserializeOwned,
    {
        self.execute(call, options)
            .await?
            .try_map(|body| codec::decode_slice(&body))
    }

    /// Send `call` and decode a plain record.
    ///
    /// # Errors
    /// As [`Self::execute`], plus `Decode`.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        call: Call,
        options: &CallOptions,
    ) -> Result<DetailedResponse<T>, SecretsManagerError> {
        self.execute(call, options)
            .await?
            .try_map(|body| codec::decode_plain(&body, "$"))
    }

    /// Send `call` and discard the response body.
    ///
    /// # Errors
    /// As [`Self::execute`].
    pub async fn execute_empty(
        &self,
        call: Call,
        options: &CallOptions,
    ) -> Result<DetailedResponse<()>, SecretsManagerError> {
        Ok(self.execute(call, options).await?.map(|_| ()))
    }

    /// Send `call` and decode a page whose `field` list holds records of a
    /// polymorphic family.
    ///
    /// # Errors
    /// As [`Self::execute_variant`]; element errors carry their index.
    pub async fn execute_collection<T>(
        &self,
        call: Call,
        options: &CallOptions,
        field: &str,
    ) -> Result<DetailedResponse<(PageInfo, Vec<T>)>, SecretsManagerError>
    where
        T: Polymorphic + DeserializeOwned,
    {
        self.execute(call, options)
            .await?
            .try_map(|body| split_collection(&body, field))
    }
}

fn require_body(call: &Call) -> Result<&Value, SecretsManagerError> {
    call.body
        .as_ref()
        .ok_or_else(|| SecretsManagerError::missing_field("request body"))
}

/// Separate the paging envelope from the polymorphic item list.
///
/// # Errors
/// `Decode` when the body or the envelope is malformed, or `field` is not an
/// array; element errors from [`codec::decode_list`].
pub fn split_collection<T>(body: &[u8], field: &str) -> Result<(PageInfo, Vec<T>), SecretsManagerError>
where
    T: Polymorphic + DeserializeOwned,
{
    let mut envelope: Value = codec::decode_plain(body, "$")?;
    let items = match envelope.get_mut(field).map(Value::take) {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            return Err(SecretsManagerError::Decode {
                path: format!("$.{field}"),
                reason: "expected an array".to_owned(),
            });
        }
    };
    let page: PageInfo =
        serde_json::from_value(envelope).map_err(|e| SecretsManagerError::Decode {
            path: "$".to_owned(),
            reason: e.to_string(),
        })?;
    Ok((page, codec::decode_list(items)?))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use secrets_http::{HttpClientBuilder, HttpClientConfig};
    use secrets_manager_sdk::models::{Secret, SecretMetadata};
    use serde_json::json;

    static GET_SECRET: OperationSpec = OperationSpec {
        name: "get_secret",
        method: Method::GET,
        path: "/api/v2/secrets/{id}",
        body: BodyKind::None,
        success: StatusCode::OK,
    };

    static LIST_SECRETS: OperationSpec = OperationSpec {
        name: "list_secrets",
        method: Method::GET,
        path: "/api/v2/secrets",
        body: BodyKind::None,
        success: StatusCode::OK,
    };

    static PATCH_VERSION: OperationSpec = OperationSpec {
        name: "update_secret_version_metadata",
        method: Method::PATCH,
        path: "/api/v2/secrets/{secret_id}/versions/{id}/metadata",
        body: BodyKind::MergePatch,
        success: StatusCode::OK,
    };

    fn pipeline(server: &MockServer) -> Pipeline {
        let http = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap();
        Pipeline::new(http, &server.base_url()).unwrap()
    }

    #[test]
    fn placeholders_are_percent_encoded() {
        let call = Call::new(&PATCH_VERSION)
            .path("secret_id", "a b/c")
            .path("id", "current");
        assert_eq!(
            call.render_path().unwrap(),
            "/api/v2/secrets/a%20b%2Fc/versions/current/metadata"
        );
    }

    #[test]
    fn missing_or_blank_path_parameter_fails() {
        let err = Call::new(&PATCH_VERSION)
            .path("secret_id", "s1")
            .render_path()
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: id must be provided");

        let err = Call::new(&GET_SECRET).path("id", "  ").render_path().unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: id must be provided");
    }

    #[tokio::test]
    async fn lists_are_comma_joined_and_unset_values_omitted() {
        let http = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap();
        let pipeline = Pipeline::new(http, "https://sm.example.com/").unwrap();
        let groups = vec!["default".to_owned(), "g-2".to_owned()];
        let no_types: &[String] = &[];
        let call = Call::new(&LIST_SECRETS)
            .query("limit", Some(10))
            .query::<u32>("offset", None)
            .query_list("groups", Some(groups.as_slice()))
            .query_list("secret_types", Some(no_types))
            .query_list::<String>("match_all_labels", None);
        let url = pipeline.url_for(&call).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sm.example.com/api/v2/secrets?limit=10&groups=default%2Cg-2"
        );
    }

    #[tokio::test]
    async fn relative_service_url_is_rejected() {
        let http = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap();
        assert!(matches!(
            Pipeline::new(http, "sm.example.com"),
            Err(SecretsManagerError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn success_is_decoded_by_discriminator() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/v2/secrets/s1");
            then.status(200).json_body(json!({
                "secret_type": "arbitrary",
                "id": "s1",
                "name": "example",
                "payload": "secret-data",
                "added_later": true
            }));
        });

        let resp = pipeline(&server)
            .execute_variant::<Secret>(Call::new(&GET_SECRET).path("id", "s1"), &CallOptions::default())
            .await
            .unwrap();
        mock.assert();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.result.id(), Some("s1"));
        let Secret::Arbitrary(secret) = resp.result else {
            panic!("expected an arbitrary secret");
        };
        assert_eq!(secret.data.payload.as_deref(), Some("secret-data"));
    }

    #[tokio::test]
    async fn unknown_variant_in_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/secrets/s1");
            then.status(200)
                .json_body(json!({"secret_type": "quantum_key", "id": "s1"}));
        });

        let err = pipeline(&server)
            .execute_variant::<Secret>(Call::new(&GET_SECRET).path("id", "s1"), &CallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SecretsManagerError::UnknownVariant { ref discriminator, .. } if discriminator == "quantum_key"
        ));
    }

    #[tokio::test]
    async fn error_body_is_classified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/secrets/missing");
            then.status(404).json_body(json!({
                "errors": [{
                    "code": "secrets_manager.secret_not_found",
                    "message": "Secret not found",
                    "target": {"type": "field", "name": "id"}
                }],
                "status_code": 404,
                "trace": "3f2c"
            }));
        });

        let err = pipeline(&server)
            .execute_variant::<Secret>(
                Call::new(&GET_SECRET).path("id", "missing"),
                &CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        let problem = err.problem().unwrap();
        assert_eq!(problem.code(), Some("secrets_manager.secret_not_found"));
        assert_eq!(problem.trace.as_deref(), Some("3f2c"));
        assert_eq!(
            problem.errors[0].target.as_ref().map(|t| t.name.as_str()),
            Some("id")
        );
    }

    #[tokio::test]
    async fn rate_limit_carries_retry_after() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/secrets/s1");
            then.status(429).header("Retry-After", "7").body("slow down");
        });

        let err = pipeline(&server)
            .execute_empty(Call::new(&GET_SECRET).path("id", "s1"), &CallOptions::default())
            .await
            .unwrap_err();
        let SecretsManagerError::RateLimited {
            problem,
            retry_after,
        } = err
        else {
            panic!("expected RateLimited");
        };
        assert_eq!(retry_after, Some(Duration::from_secs(7)));
        assert_eq!(problem.raw, "slow down");
    }

    #[tokio::test]
    async fn merge_patch_body_and_headers_are_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/api/v2/secrets/s1/versions/v1/metadata")
                .header("content-type", "application/merge-patch+json")
                .header("x-correlation-id", "abc")
                .json_body(json!({"version_custom_metadata": {"k": "v"}}));
            then.status(200).json_body(json!({"id": "v1"}));
        });

        let call = Call::new(&PATCH_VERSION)
            .path("secret_id", "s1")
            .path("id", "v1")
            .body(json!({"version_custom_metadata": {"k": "v"}}));
        let resp = pipeline(&server)
            .execute_json::<Value>(call, &CallOptions::default().header("X-Correlation-Id", "abc"))
            .await
            .unwrap();
        mock.assert();
        assert_eq!(resp.result["id"], "v1");
    }

    #[tokio::test]
    async fn missing_body_fails_before_dispatch() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH);
            then.status(200);
        });
        let call = Call::new(&PATCH_VERSION).path("secret_id", "s1").path("id", "v1");
        let err = pipeline(&server)
            .execute_empty(call, &CallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SecretsManagerError::InvalidArgument(_)));
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn call_timeout_surfaces_as_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/secrets/slow");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({"secret_type": "arbitrary"}));
        });

        let err = pipeline(&server)
            .execute_empty(
                Call::new(&GET_SECRET).path("id", "slow"),
                &CallOptions::with_timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SecretsManagerError::Timeout(d) if d == Duration::from_millis(50)));
    }

    #[test]
    fn collection_items_decode_per_variant() {
        let body = json!({
            "limit": 2,
            "offset": 0,
            "total_count": 3,
            "next": {"href": "https://sm.example.com/api/v2/secrets?limit=2&offset=2"},
            "secrets": [
                {"secret_type": "arbitrary", "id": "a"},
                {"secret_type": "kv", "id": "b"}
            ]
        })
        .to_string();
        let (page, items): (PageInfo, Vec<SecretMetadata>) =
            split_collection(body.as_bytes(), "secrets").unwrap();
        assert_eq!(page.total_count, 3);
        assert!(page.next.is_some());
        assert!(matches!(items[0], SecretMetadata::Arbitrary(_)));
        assert!(matches!(items[1], SecretMetadata::Kv(_)));
    }

    #[test]
    fn collection_element_error_names_index() {
        let body = br#"{"total_count":1,"secrets":[{"secret_type":"arbitrary"},{"id":"x"}]}"#;
        let err = split_collection::<SecretMetadata>(body, "secrets").unwrap_err();
        assert!(matches!(err, SecretsManagerError::UnknownVariant { .. }));

        let err = split_collection::<SecretMetadata>(br#"{"secrets":{}}"#, "secrets").unwrap_err();
        assert!(
            matches!(err, SecretsManagerError::Decode { ref path, .. } if path == "$.secrets")
        );
    }
}
