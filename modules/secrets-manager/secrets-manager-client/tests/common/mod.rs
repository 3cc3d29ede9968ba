#![allow(dead_code)]

use httpmock::MockServer;
use secrets_http::{HttpClientBuilder, HttpClientConfig};
use secrets_manager_client::SecretsManagerClient;

/// Client against `server` without retries or authentication.
pub fn client(server: &MockServer) -> SecretsManagerClient {
    let http = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
        .build()
        .unwrap();
    SecretsManagerClient::new(http, &server.base_url()).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
