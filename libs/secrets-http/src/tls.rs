//! Connector construction and cached native roots.

use crate::config::{TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use rustls_pki_types::CertificateDer;
use std::sync::{Arc, OnceLock};

/// OS store is read once per process; an empty vec means nothing usable was found.
static NATIVE_ROOTS: OnceLock<Vec<CertificateDer<'static>>> = OnceLock::new();

fn native_root_certs() -> &'static [CertificateDer<'static>] {
    NATIVE_ROOTS.get_or_init(|| {
        let result = rustls_native_certs::load_native_certs();
        for err in &result.errors {
            tracing::warn!(error = %err, "error loading native root certificate");
        }
        if result.certs.is_empty() {
            tracing::warn!("no native root CA certificates found");
        } else {
            tracing::debug!(count = result.certs.len(), "loaded native root certificates");
        }
        result.certs
    })
}

/// Installed default provider if any, else a fresh aws-lc-rs provider.
fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

fn native_roots_client_config() -> Result<rustls::ClientConfig, HttpError> {
    let certs = native_root_certs();
    if certs.is_empty() {
        return Err(HttpError::Tls(
            "no native root CA certificates found in OS certificate store".into(),
        ));
    }

    let mut roots = rustls::RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs.iter().cloned());
    if ignored > 0 {
        tracing::warn!(added, ignored, "some native root certificates could not be parsed");
    }
    if added == 0 {
        return Err(HttpError::Tls(
            format!("none of the {} native root certificates parsed", certs.len()).into(),
        ));
    }

    Ok(
        rustls::ClientConfig::builder_with_provider(crypto_provider())
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpError::Tls(Box::new(e)))?
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
}

/// HTTPS connector advertising h2 and http/1.1 via ALPN.
///
/// # Errors
/// `HttpError::Tls` when the provider cannot be configured or no native
/// roots are usable.
pub fn build_https_connector(
    roots: TlsRootConfig,
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = match roots {
        TlsRootConfig::WebPki => hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(crypto_provider())
            .map_err(|e| HttpError::Tls(Box::new(e)))?,
        TlsRootConfig::Native => {
            hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(native_roots_client_config()?)
        }
    };

    let connector = match transport {
        TransportSecurity::AllowInsecureHttp => builder.https_or_http().enable_all_versions().build(),
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
    };
    Ok(connector)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn webpki_connector_builds() {
        assert!(build_https_connector(TlsRootConfig::WebPki, TransportSecurity::TlsOnly).is_ok());
        assert!(
            build_https_connector(TlsRootConfig::WebPki, TransportSecurity::AllowInsecureHttp)
                .is_ok()
        );
    }

    #[test]
    fn native_roots_are_cached() {
        let first = native_root_certs().as_ptr();
        let second = native_root_certs().as_ptr();
        assert_eq!(first, second);
    }
}
