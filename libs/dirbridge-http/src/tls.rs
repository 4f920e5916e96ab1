//! rustls client configurations.
//!
//! The OS root store is parsed at most once per process; plugins rebuild the
//! client on every lookup. Verification is only ever weakened in
//! [`unverified_client_config`].

use std::sync::{Arc, OnceLock};

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};

static NATIVE_ROOTS: OnceLock<Result<Arc<RootCertStore>, String>> = OnceLock::new();

/// The installed process default provider, or a private aws-lc-rs one.
///
/// Never installs a default: the host process may rely on its own.
#[must_use]
pub fn crypto_provider() -> Arc<CryptoProvider> {
    match CryptoProvider::get_default() {
        Some(installed) => Arc::clone(installed),
        None => Arc::new(rustls::crypto::aws_lc_rs::default_provider()),
    }
}

/// OS trust anchors, parsed on first use.
///
/// # Errors
///
/// Fails when the store yields no usable certificate. The failure is cached too.
pub fn native_roots() -> Result<Arc<RootCertStore>, String> {
    NATIVE_ROOTS.get_or_init(load_native_roots).clone()
}

fn load_native_roots() -> Result<Arc<RootCertStore>, String> {
    let loaded = rustls_native_certs::load_native_certs();
    for err in &loaded.errors {
        tracing::warn!(error = %err, "skipping unreadable native root");
    }

    let found = loaded.certs.len();
    let mut store = RootCertStore::empty();
    let (added, ignored) = store.add_parsable_certificates(loaded.certs);
    if ignored > 0 {
        tracing::warn!(added, ignored, "unparsable native roots ignored");
    }
    if added == 0 {
        return Err(format!("OS trust store has no usable native root ({found} found)"));
    }

    tracing::debug!(added, "native roots loaded");
    Ok(Arc::new(store))
}

/// # Errors
///
/// Fails when [`native_roots`] does, or the provider rejects the default
/// protocol versions.
pub fn native_roots_client_config() -> Result<ClientConfig, String> {
    let roots = native_roots()?;
    Ok(ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| e.to_string())?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

/// Accepts any chain for any host name.
///
/// The handshake signature is still checked against the presented
/// certificate, so the peer must hold its private key.
///
/// # Errors
///
/// Fails if the provider rejects the default protocol versions.
pub fn unverified_client_config() -> Result<ClientConfig, rustls::Error> {
    let provider = crypto_provider();
    let verifier = Arc::new(TrustAnyServer(Arc::clone(&provider)));

    Ok(ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth())
}

#[derive(Debug)]
struct TrustAnyServer(Arc<CryptoProvider>);

impl ServerCertVerifier for TrustAnyServer {
    fn verify_server_cert(
        &self,
        _: &CertificateDer<'_>,
        _: &[CertificateDer<'_>],
        _: &ServerName<'_>,
        _: &[u8],
        _: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_native_roots_parsed_once() {
        // Containers without an OS store get the same cached error twice.
        match (native_roots(), native_roots()) {
            (Ok(a), Ok(b)) => assert!(Arc::ptr_eq(&a, &b)),
            (Err(a), Err(b)) => {
                assert_eq!(a, b);
                assert!(a.contains("native root"));
            }
            _ => panic!("cached result changed between calls"),
        }
    }

    #[test]
    fn test_unverified_config_builds() {
        let config = unverified_client_config().unwrap();
        assert!(config.alpn_protocols.is_empty());
    }

    #[test]
    fn test_unverified_verifier_keeps_signature_schemes() {
        let verifier = TrustAnyServer(crypto_provider());
        assert!(!verifier.supported_verify_schemes().is_empty());
    }
}
