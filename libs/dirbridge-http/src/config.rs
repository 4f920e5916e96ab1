use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("dirbridge-http/", env!("CARGO_PKG_VERSION"));

/// Where trust anchors come from when certificates are verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Bundled Mozilla roots.
    #[default]
    WebPki,
    /// The host's certificate store.
    Native,
}

/// Which URL schemes a client may connect to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// `http://` is accepted as well. Authentication queries then carry the
    /// password unencrypted.
    AllowInsecureHttp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum CertificateVerification {
    #[default]
    Verify,
    /// Any certificate for any host name is accepted. Building a client with
    /// this setting logs a warning.
    Disabled,
}

/// Settings for one [`HttpClient`](crate::HttpClient).
///
/// Defaults: 2 s connect, 5 s request, 64 KiB bodies, TLS only, verified
/// against the bundled roots.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    /// One deadline for the response head and body together.
    pub request_timeout: Duration,
    /// Upper bound for every body; requests may only lower it.
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
    pub tls_roots: TlsRootConfig,
    pub verification: CertificateVerification,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            max_body_size: 64 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::default(),
            tls_roots: TlsRootConfig::default(),
            verification: CertificateVerification::default(),
        }
    }
}

impl HttpClientConfig {
    /// Plain HTTP with short timeouts, for loopback mock servers.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(2),
            transport: TransportSecurity::AllowInsecureHttp,
            ..Self::default()
        }
    }

    /// `true` if either plain HTTP or unverified TLS is allowed.
    #[must_use]
    pub fn is_insecure(&self) -> bool {
        matches!(self.transport, TransportSecurity::AllowInsecureHttp)
            || matches!(self.verification, CertificateVerification::Disabled)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.tls_roots, TlsRootConfig::WebPki);
        assert!(!config.is_insecure());
        assert!(config.user_agent.starts_with("dirbridge-http/"));
    }

    #[test]
    fn test_insecure_settings() {
        assert!(HttpClientConfig::for_testing().is_insecure());

        let unverified = HttpClientConfig {
            verification: CertificateVerification::Disabled,
            ..HttpClientConfig::default()
        };
        assert!(unverified.is_insecure());
        assert_eq!(unverified.transport, TransportSecurity::TlsOnly);
    }
}
