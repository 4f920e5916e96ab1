use std::time::Duration;

use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Empty};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tower::timeout::TimeoutLayer;
use tower::util::BoxCloneSyncService;
use tower::{ServiceBuilder, ServiceExt};

use crate::HttpClient;
use crate::config::{CertificateVerification, HttpClientConfig, TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use crate::layers::DefaultHeadersLayer;
use crate::response::ResponseBody;
use crate::tls;

/// Target for warnings about weakened transport security.
pub const SECURITY_LOG_TARGET: &str = "dirbridge_http::security";

pub(crate) type InnerService =
    BoxCloneSyncService<http::Request<Empty<Bytes>>, Response<ResponseBody>, HttpError>;

/// Assembles an [`HttpClient`] from an [`HttpClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// Deadline for the whole request, head and body together.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    #[must_use]
    pub fn tls_roots(mut self, roots: TlsRootConfig) -> Self {
        self.config.tls_roots = roots;
        self
    }

    /// [`CertificateVerification::Disabled`] accepts any certificate for any host.
    #[must_use]
    pub fn verification(mut self, verification: CertificateVerification) -> Self {
        self.config.verification = verification;
        self
    }

    /// # Errors
    ///
    /// `Tls` if the root store or provider cannot be set up, and
    /// `InvalidHeaderValue` for an unusable user agent.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let config = self.config;
        warn_if_weakened(&config);

        let connector = https_connector(&config)?;
        let user_agent = DefaultHeadersLayer::try_new(&config.user_agent)?;

        // No pooling: every client serves a single request.
        let hyper = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build::<_, Empty<Bytes>>(connector);

        // timeout -> default headers -> hyper. The layer bounds the response
        // head; the body is read against the same deadline in HttpResponse.
        let deadline = config.request_timeout;
        let stack = ServiceBuilder::new()
            .layer(TimeoutLayer::new(deadline))
            .layer(user_agent)
            .service(hyper)
            .map_response(erase_body)
            .map_err(move |e: tower::BoxError| classify(e, deadline));

        Ok(HttpClient {
            service: BoxCloneSyncService::new(stack),
            max_body_size: config.max_body_size,
            request_timeout: deadline,
            transport_security: config.transport,
        })
    }
}

fn warn_if_weakened(config: &HttpClientConfig) {
    if config.transport == TransportSecurity::AllowInsecureHttp {
        tracing::warn!(
            target: SECURITY_LOG_TARGET,
            "plain http permitted; passwords in the query string may travel unencrypted"
        );
    }
    if config.verification == CertificateVerification::Disabled {
        tracing::warn!(
            target: SECURITY_LOG_TARGET,
            "server certificates are not verified"
        );
    }
}

fn classify(err: tower::BoxError, deadline: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(deadline);
    }
    match err.downcast::<HttpError>() {
        Ok(inner) => *inner,
        Err(other) => HttpError::Transport(other),
    }
}

fn erase_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    response.map(|body| body.map_err(Into::into).boxed())
}

/// TCP with the connect timeout, wrapped in rustls per the root and
/// verification settings. ALPN offers h2 and http/1.1.
fn https_connector(config: &HttpClientConfig) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let tls_err = |e: Box<dyn std::error::Error + Send + Sync>| HttpError::Tls(e);

    let with_tls = match (config.verification, config.tls_roots) {
        (CertificateVerification::Disabled, _) => HttpsConnectorBuilder::new()
            .with_tls_config(tls::unverified_client_config().map_err(|e| tls_err(e.into()))?),
        (CertificateVerification::Verify, TlsRootConfig::Native) => HttpsConnectorBuilder::new()
            .with_tls_config(tls::native_roots_client_config().map_err(|e| tls_err(e.into()))?),
        (CertificateVerification::Verify, TlsRootConfig::WebPki) => HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(tls::crypto_provider())
            .map_err(|e| tls_err(e.into()))?,
    };

    let with_scheme = if config.transport == TransportSecurity::AllowInsecureHttp {
        with_tls.https_or_http()
    } else {
        with_tls.https_only()
    };

    let mut tcp = HttpConnector::new();
    tcp.enforce_http(false);
    tcp.set_connect_timeout(Some(config.connect_timeout));

    Ok(with_scheme.enable_all_versions().wrap_connector(tcp))
}
