use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use http::{Method, Request, Uri};
use http_body_util::Empty;
use tokio::time::Instant;
use tower::ServiceExt;

use crate::builder::InnerService;
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::HttpResponse;

/// A pending GET, created by [`HttpClient::get`](crate::HttpClient::get).
///
/// Header errors are held back and reported by [`send`](Self::send).
#[must_use = "nothing is sent until .send() is awaited"]
pub struct RequestBuilder {
    service: InnerService,
    max_body_size: usize,
    timeout: Duration,
    transport_security: TransportSecurity,
    url: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    deferred: Option<HttpError>,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: InnerService,
        max_body_size: usize,
        timeout: Duration,
        transport_security: TransportSecurity,
        url: String,
    ) -> Self {
        Self {
            service,
            max_body_size,
            timeout,
            transport_security,
            url,
            headers: Vec::new(),
            deferred: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.deferred.is_none() {
            match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                (Ok(name), Ok(value)) => self.headers.push((name, value)),
                (Err(e), _) => self.deferred = Some(e.into()),
                (_, Err(e)) => self.deferred = Some(e.into()),
            }
        }
        self
    }

    /// Lower the body cap for this request. Raising it has no effect.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.max_body_size = self.max_body_size.min(limit);
        self
    }

    fn target(&self) -> Result<Uri, HttpError> {
        let invalid = |kind, reason: String| HttpError::InvalidUri {
            url: self.url.clone(),
            kind,
            reason,
        };

        let uri: Uri = self
            .url
            .parse()
            .map_err(|e: http::uri::InvalidUri| invalid(InvalidUriKind::ParseError, e.to_string()))?;
        if uri.host().is_none() {
            return Err(invalid(InvalidUriKind::MissingAuthority, "no host".to_owned()));
        }

        let refused = |scheme: &str, reason: &str| HttpError::InvalidScheme {
            scheme: scheme.to_owned(),
            reason: reason.to_owned(),
        };
        match (uri.scheme_str(), self.transport_security) {
            (Some("https"), _) | (Some("http"), TransportSecurity::AllowInsecureHttp) => Ok(uri),
            (Some("http"), _) => Err(refused("http", "client is configured for TLS only")),
            (Some(other), _) => Err(refused(other, "expected http or https")),
            (None, _) => Err(invalid(InvalidUriKind::MissingScheme, "no scheme".to_owned())),
        }
    }

    /// Issue the request and wait for the response head.
    ///
    /// Every status comes back as `Ok`; [`HttpResponse::checked_bytes`]
    /// rejects non-2xx. The request timeout starts here and covers the
    /// head and the body together.
    ///
    /// # Errors
    ///
    /// A deferred header error, an unusable URL or scheme, a connect or TLS
    /// failure, or no response head within the request timeout.
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(err) = self.deferred.take() {
            return Err(err);
        }

        let mut request = Request::builder().method(Method::GET).uri(self.target()?);
        for (name, value) in self.headers {
            request = request.header(name, value);
        }

        let request = request.body(Empty::new())?;
        let deadline = Instant::now() + self.timeout;
        let inner = self.service.oneshot(request).await?;
        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
            deadline,
            timeout: self.timeout,
        })
    }
}
