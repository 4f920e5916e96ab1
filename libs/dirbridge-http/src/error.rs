use std::time::Duration;

use thiserror::Error;

/// Why a request URL was rejected before any connection was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    /// Not a syntactically valid URI.
    ParseError,
    /// No host to connect to.
    MissingAuthority,
    /// Neither `http` nor `https`.
    MissingScheme,
}

/// Failures of a single directory-service request.
///
/// Match on variants, not on the rendered message.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("cannot build request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("bad header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("bad header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Headers and body did not both arrive within the request timeout.
    #[error("no complete response within {0:?}")]
    Timeout(Duration),

    /// Resolution, connect or I/O failure below HTTP.
    #[error("connection failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Root store or handshake failure.
    #[error("tls: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The body outgrew the per-request limit.
    ///
    /// `actual` is the byte count at the moment the limit tripped, or the
    /// advertised `Content-Length` when the body was refused unread.
    #[error("response of {actual} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Any status outside 2xx. The preview is empty when the body was skipped.
    #[error("server answered {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
    },

    /// `reason` is free-form text for logs; match on `kind`.
    #[error("unusable url {url:?}: {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    /// The scheme conflicts with the configured [`TransportSecurity`](crate::TransportSecurity).
    #[error("scheme {scheme:?} refused: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl HttpError {
    /// `true` when the response outgrew its limit.
    #[must_use]
    pub fn is_body_too_large(&self) -> bool {
        matches!(self, Self::BodyTooLarge { .. })
    }

    pub(crate) fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(err.into())
    }
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        Self::transport(err)
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::transport(err)
    }
}
