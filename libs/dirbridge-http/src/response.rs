use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Response, StatusCode};
use http_body::Frame;
use http_body_util::BodyExt;
use pin_project_lite::pin_project;
use tokio::time::Instant;

use crate::error::HttpError;

/// Bytes of a non-2xx body kept in [`HttpError::HttpStatus`] for the log.
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 512;

/// Response body after the tower stack has boxed it.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

pin_project! {
    /// Streams a body while counting data bytes against a hard cap.
    ///
    /// The frame that would cross the cap is replaced by
    /// [`HttpError::BodyTooLarge`]; callers never see a truncated prefix
    /// followed by more data.
    pub struct LimitedBody {
        #[pin]
        inner: ResponseBody,
        limit: usize,
        read: usize,
    }
}

impl LimitedBody {
    #[must_use]
    pub fn new(inner: ResponseBody, limit: usize) -> Self {
        Self {
            inner,
            limit,
            read: 0,
        }
    }

    /// Data bytes yielded so far.
    #[must_use]
    pub fn bytes_read(&self) -> usize {
        self.read
    }

    /// Collect the rest of the body into one buffer.
    async fn collect_capped(mut self) -> Result<Bytes, HttpError> {
        let mut out = BytesMut::new();
        while let Some(frame) = self.frame().await {
            if let Some(chunk) = frame?.data_ref() {
                out.extend_from_slice(chunk);
            }
        }
        Ok(out.freeze())
    }
}

impl http_body::Body for LimitedBody {
    type Data = Bytes;
    type Error = HttpError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, HttpError>>> {
        let this = self.project();
        let frame = match this.inner.poll_frame(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(None) => return Poll::Ready(None),
            Poll::Ready(Some(Err(source))) => {
                return Poll::Ready(Some(Err(HttpError::Transport(source))));
            }
            Poll::Ready(Some(Ok(frame))) => frame,
        };

        let chunk_len = frame.data_ref().map_or(0, Bytes::len);
        let seen = this.read.saturating_add(chunk_len);
        if seen > *this.limit {
            return Poll::Ready(Some(Err(HttpError::BodyTooLarge {
                limit: *this.limit,
                actual: seen,
            })));
        }
        *this.read = seen;
        Poll::Ready(Some(Ok(frame)))
    }
}

/// Response head plus a body that can only be read under the request's
/// size cap and deadline.
///
/// The deadline was fixed when the request was sent; reading the body gets
/// whatever the head left of it.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
    pub(crate) deadline: Instant,
    /// Configured request timeout, reported in `Timeout`.
    pub(crate) timeout: Duration,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Cap applied when the body is read.
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// The whole body, whatever the status.
    ///
    /// # Errors
    ///
    /// `BodyTooLarge` past the cap, `Timeout` past the deadline, `Transport`
    /// if the connection drops mid-body.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        read_capped(self.inner, self.max_body_size, self.deadline, self.timeout).await
    }

    /// The whole body of a 2xx response.
    ///
    /// Anything else becomes `HttpStatus`, carrying up to
    /// [`ERROR_BODY_PREVIEW_LIMIT`] bytes of the body for the log.
    ///
    /// # Errors
    ///
    /// As [`bytes`](Self::bytes), plus `HttpStatus` for non-2xx.
    pub async fn checked_bytes(self) -> Result<Bytes, HttpError> {
        let status = self.inner.status();
        if status.is_success() {
            return self.bytes().await;
        }

        let cap = self.max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
        let body_preview = match read_capped(self.inner, cap, self.deadline, self.timeout).await {
            Ok(body) => String::from_utf8_lossy(&body).into_owned(),
            Err(HttpError::BodyTooLarge { actual, .. }) => format!("<{actual}+ bytes omitted>"),
            Err(other) => return Err(other),
        };
        Err(HttpError::HttpStatus {
            status,
            body_preview,
        })
    }
}

/// Refuses an oversized `Content-Length` up front, then streams under the cap.
async fn read_capped(
    response: Response<ResponseBody>,
    limit: usize,
    deadline: Instant,
    timeout: Duration,
) -> Result<Bytes, HttpError> {
    match declared_length(response.headers()) {
        Some(declared) if declared > limit => {
            return Err(HttpError::BodyTooLarge {
                limit,
                actual: declared,
            });
        }
        _ => {}
    }

    let body = LimitedBody::new(response.into_body(), limit);
    tokio::time::timeout_at(deadline, body.collect_capped())
        .await
        .unwrap_or(Err(HttpError::Timeout(timeout)))
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    let value = headers.get(http::header::CONTENT_LENGTH)?;
    value.to_str().ok()?.trim().parse().ok()
}
