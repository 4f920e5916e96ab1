//! Directory client: one bounded GET per call.

use bytes::Bytes;
use dirbridge_http::{HttpClient, HttpClientBuilder, HttpError};
use directory_resolver_sdk::DirectoryError;
use url::Url;

use crate::config::DirectoryConfig;
use crate::query;

/// Raw body of one directory response.
///
/// Always shorter than the capacity it was fetched with, so a NUL terminator
/// fits behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResponse {
    body: Bytes,
    capacity: usize,
}

impl DirectoryResponse {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Capacity the response was fetched with, NUL terminator included.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy the body plus a NUL terminator into `dest` and return the body length.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::BufferOverflow` without touching `dest` when
    /// the body and its terminator do not fit.
    pub fn write_to(&self, dest: &mut [u8]) -> Result<usize, DirectoryError> {
        let len = self.body.len();
        let Some(slot) = dest.get_mut(..=len) else {
            return Err(DirectoryError::BufferOverflow {
                capacity: dest.len(),
            });
        };
        let (text, terminator) = slot.split_at_mut(len);
        text.copy_from_slice(&self.body);
        terminator[0] = 0;
        Ok(len)
    }
}

/// HTTP client for the directory service.
///
/// Cheap to clone; clones share no mutable state.
#[derive(Clone)]
pub struct DirectoryClient {
    http: HttpClient,
}

impl DirectoryClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Build a client from resolver configuration.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Configuration` if the TLS setup cannot be built.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let http = HttpClientBuilder::with_config(config.http_config())
            .build()
            .map_err(|e| DirectoryError::Configuration(format!("HTTP client setup failed: {e}")))?;
        Ok(Self::new(http))
    }

    /// GET `url` and return its body, which must be at most `capacity - 1` bytes.
    ///
    /// # Errors
    ///
    /// - `BufferOverflow` if the body does not fit; nothing is truncated
    /// - `Transport` on connect, TLS or timeout failures and non-2xx statuses
    pub async fn fetch(&self, url: &Url, capacity: usize) -> Result<DirectoryResponse, DirectoryError> {
        // Room for the NUL terminator; the client's own limit applies as well.
        let Some(limit) = capacity.checked_sub(1) else {
            return Err(DirectoryError::BufferOverflow { capacity });
        };
        let limit = limit.min(self.http.max_body_size());
        let effective_capacity = limit + 1;

        tracing::debug!(url = %query::redact(url), capacity = effective_capacity, "directory request");

        let result = match self.http.get(url.as_str()).body_limit(limit).send().await {
            Ok(response) => response.checked_bytes().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(body) => {
                tracing::debug!(len = body.len(), "directory response");
                Ok(DirectoryResponse {
                    body,
                    capacity: effective_capacity,
                })
            }
            Err(e) if e.is_body_too_large() => {
                tracing::warn!(capacity = effective_capacity, error = %e, "directory response exceeds buffer");
                Err(DirectoryError::BufferOverflow {
                    capacity: effective_capacity,
                })
            }
            Err(e) => {
                log_transport_error(url, &e);
                Err(DirectoryError::transport(e))
            }
        }
    }

    /// GET `url` and copy the NUL-terminated body into `dest`.
    ///
    /// Returns the body length. `dest` is written only after the whole body
    /// has arrived and fits.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch), with `dest.len()` as the capacity.
    pub async fn fetch_into(&self, url: &Url, dest: &mut [u8]) -> Result<usize, DirectoryError> {
        let response = self.fetch(url, dest.len()).await?;
        response.write_to(dest)
    }
}

fn log_transport_error(url: &Url, err: &HttpError) {
    match err {
        HttpError::HttpStatus { status, .. } => {
            tracing::warn!(url = %query::redact(url), status = status.as_u16(), "directory service returned an error status");
        }
        HttpError::Timeout(after) => {
            tracing::warn!(url = %query::redact(url), timeout_ms = after.as_millis(), "directory request timed out");
        }
        other => {
            tracing::warn!(url = %query::redact(url), error = %other, "directory request failed");
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client() -> DirectoryClient {
        let mut config = DirectoryConfig::with_base_url("http://127.0.0.1/");
        config.allow_insecure_http = true;
        DirectoryClient::from_config(&config).unwrap()
    }

    fn url(server: &MockServer) -> Url {
        Url::parse(&server.url("/nss?id=alice")).unwrap()
    }

    #[test]
    fn test_write_to_adds_terminator() {
        let response = DirectoryResponse {
            body: Bytes::from_static(b"1000 alice"),
            capacity: 16,
        };
        let mut dest = [0xAA_u8; 11];
        assert_eq!(response.write_to(&mut dest).unwrap(), 10);
        assert_eq!(&dest[..10], b"1000 alice");
        assert_eq!(dest[10], 0);
    }

    #[test]
    fn test_write_to_short_destination_untouched() {
        let response = DirectoryResponse {
            body: Bytes::from_static(b"1000 alice"),
            capacity: 16,
        };
        let mut dest = [0xAA_u8; 10];
        let err = response.write_to(&mut dest).unwrap_err();
        assert!(matches!(err, DirectoryError::BufferOverflow { capacity: 10 }));
        assert!(dest.iter().all(|b| *b == 0xAA));
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::GET).path("/nss").query_param("id", "alice");
            then.status(200).body("1000 alice");
        });

        let response = client().fetch(&url(&server), 256).await.unwrap();
        assert_eq!(response.as_bytes(), b"1000 alice");
        assert_eq!(response.capacity(), 256);
    }

    #[tokio::test]
    async fn test_zero_capacity_overflows_without_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::GET).path("/nss");
            then.status(200).body("");
        });

        let err = client().fetch(&url(&server), 0).await.unwrap_err();
        assert!(matches!(err, DirectoryError::BufferOverflow { capacity: 0 }));
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_error_status_is_transport() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::GET).path("/nss");
            then.status(503).body("maintenance");
        });

        let err = client().fetch(&url(&server), 256).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_plain_http_refused_by_default() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::GET).path("/nss");
            then.status(200).body("1000 alice");
        });

        let strict = DirectoryClient::from_config(&DirectoryConfig::default()).unwrap();
        let err = strict.fetch(&url(&server), 256).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Transport(_)));
        mock.assert_calls(0);
    }
}
