use std::time::Duration;

use crate::builder::{HttpClientBuilder, InnerService};
use crate::config::TransportSecurity;
use crate::request::RequestBuilder;

/// GET-only client: request timeout, default headers, no idle connections.
///
/// Cheap to clone; each request runs on its own clone of the service stack.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: InnerService,
    pub(crate) max_body_size: usize,
    pub(crate) request_timeout: Duration,
    pub(crate) transport_security: TransportSecurity,
}

impl HttpClient {
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Start a GET for an absolute URL whose query is already encoded.
    pub fn get(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            self.request_timeout,
            self.transport_security,
            url.to_owned(),
        )
    }

    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use httpmock::prelude::*;

    fn loopback_client() -> HttpClient {
        HttpClient::builder()
            .transport(TransportSecurity::AllowInsecureHttp)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_sends_default_headers_and_reads_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/nss")
                .query_param("name", "1000")
                .header("accept", "text/plain")
                .header_exists("user-agent");
            then.status(200).body("1000 alice");
        });

        let body = loopback_client()
            .get(&format!("{}?name=1000", server.url("/nss")))
            .send()
            .await
            .unwrap()
            .checked_bytes()
            .await
            .unwrap();

        assert_eq!(&body[..], b"1000 alice");
        mock.assert();
    }

    #[tokio::test]
    async fn test_server_error_surfaces_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/nss");
            then.status(503).body("maintenance");
        });

        let resp = loopback_client().get(&server.url("/nss")).send().await.unwrap();
        assert_eq!(resp.status(), http::StatusCode::SERVICE_UNAVAILABLE);

        match resp.checked_bytes().await.unwrap_err() {
            HttpError::HttpStatus {
                status,
                body_preview,
            } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body_preview, "maintenance");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/nss");
            then.status(200).body("1").delay(Duration::from_millis(800));
        });

        let client = HttpClient::builder()
            .transport(TransportSecurity::AllowInsecureHttp)
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();

        let err = client.get(&server.url("/nss")).send().await.unwrap_err();
        assert!(matches!(err, HttpError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_timeout_covers_head_and_body_together() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Head and body each arrive within the timeout, but not both.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0_u8; 1024];
            let _ = socket.read(&mut request).await.unwrap();
            tokio::time::sleep(Duration::from_millis(250)).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 10\r\n\r\n")
                .await
                .unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(250)).await;
            let _ = socket.write_all(b"1000 alice").await;
        });

        let client = HttpClient::builder()
            .transport(TransportSecurity::AllowInsecureHttp)
            .timeout(Duration::from_millis(350))
            .build()
            .unwrap();

        let started = tokio::time::Instant::now();
        let resp = client.get(&format!("http://{addr}/nss")).send().await.unwrap();
        let err = resp.checked_bytes().await.unwrap_err();

        assert!(matches!(err, HttpError::Timeout(_)), "got {err:?}");
        assert!(started.elapsed() < Duration::from_millis(480));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport() {
        // Nothing listens on the loopback discard port.
        let err = loopback_client()
            .get("http://127.0.0.1:9/nss")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Transport(_)), "got {err:?}");
    }
}
