#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Minimal HTTPS GET client for the directory bridge.
//!
//! Built for plugin callers that make one request per OS callback and then
//! drop the client:
//! - rustls with verification on unless explicitly disabled
//! - connect and request deadlines on every call
//! - no pooling, no retries, no redirects
//! - bodies above the cap fail instead of being truncated
//!
//! ```ignore
//! use dirbridge_http::HttpClient;
//!
//! let client = HttpClient::builder().max_body_size(255).build()?;
//! let body = client
//!     .get("https://directory.example.com/nss?id=alice")
//!     .send()
//!     .await?
//!     .checked_bytes()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
pub mod tls;

pub use builder::{HttpClientBuilder, SECURITY_LOG_TARGET};
pub use client::HttpClient;
pub use config::{
    CertificateVerification, DEFAULT_USER_AGENT, HttpClientConfig, TlsRootConfig,
    TransportSecurity,
};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{DefaultHeadersLayer, DefaultHeadersService};
pub use request::RequestBuilder;
pub use response::{ERROR_BODY_PREVIEW_LIMIT, HttpResponse, LimitedBody, ResponseBody};
