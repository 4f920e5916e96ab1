#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Directory Resolver
//!
//! HTTP-backed identity resolution for the NSS and PAM plugins:
//!
//! - [`DirectoryClient`] - bounded GET into a NUL-terminated buffer
//! - [`decoder`] - plain-text response decoding
//! - [`DirectoryQuery`] - percent-encoding query builder
//! - [`IdentityResolver`] - async lookups and credential checks
//! - [`DirectoryBridge`] - blocking [`IdentityDirectory`](directory_resolver_sdk::IdentityDirectory)
//!   implementation used by the plugins
//! - [`PasswdEntry`] - `passwd` records packed into caller buffers
//!
//! ```ignore
//! use directory_resolver::DirectoryBridge;
//! use directory_resolver_sdk::IdentityDirectory;
//!
//! let bridge = DirectoryBridge::system();
//! let lookup = bridge.resolve_by_id(1000)?;
//! ```

pub mod bridge;
pub mod client;
pub mod config;
pub mod decoder;
pub mod passwd;
pub mod query;
pub mod resolver;
pub mod telemetry;

pub use bridge::DirectoryBridge;
pub use client::{DirectoryClient, DirectoryResponse};
pub use config::{DEFAULT_CONFIG_PATH, DirectoryConfig, LoggingConfig, PasswdConfig, TlsRoots};
pub use decoder::{decode_auth, decode_lookup};
pub use passwd::{PackedOffsets, PasswdEntry};
pub use query::{DirectoryQuery, QueryKind};
pub use resolver::IdentityResolver;
