//! Directory Resolver SDK
//!
//! This crate provides the public surface shared by the directory resolver
//! and the OS plugin adapters:
//!
//! - [`IdentityDirectory`] - Blocking trait the NSS and PAM adapters are written against
//! - [`ResolvedIdentity`], [`Lookup`], [`AuthResult`] - Resolution outcomes
//! - [`ServiceEndpoint`] - Validated base URL of the directory service
//! - [`Password`] - Redacted, zeroed-on-drop credential
//! - [`DirectoryError`] - Error taxonomy
//!
//! ## Usage
//!
//! ```ignore
//! use directory_resolver_sdk::{IdentityDirectory, Lookup};
//!
//! match directory.resolve_by_name("alice")? {
//!     Lookup::Found(identity) => println!("{}:{}", identity.name(), identity.numeric_id()),
//!     Lookup::NotFound => println!("no such user"),
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod secret;

// Re-export main types at crate root
pub use api::IdentityDirectory;
pub use error::DirectoryError;
pub use models::{AuthResult, Lookup, NOT_FOUND_SENTINEL, ResolvedIdentity, ServiceEndpoint};
pub use secret::Password;
