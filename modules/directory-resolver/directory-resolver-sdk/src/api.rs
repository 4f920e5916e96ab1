//! Plugin-facing directory trait.
//!
//! OS plugin entry points are synchronous, so this seam is blocking. The
//! resolver crate implements it on top of its async client; tests implement
//! it with in-memory fakes.

use crate::error::DirectoryError;
use crate::models::{AuthResult, Lookup};
use crate::secret::Password;

/// Blocking identity directory consumed by the NSS and PAM adapters.
///
/// Implementations hold no mutable state shared between calls and may be
/// invoked concurrently from any number of threads.
pub trait IdentityDirectory: Send + Sync {
    /// Resolve a user by login name.
    ///
    /// # Errors
    ///
    /// - `Configuration` if no endpoint is configured (no request is sent)
    /// - `Transport` if the service cannot be reached or answers non-2xx
    /// - `BufferOverflow` if the response does not fit the buffer
    /// - `Runtime` if the request could not be driven to completion
    ///
    /// Malformed bodies are reported as [`Lookup::NotFound`], not as errors.
    fn resolve_by_name(&self, name: &str) -> Result<Lookup, DirectoryError>;

    /// Resolve a user by numeric id.
    ///
    /// # Errors
    ///
    /// Same as [`resolve_by_name`](Self::resolve_by_name).
    fn resolve_by_id(&self, numeric_id: u32) -> Result<Lookup, DirectoryError>;

    /// Verify a username/password pair.
    ///
    /// Service failures are folded into [`AuthResult::ServiceError`].
    ///
    /// # Errors
    ///
    /// - `Configuration` if no endpoint is configured (no request is sent)
    /// - `Runtime` if the request could not be driven to completion
    fn authenticate(&self, username: &str, password: &Password)
    -> Result<AuthResult, DirectoryError>;
}
