//! Error types for the directory resolver.

use thiserror::Error;

/// Errors that can occur while resolving identities against the directory service.
///
/// None of these is fatal to the host process; adapters translate every
/// variant into a terminal status code of their framework.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The service endpoint or the configuration file is missing, empty or invalid.
    ///
    /// Raised before any network activity.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// DNS, connect, TLS, timeout or non-2xx failure talking to the service.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response did not fit the bounded buffer.
    ///
    /// Nothing is written to the destination when this is returned.
    #[error("response exceeds buffer capacity of {capacity} bytes")]
    BufferOverflow {
        /// Capacity of the destination, NUL terminator included.
        capacity: usize,
    },

    /// The response body is malformed.
    ///
    /// Lookups treat this exactly like "not found".
    #[error("malformed directory response: {0}")]
    Decode(String),

    /// The async runtime could not be created or the worker thread failed.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl DirectoryError {
    /// Wrap any error as a transport failure.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(err.into())
    }

    /// Returns `true` for configuration failures.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns `true` when the response overflowed the buffer.
    #[must_use]
    pub fn is_buffer_overflow(&self) -> bool {
        matches!(self, Self::BufferOverflow { .. })
    }
}
