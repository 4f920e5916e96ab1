//! Identity resolution: query, fetch, decode.

use directory_resolver_sdk::{AuthResult, DirectoryError, Lookup, Password, ServiceEndpoint};

use crate::client::DirectoryClient;
use crate::config::DEFAULT_RESPONSE_CAPACITY;
use crate::decoder::{decode_auth, decode_lookup};
use crate::query::DirectoryQuery;

/// Async resolver composed from a [`DirectoryClient`] and the decoder.
///
/// Every operation is one stateless request/decode cycle with no retries.
#[derive(Clone)]
pub struct IdentityResolver {
    client: DirectoryClient,
    capacity: usize,
}

impl IdentityResolver {
    /// Resolver with the default 256-byte response capacity.
    #[must_use]
    pub fn new(client: DirectoryClient) -> Self {
        Self::with_capacity(client, DEFAULT_RESPONSE_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(client: DirectoryClient, capacity: usize) -> Self {
        Self { client, capacity }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resolve a user by login name (`?id=<name>`).
    ///
    /// # Errors
    ///
    /// `Transport` or `BufferOverflow` from the client. Malformed bodies are
    /// `Ok(Lookup::NotFound)`.
    pub async fn resolve_by_name(
        &self,
        endpoint: &ServiceEndpoint,
        name: &str,
    ) -> Result<Lookup, DirectoryError> {
        if name.is_empty() {
            return Ok(Lookup::NotFound);
        }
        self.lookup(DirectoryQuery::by_name(endpoint, name)).await
    }

    /// Resolve a user by numeric id (`?name=<numeric_id>`).
    ///
    /// # Errors
    ///
    /// Same as [`resolve_by_name`](Self::resolve_by_name).
    pub async fn resolve_by_id(
        &self,
        endpoint: &ServiceEndpoint,
        numeric_id: u32,
    ) -> Result<Lookup, DirectoryError> {
        if numeric_id == u32::MAX {
            return Ok(Lookup::NotFound);
        }
        self.lookup(DirectoryQuery::by_id(endpoint, numeric_id)).await
    }

    /// Verify a username/password pair (`?id=<user>&pass=<pass>`).
    ///
    /// Any client failure yields [`AuthResult::ServiceError`].
    pub async fn authenticate(
        &self,
        endpoint: &ServiceEndpoint,
        username: &str,
        password: &Password,
    ) -> AuthResult {
        if username.is_empty() {
            tracing::debug!("empty username denied without a request");
            return AuthResult::Denied;
        }

        let query = DirectoryQuery::authenticate(endpoint, username, password);
        let result = match self.client.fetch(query.url(), self.capacity).await {
            Ok(response) => decode_auth(response.as_bytes()),
            Err(e) => {
                tracing::warn!(user = username, error = %e, "authentication request failed");
                AuthResult::ServiceError
            }
        };

        tracing::info!(user = username, result = ?result, "authentication finished");
        result
    }

    async fn lookup(&self, query: DirectoryQuery) -> Result<Lookup, DirectoryError> {
        let response = self.client.fetch(query.url(), self.capacity).await?;
        let lookup = decode_lookup(response.as_bytes());
        tracing::debug!(kind = ?query.kind(), found = lookup.is_found(), "lookup finished");
        Ok(lookup)
    }
}
