//! Blocking facade used by the OS plugins.
//!
//! Each call loads the configuration, fails fast when no endpoint is
//! configured, builds a fresh client and drives the async resolver on a
//! current-thread runtime that lives for that call only.

use std::future::Future;
use std::path::{Path, PathBuf};

use directory_resolver_sdk::{
    AuthResult, DirectoryError, IdentityDirectory, Lookup, Password, ServiceEndpoint,
};

use crate::client::DirectoryClient;
use crate::config::{DEFAULT_CONFIG_PATH, DirectoryConfig};
use crate::resolver::IdentityResolver;
use crate::telemetry;

#[derive(Debug, Clone)]
enum ConfigSource {
    /// Re-read on every call.
    File(PathBuf),
    Fixed(DirectoryConfig),
}

/// Synchronous [`IdentityDirectory`] backed by the HTTP directory service.
#[derive(Debug, Clone)]
pub struct DirectoryBridge {
    source: ConfigSource,
}

impl DirectoryBridge {
    /// Bridge reading [`DEFAULT_CONFIG_PATH`] on every call.
    #[must_use]
    pub fn system() -> Self {
        Self::from_path(DEFAULT_CONFIG_PATH)
    }

    /// Bridge reading `path` on every call.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ConfigSource::File(path.into()),
        }
    }

    /// Bridge over an already loaded configuration.
    #[must_use]
    pub fn with_config(config: DirectoryConfig) -> Self {
        Self {
            source: ConfigSource::Fixed(config),
        }
    }

    /// Path the configuration is read from, if any.
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        match &self.source {
            ConfigSource::File(path) => Some(path),
            ConfigSource::Fixed(_) => None,
        }
    }

    /// Load the configuration for one call.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Configuration` if the file cannot be loaded.
    pub fn config(&self) -> Result<DirectoryConfig, DirectoryError> {
        match &self.source {
            ConfigSource::File(path) => DirectoryConfig::load(path),
            ConfigSource::Fixed(config) => Ok(config.clone()),
        }
    }

    /// Everything one call needs, or a configuration error before any I/O.
    fn prepare(&self) -> Result<(IdentityResolver, ServiceEndpoint), DirectoryError> {
        let config = self.config().inspect_err(|e| {
            tracing::warn!(error = %e, "directory configuration unavailable");
        })?;
        telemetry::init(&config.logging);

        let endpoint = config.endpoint().inspect_err(|e| {
            tracing::warn!(error = %e, "directory endpoint unavailable");
        })?;
        let client = DirectoryClient::from_config(&config)?;
        Ok((
            IdentityResolver::with_capacity(client, config.response_capacity),
            endpoint,
        ))
    }
}

impl IdentityDirectory for DirectoryBridge {
    fn resolve_by_name(&self, name: &str) -> Result<Lookup, DirectoryError> {
        let (resolver, endpoint) = self.prepare()?;
        block_on(resolver.resolve_by_name(&endpoint, name))?
    }

    fn resolve_by_id(&self, numeric_id: u32) -> Result<Lookup, DirectoryError> {
        let (resolver, endpoint) = self.prepare()?;
        block_on(resolver.resolve_by_id(&endpoint, numeric_id))?
    }

    fn authenticate(
        &self,
        username: &str,
        password: &Password,
    ) -> Result<AuthResult, DirectoryError> {
        let (resolver, endpoint) = self.prepare()?;
        block_on(resolver.authenticate(&endpoint, username, password))
    }
}

/// Run `fut` to completion on a runtime owned by this call.
///
/// Inside an existing tokio runtime a nested `block_on` would panic, so the
/// future is driven on a scoped helper thread instead.
fn block_on<F>(fut: F) -> Result<F::Output, DirectoryError>
where
    F: Future + Send,
    F::Output: Send,
{
    if tokio::runtime::Handle::try_current().is_err() {
        return run_current_thread(fut);
    }

    std::thread::scope(|scope| {
        scope
            .spawn(|| run_current_thread(fut))
            .join()
            .map_err(|_| DirectoryError::Runtime("resolver thread panicked".to_owned()))?
    })
}

fn run_current_thread<F: Future>(fut: F) -> Result<F::Output, DirectoryError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DirectoryError::Runtime(format!("failed to start runtime: {e}")))?;
    Ok(runtime.block_on(fut))
}
