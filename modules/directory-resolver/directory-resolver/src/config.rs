//! Configuration for the directory resolver.
//!
//! The file is either a legacy single line holding the base URL, or a YAML
//! document. Plugins load it with [`DirectoryConfig::load`], which reads the
//! file only. The operator CLI uses [`DirectoryConfig::load_with_env`], which
//! additionally honours `DIRBRIDGE_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dirbridge_http::{
    CertificateVerification, HttpClientConfig, TlsRootConfig, TransportSecurity,
};
use directory_resolver_sdk::{DirectoryError, ServiceEndpoint};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Location read by the NSS and PAM plugins.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/dirbridge.conf";

/// Default response buffer size, NUL terminator included.
pub const DEFAULT_RESPONSE_CAPACITY: usize = 256;

/// Largest accepted `response_capacity`.
pub const MAX_RESPONSE_CAPACITY: usize = 64 * 1024;

const ENV_PREFIX: &str = "DIRBRIDGE_";

/// Resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Base URL of the directory service. Empty means "not configured".
    pub base_url: String,

    /// Response buffer size in bytes, NUL terminator included.
    pub response_capacity: usize,

    pub connect_timeout_ms: u64,

    /// Bound on the whole request, body included.
    pub request_timeout_ms: u64,

    /// Permit `http://` endpoints.
    pub allow_insecure_http: bool,

    /// Accept any server certificate for any host.
    pub insecure_skip_tls_verify: bool,

    pub tls_roots: TlsRoots,

    pub passwd: PasswdConfig,

    pub logging: LoggingConfig,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            response_capacity: DEFAULT_RESPONSE_CAPACITY,
            connect_timeout_ms: 2_000,
            request_timeout_ms: 5_000,
            allow_insecure_http: false,
            insecure_skip_tls_verify: false,
            tls_roots: TlsRoots::default(),
            passwd: PasswdConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Trust anchors for server certificates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsRoots {
    /// Mozilla roots compiled into the binary.
    #[default]
    Webpki,
    /// The operating system certificate store.
    Native,
}

impl From<TlsRoots> for TlsRootConfig {
    fn from(roots: TlsRoots) -> Self {
        match roots {
            TlsRoots::Webpki => TlsRootConfig::WebPki,
            TlsRoots::Native => TlsRootConfig::Native,
        }
    }
}

/// Fixed fields of the `passwd` records produced for resolved users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswdConfig {
    /// Parent of every home directory; the user's home is `<home_base>/<name>`.
    pub home_base: String,
    pub shell: String,
    pub gecos: String,
}

impl Default for PasswdConfig {
    fn default() -> Self {
        Self {
            home_base: "/home".to_owned(),
            shell: "/bin/sh".to_owned(),
            gecos: String::new(),
        }
    }
}

/// Diagnostics output.
///
/// Nothing is logged unless `file` is set: the plugins run inside host
/// programs whose stderr is not ours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `directory_resolver=debug`.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}

impl DirectoryConfig {
    /// Config with only the base URL set, as produced by a legacy file.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a file. Environment variables are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Configuration` if the file cannot be read,
    /// is malformed, or holds out-of-range values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let contents = read_config_file(path.as_ref())?;
        Self::from_figment(Self::figment_for(&contents))
    }

    /// Load configuration from a file, then apply `DIRBRIDGE_*` overrides.
    ///
    /// Nested keys use `__`, e.g. `DIRBRIDGE_PASSWD__SHELL=/bin/bash`.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with_env(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let contents = read_config_file(path.as_ref())?;
        let figment = Self::figment_for(&contents).merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    /// Parse configuration from file contents.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Configuration` if the contents are malformed.
    pub fn from_contents(contents: &str) -> Result<Self, DirectoryError> {
        Self::from_figment(Self::figment_for(contents))
    }

    fn figment_for(contents: &str) -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Self::default()));
        match legacy_base_url(contents) {
            Some(url) => figment.merge(Serialized::default("base_url", url)),
            None => figment.merge(Yaml::string(contents)),
        }
    }

    fn from_figment(figment: Figment) -> Result<Self, DirectoryError> {
        let config: Self = figment
            .extract()
            .map_err(|e| DirectoryError::Configuration(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges. An empty `base_url` is not an error here; it is
    /// reported by [`endpoint`](Self::endpoint) on every operation.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Configuration` naming the offending key.
    pub fn validate(&self) -> Result<(), DirectoryError> {
        if !(2..=MAX_RESPONSE_CAPACITY).contains(&self.response_capacity) {
            return Err(DirectoryError::Configuration(format!(
                "response_capacity must be between 2 and {MAX_RESPONSE_CAPACITY}, got {}",
                self.response_capacity
            )));
        }
        if self.connect_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(DirectoryError::Configuration(
                "timeouts must be greater than zero".to_owned(),
            ));
        }
        for (key, value) in [
            ("passwd.home_base", &self.passwd.home_base),
            ("passwd.shell", &self.passwd.shell),
            ("passwd.gecos", &self.passwd.gecos),
        ] {
            if value.contains(['\0', ':', '\n']) {
                return Err(DirectoryError::Configuration(format!(
                    "{key} must not contain NUL, ':' or newline"
                )));
            }
        }
        Ok(())
    }

    /// The validated service endpoint.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Configuration` if `base_url` is empty or invalid.
    pub fn endpoint(&self) -> Result<ServiceEndpoint, DirectoryError> {
        ServiceEndpoint::parse(&self.base_url)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// HTTP client settings derived from this configuration.
    #[must_use]
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            connect_timeout: self.connect_timeout(),
            request_timeout: self.request_timeout(),
            max_body_size: self.response_capacity,
            transport: if self.allow_insecure_http {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
            tls_roots: self.tls_roots.into(),
            verification: if self.insecure_skip_tls_verify {
                CertificateVerification::Disabled
            } else {
                CertificateVerification::Verify
            },
            ..HttpClientConfig::default()
        }
    }
}

fn read_config_file(path: &Path) -> Result<String, DirectoryError> {
    std::fs::read_to_string(path).map_err(|e| {
        DirectoryError::Configuration(format!("cannot read {}: {e}", path.display()))
    })
}

/// Returns the URL when `contents` is the legacy single-line form.
///
/// Blank lines and `#` comments are ignored; an empty file counts as a
/// legacy file with an empty URL.
fn legacy_base_url(contents: &str) -> Option<String> {
    let mut lines = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));

    match (lines.next(), lines.next()) {
        (None, _) => Some(String::new()),
        (Some(line), None) if line.starts_with("http://") || line.starts_with("https://") => {
            Some(line.to_owned())
        }
        _ => None,
    }
}
