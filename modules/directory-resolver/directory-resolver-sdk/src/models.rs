//! Domain models for the directory resolver.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use url::Url;

use crate::error::DirectoryError;

/// Wire value the service uses for "no such identity".
///
/// Never surfaced as a [`ResolvedIdentity`]; its `uid_t` alias `u32::MAX` is
/// rejected as well.
pub const NOT_FOUND_SENTINEL: i64 = -1;

/// A user resolved by the directory service.
///
/// Construction goes through [`ResolvedIdentity::new`], so every value holds a
/// real id and a non-empty name that is safe to place in a `passwd` record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedIdentity {
    numeric_id: u32,
    name: String,
}

impl ResolvedIdentity {
    /// Validate and build an identity.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Decode` when the id is the `uid_t` sentinel,
    /// the name is empty, or the name contains control characters or `:`.
    pub fn new(numeric_id: u32, name: impl Into<String>) -> Result<Self, DirectoryError> {
        let name = name.into();
        if numeric_id == u32::MAX {
            return Err(DirectoryError::Decode(
                "numeric id is the not-found sentinel".to_owned(),
            ));
        }
        if name.is_empty() {
            return Err(DirectoryError::Decode("name is empty".to_owned()));
        }
        if name.chars().any(|c| c.is_control() || c == ':') {
            return Err(DirectoryError::Decode(
                "name contains a control character or ':'".to_owned(),
            ));
        }
        Ok(Self { numeric_id, name })
    }

    #[must_use]
    pub fn numeric_id(&self) -> u32 {
        self.numeric_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Outcome of a name or id lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ResolvedIdentity),
    NotFound,
}

impl Lookup {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns the identity, if one was found.
    #[must_use]
    pub fn into_identity(self) -> Option<ResolvedIdentity> {
        match self {
            Self::Found(identity) => Some(identity),
            Self::NotFound => None,
        }
    }
}

/// Outcome of a credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthResult {
    /// The service answered 2xx with a leading byte other than `'0'`.
    Authenticated,
    /// The service answered 2xx with a leading `'0'` (or an empty body).
    Denied,
    /// The service could not be reached or did not answer 2xx.
    ServiceError,
}

impl AuthResult {
    #[must_use]
    pub fn is_authenticated(self) -> bool {
        self == Self::Authenticated
    }
}

/// Validated base URL of the directory service.
///
/// Immutable once built and safe to share between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint(Url);

impl ServiceEndpoint {
    /// Parse and validate a base URL.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Configuration` if the value is empty, does not
    /// parse, is not `http`/`https`, or has no host.
    pub fn parse(value: &str) -> Result<Self, DirectoryError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(DirectoryError::Configuration(
                "service endpoint is not configured".to_owned(),
            ));
        }

        let url = Url::parse(value).map_err(|e| {
            DirectoryError::Configuration(format!("invalid service endpoint '{value}': {e}"))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DirectoryError::Configuration(format!(
                "unsupported service endpoint scheme '{}'",
                url.scheme()
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(DirectoryError::Configuration(format!(
                "service endpoint '{value}' has no host"
            )));
        }

        Ok(Self(url))
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.0
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn is_https(&self) -> bool {
        self.0.scheme() == "https"
    }
}

impl FromStr for ServiceEndpoint {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_identity_accepts_regular_values() {
        let identity = ResolvedIdentity::new(1000, "alice").unwrap();
        assert_eq!(identity.numeric_id(), 1000);
        assert_eq!(identity.name(), "alice");

        let root = ResolvedIdentity::new(0, "root").unwrap();
        assert_eq!(root.numeric_id(), 0);
    }

    #[test]
    fn test_identity_rejects_sentinel_and_bad_names() {
        assert!(ResolvedIdentity::new(u32::MAX, "ghost").is_err());
        assert!(ResolvedIdentity::new(1, "").is_err());
        assert!(ResolvedIdentity::new(1, "al\nice").is_err());
        assert!(ResolvedIdentity::new(1, "al\0ice").is_err());
        assert!(ResolvedIdentity::new(1, "al:ice").is_err());
    }

    #[test]
    fn test_identity_serializes_fields() {
        let identity = ResolvedIdentity::new(42, "bob").unwrap();
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json, serde_json::json!({"numeric_id": 42, "name": "bob"}));
    }

    #[test]
    fn test_lookup_helpers() {
        let found = Lookup::Found(ResolvedIdentity::new(7, "carol").unwrap());
        assert!(found.is_found());
        assert_eq!(found.into_identity().unwrap().name(), "carol");
        assert!(!Lookup::NotFound.is_found());
        assert!(Lookup::NotFound.into_identity().is_none());
    }

    #[test]
    fn test_auth_result() {
        assert!(AuthResult::Authenticated.is_authenticated());
        assert!(!AuthResult::Denied.is_authenticated());
        assert!(!AuthResult::ServiceError.is_authenticated());
        assert_eq!(
            serde_json::to_string(&AuthResult::ServiceError).unwrap(),
            "\"service_error\""
        );
    }

    #[test]
    fn test_endpoint_empty_is_configuration_error() {
        for value in ["", "   ", "\n"] {
            let err = ServiceEndpoint::parse(value).unwrap_err();
            assert!(err.is_configuration(), "{value:?} gave {err:?}");
        }
    }

    #[test]
    fn test_endpoint_validation() {
        let ep = ServiceEndpoint::parse(" https://directory.example.com/nss \n").unwrap();
        assert_eq!(ep.as_str(), "https://directory.example.com/nss");
        assert!(ep.is_https());

        let plain: ServiceEndpoint = "http://127.0.0.1:8080/nss?realm=x".parse().unwrap();
        assert!(!plain.is_https());
        assert_eq!(plain.url().query(), Some("realm=x"));

        assert!(ServiceEndpoint::parse("ftp://example.com/").unwrap_err().is_configuration());
        assert!(ServiceEndpoint::parse("not a url").unwrap_err().is_configuration());
    }
}
