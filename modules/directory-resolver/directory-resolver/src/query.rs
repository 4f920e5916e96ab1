//! Typed directory queries.
//!
//! Wire grammar, all values `application/x-www-form-urlencoded`:
//!
//! | Kind           | Query                     |
//! |----------------|---------------------------|
//! | `ByName`       | `?id=<name>`              |
//! | `ById`         | `?name=<numeric id>`      |
//! | `Authenticate` | `?id=<user>&pass=<pass>`  |
//!
//! `ByName` and `ById` deliberately use the parameter names the service
//! expects, even though they read swapped. Query pairs already present on the
//! base URL are kept in front of the generated ones.

use std::fmt;

use directory_resolver_sdk::{Password, ServiceEndpoint};
use url::Url;

const NAME_KEY: &str = "id";
const ID_KEY: &str = "name";
const PASSWORD_KEY: &str = "pass";
const REDACTED: &str = "REDACTED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    ByName,
    ById,
    Authenticate,
}

/// A fully formed GET URL for one directory request.
///
/// `Debug` renders the URL with the password replaced.
#[derive(Clone, PartialEq, Eq)]
pub struct DirectoryQuery {
    kind: QueryKind,
    url: Url,
}

impl DirectoryQuery {
    #[must_use]
    pub fn by_name(endpoint: &ServiceEndpoint, name: &str) -> Self {
        Self::build(endpoint, QueryKind::ByName, &[(NAME_KEY, name)])
    }

    #[must_use]
    pub fn by_id(endpoint: &ServiceEndpoint, numeric_id: u32) -> Self {
        Self::build(endpoint, QueryKind::ById, &[(ID_KEY, &numeric_id.to_string())])
    }

    #[must_use]
    pub fn authenticate(endpoint: &ServiceEndpoint, username: &str, password: &Password) -> Self {
        Self::build(
            endpoint,
            QueryKind::Authenticate,
            &[(NAME_KEY, username), (PASSWORD_KEY, password.expose())],
        )
    }

    fn build(endpoint: &ServiceEndpoint, kind: QueryKind, pairs: &[(&str, &str)]) -> Self {
        let mut url = endpoint.url().clone();
        url.query_pairs_mut().extend_pairs(pairs);
        Self { kind, url }
    }

    #[must_use]
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL with any password parameter masked, for logging.
    #[must_use]
    pub fn redacted(&self) -> String {
        redact(&self.url)
    }
}

impl fmt::Debug for DirectoryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryQuery")
            .field("kind", &self.kind)
            .field("url", &self.redacted())
            .finish()
    }
}

/// Render `url` with the value of every `pass` parameter masked.
#[must_use]
pub fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(key, _)| key == PASSWORD_KEY) {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == PASSWORD_KEY {
                REDACTED.to_owned()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    let mut masked = url.clone();
    masked.set_query(None);
    masked.query_pairs_mut().extend_pairs(pairs);
    masked.to_string()
}
