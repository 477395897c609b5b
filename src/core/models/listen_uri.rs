//! Listen URI prefixes
//!
//! A `ListenUri` is an absolute URL whose string form ends in `/`. The engine
//! serves every request whose path falls under that prefix.
//!
//! # Examples
//!
//! ```
//! use nancy_pack::core::models::ListenUri;
//!
//! let uri = ListenUri::parse("http://localhost:8888/app/").unwrap();
//! assert_eq!(uri.path(), "/app/");
//!
//! // Authority-only URLs normalize to a trailing slash
//! let uri = ListenUri::parse("http://localhost:8888").unwrap();
//! assert_eq!(uri.as_str(), "http://localhost:8888/");
//!
//! assert!(ListenUri::parse("http://localhost:8888/app").is_err());
//! assert!(ListenUri::parse("/relative/").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// The endpoint served when nothing else is configured
pub const DEFAULT_URI: &str = "http://localhost:8888/";

/// Errors that can occur when validating a listen URI
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    /// The entry was absent
    #[error("URI is missing")]
    Missing,

    /// The entry is not an absolute, hierarchical URL
    #[error("'{input}' is not an absolute URI: {reason}")]
    Malformed {
        /// The rejected input
        input: String,
        /// Why the parser rejected it
        reason: String,
    },

    /// The normalized form does not end in `/`
    #[error("only URI prefixes ending in '/' are allowed: {0}")]
    MissingTrailingSlash(String),
}

/// A validated listen prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListenUri(Url);

impl ListenUri {
    /// Parse and validate a listen prefix
    pub fn parse(input: &str) -> Result<Self, UriError> {
        let url = Url::parse(input).map_err(|e| UriError::Malformed {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    /// Validate an already parsed URL
    pub fn from_url(url: Url) -> Result<Self, UriError> {
        if url.cannot_be_a_base() {
            return Err(UriError::Malformed {
                input: url.to_string(),
                reason: "URI has no hierarchical path".to_string(),
            });
        }

        if !url.as_str().ends_with('/') {
            return Err(UriError::MissingTrailingSlash(url.to_string()));
        }

        Ok(Self(url))
    }

    /// The single-entry set used by a fresh controller
    ///
    /// # Panics
    ///
    /// Panics if [`DEFAULT_URI`] fails to parse (should never happen)
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![Self(Url::parse(DEFAULT_URI).expect("default URI is a valid absolute URL"))]
    }

    /// Normalized string form, always ending in `/`
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// URL scheme (`http`, `https`, ...)
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Host as written in the URL, brackets included for IPv6
    #[must_use]
    pub fn host_str(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Explicit port, or the scheme's well-known port
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.0.port_or_known_default()
    }

    /// Path prefix served by this URI
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl std::fmt::Display for ListenUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ListenUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ListenUri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for ListenUri {
    type Error = UriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ListenUri> for String {
    fn from(value: ListenUri) -> Self {
        value.0.into()
    }
}
