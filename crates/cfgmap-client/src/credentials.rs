//! Credential collaborators
//!
//! A [`Credentials`] implementation adds authentication headers to an
//! outgoing request. Services never inspect tokens themselves.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Headers of an outgoing request
pub type Headers = BTreeMap<String, String>;

pub trait Credentials: Send + Sync + fmt::Debug {
    /// Add authentication to `headers`.
    fn authenticate(&self, headers: &mut Headers) -> Result<()>;

    /// Whether a secret is available at all.
    fn configured(&self) -> bool;
}

/// Static API token sent as `Authorization: Api-Token <token>`
#[derive(Clone)]
pub struct ApiToken {
    token: Option<String>,
    source: String,
}

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            source: "explicit token".to_string(),
        }
    }

    /// Read the token from environment variable `var`. A missing or empty
    /// variable yields unconfigured credentials rather than an error.
    pub fn from_env(var: &str) -> Self {
        let token = std::env::var(var).ok().filter(|t| !t.trim().is_empty());
        Self {
            token,
            source: var.to_string(),
        }
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiToken")
            .field("source", &self.source)
            .field("configured", &self.token.is_some())
            .finish()
    }
}

impl Credentials for ApiToken {
    fn authenticate(&self, headers: &mut Headers) -> Result<()> {
        let token = self.token.as_deref().ok_or_else(|| {
            Error::Credentials(format!("no API token available from {}", self.source))
        })?;
        headers.insert("Authorization".to_string(), format!("Api-Token {token}"));
        Ok(())
    }

    fn configured(&self) -> bool {
        self.token.is_some()
    }
}

/// OAuth bearer token
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

impl Credentials for BearerToken {
    fn authenticate(&self, headers: &mut Headers) -> Result<()> {
        headers.insert("Authorization".to_string(), format!("Bearer {}", self.0));
        Ok(())
    }

    fn configured(&self) -> bool {
        !self.0.is_empty()
    }
}

/// No authentication, for local endpoints and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl Credentials for NoCredentials {
    fn authenticate(&self, _headers: &mut Headers) -> Result<()> {
        Ok(())
    }

    fn configured(&self) -> bool {
        false
    }
}
