//! core::config::credentials
//!
//! GBIF account credentials, read once from the environment at startup.
//!
//! Only the download commands need them. Missing values are not an error
//! until a command asks for one through [`Credentials::require`].

use std::fmt;

use super::ConfigError;
use crate::backend::BasicAuth;

/// Environment variable holding the GBIF username.
pub const GBIF_USER: &str = "GBIF_USER";
/// Environment variable holding the GBIF password.
pub const GBIF_PWD: &str = "GBIF_PWD";
/// Environment variable holding the notification email.
pub const GBIF_EMAIL: &str = "GBIF_EMAIL";

/// Credentials as found in the environment. Empty values count as unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    user: Option<String>,
    password: Option<String>,
    email: Option<String>,
}

// Custom Debug to avoid exposing the password
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
        Self {
            user: read(GBIF_USER),
            password: read(GBIF_PWD),
            email: read(GBIF_EMAIL),
        }
    }

    /// Build credentials from explicit values.
    pub fn new(
        user: Option<String>,
        password: Option<String>,
        email: Option<String>,
    ) -> Self {
        Self::from_lookup(|name| match name {
            GBIF_USER => user.clone(),
            GBIF_PWD => password.clone(),
            GBIF_EMAIL => email.clone(),
            _ => None,
        })
    }

    /// Value of `variable`, or `MissingCredential` naming it.
    pub fn require(&self, variable: &'static str) -> Result<&str, ConfigError> {
        let value = match variable {
            GBIF_USER => &self.user,
            GBIF_PWD => &self.password,
            GBIF_EMAIL => &self.email,
            _ => &None,
        };
        value
            .as_deref()
            .ok_or(ConfigError::MissingCredential(variable))
    }

    /// Username and password for basic auth.
    pub fn basic_auth(&self) -> Result<BasicAuth, ConfigError> {
        Ok(BasicAuth {
            user: self.require(GBIF_USER)?.to_string(),
            password: self.require(GBIF_PWD)?.to_string(),
        })
    }
}
