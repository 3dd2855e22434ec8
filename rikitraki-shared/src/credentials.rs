//! Credential source: explicit values with environment fallback

use crate::{Result, TrackerError};
use std::fmt;

pub const ENV_USER: &str = "API_USER";
pub const ENV_PASSWORD: &str = "API_PASS";
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";

/// Login material for the token endpoint.
///
/// Immutable once built. `user` and `password` may still be absent; that is
/// reported when a token is requested, not at construction.
#[derive(Clone, Default)]
pub struct Credentials {
    user: Option<String>,
    password: Option<String>,
    shared_secret: Option<String>,
}

impl Credentials {
    /// Explicit values win; anything left `None` is read from
    /// `API_USER`, `API_PASS` and `JWT_SECRET`.
    pub fn resolve(
        user: Option<String>,
        password: Option<String>,
        shared_secret: Option<String>,
    ) -> Self {
        Self::resolve_with(user, password, shared_secret, |key| std::env::var(key).ok())
    }

    /// Same as [`Credentials::resolve`] with a custom variable lookup
    pub fn resolve_with<F>(
        user: Option<String>,
        password: Option<String>,
        shared_secret: Option<String>,
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            user: user.or_else(|| env(ENV_USER)),
            password: password.or_else(|| env(ENV_PASSWORD)),
            shared_secret: shared_secret.or_else(|| env(ENV_JWT_SECRET)),
        }
    }

    /// Everything from the environment
    pub fn from_env() -> Self {
        Self::resolve(None, None, None)
    }

    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            password: Some(password.into()),
            shared_secret: None,
        }
    }

    pub fn with_shared_secret(mut self, secret: impl Into<String>) -> Self {
        self.shared_secret = Some(secret.into());
        self
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn shared_secret(&self) -> Option<&str> {
        self.shared_secret.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// User and password, or an authentication error naming what is missing
    pub fn login(&self) -> Result<(&str, &str)> {
        self.login_with(None, None)
    }

    /// Like [`Credentials::login`], with either value overridden. Each value
    /// falls back to the stored one on its own.
    pub fn login_with<'a>(
        &'a self,
        user: Option<&'a str>,
        password: Option<&'a str>,
    ) -> Result<(&'a str, &'a str)> {
        let user = user.or(self.user()).ok_or_else(|| {
            TrackerError::auth(format!(
                "No user configured (set {ENV_USER} or pass one explicitly)"
            ))
        })?;
        let password = password.or(self.password()).ok_or_else(|| {
            TrackerError::auth(format!(
                "No password configured (set {ENV_PASSWORD} or pass one explicitly)"
            ))
        })?;
        Ok((user, password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "shared_secret",
                &self.shared_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
