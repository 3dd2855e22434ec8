//! Token acquisition and the client's active token slot

use reqwest::{Client, StatusCode};
use rikitraki_shared::{Credentials, Result, TrackerError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Prefix the backend expects in the `Authorization` header
pub const AUTH_SCHEME: &str = "JWT";

/// Acquires bearer tokens with HTTP Basic auth and holds the last good one.
///
/// Clones share the same slot, so a token acquired through one handle is
/// seen by every other.
#[derive(Clone)]
pub struct TokenManager {
    client: Client,
    token_url: Url,
    credentials: Credentials,
    slot: Arc<RwLock<Option<String>>>,
}

impl TokenManager {
    pub fn new(client: Client, token_url: Url, credentials: Credentials) -> Self {
        Self {
            client,
            token_url,
            credentials,
            slot: Arc::new(RwLock::new(None)),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Request a new token. `user`/`password` override the stored
    /// credentials for this call only; the active token is replaced either
    /// way. On failure the active token is left as it was.
    pub async fn acquire(&self, user: Option<&str>, password: Option<&str>) -> Result<String> {
        let (user, password) = self.credentials.login_with(user, password)?;

        debug!("Requesting token for {} from {}", user, self.token_url);

        let response = self
            .client
            .get(self.token_url.clone())
            .basic_auth(user, Some(password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Token request for {} rejected: HTTP {}", user, status);
            return Err(TrackerError::Authentication {
                message: format!("Token endpoint {} returned HTTP {}", self.token_url.path(), status),
                status: Some(status.as_u16()),
            });
        }

        let token = response.text().await?.trim().to_string();
        if token.is_empty() || status == StatusCode::NO_CONTENT {
            return Err(TrackerError::Authentication {
                message: "Token endpoint returned an empty token".to_string(),
                status: Some(status.as_u16()),
            });
        }

        *self.slot.write().await = Some(token.clone());
        info!("Acquired token for {}", user);

        Ok(token)
    }

    /// Last successfully acquired token
    pub async fn token(&self) -> Option<String> {
        self.slot.read().await.clone()
    }

    /// The active token, or an authentication error if none was acquired
    pub async fn require(&self) -> Result<String> {
        self.token().await.ok_or_else(|| {
            TrackerError::auth("No token acquired; call acquire_token before authenticated requests")
        })
    }

    pub async fn is_authenticated(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Forget the active token
    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }
}

/// `Authorization` header value for a token
pub fn authorization_header(token: &str) -> String {
    format!("{AUTH_SCHEME} {token}")
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(credentials: Credentials) -> TokenManager {
        TokenManager::new(
            Client::new(),
            Url::parse("http://127.0.0.1:9/api/v1/token/").unwrap(),
            credentials,
        )
    }

    #[test]
    fn test_authorization_header() {
        assert_eq!(authorization_header("abc.def.ghi"), "JWT abc.def.ghi");
    }

    #[tokio::test]
    async fn test_require_without_token() {
        let tokens = manager(Credentials::new("mah", "s3cret"));
        assert!(!tokens.is_authenticated().await);

        let err = tokens.require().await.unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_request() {
        let tokens = manager(Credentials::default());

        let err = tokens.acquire(None, None).await.unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_clones_share_slot() {
        let tokens = manager(Credentials::new("mah", "s3cret"));
        let other = tokens.clone();

        *tokens.slot.write().await = Some("t1".to_string());
        assert_eq!(other.token().await.as_deref(), Some("t1"));

        other.clear().await;
        assert!(tokens.token().await.is_none());
    }
}
