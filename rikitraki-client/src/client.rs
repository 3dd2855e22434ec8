//! Client handle and request dispatch shared by the resource operations

use crate::auth::{authorization_header, TokenManager};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use rikitraki_shared::{
    describe_token, ConnectionConfig, Credentials, ErrorBody, Result, TimeoutConfig, TokenClaims,
    TrackerConfig, TrackerError,
};
use tracing::{debug, warn};
use url::Url;

/// Authenticated access to one RikiTraki backend.
///
/// Cheap to clone; clones share the HTTP connection pool and the active
/// token.
#[derive(Clone, Debug)]
pub struct TrackerClient {
    pub(crate) http: Client,
    base_url: Url,
    pub(crate) tokens: TokenManager,
}

/// How a request authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    /// No `Authorization` header
    None,
    /// Must carry the active token; fails before sending when there is none
    Required,
    /// Carries the active token when one is held
    IfAvailable,
}

impl TrackerClient {
    /// Build a client from configuration
    pub fn new(config: &TrackerConfig, credentials: Credentials) -> Result<Self> {
        config.validate()?;
        Self::with_connection(&config.connection, &config.timeouts, credentials)
    }

    pub fn with_connection(
        connection: &ConnectionConfig,
        timeouts: &TimeoutConfig,
        credentials: Credentials,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeouts.request_timeout())
            .connect_timeout(timeouts.connect_timeout())
            .build()?;

        let base_url = connection.base_url()?;
        let token_url = build_url(&base_url, &["api", "v1", "token", ""])?;

        Ok(Self {
            tokens: TokenManager::new(http.clone(), token_url, credentials),
            http,
            base_url,
        })
    }

    /// Client for a base URL such as `http://127.0.0.1:3000`, with
    /// credentials resolved from the environment
    pub fn from_url(base: &str) -> Result<Self> {
        Self::with_connection(
            &ConnectionConfig::from_url(base)?,
            &TimeoutConfig::default(),
            Credentials::from_env(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// Acquire a token and make it the active one
    pub async fn acquire_token(&self, user: Option<&str>, password: Option<&str>) -> Result<String> {
        self.tokens.acquire(user, password).await
    }

    pub async fn token(&self) -> Option<String> {
        self.tokens.token().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated().await
    }

    pub async fn clear_token(&self) {
        self.tokens.clear().await
    }

    /// Claims of the active token for display, verified with the shared
    /// secret when one is configured. Not an authorisation check.
    pub async fn inspect_token(&self) -> Result<TokenClaims> {
        let token = self.tokens.require().await?;
        describe_token(&token, self.tokens.credentials().shared_secret())
    }

    /// `GET /api/v1/users/me` with the active token or an explicit one
    pub async fn get_profile(&self, token: Option<&str>) -> Result<String> {
        let url = self.url(&["api", "v1", "users", "me"])?;
        let token = match token {
            Some(t) => t.to_string(),
            None => self.tokens.require().await?,
        };

        let request = self
            .http
            .get(url.clone())
            .header(AUTHORIZATION, authorization_header(&token));
        let response = self.dispatch(Method::GET, &url, request).await?;
        Ok(response.text().await?)
    }

    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        build_url(&self.base_url, segments)
    }

    /// Start a request, attaching the token according to `auth`
    pub(crate) async fn request(&self, method: Method, url: &Url, auth: Auth) -> Result<RequestBuilder> {
        let token = match auth {
            Auth::None => None,
            Auth::Required => Some(self.tokens.require().await?),
            Auth::IfAvailable => self.tokens.token().await,
        };

        let builder = self.http.request(method, url.clone());
        Ok(match token {
            Some(t) => builder.header(AUTHORIZATION, authorization_header(&t)),
            None => builder,
        })
    }

    /// Send a request and turn non-success statuses into backend errors
    pub(crate) async fn dispatch(
        &self,
        method: Method,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<Response> {
        debug!("{} {}", method, url);
        let response = request.send().await?;
        check_status(&format!("{} {}", method, url.path()), response).await
    }
}

/// Pass successful responses through; read the error body of the rest
pub(crate) async fn check_status(endpoint: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            debug!("{} returned HTTP {} with an unreadable body: {}", endpoint, status, e);
            String::new()
        }
    };
    let (error, description) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => {
            let description = body.description_text();
            (body.error, description)
        }
        Err(_) if text.trim().is_empty() => (None, None),
        Err(_) => (None, Some(text.trim().to_string())),
    };

    warn!(
        "{} failed with HTTP {}: {}",
        endpoint,
        status,
        error.as_deref().unwrap_or("no error code")
    );

    Err(TrackerError::Backend {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        error,
        description,
    })
}

/// Append percent-encoded path segments to the base URL
fn build_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| TrackerError::Config(format!("Base URL cannot carry a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
