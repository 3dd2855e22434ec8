//! Local, best-effort decoding of tokens for display.
//!
//! The backend signs its tokens with a shared HS256 secret. Holding that
//! secret lets a caller print the claims of a token it just received. Nothing
//! here decides whether a token is accepted; the server does that.

use crate::Result;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims carried by a backend token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Anything else the server put in
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|t| Utc.timestamp_opt(t, 0).single())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|t| Utc.timestamp_opt(t, 0).single())
    }

    /// `None` when the token carries no expiry
    pub fn is_expired(&self) -> Option<bool> {
        self.expires_at().map(|at| Utc::now() >= at)
    }
}

/// Decodes tokens with the shared secret from `JWT_SECRET`
pub struct TokenInspector {
    key: DecodingKey,
}

impl TokenInspector {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// An inspector if a shared secret is available
    pub fn from_secret(secret: Option<&str>) -> Option<Self> {
        secret.filter(|s| !s.is_empty()).map(Self::new)
    }

    /// Verify the signature and decode the claims. Expiry is reported, not
    /// enforced.
    pub fn inspect(&self, token: &str) -> Result<TokenClaims> {
        let data: TokenData<TokenClaims> = decode(token, &self.key, &Self::validation())?;
        Ok(data.claims)
    }

    /// Decode the claims without checking the signature
    pub fn decode_unverified(token: &str) -> Result<TokenClaims> {
        let mut validation = Self::validation();
        validation.insecure_disable_signature_validation();

        let data: TokenData<TokenClaims> =
            decode(token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(data.claims)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.validate_nbf = false;
        validation.required_spec_claims.clear();
        validation
    }
}

impl std::fmt::Debug for TokenInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenInspector").finish_non_exhaustive()
    }
}

/// Claims for display: verified when a secret is given, unverified otherwise
pub fn describe_token(token: &str, secret: Option<&str>) -> Result<TokenClaims> {
    match TokenInspector::from_secret(secret) {
        Some(inspector) => inspector.inspect(token),
        None => TokenInspector::decode_unverified(token),
    }
}
