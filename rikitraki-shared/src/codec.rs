//! Transfer codec: binary payloads to and from JSON-safe base64 text

use crate::Result;
use base64::{engine::general_purpose, Engine as _};
use sha1::{Digest, Sha1};

/// Encode a payload as standard, padded base64
pub fn encode(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

/// Decode base64 text produced by [`encode`] (or by the backend).
/// Leading and trailing whitespace is ignored.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    Ok(general_purpose::STANDARD.decode(text.trim())?)
}

/// Hex SHA-1 of the raw payload, for cross-checking uploads by hand.
/// Never sent to the backend.
pub fn digest(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
