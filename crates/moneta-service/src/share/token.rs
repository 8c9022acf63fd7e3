//! Share token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

/// Bytes of entropy per token; 48 bytes encode to 64 URL-safe characters.
const TOKEN_BYTES: usize = 48;

/// Generates cryptographically random, URL-safe share tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    /// Creates a new token generator.
    pub fn new() -> Self {
        Self
    }

    /// Generates a fresh 64-character URL-safe token.
    pub fn generate(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
