//! Security tokens and their key material.
//!
//! Keys zeroize their memory on drop and never print their bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::{
    aead::{KeyInit, OsRng},
    XChaCha20Poly1305,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use labelkit_common::{Error, Result};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Symmetric key backing a security token.
///
/// Serialized as standard base64 text.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    key: [u8; KEY_LENGTH],
}

impl SecretKey {
    /// Create a key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Generate a random key from the OS RNG.
    pub fn generate() -> Self {
        let generated = XChaCha20Poly1305::generate_key(&mut OsRng);
        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(generated.as_slice());
        Self { key }
    }

    /// Parse a base64-encoded key.
    ///
    /// # Errors
    /// - Invalid base64
    /// - Decoded length is not KEY_LENGTH
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let mut decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::InvalidInput(format!("Invalid key encoding: {}", e)))?;

        if decoded.len() != KEY_LENGTH {
            let len = decoded.len();
            decoded.zeroize();
            return Err(Error::InvalidInput(format!(
                "Invalid key length: expected {}, got {}",
                KEY_LENGTH, len
            )));
        }

        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { key })
    }

    /// Encode the key as base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.key)
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.key[..].ct_eq(&other.key[..]).into()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

impl Serialize for SecretKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut encoded = String::deserialize(deserializer)?;
        let key = SecretKey::from_base64(&encoded).map_err(serde::de::Error::custom);
        encoded.zeroize();
        key
    }
}

/// Named symmetric key used to protect a project's provider options.
///
/// Projects record only the token name; the key is supplied out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityToken {
    pub name: String,
    pub key: SecretKey,
}

impl SecurityToken {
    pub fn new(name: impl Into<String>, key: SecretKey) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }

    /// Create a token with a freshly generated key.
    pub fn generate(name: impl Into<String>) -> Self {
        Self::new(name, SecretKey::generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_differ() {
        let key1 = SecretKey::generate();
        let key2 = SecretKey::generate();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_base64_roundtrip() {
        let key = SecretKey::from_bytes([7u8; KEY_LENGTH]);
        let encoded = key.to_base64();

        assert_eq!(SecretKey::from_base64(&encoded).unwrap(), key);
    }

    #[test]
    fn test_base64_wrong_length_fails() {
        assert!(SecretKey::from_base64("AAAA").is_err());
        assert!(SecretKey::from_base64("not base64!").is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = SecurityToken::new("Token", SecretKey::from_bytes([9u8; KEY_LENGTH]));
        let printed = format!("{:?}", token);

        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains(&token.key.to_base64()));
    }

    #[test]
    fn test_token_serializes_key_as_base64() {
        let token = SecurityToken::new("Token", SecretKey::from_bytes([1u8; KEY_LENGTH]));
        let value = serde_json::to_value(&token).unwrap();

        assert_eq!(value["name"], "Token");
        assert_eq!(value["key"], token.key.to_base64());

        let restored: SecurityToken = serde_json::from_value(value).unwrap();
        assert_eq!(restored, token);
    }
}
