//! XChaCha20-Poly1305 sealing of byte payloads under a security token key.
//!
//! Payload layout: `nonce (24) || ciphertext || tag (16)`. The nonce is drawn
//! from the OS RNG for every call.

use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Key, XChaCha20Poly1305, XNonce,
};

use crate::keys::SecretKey;
use labelkit_common::{Error, Result};

/// Nonce size for XChaCha20-Poly1305 (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

fn cipher(key: &SecretKey) -> XChaCha20Poly1305 {
    XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()))
}

/// Encrypt a payload.
///
/// # Postconditions
/// - Output is `NONCE_SIZE + plaintext.len() + TAG_SIZE` bytes
/// - Equal plaintexts produce different outputs
pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
    let sealed = cipher(key)
        .encrypt(&nonce, plaintext)
        .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

    let mut payload = nonce.to_vec();
    payload.extend(sealed);
    Ok(payload)
}

/// Decrypt a payload produced by [`encrypt`].
///
/// # Errors
/// - `Decryption` if the payload is shorter than nonce plus tag, or fails
///   authentication (wrong key, tampered bytes)
pub fn decrypt(key: &SecretKey, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() < NONCE_SIZE + TAG_SIZE {
        return Err(Error::Decryption(format!(
            "Payload of {} bytes is too short",
            payload.len()
        )));
    }

    let (nonce, sealed) = payload.split_at(NONCE_SIZE);
    cipher(key)
        .decrypt(XNonce::from_slice(nonce), sealed)
        .map_err(|_| Error::Decryption("Authentication failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KEY_LENGTH;

    fn key(byte: u8) -> SecretKey {
        SecretKey::from_bytes([byte; KEY_LENGTH])
    }

    #[test]
    fn test_roundtrip() {
        let plaintext = br#"{"folderPath":"/data"}"#;

        let payload = encrypt(&key(42), plaintext).unwrap();

        assert_eq!(payload.len(), NONCE_SIZE + plaintext.len() + TAG_SIZE);
        assert_eq!(decrypt(&key(42), &payload).unwrap(), plaintext);
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let a = encrypt(&key(42), b"same").unwrap();
        let b = encrypt(&key(42), b"same").unwrap();

        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
    }

    #[test]
    fn test_wrong_key_fails() {
        let payload = encrypt(&key(1), b"sas token").unwrap();
        assert!(matches!(decrypt(&key(2), &payload), Err(Error::Decryption(_))));
    }

    #[test]
    fn test_tampering_detected() {
        let mut payload = encrypt(&key(42), b"connection string").unwrap();
        let last = payload.len() - 1;
        payload[last] ^= 0x01;

        assert!(matches!(decrypt(&key(42), &payload), Err(Error::Decryption(_))));
    }

    #[test]
    fn test_short_payload_fails() {
        assert!(matches!(
            decrypt(&key(42), &[0u8; NONCE_SIZE + TAG_SIZE - 1]),
            Err(Error::Decryption(_))
        ));
    }

    #[test]
    fn test_empty_plaintext() {
        let payload = encrypt(&key(42), b"").unwrap();
        assert!(decrypt(&key(42), &payload).unwrap().is_empty());
    }
}
