//! Encryption of provider options.
//!
//! Options are serialized to JSON, encrypted with the token key and stored as
//! base64 inside an `{ "encrypted": ... }` container.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::aead::{decrypt, encrypt};
use crate::keys::SecretKey;
use labelkit_common::{Error, ProviderOptions, Result};

/// Encrypt structured options into a base64 ciphertext string.
///
/// Every call draws a fresh nonce, so identical options yield distinct
/// ciphertexts.
pub fn encrypt_options(options: &Value, key: &SecretKey) -> Result<String> {
    let plaintext = Zeroizing::new(serde_json::to_vec(options)?);
    let ciphertext = encrypt(key, &plaintext)?;
    Ok(STANDARD.encode(ciphertext))
}

/// Decrypt a ciphertext string produced by [`encrypt_options`].
///
/// # Errors
/// - `Decryption` if the text is not valid base64, fails authentication, or
///   does not hold JSON
pub fn decrypt_options(ciphertext: &str, key: &SecretKey) -> Result<Value> {
    let bytes = STANDARD
        .decode(ciphertext)
        .map_err(|e| Error::Decryption(format!("Invalid ciphertext encoding: {}", e)))?;
    let plaintext = Zeroizing::new(decrypt(key, &bytes)?);
    serde_json::from_slice(&plaintext)
        .map_err(|e| Error::Decryption(format!("Decrypted options are not valid JSON: {}", e)))
}

/// Encrypt provider options; already encrypted options pass through.
pub fn seal(options: &ProviderOptions, key: &SecretKey) -> Result<ProviderOptions> {
    match options {
        ProviderOptions::Plain(value) => Ok(ProviderOptions::encrypted(encrypt_options(value, key)?)),
        ProviderOptions::Encrypted(_) => Ok(options.clone()),
    }
}

/// Decrypt provider options; plain options pass through.
pub fn unseal(options: &ProviderOptions, key: &SecretKey) -> Result<ProviderOptions> {
    match options {
        ProviderOptions::Encrypted(container) => {
            Ok(ProviderOptions::Plain(decrypt_options(&container.encrypted, key)?))
        }
        ProviderOptions::Plain(_) => Ok(options.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KEY_LENGTH;
    use proptest::prelude::*;
    use serde_json::json;

    fn key(byte: u8) -> SecretKey {
        SecretKey::from_bytes([byte; KEY_LENGTH])
    }

    #[test]
    fn test_seal_unseal_roundtrip() {
        let options = ProviderOptions::Plain(json!({"folderPath": "/data", "sas": "secret"}));

        let sealed = seal(&options, &key(1)).unwrap();
        assert!(sealed.is_encrypted());

        let unsealed = unseal(&sealed, &key(1)).unwrap();
        assert_eq!(unsealed, options);
    }

    #[test]
    fn test_seal_is_randomized() {
        let options = ProviderOptions::Plain(json!({"folderPath": "/data"}));

        let first = seal(&options, &key(1)).unwrap();
        let second = seal(&options, &key(1)).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_passthrough() {
        let sealed = ProviderOptions::encrypted("abc");
        assert_eq!(seal(&sealed, &key(1)).unwrap(), sealed);

        let plain = ProviderOptions::Plain(json!({"a": 1}));
        assert_eq!(unseal(&plain, &key(1)).unwrap(), plain);
    }

    #[test]
    fn test_wrong_key_is_decryption_error() {
        let ciphertext = encrypt_options(&json!({"a": 1}), &key(1)).unwrap();
        assert!(matches!(
            decrypt_options(&ciphertext, &key(2)),
            Err(Error::Decryption(_))
        ));
    }

    #[test]
    fn test_garbage_is_decryption_error() {
        assert!(matches!(
            decrypt_options("%%% not base64", &key(1)),
            Err(Error::Decryption(_))
        ));
        assert!(matches!(
            decrypt_options("AAAA", &key(1)),
            Err(Error::Decryption(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_options_roundtrip(
            entries in proptest::collection::btree_map("[a-zA-Z]{1,8}", ".{0,24}", 0..6),
            byte in any::<u8>(),
        ) {
            let value = serde_json::to_value(&entries).unwrap();
            let ciphertext = encrypt_options(&value, &key(byte)).unwrap();
            prop_assert_eq!(decrypt_options(&ciphertext, &key(byte)).unwrap(), value);
        }
    }
}
