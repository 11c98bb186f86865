//! Cryptographic primitives for labelkit.
//!
//! This module provides:
//! - Authenticated encryption using XChaCha20-Poly1305
//! - Security tokens: named keys with automatic zeroization
//! - Encryption of provider options into `{ "encrypted": ... }` containers
//! - A token store resolving security tokens by name
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext options or key material is ever logged
//! - Token keys are compared in constant time

pub mod aead;
pub mod envelope;
pub mod keys;
pub mod store;

pub use aead::{decrypt, encrypt};
pub use envelope::{decrypt_options, encrypt_options, seal, unseal};
pub use keys::{SecretKey, SecurityToken, KEY_LENGTH};
pub use store::TokenStore;
