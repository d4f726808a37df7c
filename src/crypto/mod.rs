//! Cryptographic primitives for SecureVault.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA512 master-secret stretching (`kdf`)
//! - The zeroizing `DerivedKey` type and its base64 storage form (`keys`)
//! - AES-256-CBC / PKCS#7 primitives (`encryption`)
//! - Versioned, self-describing envelopes over those primitives (`envelope`)

pub mod encryption;
pub mod envelope;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{derive_key, seal, open, DerivedKey, ...};
pub use envelope::{open, open_bytes, seal, seal_to_blob, EncryptedEnvelope, EnvelopeVersion};
pub use kdf::{derive_key, derive_key_with_params, generate_salt, KdfParams};
pub use keys::DerivedKey;
