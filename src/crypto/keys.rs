//! The derived vault key and its storage encoding.
//!
//! A `DerivedKey` is raw key bytes only.  When a key has to travel as
//! text (secure store, environment) it is base64-encoded, and it must be
//! decoded back with `DerivedKey::from_encoded` before it reaches the
//! cipher.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::{Result, VaultError};

/// Length of the derived key (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A 32-byte symmetric key that zeroes its memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Copy key bytes out of a slice, rejecting anything but 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            VaultError::InvalidKey(format!(
                "expected {KEY_LEN} key bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes: array })
    }

    /// Decode a key from its base64 storage form.
    pub fn from_encoded(encoded: &str) -> Result<Self> {
        let mut raw = BASE64
            .decode(encoded.trim())
            .map_err(|e| VaultError::InvalidKey(format!("key is not valid base64: {e}")))?;
        let key = Self::from_slice(&raw);
        raw.zeroize();
        key
    }

    /// Encode the key for storage (base64).  The returned string is
    /// wiped when dropped.
    pub fn to_encoded(&self) -> Zeroizing<String> {
        Zeroizing::new(BASE64.encode(self.bytes))
    }

    /// Access the raw key bytes (e.g. to key the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for DerivedKey {}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}
