//! Versioned encryption envelopes.
//!
//! `seal` always produces a v2 envelope, serialized as JSON:
//!
//! ```text
//! {"version":"v2","cipher":"<base64 AES-256-CBC output>","iv":"<32 hex chars>"}
//! ```
//!
//! `open` also reads the legacy form: a bare base64 ciphertext string
//! with no JSON wrapper, encrypted under an all-zero IV.  Legacy records
//! are readable but never written; `Vault::migrate_legacy` re-seals them.
//!
//! There is no authentication tag.  A wrong key is detected only through
//! bad padding or a plaintext that is not valid UTF-8.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroize;

use super::encryption::{self, IV_LEN, ZERO_IV};
use super::keys::DerivedKey;
use crate::errors::{Result, VaultError};

/// Version tag written into every structured envelope.
pub const CURRENT_VERSION: &str = "v2";

/// OpenSSL passphrase-mode prefix.  Blobs carrying it were keyed by a
/// passphrase, not a derived key, and cannot be opened here.
const OPENSSL_SALTED_MAGIC: &[u8; 8] = b"Salted__";

/// Which serialized form an envelope came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeVersion {
    /// Structured JSON envelope with a per-encryption random IV.
    V2,
    /// Bare ciphertext string, zero IV.
    Legacy,
}

/// A parsed envelope: ciphertext plus whatever is needed to decrypt it
/// with the right key.  Which key that is, the envelope does not say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    version: EnvelopeVersion,
    iv: [u8; IV_LEN],
    ciphertext: Vec<u8>,
}

/// On-the-wire JSON shape of a v2 envelope.
#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    #[serde(default = "default_version")]
    version: String,
    cipher: String,
    iv: String,
}

fn default_version() -> String {
    CURRENT_VERSION.to_string()
}

impl EncryptedEnvelope {
    pub fn version(&self) -> EnvelopeVersion {
        self.version
    }

    pub fn is_legacy(&self) -> bool {
        self.version == EnvelopeVersion::Legacy
    }

    /// The IV used for this envelope (all zeros for legacy envelopes).
    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Parse a persisted blob into an envelope.
    ///
    /// A blob whose first non-blank character is `{` is a structured
    /// envelope; anything else is treated as a legacy bare ciphertext.
    pub fn parse(blob: &str) -> Result<Self> {
        let trimmed = blob.trim();
        if trimmed.is_empty() {
            return Err(VaultError::decryption("envelope is empty"));
        }

        if trimmed.starts_with('{') {
            Self::parse_structured(trimmed)
        } else {
            Self::parse_legacy(trimmed)
        }
    }

    fn parse_structured(blob: &str) -> Result<Self> {
        let wire: WireEnvelope = serde_json::from_str(blob)
            .map_err(|e| VaultError::decryption(format!("malformed envelope: {e}")))?;

        if wire.version != CURRENT_VERSION {
            return Err(VaultError::decryption(format!(
                "unsupported envelope version '{}'",
                wire.version
            )));
        }

        let iv: [u8; IV_LEN] = hex::decode(&wire.iv)
            .map_err(|e| VaultError::decryption(format!("IV is not valid hex: {e}")))?
            .try_into()
            .map_err(|_| VaultError::decryption(format!("IV must be {IV_LEN} bytes")))?;

        let ciphertext = BASE64
            .decode(&wire.cipher)
            .map_err(|e| VaultError::decryption(format!("cipher is not valid base64: {e}")))?;

        Ok(Self {
            version: EnvelopeVersion::V2,
            iv,
            ciphertext,
        })
    }

    fn parse_legacy(blob: &str) -> Result<Self> {
        let ciphertext = BASE64.decode(blob).map_err(|e| {
            VaultError::decryption(format!("legacy cipher is not valid base64: {e}"))
        })?;

        if ciphertext.starts_with(OPENSSL_SALTED_MAGIC) {
            return Err(VaultError::decryption(
                "passphrase-keyed legacy record; it was not sealed with a derived key",
            ));
        }

        Ok(Self {
            version: EnvelopeVersion::Legacy,
            iv: ZERO_IV,
            ciphertext,
        })
    }

    /// Serialize the envelope back to its persisted string form.
    ///
    /// Legacy envelopes serialize as the bare base64 string they were
    /// read from; `seal` never produces one.
    pub fn to_blob(&self) -> Result<String> {
        match self.version {
            EnvelopeVersion::Legacy => Ok(BASE64.encode(&self.ciphertext)),
            EnvelopeVersion::V2 => {
                let wire = WireEnvelope {
                    version: CURRENT_VERSION.to_string(),
                    cipher: BASE64.encode(&self.ciphertext),
                    iv: hex::encode(self.iv),
                };
                serde_json::to_string(&wire)
                    .map_err(|e| VaultError::SerializationError(format!("envelope: {e}")))
            }
        }
    }
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
pub fn seal(plaintext: &[u8], key: &DerivedKey) -> Result<EncryptedEnvelope> {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);

    let ciphertext = encryption::encrypt(key.as_bytes(), &iv, plaintext)?;
    debug!(len = ciphertext.len(), "sealed v2 envelope");

    Ok(EncryptedEnvelope {
        version: EnvelopeVersion::V2,
        iv,
        ciphertext,
    })
}

/// Seal a string and return the persisted blob in one step.
pub fn seal_to_blob(plaintext: &str, key: &DerivedKey) -> Result<String> {
    seal(plaintext.as_bytes(), key)?.to_blob()
}

/// Decrypt an already-parsed envelope to raw bytes.
///
/// Only padding is checked; prefer `open` unless the payload is binary.
pub fn open_envelope(envelope: &EncryptedEnvelope, key: &DerivedKey) -> Result<Vec<u8>> {
    if envelope.is_legacy() {
        warn!("opening legacy envelope: zero IV, no integrity protection; migrate this record");
    }
    encryption::decrypt(key.as_bytes(), &envelope.iv, &envelope.ciphertext)
}

/// Parse and decrypt a persisted blob to raw bytes.
pub fn open_bytes(blob: &str, key: &DerivedKey) -> Result<Vec<u8>> {
    let envelope = EncryptedEnvelope::parse(blob)?;
    open_envelope(&envelope, key)
}

/// Parse and decrypt a persisted blob to text.
///
/// A plaintext that is not valid UTF-8 means the key was wrong or the
/// data is corrupt; it is reported as `DecryptionFailed`, never as an
/// empty string.
pub fn open(blob: &str, key: &DerivedKey) -> Result<String> {
    let plaintext = open_bytes(blob, key)?;
    let text = String::from_utf8(plaintext).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        VaultError::decryption("decrypted data is not valid text (wrong key or corrupted data)")
    })?;
    debug!(len = text.len(), "opened envelope");
    Ok(text)
}

/// `seal_to_blob` for a key held in its base64 storage form.
pub fn seal_with_encoded_key(plaintext: &str, encoded_key: &str) -> Result<String> {
    let key = DerivedKey::from_encoded(encoded_key)?;
    seal_to_blob(plaintext, &key)
}

/// `open` for a key held in its base64 storage form.
pub fn open_with_encoded_key(blob: &str, encoded_key: &str) -> Result<String> {
    let key = DerivedKey::from_encoded(encoded_key)?;
    open(blob, &key)
}
