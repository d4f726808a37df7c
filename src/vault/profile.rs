//! The vault profile: everything needed to re-derive the vault key.
//!
//! Stored as the `profile` object of the vault file (see `vault::file`):
//!
//! ```text
//! {"version":1,"salt":"<32 hex>","kdf_iterations":100000,
//!  "key_label":"com.securevault.masterkey","created_at":"...",
//!  "verifier":"<v2 envelope>"}
//! ```
//!
//! None of it is secret.  The salt is generated once, at creation, and
//! only replaced when the master secret is rotated.  The verifier is a
//! fixed marker sealed under the derived key; opening it is how a wrong
//! master secret is caught before any record is touched.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{derive_key_with_params, generate_salt, KdfParams};
use crate::crypto::{envelope, DerivedKey};
use crate::errors::{Result, VaultError};

use super::file;

/// Current profile format version.
pub const CURRENT_VERSION: u8 = 1;

const VERIFIER_PLAINTEXT: &str = r#"{"securevault":"verifier"}"#;

/// Non-secret vault metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultProfile {
    pub version: u8,

    /// PBKDF2 salt (hex in JSON).
    #[serde(serialize_with = "hex_encode", deserialize_with = "hex_decode")]
    pub salt: Vec<u8>,

    /// Iteration count the key was derived with.
    pub kdf_iterations: u32,

    /// Label under which the derived key is cached in secure storage.
    pub key_label: String,

    pub created_at: DateTime<Utc>,

    /// Marker envelope sealed under the derived key.
    pub verifier: String,
}

impl VaultProfile {
    /// Build a profile for a new vault: fresh salt, key derived from
    /// `master_secret`, verifier sealed under it.
    pub fn create(
        master_secret: &str,
        params: &KdfParams,
        key_label: &str,
    ) -> Result<(Self, DerivedKey)> {
        let salt = generate_salt();
        let key = derive_key_with_params(master_secret, &salt, params)?;
        let verifier = envelope::seal_to_blob(VERIFIER_PLAINTEXT, &key)?;

        let profile = Self {
            version: CURRENT_VERSION,
            salt: salt.to_vec(),
            kdf_iterations: params.iterations,
            key_label: key_label.to_string(),
            created_at: Utc::now(),
            verifier,
        };
        Ok((profile, key))
    }

    /// The PBKDF2 parameters recorded for this vault.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            iterations: self.kdf_iterations,
        }
    }

    /// Re-derive the vault key from the master secret and the stored
    /// salt, and check it against the verifier.
    pub fn derive_key(&self, master_secret: &str) -> Result<DerivedKey> {
        let key = derive_key_with_params(master_secret, &self.salt, &self.kdf_params())?;
        self.verify_key(&key)?;
        Ok(key)
    }

    /// Confirm that `key` is this vault's key.
    pub fn verify_key(&self, key: &DerivedKey) -> Result<()> {
        match envelope::open(&self.verifier, key) {
            Ok(text) if text == VERIFIER_PLAINTEXT => Ok(()),
            _ => Err(VaultError::decryption(
                "the master secret does not unlock this vault",
            )),
        }
    }

    /// Replace the verifier after the key changes.
    pub(crate) fn reseal_verifier(&mut self, key: &DerivedKey) -> Result<()> {
        self.verifier = envelope::seal_to_blob(VERIFIER_PLAINTEXT, key)?;
        Ok(())
    }

    /// Does a vault exist in `vault_dir`?
    pub fn exists(vault_dir: &Path) -> bool {
        file::vault_exists(vault_dir)
    }

    /// Read just the profile from the vault in `vault_dir`.
    pub fn load(vault_dir: &Path) -> Result<Self> {
        Ok(file::read_vault(vault_dir)?.profile)
    }
}

fn hex_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&hex::encode(data))
}

fn hex_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    hex::decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SECRET: &str = "profile-test-secret";

    #[test]
    fn create_then_rederive_same_key() {
        let (profile, key) = VaultProfile::create(SECRET, &KdfParams::default(), "label").unwrap();
        assert_eq!(profile.salt.len(), 16);
        assert_eq!(profile.derive_key(SECRET).unwrap(), key);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let (profile, _) = VaultProfile::create(SECRET, &KdfParams::default(), "label").unwrap();
        let err = profile.derive_key("some-other-secret").unwrap_err();
        assert!(matches!(err, VaultError::DecryptionFailed(_)));
    }

    #[test]
    fn load_reads_profile_from_vault_file() {
        let dir = TempDir::new().unwrap();
        let (profile, key) = VaultProfile::create(SECRET, &KdfParams::default(), "label").unwrap();
        file::write_vault(dir.path(), &profile, std::iter::empty()).unwrap();

        assert!(VaultProfile::exists(dir.path()));
        let loaded = VaultProfile::load(dir.path()).unwrap();
        assert_eq!(loaded.salt, profile.salt);
        assert_eq!(loaded.key_label, "label");
        loaded.verify_key(&key).unwrap();

        // Salt is stored as hex.
        let raw = fs::read_to_string(file::vault_path(dir.path())).unwrap();
        assert!(raw.contains(&hex::encode(&profile.salt)));
    }

    #[test]
    fn load_missing_profile_is_vault_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(!VaultProfile::exists(dir.path()));
        assert!(matches!(
            VaultProfile::load(dir.path()),
            Err(VaultError::VaultNotFound(_))
        ));
    }
}
