//! The on-disk vault document.
//!
//! A vault is a single JSON file, `<vault_dir>/vault.json`, holding the
//! profile and every sealed record:
//!
//! ```text
//! {"profile":{"version":1,"salt":"...","verifier":"...",...},
//!  "records":[{"id":"...","blob":"...","created_at":"...","updated_at":"..."}]}
//! ```
//!
//! The salt and verifier always live in the same file as the records
//! sealed under the key they describe, and the whole file is replaced
//! with one rename.  A failed write leaves the previous vault intact.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

use super::profile::{VaultProfile, CURRENT_VERSION};
use super::records::StoredRecord;

/// Vault file name inside the vault directory.
pub const VAULT_FILE: &str = "vault.json";

/// A parsed vault file.
#[derive(Debug, Deserialize)]
pub struct VaultDocument {
    pub profile: VaultProfile,

    #[serde(default)]
    pub records: Vec<StoredRecord>,
}

/// Borrowed form used when writing, so records are not cloned.
#[derive(Serialize)]
struct DocumentRef<'a> {
    profile: &'a VaultProfile,
    records: Vec<&'a StoredRecord>,
}

/// Path of the vault file inside `vault_dir`.
pub fn vault_path(vault_dir: &Path) -> PathBuf {
    vault_dir.join(VAULT_FILE)
}

pub fn vault_exists(vault_dir: &Path) -> bool {
    vault_path(vault_dir).exists()
}

/// Read and parse the vault file in `vault_dir`.
pub fn read_vault(vault_dir: &Path) -> Result<VaultDocument> {
    let path = vault_path(vault_dir);
    if !path.exists() {
        return Err(VaultError::VaultNotFound(vault_dir.to_path_buf()));
    }

    let data = fs::read(&path)?;
    let document: VaultDocument = serde_json::from_slice(&data)
        .map_err(|e| VaultError::InvalidVaultFormat(format!("vault JSON: {e}")))?;

    if document.profile.version != CURRENT_VERSION {
        return Err(VaultError::InvalidVaultFormat(format!(
            "unsupported profile version {}, expected {CURRENT_VERSION}",
            document.profile.version
        )));
    }
    Ok(document)
}

/// Write the profile and records to `vault_dir` **atomically**.
///
/// Both are serialized into one buffer, written to a temp file in the
/// same directory, and renamed over the vault file.
pub fn write_vault<'a>(
    vault_dir: &Path,
    profile: &'a VaultProfile,
    records: impl IntoIterator<Item = &'a StoredRecord>,
) -> Result<()> {
    let document = DocumentRef {
        profile,
        records: records.into_iter().collect(),
    };
    let bytes = serde_json::to_vec_pretty(&document)
        .map_err(|e| VaultError::SerializationError(format!("vault: {e}")))?;

    let tmp_path = vault_dir.join(format!(".{VAULT_FILE}.tmp"));
    fs::write(&tmp_path, &bytes)?;
    fs::rename(&tmp_path, vault_path(vault_dir))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KdfParams;
    use chrono::Utc;
    use tempfile::TempDir;

    fn profile() -> VaultProfile {
        VaultProfile::create("file-test-secret", &KdfParams::default(), "label")
            .unwrap()
            .0
    }

    fn record(id: &str, blob: &str) -> StoredRecord {
        let now = Utc::now();
        StoredRecord {
            id: id.into(),
            blob: blob.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let profile = profile();
        let records = [record("a", "blob-a"), record("b", "blob-b")];

        write_vault(dir.path(), &profile, &records).unwrap();

        let document = read_vault(dir.path()).unwrap();
        assert_eq!(document.profile.salt, profile.salt);
        assert_eq!(document.records, records);
        assert!(!dir.path().join(".vault.json.tmp").exists());
    }

    #[test]
    fn missing_file_is_vault_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(!vault_exists(dir.path()));
        assert!(matches!(
            read_vault(dir.path()),
            Err(VaultError::VaultNotFound(_))
        ));
    }

    #[test]
    fn garbage_is_invalid_format() {
        let dir = TempDir::new().unwrap();
        fs::write(vault_path(dir.path()), "{not json").unwrap();
        assert!(matches!(
            read_vault(dir.path()),
            Err(VaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn unknown_profile_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut profile = profile();
        profile.version = CURRENT_VERSION + 1;
        write_vault(dir.path(), &profile, std::iter::empty()).unwrap();

        assert!(matches!(
            read_vault(dir.path()),
            Err(VaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn failed_write_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let profile = profile();
        write_vault(dir.path(), &profile, &[record("a", "first")]).unwrap();

        fs::create_dir(dir.path().join(".vault.json.tmp")).unwrap();
        assert!(write_vault(dir.path(), &profile, &[record("a", "second")]).is_err());

        let document = read_vault(dir.path()).unwrap();
        assert_eq!(document.records[0].blob, "first");
    }
}
