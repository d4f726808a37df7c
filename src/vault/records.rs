//! Sealed record storage.
//!
//! `RecordStore` is the boundary to whatever document store persists
//! records.  It only ever sees opaque envelope strings keyed by record
//! id and the non-secret profile; plaintext never crosses it.
//! `FileRecordStore` keeps them in the vault file next to the profile.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

use super::file;
use super::profile::VaultProfile;

/// Random bytes in a record id (rendered as hex).
const ID_BYTES: usize = 16;

/// One persisted record: an opaque envelope plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub blob: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Legacy blobs are bare ciphertext, not a JSON envelope.
    pub fn is_legacy(&self) -> bool {
        !self.blob.trim_start().starts_with('{')
    }
}

/// Persistence for sealed records.
pub trait RecordStore {
    /// Store a new blob and return its generated id.
    fn insert(&mut self, blob: String) -> Result<String>;

    /// Replace the blob of an existing record, keeping `created_at`.
    fn replace(&mut self, id: &str, blob: String) -> Result<()>;

    /// Fetch one record.
    fn fetch(&self, id: &str) -> Result<StoredRecord>;

    /// Delete one record.
    fn remove(&mut self, id: &str) -> Result<()>;

    /// All records, ordered by id.
    fn list(&self) -> Result<Vec<StoredRecord>>;

    /// Persist `profile` and every record as one unit.
    ///
    /// Either both land or neither does: after a failed commit the
    /// previously committed profile still describes the key of every
    /// previously committed record.
    fn commit(&mut self, profile: &VaultProfile) -> Result<()>;
}

/// `RecordStore` kept in the vault file, which is rewritten atomically
/// on every commit.
pub struct FileRecordStore {
    vault_dir: PathBuf,
    records: BTreeMap<String, StoredRecord>,
}

impl FileRecordStore {
    /// Build a store over already-loaded records.
    pub fn new(vault_dir: &Path, records: Vec<StoredRecord>) -> Self {
        Self {
            vault_dir: vault_dir.to_path_buf(),
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Load the records of the vault in `vault_dir`.  A missing vault
    /// is an empty store.
    pub fn open(vault_dir: &Path) -> Result<Self> {
        let records = if file::vault_exists(vault_dir) {
            file::read_vault(vault_dir)?.records
        } else {
            Vec::new()
        };
        Ok(Self::new(vault_dir, records))
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn new_id(&self) -> String {
        loop {
            let mut bytes = [0u8; ID_BYTES];
            rand::rng().fill_bytes(&mut bytes);
            let id = hex::encode(bytes);
            if !self.records.contains_key(&id) {
                return id;
            }
        }
    }
}

impl RecordStore for FileRecordStore {
    fn insert(&mut self, blob: String) -> Result<String> {
        let id = self.new_id();
        let now = Utc::now();
        self.records.insert(
            id.clone(),
            StoredRecord {
                id: id.clone(),
                blob,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn replace(&mut self, id: &str, blob: String) -> Result<()> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| VaultError::RecordNotFound(id.to_string()))?;
        record.blob = blob;
        record.updated_at = Utc::now();
        Ok(())
    }

    fn fetch(&self, id: &str) -> Result<StoredRecord> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| VaultError::RecordNotFound(id.to_string()))
    }

    fn remove(&mut self, id: &str) -> Result<()> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| VaultError::RecordNotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<StoredRecord>> {
        Ok(self.records.values().cloned().collect())
    }

    fn commit(&mut self, profile: &VaultProfile) -> Result<()> {
        file::write_vault(&self.vault_dir, profile, self.records.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KdfParams;
    use tempfile::TempDir;

    #[test]
    fn insert_fetch_remove() {
        let dir = TempDir::new().unwrap();
        let mut store = FileRecordStore::open(dir.path()).unwrap();
        assert!(store.is_empty());

        let id = store.insert("{\"cipher\":\"x\",\"iv\":\"y\"}".into()).unwrap();
        assert_eq!(id.len(), 32);
        assert_eq!(store.fetch(&id).unwrap().blob, "{\"cipher\":\"x\",\"iv\":\"y\"}");

        store.remove(&id).unwrap();
        assert!(matches!(store.fetch(&id), Err(VaultError::RecordNotFound(_))));
        assert!(store.remove(&id).is_err());
    }

    #[test]
    fn replace_keeps_created_at() {
        let dir = TempDir::new().unwrap();
        let mut store = FileRecordStore::open(dir.path()).unwrap();
        let id = store.insert("first".into()).unwrap();
        let created = store.fetch(&id).unwrap().created_at;

        store.replace(&id, "second".into()).unwrap();
        let record = store.fetch(&id).unwrap();
        assert_eq!(record.blob, "second");
        assert_eq!(record.created_at, created);
        assert!(record.updated_at >= created);
    }

    #[test]
    fn replace_unknown_id_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = FileRecordStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.replace("nope", "x".into()),
            Err(VaultError::RecordNotFound(_))
        ));
    }

    #[test]
    fn commit_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let (profile, _) =
            VaultProfile::create("records-test-secret", &KdfParams::default(), "label").unwrap();
        let mut store = FileRecordStore::open(dir.path()).unwrap();
        let a = store.insert("blob-a".into()).unwrap();
        let b = store.insert("blob-b".into()).unwrap();
        store.commit(&profile).unwrap();

        let reopened = FileRecordStore::open(dir.path()).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.fetch(&a).unwrap().blob, "blob-a");
        assert_eq!(reopened.fetch(&b).unwrap().blob, "blob-b");
    }

    #[test]
    fn legacy_detection() {
        let now = Utc::now();
        let mut record = StoredRecord {
            id: "1".into(),
            blob: "U29tZUJhc2U2NA==".into(),
            created_at: now,
            updated_at: now,
        };
        assert!(record.is_legacy());
        record.blob = " {\"cipher\":\"\"}".into();
        assert!(!record.is_legacy());
    }
}
