//! High-level vault operations used by CLI commands.
//!
//! `VaultStore` holds the derived key for one vault and a `RecordStore`,
//! so the rest of the application can work with simple calls like
//! `store.add_record(&record)` and never touch envelopes directly.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::crypto::kdf::{check_master_secret, derive_key_with_params, generate_salt, KdfParams};
use crate::crypto::{envelope, DerivedKey};
use crate::errors::{Result, VaultError};
use crate::record::{self, PlaintextRecord};

use super::file;
use super::profile::VaultProfile;
use super::records::{FileRecordStore, RecordStore, StoredRecord};

/// Listing entry: metadata only, nothing decrypted.
#[derive(Debug, Clone)]
pub struct RecordSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub legacy: bool,
}

/// A decrypted record with its bookkeeping, as produced by export.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExportedRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub record: PlaintextRecord,
}

/// The main vault handle.  Create one with `VaultStore::create`,
/// `VaultStore::open`, or `VaultStore::open_with_key`.
pub struct VaultStore<S: RecordStore = FileRecordStore> {
    /// Directory holding the vault file.
    dir: PathBuf,

    profile: VaultProfile,

    /// Sealed records.
    records: S,

    /// The derived vault key (zeroized on drop).
    key: DerivedKey,
}

impl VaultStore<FileRecordStore> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new vault in `dir`.
    ///
    /// Generates the salt, derives the key from `master_secret`, and
    /// writes a vault file with the profile and no records.
    pub fn create(
        dir: &Path,
        master_secret: &str,
        params: &KdfParams,
        key_label: &str,
    ) -> Result<Self> {
        if VaultProfile::exists(dir) {
            return Err(VaultError::VaultAlreadyExists(dir.to_path_buf()));
        }
        std::fs::create_dir_all(dir)?;

        let (profile, key) = VaultProfile::create(master_secret, params, key_label)?;
        let records = FileRecordStore::new(dir, Vec::new());

        let mut store = Self {
            dir: dir.to_path_buf(),
            profile,
            records,
            key,
        };
        store.save()?;

        info!(dir = %dir.display(), "created vault");
        Ok(store)
    }

    /// Open an existing vault by re-deriving its key from the master
    /// secret and the stored salt.
    pub fn open(dir: &Path, master_secret: &str) -> Result<Self> {
        let document = file::read_vault(dir)?;
        let key = document.profile.derive_key(master_secret)?;
        let records = FileRecordStore::new(dir, document.records);
        Ok(Self::from_parts(dir.to_path_buf(), document.profile, records, key))
    }

    /// Open an existing vault with an already-derived (cached) key.
    pub fn open_with_key(dir: &Path, key: DerivedKey) -> Result<Self> {
        let document = file::read_vault(dir)?;
        document.profile.verify_key(&key)?;
        let records = FileRecordStore::new(dir, document.records);
        Ok(Self::from_parts(dir.to_path_buf(), document.profile, records, key))
    }
}

impl<S: RecordStore> VaultStore<S> {
    /// Assemble a store from parts.  The key is assumed to match the
    /// profile; use `open_with_key` when that needs checking.
    pub fn from_parts(dir: PathBuf, profile: VaultProfile, records: S, key: DerivedKey) -> Self {
        Self {
            dir,
            profile,
            records,
            key,
        }
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Seal and store a new record.  Returns its id.
    pub fn add_record(&mut self, record: &PlaintextRecord) -> Result<String> {
        let blob = record::seal_record(record, &self.key)?;
        let id = self.records.insert(blob)?;
        debug!(id, kind = record.kind(), "added record");
        Ok(id)
    }

    /// Decrypt one record.
    pub fn get_record(&self, id: &str) -> Result<PlaintextRecord> {
        let stored = self.records.fetch(id)?;
        record::open_record(&stored.blob, &self.key)
    }

    /// Replace a record's contents, sealing under a fresh IV.
    pub fn update_record(&mut self, id: &str, record: &PlaintextRecord) -> Result<()> {
        // Fail on unknown ids before doing any crypto.
        self.records.fetch(id)?;
        let blob = record::seal_record(record, &self.key)?;
        self.records.replace(id, blob)
    }

    pub fn delete_record(&mut self, id: &str) -> Result<()> {
        self.records.remove(id)
    }

    /// Metadata for every record, ordered by id.
    pub fn list_records(&self) -> Result<Vec<RecordSummary>> {
        Ok(self
            .records
            .list()?
            .into_iter()
            .map(|r| RecordSummary {
                legacy: r.is_legacy(),
                id: r.id,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect())
    }

    /// Decrypt every record.
    ///
    /// Any record that fails to open aborts the export with
    /// `DecryptionFailed` naming it; nothing is silently skipped.
    pub fn export_records(&self) -> Result<Vec<ExportedRecord>> {
        self.records
            .list()?
            .into_iter()
            .map(|stored| {
                let record = record::open_record(&stored.blob, &self.key)
                    .map_err(|e| annotate(e, &stored.id))?;
                Ok(ExportedRecord {
                    id: stored.id,
                    created_at: stored.created_at,
                    updated_at: stored.updated_at,
                    record,
                })
            })
            .collect()
    }

    /// Number of records still in the legacy zero-IV form.
    pub fn legacy_count(&self) -> Result<usize> {
        Ok(self.records.list()?.iter().filter(|r| r.is_legacy()).count())
    }

    /// Re-seal every legacy record as a v2 envelope.  Returns how many
    /// were migrated.  The plaintext is carried over byte for byte.
    pub fn migrate_legacy(&mut self) -> Result<usize> {
        let legacy: Vec<StoredRecord> = self
            .records
            .list()?
            .into_iter()
            .filter(StoredRecord::is_legacy)
            .collect();

        for stored in &legacy {
            let mut text = envelope::open(&stored.blob, &self.key)
                .map_err(|e| annotate(e, &stored.id))?;
            let blob = envelope::seal_to_blob(&text, &self.key);
            text.zeroize();
            self.records.replace(&stored.id, blob?)?;
        }

        if !legacy.is_empty() {
            info!(count = legacy.len(), "migrated legacy records to v2 envelopes");
        }
        Ok(legacy.len())
    }

    /// Change the master secret.
    ///
    /// `current_secret` must re-derive the key this store holds, even
    /// when the store was opened with a cached key.  Every record is
    /// decrypted under the current key, a new salt and key are derived
    /// from `new_secret`, and every record is re-sealed.  Legacy records
    /// come out as v2.  Nothing is written until `save`.
    pub fn rotate_master_secret(
        &mut self,
        current_secret: &str,
        new_secret: &str,
        params: &KdfParams,
    ) -> Result<()> {
        check_master_secret(new_secret)?;
        if self.profile.derive_key(current_secret)? != self.key {
            return Err(VaultError::decryption(
                "the current master secret does not unlock this vault",
            ));
        }

        let stored = self.records.list()?;
        let mut plaintexts = Vec::with_capacity(stored.len());
        for record in &stored {
            let text =
                envelope::open(&record.blob, &self.key).map_err(|e| annotate(e, &record.id))?;
            plaintexts.push((record.id.clone(), text));
        }

        let salt = generate_salt();
        let new_key = derive_key_with_params(new_secret, &salt, params)?;

        let resealed: Result<Vec<(String, String)>> = plaintexts
            .iter()
            .map(|(id, text)| Ok((id.clone(), envelope::seal_to_blob(text, &new_key)?)))
            .collect();
        for (_, text) in &mut plaintexts {
            text.zeroize();
        }
        for (id, blob) in resealed? {
            self.records.replace(&id, blob)?;
        }

        self.profile.salt = salt.to_vec();
        self.profile.kdf_iterations = params.iterations;
        self.profile.reseal_verifier(&new_key)?;
        self.key = new_key;

        info!(records = plaintexts.len(), "rotated master secret");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the profile and every record in one atomic commit.
    ///
    /// If the commit fails, the vault on disk is unchanged and still
    /// opens with the secret it was last saved under.
    pub fn save(&mut self) -> Result<()> {
        self.records.commit(&self.profile)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn profile(&self) -> &VaultProfile {
        &self.profile
    }

    /// The derived key, e.g. to cache it in a `SecureStore`.
    pub fn key(&self) -> &DerivedKey {
        &self.key
    }

    pub fn record_count(&self) -> Result<usize> {
        Ok(self.records.list()?.len())
    }
}

fn annotate(err: VaultError, id: &str) -> VaultError {
    match err {
        VaultError::DecryptionFailed(detail) => {
            VaultError::DecryptionFailed(format!("record {id}: {detail}"))
        }
        other => other,
    }
}
