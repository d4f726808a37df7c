//! Vault module: profile, sealed record storage, and the high-level
//! `VaultStore`.
//!
//! This module provides:
//! - The single-file on-disk layout, written atomically (`file`)
//! - `VaultProfile`: salt, KDF params, key label, verifier (`profile`)
//! - `RecordStore` trait and the file-backed `FileRecordStore` (`records`)
//! - `VaultStore` tying a derived key to a record store (`store`)

pub mod file;
pub mod profile;
pub mod records;
pub mod store;

// Re-export the most commonly used items.
pub use file::VAULT_FILE;
pub use profile::VaultProfile;
pub use records::{FileRecordStore, RecordStore, StoredRecord};
pub use store::{ExportedRecord, RecordSummary, VaultStore};
