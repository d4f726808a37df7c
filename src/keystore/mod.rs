//! Secure storage for derived keys between launches.
//!
//! `SecureStore` is the seam: `store`, `retrieve`, `clear` by label.
//! Keys are held in their base64 storage form and decoded on the way out.
//!
//! - `KeyringKeyStore` (feature `keyring-store`) uses the operating
//!   system's credential store: macOS Keychain, Windows Credential
//!   Manager, Linux kernel keyring.
//! - `MemoryKeyStore` keeps keys for the lifetime of the process only.
//!
//! Failures are returned as-is.  Retrying after an unlock prompt is the
//! caller's business, not the store's.

use std::collections::HashMap;
use std::sync::Mutex;

use zeroize::Zeroizing;

use crate::crypto::DerivedKey;
use crate::errors::{Result, VaultError};

/// Default label (service identifier) for a vault's cached key.
pub const DEFAULT_SERVICE: &str = "com.securevault.masterkey";

/// Scoped storage for derived keys.
pub trait SecureStore {
    /// Save `key` under `label`, replacing any previous value.
    fn store(&self, label: &str, key: &DerivedKey) -> Result<()>;

    /// Load the key saved under `label`.
    ///
    /// Returns `KeyNotFound` if nothing was stored or it was cleared.
    fn retrieve(&self, label: &str) -> Result<DerivedKey>;

    /// Remove whatever is stored under `label`.  Clearing an empty
    /// label succeeds.
    fn clear(&self, label: &str) -> Result<()>;
}

/// In-process key store.  Nothing touches disk.
#[derive(Default)]
pub struct MemoryKeyStore {
    entries: Mutex<HashMap<String, Zeroizing<String>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Zeroizing<String>>>> {
        self.entries
            .lock()
            .map_err(|_| VaultError::StorageAccess("in-memory key store is poisoned".into()))
    }
}

impl SecureStore for MemoryKeyStore {
    fn store(&self, label: &str, key: &DerivedKey) -> Result<()> {
        self.entries()?.insert(label.to_string(), key.to_encoded());
        Ok(())
    }

    fn retrieve(&self, label: &str) -> Result<DerivedKey> {
        let entries = self.entries()?;
        let encoded = entries
            .get(label)
            .ok_or_else(|| VaultError::KeyNotFound(label.to_string()))?;
        DerivedKey::from_encoded(encoded)
    }

    fn clear(&self, label: &str) -> Result<()> {
        self.entries()?.remove(label);
        Ok(())
    }
}

/// OS credential store backed by the `keyring` crate.
///
/// The label is used as the keyring service name; the account name is
/// fixed, so each vault owns exactly one entry.
#[cfg(feature = "keyring-store")]
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringKeyStore;

#[cfg(feature = "keyring-store")]
impl KeyringKeyStore {
    /// Account name under which the derived key is filed.
    const ACCOUNT: &'static str = "derived-key";

    pub fn new() -> Self {
        Self
    }

    fn entry(label: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(label, Self::ACCOUNT).map_err(|e| {
            VaultError::StorageAccess(format!("failed to create keyring entry: {e}"))
        })
    }
}

#[cfg(feature = "keyring-store")]
impl SecureStore for KeyringKeyStore {
    fn store(&self, label: &str, key: &DerivedKey) -> Result<()> {
        let encoded = key.to_encoded();
        Self::entry(label)?.set_password(&encoded).map_err(|e| {
            VaultError::StorageAccess(format!("failed to store key in keyring: {e}"))
        })?;
        tracing::debug!(label, "stored derived key in OS keyring");
        Ok(())
    }

    fn retrieve(&self, label: &str) -> Result<DerivedKey> {
        match Self::entry(label)?.get_password() {
            Ok(encoded) => {
                let encoded = Zeroizing::new(encoded);
                DerivedKey::from_encoded(&encoded)
            }
            Err(keyring::Error::NoEntry) => Err(VaultError::KeyNotFound(label.to_string())),
            Err(e) => Err(VaultError::StorageAccess(format!(
                "failed to read from keyring: {e}"
            ))),
        }
    }

    fn clear(&self, label: &str) -> Result<()> {
        match Self::entry(label)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(VaultError::StorageAccess(format!(
                "failed to delete from keyring: {e}"
            ))),
        }
    }
}
