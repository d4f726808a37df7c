//! `securevault rotate-key`: change the vault master secret.
//!
//! Always asks for the current secret, even when a cached key could
//! open the vault.  Decrypts every record under the current key,
//! generates a new salt, derives a new key from the new secret,
//! re-encrypts every record, and writes the vault.  A cached keyring
//! entry is replaced.

use crate::cli::output;
use crate::cli::{load_context, prompt_master_secret, prompt_new_master_secret, Cli};
use crate::errors::Result;
use crate::vault::VaultStore;

/// Execute the `rotate-key` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (dir, settings) = load_context(cli)?;

    // 1. Open the vault with the current secret, never the cached key.
    output::info("Enter your current master secret.");
    let current_secret = prompt_master_secret()?;
    let mut store = VaultStore::open(&dir, &current_secret)?;

    // 2. Prompt for the new secret.
    output::info("Choose your new master secret.");
    let new_secret = prompt_new_master_secret()?;

    // 3. Re-encrypt everything and persist.
    store.rotate_master_secret(&current_secret, &new_secret, &settings.kdf_params())?;
    store.save()?;

    // 4. A stale cached key would no longer open the vault.
    #[cfg(feature = "keyring-store")]
    {
        use crate::keystore::{KeyringKeyStore, SecureStore};
        let keyring = KeyringKeyStore::new();
        let label = &store.profile().key_label;
        if keyring.retrieve(label).is_ok() {
            keyring.store(label, store.key())?;
            output::info("Updated the cached key in the OS keyring.");
        }
    }

    output::success(&format!(
        "Master secret rotated ({} record(s) re-encrypted)",
        store.record_count()?
    ));

    Ok(())
}
