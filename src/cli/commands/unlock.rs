//! `securevault unlock` / `securevault lock`: cache or forget the
//! derived key in the OS keyring.
//!
//! Only the derived key is cached, never the master secret.  Without the
//! `keyring-store` feature both commands explain how to enable it.

use crate::cli::Cli;
use crate::errors::Result;
#[cfg(feature = "keyring-store")]
use crate::{
    cli::{load_context, output},
    keystore::{KeyringKeyStore, SecureStore},
};

/// Execute the `unlock` command.
#[cfg(feature = "keyring-store")]
pub fn execute_unlock(cli: &Cli) -> Result<()> {
    let (dir, _) = load_context(cli)?;
    let secret = crate::cli::prompt_master_secret()?;
    let store = crate::vault::VaultStore::open(&dir, &secret)?;

    let label = &store.profile().key_label;
    KeyringKeyStore::new().store(label, store.key())?;

    output::success(&format!("Vault unlocked; key cached under '{label}'"));
    output::tip("Run `securevault lock` to remove it from the keyring.");
    Ok(())
}

/// Execute the `lock` command.
#[cfg(feature = "keyring-store")]
pub fn execute_lock(cli: &Cli) -> Result<()> {
    let (dir, _) = load_context(cli)?;
    let profile = crate::vault::VaultProfile::load(&dir)?;
    KeyringKeyStore::new().clear(&profile.key_label)?;

    output::success("Vault locked; cached key removed from keyring");
    Ok(())
}

#[cfg(not(feature = "keyring-store"))]
pub fn execute_unlock(cli: &Cli) -> Result<()> {
    keyring_unavailable(cli)
}

#[cfg(not(feature = "keyring-store"))]
pub fn execute_lock(cli: &Cli) -> Result<()> {
    keyring_unavailable(cli)
}

#[cfg(not(feature = "keyring-store"))]
fn keyring_unavailable(_cli: &Cli) -> Result<()> {
    Err(crate::errors::VaultError::CommandFailed(
        "keyring support not compiled in. Rebuild with: cargo build --features keyring-store"
            .into(),
    ))
}
