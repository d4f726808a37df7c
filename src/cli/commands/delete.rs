//! `securevault delete`: remove a record from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{load_context, open_vault, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let (dir, _) = load_context(cli)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete record '{id}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut store = open_vault(&dir)?;
    store.delete_record(id)?;
    store.save()?;

    output::success(&format!("Deleted record '{id}'"));
    Ok(())
}
