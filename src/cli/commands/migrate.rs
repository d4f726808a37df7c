//! `securevault migrate`: upgrade legacy records to v2 envelopes.

use crate::cli::output;
use crate::cli::{load_context, open_vault, Cli};
use crate::errors::Result;

/// Execute the `migrate` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (dir, _) = load_context(cli)?;
    let mut store = open_vault(&dir)?;

    let migrated = store.migrate_legacy()?;
    if migrated == 0 {
        output::info("No legacy records found; nothing to migrate.");
        return Ok(());
    }

    store.save()?;
    output::success(&format!("Migrated {migrated} legacy record(s) to v2"));
    Ok(())
}
