//! `securevault update`: change fields of an existing password entry.

use crate::cli::commands::add::{resolve_password, warn_if_weak};
use crate::cli::output;
use crate::cli::{load_context, open_vault, Cli};
use crate::errors::{Result, VaultError};
use crate::record::PlaintextRecord;

/// Execute the `update` command.
///
/// Fields not given on the command line keep their current value.  The
/// password is only prompted for when no other field is being changed.
pub fn execute(
    cli: &Cli,
    id: &str,
    username: Option<&str>,
    password: Option<&str>,
    generate: bool,
    notes: Option<&str>,
) -> Result<()> {
    let (dir, settings) = load_context(cli)?;
    let mut store = open_vault(&dir)?;

    let mut entry = match store.get_record(id)? {
        PlaintextRecord::Password(entry) => entry,
        other => {
            return Err(VaultError::CommandFailed(format!(
                "record {id} is a {} record; only password entries can be updated",
                other.kind()
            )))
        }
    };

    if let Some(username) = username {
        entry.username = username.to_string();
    }
    if let Some(notes) = notes {
        entry.notes = Some(notes.to_string());
    }
    let prompt_for_password = username.is_none() && notes.is_none();
    if generate || password.is_some() || prompt_for_password {
        let new_password = resolve_password(&settings, password, generate)?;
        warn_if_weak(&new_password);
        entry.password = new_password.to_string();
    }

    store.update_record(id, &PlaintextRecord::Password(entry))?;
    store.save()?;

    output::success(&format!("Updated record {id}"));
    Ok(())
}
