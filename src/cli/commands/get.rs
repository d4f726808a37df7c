//! `securevault get`: decrypt and show a single record.

use crate::cli::output;
use crate::cli::{copy_to_clipboard, load_context, open_vault, Cli};
use crate::errors::Result;
use crate::record::PlaintextRecord;

/// Execute the `get` command.
pub fn execute(cli: &Cli, id: &str, copy: bool) -> Result<()> {
    let (dir, _) = load_context(cli)?;
    let store = open_vault(&dir)?;

    match store.get_record(id)? {
        PlaintextRecord::Password(entry) => {
            if copy {
                copy_to_clipboard(&entry.password)?;
            }
            output::print_password_entry(&entry, !copy);
        }
        PlaintextRecord::ChatMessage(msg) => {
            println!(
                "[{}] {}: {}",
                msg.sent_at.format("%Y-%m-%d %H:%M:%S"),
                msg.sender_id,
                msg.body
            );
        }
    }

    Ok(())
}
