//! `securevault list`: display record metadata in a table.

use crate::cli::output;
use crate::cli::{load_context, open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (dir, _) = load_context(cli)?;
    let store = open_vault(&dir)?;

    let records = store.list_records()?;
    let legacy = records.iter().filter(|r| r.legacy).count();

    output::info(&format!("{} record(s)", records.len()));
    output::print_records_table(&records);

    if legacy > 0 {
        output::tip(&format!(
            "{legacy} record(s) use the legacy format. Run `securevault migrate` to upgrade them."
        ));
    }

    Ok(())
}
