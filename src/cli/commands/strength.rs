//! `securevault strength`: score a password without storing it.

use crate::cli::output;
use crate::cli::arg_or_stdin;
use crate::errors::{Result, VaultError};
use crate::generator;

/// Execute the `strength` command.
pub fn execute(password: Option<&str>, json: bool) -> Result<()> {
    let password = arg_or_stdin(password)?;
    let score = generator::check_strength(&password);

    if json {
        let out = serde_json::to_string(&score)
            .map_err(|e| VaultError::SerializationError(format!("strength: {e}")))?;
        println!("{out}");
    } else {
        println!("{}", output::styled_strength(&score));
    }
    Ok(())
}
