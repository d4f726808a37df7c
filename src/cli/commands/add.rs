//! `securevault add`: store a new password entry.

use crate::cli::output;
use crate::cli::{load_context, open_vault, Cli};
use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::generator::{self, StrengthLabel};
use crate::record::{PasswordEntry, PlaintextRecord};
use zeroize::Zeroizing;

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    website: &str,
    username: &str,
    password: Option<&str>,
    generate: bool,
    notes: Option<&str>,
) -> Result<()> {
    let (dir, settings) = load_context(cli)?;
    let mut store = open_vault(&dir)?;

    let password = resolve_password(&settings, password, generate)?;
    warn_if_weak(&password);

    let record = PlaintextRecord::Password(PasswordEntry {
        website: website.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        notes: notes.map(str::to_string),
    });

    let id = store.add_record(&record)?;
    store.save()?;

    output::success(&format!("Added '{website}' as record {id}"));
    Ok(())
}

/// Use the given password, generate one, or prompt for it.
pub(crate) fn resolve_password(
    settings: &Settings,
    password: Option<&str>,
    generate: bool,
) -> Result<Zeroizing<String>> {
    if generate {
        let generated = generator::generate(&settings.password_policy())?;
        output::info("Generated a new password.");
        return Ok(generated);
    }

    if let Some(pw) = password {
        return Ok(Zeroizing::new(pw.to_string()));
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Non-blocking nudge for weak passwords.
pub(crate) fn warn_if_weak(password: &str) {
    let score = generator::check_strength(password);
    if score.label <= StrengthLabel::Weak {
        output::warning(&format!(
            "This password is {}. Consider `--generate`.",
            output::styled_strength(&score)
        ));
    }
}
