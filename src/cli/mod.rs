//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::kdf::MIN_MASTER_SECRET_LEN;
use crate::errors::{Result, VaultError};
use crate::generator::CharClass;
use crate::vault::VaultStore;

/// Environment variable consulted before any interactive prompt.
pub const MASTER_SECRET_ENV: &str = "SECUREVAULT_MASTER_SECRET";

/// SecureVault CLI: local password vault with a password generator.
#[derive(Parser)]
#[command(
    name = "securevault",
    about = "Local password vault with a password generator",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: from .securevault.toml, else .securevault)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault in the project directory
    Init,

    /// Cache the derived key in the OS keyring (no prompt until `lock`)
    Unlock,

    /// Remove the cached key from the OS keyring
    Lock,

    /// Add a password entry
    Add {
        /// Website or service name
        website: String,
        /// Account username
        #[arg(short, long, default_value = "")]
        username: String,
        /// Password (omit for interactive prompt)
        #[arg(short, long, conflicts_with = "generate")]
        password: Option<String>,
        /// Generate a password with the configured policy
        #[arg(short, long)]
        generate: bool,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Show one record
    Get {
        /// Record id (see `list`)
        id: String,
        /// Copy the password to the clipboard instead of printing it
        #[arg(short, long)]
        copy: bool,
    },

    /// Change the password (and optionally other fields) of an entry
    Update {
        /// Record id
        id: String,
        /// New username
        #[arg(short, long)]
        username: Option<String>,
        /// New password (omit for interactive prompt)
        #[arg(short, long, conflicts_with = "generate")]
        password: Option<String>,
        /// Generate a new password with the configured policy
        #[arg(short, long)]
        generate: bool,
        /// New notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List all records (metadata only)
    List,

    /// Delete a record
    Delete {
        /// Record id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Decrypt every record and write them out
    Export {
        /// Output format: json (default) or csv
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Change the vault's master secret and re-encrypt every record
    RotateKey,

    /// Re-encrypt legacy (zero-IV) records as v2 envelopes
    Migrate,

    /// Encrypt text with the vault key and print the envelope
    Seal {
        /// Text to encrypt (read from stdin if omitted)
        text: Option<String>,
    },

    /// Decrypt an envelope with the vault key
    Open {
        /// Envelope JSON or legacy base64 (read from stdin if omitted)
        blob: Option<String>,
    },

    /// Generate a random password
    Generate {
        /// Password length
        #[arg(short, long)]
        length: Option<usize>,
        /// Character class to include (repeatable)
        #[arg(short, long = "class", value_enum)]
        classes: Vec<CharClass>,
        /// Copy to the clipboard instead of printing
        #[arg(long)]
        copy: bool,
    },

    /// Score a password's strength
    Strength {
        /// Password to score (read from stdin if omitted)
        password: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the vault directory and the project settings.
///
/// `--vault-dir` wins over `vault_dir` in `.securevault.toml`.
pub fn load_context(cli: &Cli) -> Result<(PathBuf, Settings)> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let dir = match &cli.vault_dir {
        Some(dir) => cwd.join(dir),
        None => settings.vault_path(&cwd),
    };
    Ok((dir, settings))
}

/// Get the master secret, trying in order:
/// 1. `SECUREVAULT_MASTER_SECRET` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the secret is wiped from memory on drop.
pub fn prompt_master_secret() -> Result<Zeroizing<String>> {
    if let Some(secret) = secret_from_env() {
        return Ok(secret);
    }

    let secret = dialoguer::Password::new()
        .with_prompt("Enter master secret")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("master secret prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}

/// Prompt for a new master secret with confirmation (used by `init`
/// and `rotate-key`).
///
/// Also respects `SECUREVAULT_MASTER_SECRET` for scripted usage.
pub fn prompt_new_master_secret() -> Result<Zeroizing<String>> {
    if let Some(secret) = secret_from_env() {
        if secret.chars().count() < MIN_MASTER_SECRET_LEN {
            return Err(VaultError::WeakInput {
                min_len: MIN_MASTER_SECRET_LEN,
            });
        }
        return Ok(secret);
    }

    loop {
        let secret = dialoguer::Password::new()
            .with_prompt("Choose master secret")
            .with_confirmation(
                "Confirm master secret",
                "Master secrets do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("master secret prompt: {e}")))?;
        let secret = Zeroizing::new(secret);

        if secret.chars().count() < MIN_MASTER_SECRET_LEN {
            output::warning(&format!(
                "Master secret must be at least {MIN_MASTER_SECRET_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(secret);
    }
}

fn secret_from_env() -> Option<Zeroizing<String>> {
    std::env::var(MASTER_SECRET_ENV)
        .ok()
        .filter(|s| !s.is_empty())
        .map(Zeroizing::new)
}

/// Open the vault in `dir`, trying in order:
/// 1. `SECUREVAULT_MASTER_SECRET` env var
/// 2. The derived key cached in the OS keyring (feature `keyring-store`)
/// 3. Interactive prompt
pub fn open_vault(dir: &std::path::Path) -> Result<VaultStore> {
    if let Some(secret) = secret_from_env() {
        return VaultStore::open(dir, &secret);
    }

    #[cfg(feature = "keyring-store")]
    {
        use crate::keystore::{KeyringKeyStore, SecureStore};

        let profile = crate::vault::VaultProfile::load(dir)?;
        match KeyringKeyStore::new().retrieve(&profile.key_label) {
            Ok(key) => match VaultStore::open_with_key(dir, key) {
                Ok(store) => return Ok(store),
                Err(e) => debug!(error = %e, "cached key rejected, prompting"),
            },
            Err(e) => debug!(error = %e, "no cached key, prompting"),
        }
    }

    let secret = prompt_master_secret()?;
    debug!(dir = %dir.display(), "opening vault with prompted master secret");
    VaultStore::open(dir, &secret)
}

/// Take an argument, or read it from stdin when absent.
pub fn arg_or_stdin(arg: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(value) = arg {
        return Ok(Zeroizing::new(value.to_string()));
    }
    let mut buf = Zeroizing::new(String::new());
    std::io::stdin().read_to_string(&mut buf)?;
    let trimmed = Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string());
    Ok(trimmed)
}

/// Put `text` on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    arboard::Clipboard::new()
        .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
        .map_err(|e| VaultError::CommandFailed(format!("clipboard unavailable: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_classes() {
        let cli = Cli::try_parse_from([
            "securevault",
            "generate",
            "--length",
            "24",
            "--class",
            "lowercase",
            "--class",
            "digits",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                length, classes, ..
            } => {
                assert_eq!(length, Some(24));
                assert_eq!(classes, vec![CharClass::Lowercase, CharClass::Digits]);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn add_rejects_password_with_generate() {
        let result = Cli::try_parse_from([
            "securevault",
            "add",
            "example.com",
            "--password",
            "hunter22",
            "--generate",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn arg_or_stdin_prefers_argument() {
        assert_eq!(arg_or_stdin(Some("value")).unwrap().as_str(), "value");
    }
}
