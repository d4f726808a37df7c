//! `securevault init`: create a new vault.

use std::fs;
use std::io;
use std::path::Path;

use crate::cli::output;
use crate::cli::{load_context, prompt_new_master_secret, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::{VaultProfile, VaultStore};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (dir, settings) = load_context(cli)?;

    // 1. Refuse early so the user isn't asked for a secret for nothing.
    if VaultProfile::exists(&dir) {
        output::tip("Use `securevault add` to add records to the existing vault.");
        return Err(VaultError::VaultAlreadyExists(dir));
    }

    // 2. Prompt for a new master secret (with confirmation).
    let secret = prompt_new_master_secret()?;

    // 3. Derive the key and write the vault file.
    let store = VaultStore::create(
        &dir,
        &secret,
        &settings.kdf_params(),
        &settings.keyring_service,
    )?;
    output::success(&format!("Vault created at {}", store.dir().display()));

    // 4. Keep the vault directory out of version control.
    match ignore_vault_dir(&cwd, &dir) {
        Ok(Some(entry)) => output::info(&format!("Added '{entry}' to .gitignore")),
        Ok(None) => {}
        Err(e) => output::warning(&format!("Could not update .gitignore: {e}")),
    }

    output::tip("Run `securevault add <WEBSITE>` to store a password.");
    output::tip("Run `securevault generate` to create a strong password.");

    Ok(())
}

/// Make `<project_dir>/.gitignore` ignore `vault_dir`.
///
/// Returns the entry that was appended, or `None` when the vault lives
/// outside the project or an equivalent pattern (`.securevault`,
/// `/.securevault/`, ...) is already listed.
fn ignore_vault_dir(project_dir: &Path, vault_dir: &Path) -> Result<Option<String>> {
    let Ok(relative) = vault_dir.strip_prefix(project_dir) else {
        return Ok(None);
    };
    let relative = relative.to_string_lossy().replace('\\', "/");
    if relative.is_empty() {
        return Ok(None);
    }

    let gitignore = project_dir.join(".gitignore");
    let mut contents = match fs::read_to_string(&gitignore) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let listed = contents
        .lines()
        .map(|line| line.trim().trim_start_matches('/').trim_end_matches('/'))
        .any(|pattern| pattern == relative);
    if listed {
        return Ok(None);
    }

    let entry = format!("{relative}/");
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&entry);
    contents.push('\n');
    fs::write(&gitignore, contents)?;

    Ok(Some(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gitignore(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join(".gitignore")).unwrap()
    }

    #[test]
    fn creates_gitignore_for_default_vault_dir() {
        let dir = TempDir::new().unwrap();
        let added = ignore_vault_dir(dir.path(), &dir.path().join(".securevault")).unwrap();

        assert_eq!(added.as_deref(), Some(".securevault/"));
        assert_eq!(gitignore(&dir), ".securevault/\n");
    }

    #[test]
    fn nested_vault_dir_uses_relative_path() {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("secrets").join("vault");
        ignore_vault_dir(dir.path(), &vault).unwrap();

        assert_eq!(gitignore(&dir), "secrets/vault/\n");
    }

    #[test]
    fn equivalent_patterns_count_as_listed() {
        for existing in [".securevault", "/.securevault/", "  .securevault/  "] {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join(".gitignore"), format!("target/\n{existing}\n")).unwrap();

            let added = ignore_vault_dir(dir.path(), &dir.path().join(".securevault")).unwrap();
            assert_eq!(added, None, "{existing:?}");
            assert_eq!(gitignore(&dir), format!("target/\n{existing}\n"));
        }
    }

    #[test]
    fn appends_after_missing_trailing_newline() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "target/").unwrap();

        ignore_vault_dir(dir.path(), &dir.path().join(".securevault")).unwrap();
        assert_eq!(gitignore(&dir), "target/\n.securevault/\n");
    }

    #[test]
    fn vault_outside_project_is_skipped() {
        let project = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();

        let added = ignore_vault_dir(project.path(), elsewhere.path()).unwrap();
        assert_eq!(added, None);
        assert!(!project.path().join(".gitignore").exists());
    }
}
