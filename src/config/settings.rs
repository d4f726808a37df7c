use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{KdfParams, DEFAULT_ITERATIONS};
use crate::errors::{Result, VaultError};
use crate::generator::{CharClass, PasswordPolicy};
use crate::keystore::DEFAULT_SERVICE;

/// Project-level configuration, loaded from `.securevault.toml`.
///
/// Every field has a sensible default so SecureVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the vault files.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// PBKDF2 iteration count for new vaults and rotations.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Secure-store label the derived key is cached under.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Default length for `generate`.
    #[serde(default = "default_password_length")]
    pub password_length: usize,

    /// Default character classes for `generate`.
    #[serde(default = "default_password_classes")]
    pub password_classes: Vec<CharClass>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".securevault".to_string()
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_keyring_service() -> String {
    DEFAULT_SERVICE.to_string()
}

fn default_password_length() -> usize {
    16
}

fn default_password_classes() -> Vec<CharClass> {
    CharClass::ALL.to_vec()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            kdf_iterations: default_kdf_iterations(),
            keyring_service: default_keyring_service(),
            password_length: default_password_length(),
            password_classes: default_password_classes(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".securevault.toml";

    /// Load settings from `<project_dir>/.securevault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path of the vault directory for a project.
    pub fn vault_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir)
    }

    /// Convert the KDF settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            iterations: self.kdf_iterations,
        }
    }

    /// The configured default generator policy.
    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::new(self.password_length, self.password_classes.iter().copied())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
