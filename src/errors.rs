use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in SecureVault.
///
/// None of the messages ever carry key material, master secrets, or
/// decrypted plaintext.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Key derivation errors ---
    #[error("Master secret is too weak: at least {min_len} characters are required")]
    WeakInput { min_len: usize },

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    // --- Secure store errors ---
    #[error("No derived key stored under '{0}' (unlock the vault again)")]
    KeyNotFound(String),

    #[error("Secure storage access denied: {0}")]
    StorageAccess(String),

    // --- Envelope errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Cannot unlock this record: {0}")]
    DecryptionFailed(String),

    // --- Generator errors ---
    #[error("Invalid password policy: {0}")]
    InvalidPolicy(String),

    // --- Record / vault errors ---
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Record '{0}' not found")]
    RecordNotFound(String),

    #[error("Vault not found at {0} (run `securevault init` first)")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Master secrets do not match")]
    PasswordMismatch,
}

impl VaultError {
    /// Shorthand used throughout the envelope code.
    pub(crate) fn decryption(detail: impl Into<String>) -> Self {
        Self::DecryptionFailed(detail.into())
    }
}

/// Convenience type alias for SecureVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
