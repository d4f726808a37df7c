//! Password-based key derivation using PBKDF2-HMAC-SHA512.
//!
//! The iteration count is deliberately high so each guess against a
//! stolen vault costs real CPU time.  Derivation blocks the calling
//! thread; interactive callers should run it off their event loop.

use rand::RngCore;
use sha2::Sha512;
use tracing::debug;
use zeroize::Zeroize;

use super::keys::{DerivedKey, KEY_LEN};
use crate::errors::{Result, VaultError};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Iteration count used for new vaults.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Anything below this is refused outright.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Minimum master secret length, counted in characters.
pub const MIN_MASTER_SECRET_LEN: usize = 8;

/// Tunable PBKDF2 parameters.
///
/// Stored in the vault profile so reopening uses the exact count the
/// vault was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Derive a 256-bit key from a master secret and salt with default params.
pub fn derive_key(master_secret: &str, salt: &[u8]) -> Result<DerivedKey> {
    derive_key_with_params(master_secret, salt, &KdfParams::default())
}

/// Derive a 256-bit key with explicit PBKDF2 parameters.
///
/// The same secret + salt + params always produce the same key, which
/// is what keeps previously sealed records readable.
pub fn derive_key_with_params(
    master_secret: &str,
    salt: &[u8],
    params: &KdfParams,
) -> Result<DerivedKey> {
    check_master_secret(master_secret)?;

    if params.iterations < MIN_ITERATIONS {
        return Err(VaultError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {})",
            params.iterations
        )));
    }
    if salt.len() != SALT_LEN {
        return Err(VaultError::KeyDerivationFailed(format!(
            "salt must be {SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha512>(master_secret.as_bytes(), salt, params.iterations, &mut key);
    let derived = DerivedKey::from_bytes(key);
    key.zeroize();

    debug!(iterations = params.iterations, "derived vault key");
    Ok(derived)
}

/// Reject empty or short master secrets before spending any CPU on them.
pub fn check_master_secret(master_secret: &str) -> Result<()> {
    if master_secret.chars().count() < MIN_MASTER_SECRET_LEN {
        return Err(VaultError::WeakInput {
            min_len: MIN_MASTER_SECRET_LEN,
        });
    }
    Ok(())
}

/// Generate a fresh random 16-byte salt.
///
/// Only called when a vault is created; reopening must reuse the stored
/// salt or the derived key changes.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_weak_input() {
        let salt = generate_salt();
        let err = derive_key("", &salt).unwrap_err();
        assert!(matches!(err, VaultError::WeakInput { min_len: 8 }));
    }

    #[test]
    fn seven_characters_is_weak_input() {
        let salt = generate_salt();
        assert!(matches!(
            derive_key("1234567", &salt),
            Err(VaultError::WeakInput { .. })
        ));
    }

    #[test]
    fn length_is_counted_in_characters() {
        // Eight characters, sixteen bytes.
        assert!(check_master_secret("ééééééé").is_err());
        assert!(check_master_secret("éééééééé").is_ok());
    }

    #[test]
    fn low_iteration_count_is_rejected() {
        let salt = generate_salt();
        let params = KdfParams { iterations: 1_000 };
        let err = derive_key_with_params("long enough secret", &salt, &params).unwrap_err();
        assert!(matches!(err, VaultError::KeyDerivationFailed(_)));
    }

    #[test]
    fn wrong_salt_length_is_rejected() {
        let err = derive_key("long enough secret", &[0u8; 8]).unwrap_err();
        assert!(matches!(err, VaultError::KeyDerivationFailed(_)));
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn matches_pbkdf2_reference_output() {
        // Cross-check against the pbkdf2 crate driven directly.
        let salt = [7u8; SALT_LEN];
        let key = derive_key("correct horse battery", &salt).unwrap();

        let mut expected = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha512>(b"correct horse battery", &salt, 100_000, &mut expected);
        assert_eq!(key.as_bytes(), &expected);
    }
}
