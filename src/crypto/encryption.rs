//! AES-256-CBC with PKCS#7 padding.
//!
//! These are the raw primitives under the envelope layer: the caller
//! supplies the IV.  CBC gives confidentiality only; nothing here detects
//! a wrong key or tampered ciphertext beyond a padding check.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::errors::{Result, VaultError};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Size of the CBC initialisation vector in bytes.
pub const IV_LEN: usize = 16;

/// The all-zero IV that legacy records were written with.
pub const ZERO_IV: [u8; IV_LEN] = [0u8; IV_LEN];

/// Encrypt `plaintext` with a 32-byte `key` under `iv`.
pub fn encrypt(key: &[u8], iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt data produced by `encrypt` with the same key and IV.
///
/// Fails on a ciphertext that is not a whole number of blocks or whose
/// padding does not check out.
pub fn decrypt(key: &[u8], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|e| VaultError::decryption(format!("invalid key length: {e}")))?;

    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| VaultError::decryption("invalid padding (wrong key or corrupted data)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let key = [0x11u8; 32];
        let iv = [0x22u8; IV_LEN];
        let ct = encrypt(&key, &iv, b"hello vault").unwrap();
        assert_eq!(ct.len(), 16);
        assert_eq!(decrypt(&key, &iv, &ct).unwrap(), b"hello vault");
    }

    #[test]
    fn full_block_plaintext_gets_extra_padding_block() {
        let key = [0x11u8; 32];
        let ct = encrypt(&key, &ZERO_IV, &[b'x'; 16]).unwrap();
        assert_eq!(ct.len(), 32);
    }

    #[test]
    fn nist_sp800_38a_first_block() {
        // F.2.5 CBC-AES256.Encrypt, block #1.  PKCS#7 appends a second
        // block, so only the first 16 bytes are compared.
        let key = hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4")
            .unwrap();
        let iv: [u8; IV_LEN] = hex::decode("000102030405060708090a0b0c0d0e0f")
            .unwrap()
            .try_into()
            .unwrap();
        let pt = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();

        let ct = encrypt(&key, &iv, &pt).unwrap();
        assert_eq!(hex::encode(&ct[..16]), "f58c4c04d6e5f1ba779eabfb5f7bfbd6");
    }

    #[test]
    fn rejects_partial_block() {
        let key = [0x11u8; 32];
        assert!(matches!(
            decrypt(&key, &ZERO_IV, &[0u8; 15]),
            Err(VaultError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn rejects_empty_ciphertext() {
        let key = [0x11u8; 32];
        assert!(decrypt(&key, &ZERO_IV, &[]).is_err());
    }

    #[test]
    fn rejects_short_key() {
        assert!(matches!(
            encrypt(&[0u8; 16], &ZERO_IV, b"x"),
            Err(VaultError::EncryptionFailed(_))
        ));
    }
}
