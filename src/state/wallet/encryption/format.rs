//! Encoded layout of an encrypted mnemonic
//!
//! ```text
//! base64( salt (16) || iv (12) || ciphertext || tag (16) )
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroizing;

use super::WalletCipher;
use super::WalletKeyManager;
use super::MIN_BLOB_LEN;
use super::NONCE_LEN;
use super::SALT_LEN;
use crate::state::wallet::errors::SecretStoreError;

/// Salt, nonce and authenticated ciphertext of one encrypted secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the 16-byte GCM tag appended
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Encrypt `plaintext` under a key derived from `password` with a fresh
    /// salt and a fresh nonce.
    pub fn encrypt(
        plaintext: &str,
        password: &str,
        iterations: u32,
    ) -> Result<Self, SecretStoreError> {
        let salt = WalletKeyManager::generate_salt();
        let nonce = WalletCipher::generate_nonce();

        let key_manager = WalletKeyManager::from_password(password, &salt, iterations);
        let cipher = WalletCipher::new(key_manager.encryption_key());
        let ciphertext = cipher
            .encrypt(plaintext.as_bytes(), &nonce)
            .map_err(|e| SecretStoreError::Encryption(e.to_string()))?;

        Ok(Self {
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt with `password`. Any authentication failure, including
    /// plaintext that is not UTF-8, is a [`SecretStoreError::Decryption`].
    pub fn decrypt(
        &self,
        password: &str,
        iterations: u32,
    ) -> Result<Zeroizing<String>, SecretStoreError> {
        let key_manager = WalletKeyManager::from_password(password, &self.salt, iterations);
        let cipher = WalletCipher::new(key_manager.encryption_key());

        let plaintext = Zeroizing::new(
            cipher
                .decrypt(&self.ciphertext, &self.nonce)
                .map_err(|_| SecretStoreError::Decryption)?,
        );
        let text = std::str::from_utf8(&plaintext).map_err(|_| SecretStoreError::Decryption)?;

        Ok(Zeroizing::new(text.to_owned()))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MIN_BLOB_LEN + self.ciphertext.len());
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Split raw bytes into salt, nonce and ciphertext.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SecretStoreError> {
        if bytes.len() < MIN_BLOB_LEN {
            return Err(SecretStoreError::Decode(format!(
                "blob is {} bytes, need at least {}",
                bytes.len(),
                MIN_BLOB_LEN
            )));
        }

        let (salt, rest) = bytes.split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        Ok(Self {
            salt: salt
                .try_into()
                .map_err(|_| SecretStoreError::Decode("bad salt".to_string()))?,
            nonce: nonce
                .try_into()
                .map_err(|_| SecretStoreError::Decode("bad nonce".to_string()))?,
            ciphertext: ciphertext.to_vec(),
        })
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SecretStoreError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| SecretStoreError::Decode(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

/// Encrypt a secret string into its base64 storage form.
pub fn encrypt_secret(
    plaintext: &str,
    password: &str,
    iterations: u32,
) -> Result<String, SecretStoreError> {
    Ok(EncryptedBlob::encrypt(plaintext, password, iterations)?.to_base64())
}

/// Decrypt the base64 storage form produced by [`encrypt_secret`].
pub fn decrypt_secret(
    encoded: &str,
    password: &str,
    iterations: u32,
) -> Result<Zeroizing<String>, SecretStoreError> {
    EncryptedBlob::from_base64(encoded)?.decrypt(password, iterations)
}
