//! AES-256-GCM authenticated encryption for wallet secrets
//!
//! This module provides symmetric encryption with authentication using AES-256-GCM.

use aes_gcm::aead::Aead;
use aes_gcm::aead::KeyInit;
use aes_gcm::Aes256Gcm;
use aes_gcm::Key;
use aes_gcm::Nonce;
use rand::Rng;

use super::KEY_LEN;
use super::NONCE_LEN;

/// Failure of the AEAD primitive. Carries no detail on purpose: a wrong
/// key and a forged tag must look the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("AES-256-GCM operation failed")]
pub struct CipherError;

/// Handles AES-256-GCM encryption/decryption
pub struct WalletCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for WalletCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletCipher").finish_non_exhaustive()
    }
}

impl WalletCipher {
    /// Create cipher from 256-bit key
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        Self { cipher }
    }

    /// Generate random 96-bit nonce
    pub fn generate_nonce() -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill(&mut nonce);
        nonce
    }

    /// Encrypt plaintext with authenticated encryption
    ///
    /// Returns ciphertext with authentication tag appended
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        nonce: &[u8; NONCE_LEN],
    ) -> Result<Vec<u8>, CipherError> {
        self.cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|_| CipherError)
    }

    /// Decrypt ciphertext with authentication verification
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        nonce: &[u8; NONCE_LEN],
    ) -> Result<Vec<u8>, CipherError> {
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError)
    }
}
