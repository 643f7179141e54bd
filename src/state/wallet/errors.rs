use crate::application::database::StorageError;

/// Errors produced by the wallet vault.
///
/// `Decryption` deliberately covers both a wrong password and corrupted or
/// tampered data; the two cannot be told apart from the ciphertext.
#[derive(Debug, thiserror::Error)]
pub enum SecretStoreError {
    #[error("malformed encrypted blob: {0}")]
    Decode(String),

    #[error("failed to decrypt (wrong password or corrupted data)")]
    Decryption,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
