//! Mnemonic encryption using PBKDF2-HMAC-SHA256 + AES-256-GCM
//!
//! This module protects wallet recovery phrases stored locally.
//!
//! ## Security Properties
//!
//! - **Key Derivation**: PBKDF2-HMAC-SHA256, 100 000 rounds by default
//! - **Encryption**: AES-256-GCM (authenticated encryption)
//! - **Freshness**: new random salt and nonce for every encryption
//! - **Memory Safety**: Zeroizing for derived keys and decrypted phrases
//!
//! ## Architecture
//!
//! ```text
//! User Password (UTF-8)  +  random salt (16 bytes)
//!     ↓ PBKDF2-HMAC-SHA256
//! Encryption Key (256 bits)  +  random nonce (12 bytes)
//!     ↓ AES-256-GCM
//! base64(salt || nonce || ciphertext || tag)
//! ```
//!
//! ## Usage
//!
//! ```
//! use wallet_vault::state::wallet::encryption::{decrypt_secret, encrypt_secret};
//!
//! let blob = encrypt_secret("abandon ability able", "hunter2", 1_000).unwrap();
//! let phrase = decrypt_secret(&blob, "hunter2", 1_000).unwrap();
//! assert_eq!("abandon ability able", phrase.as_str());
//! assert!(decrypt_secret(&blob, "hunter3", 1_000).is_err());
//! ```

pub use cipher::CipherError;
pub use cipher::WalletCipher;
pub use format::decrypt_secret;
pub use format::encrypt_secret;
pub use format::EncryptedBlob;
pub use key_manager::WalletKeyManager;
pub use password::PasswordManager;
pub use password::PasswordStrength;
pub use password::VAULT_PASSWORD_ENV_VAR;

mod cipher;
mod format;
mod key_manager;
mod password;


pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;
pub const TAG_LEN: usize = 16;

/// Shortest decodable blob: salt and nonce with an empty ciphertext.
pub const MIN_BLOB_LEN: usize = SALT_LEN + NONCE_LEN;

pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;
