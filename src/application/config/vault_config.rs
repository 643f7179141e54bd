use serde::Deserialize;
use serde::Serialize;

use crate::state::wallet::encryption::DEFAULT_KDF_ITERATIONS;

pub const DEFAULT_REGISTRY_KEY: &str = "wallet_registry";
pub const DEFAULT_MNEMONIC_PREFIX: &str = "mnemonic:";

/// Key layout and key-derivation cost of a vault.
///
/// The iteration count is not recorded inside encrypted blobs, so a vault
/// must always be opened with the count it was written with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Key holding the JSON wallet registry.
    pub registry_key: String,

    /// Prefix of the keys holding encrypted mnemonics, followed by the wallet filename.
    pub mnemonic_prefix: String,

    /// PBKDF2-HMAC-SHA256 rounds.
    pub kdf_iterations: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            registry_key: DEFAULT_REGISTRY_KEY.to_string(),
            mnemonic_prefix: DEFAULT_MNEMONIC_PREFIX.to_string(),
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultConfigError {
    #[error("registry key must not be empty")]
    EmptyRegistryKey,

    #[error("mnemonic key prefix must not be empty")]
    EmptyMnemonicPrefix,

    #[error("registry key '{registry_key}' collides with mnemonic prefix '{prefix}'")]
    RegistryKeyCollision {
        registry_key: String,
        prefix: String,
    },

    #[error("key derivation needs at least one iteration")]
    ZeroIterations,
}

impl VaultConfig {
    pub fn with_kdf_iterations(mut self, kdf_iterations: u32) -> Self {
        self.kdf_iterations = kdf_iterations;
        self
    }

    /// Check that the layout cannot confuse the registry with a mnemonic key.
    pub fn validate(&self) -> Result<(), VaultConfigError> {
        if self.registry_key.is_empty() {
            return Err(VaultConfigError::EmptyRegistryKey);
        }
        if self.mnemonic_prefix.is_empty() {
            return Err(VaultConfigError::EmptyMnemonicPrefix);
        }
        if self.registry_key.starts_with(&self.mnemonic_prefix) {
            return Err(VaultConfigError::RegistryKeyCollision {
                registry_key: self.registry_key.clone(),
                prefix: self.mnemonic_prefix.clone(),
            });
        }
        if self.kdf_iterations == 0 {
            return Err(VaultConfigError::ZeroIterations);
        }
        Ok(())
    }

    /// Store key of the encrypted mnemonic for `filename`.
    pub fn mnemonic_key(&self, filename: &str) -> String {
        format!("{}{}", self.mnemonic_prefix, filename)
    }

    /// True if `key` belongs to this vault's namespace.
    pub fn owns_key(&self, key: &str) -> bool {
        key == self.registry_key || key.starts_with(&self.mnemonic_prefix)
    }
}
