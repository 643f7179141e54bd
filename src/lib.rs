//! Password-encrypted local storage of wallet recovery phrases.
//!
//! [`SecretStore`] keeps a registry of locally known wallets and, per wallet,
//! an optional recovery mnemonic encrypted with a key derived from a user
//! password. Everything is persisted through a [`KeyValueStore`], either the
//! JSON-file backed [`FileStore`] or the in-memory [`MemoryStore`].
//!
//! ```
//! use wallet_vault::{MemoryStore, SecretStore, VaultConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = VaultConfig::default().with_kdf_iterations(1_000);
//! let vault = SecretStore::new(MemoryStore::new(), config)?;
//!
//! vault.upsert_wallet("w1", "testnet-10", false).await?;
//! vault.store_mnemonic("w1", "abandon ability able", "pw").await?;
//!
//! assert!(vault.retrieve_mnemonic("w1", "wrong").await?.is_none());
//! let phrase = vault.retrieve_mnemonic("w1", "pw").await?.unwrap();
//! assert_eq!("abandon ability able", phrase.as_str());
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod state;

pub use application::config::network::Network;
pub use application::config::vault_config::VaultConfig;
pub use application::database::FileStore;
pub use application::database::KeyValueStore;
pub use application::database::MemoryStore;
pub use application::database::StorageError;
pub use state::wallet::errors::SecretStoreError;
pub use state::wallet::secret_store::SecretStore;
pub use state::wallet::secret_store::StorageUsage;
pub use state::wallet::wallet_record::WalletRecord;
