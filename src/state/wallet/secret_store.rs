//! Local wallet registry and password-encrypted mnemonic storage.
//!
//! Two kinds of keys are kept in the backing [`KeyValueStore`]:
//!
//! ```text
//! <registry_key>                  JSON array of WalletRecord
//! <mnemonic_prefix><filename>     base64(salt || nonce || ciphertext || tag)
//! ```
//!
//! Registry mutations are read-modify-write of the whole array with no
//! locking. Only one writer may use a given store at a time; concurrent
//! `store_mnemonic` calls for the same wallet leave an unspecified winner.

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;
use zeroize::Zeroizing;

use super::encryption;
use super::errors::SecretStoreError;
use super::wallet_record::WalletRecord;
use crate::application::config::vault_config::VaultConfig;
use crate::application::config::vault_config::VaultConfigError;
use crate::application::database::KeyValueStore;
use crate::application::database::StorageError;

/// Approximate footprint of the vault in its backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub wallet_count: usize,

    /// Bytes, counting two per character of every key and value the vault
    /// owns, the way browser storage accounts for UTF-16 strings.
    pub total_size_estimate: usize,
}

/// Wallet registry plus encrypted mnemonics over a [`KeyValueStore`].
///
/// The registry is read from the store on every call and never cached, so
/// several `SecretStore`s over the same store always see the latest state.
#[derive(Debug)]
pub struct SecretStore<S> {
    store: S,
    config: VaultConfig,
}

impl<S: KeyValueStore> SecretStore<S> {
    pub fn new(store: S, config: VaultConfig) -> Result<Self, VaultConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Encrypt `plaintext` with a key derived from `password`.
    ///
    /// Key derivation runs on the blocking thread pool.
    pub async fn encrypt(
        &self,
        plaintext: &str,
        password: &str,
    ) -> Result<String, SecretStoreError> {
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let password = Zeroizing::new(password.to_owned());
        let iterations = self.config.kdf_iterations;

        tokio::task::spawn_blocking(move || {
            encryption::encrypt_secret(&plaintext, &password, iterations)
        })
        .await
        .map_err(|e| SecretStoreError::Encryption(format!("encryption task failed: {e}")))?
    }

    /// Decrypt a blob produced by [`SecretStore::encrypt`].
    ///
    /// Fails with [`SecretStoreError::Decode`] on malformed input and with
    /// [`SecretStoreError::Decryption`] on a wrong password or tampered data.
    pub async fn decrypt(
        &self,
        encoded: &str,
        password: &str,
    ) -> Result<Zeroizing<String>, SecretStoreError> {
        let encoded = encoded.to_owned();
        let password = Zeroizing::new(password.to_owned());
        let iterations = self.config.kdf_iterations;

        tokio::task::spawn_blocking(move || {
            encryption::decrypt_secret(&encoded, &password, iterations)
        })
        .await
        .map_err(|_| SecretStoreError::Decryption)?
    }

    /// Read the registry. A missing or unparseable registry is empty; only a
    /// failing store is an error.
    async fn load_registry(&self) -> Result<Vec<WalletRecord>, StorageError> {
        let Some(json) = self.store.get(&self.config.registry_key).await? else {
            return Ok(vec![]);
        };

        match serde_json::from_str(&json) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("wallet registry is corrupt, treating it as empty: {e}");
                Ok(vec![])
            }
        }
    }

    async fn save_registry(&self, records: &[WalletRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string(records)?;
        self.store.set(&self.config.registry_key, json).await?;
        debug!("saved wallet registry with {} records", records.len());
        Ok(())
    }

    /// All registered wallets in insertion order. Never fails: an unreadable
    /// registry is reported as empty.
    pub async fn list_wallets(&self) -> Vec<WalletRecord> {
        self.load_registry().await.unwrap_or_else(|e| {
            warn!("could not read wallet registry: {e}");
            vec![]
        })
    }

    pub async fn get_wallet(&self, filename: &str) -> Option<WalletRecord> {
        self.list_wallets()
            .await
            .into_iter()
            .find(|record| record.filename == filename)
    }

    /// Register `filename`, or refresh its network and last-used time.
    ///
    /// `has_mnemonic` can raise the flag of an existing record but never
    /// lower it; use [`SecretStore::clear_mnemonic`] for that.
    pub async fn upsert_wallet(
        &self,
        filename: &str,
        network: &str,
        has_mnemonic: bool,
    ) -> Result<WalletRecord, StorageError> {
        let mut records = self.load_registry().await?;
        let now = Utc::now();

        let record = match records.iter_mut().find(|record| record.filename == filename) {
            Some(existing) => {
                existing.touch(network, has_mnemonic, now);
                debug!("updated wallet {filename} on {network}");
                existing.clone()
            }
            None => {
                let record = WalletRecord::new(filename, network, has_mnemonic, now);
                records.push(record.clone());
                info!("registered wallet {filename} on {network}");
                record
            }
        };

        self.save_registry(&records).await?;
        Ok(record)
    }

    /// Forget `filename` and delete its encrypted mnemonic. Unknown wallets
    /// are ignored.
    pub async fn remove_wallet(&self, filename: &str) -> Result<(), StorageError> {
        let mut records = self.load_registry().await?;
        let count = records.len();
        records.retain(|record| record.filename != filename);

        if records.len() != count {
            self.save_registry(&records).await?;
            info!("removed wallet {filename}");
        }

        self.store.remove(&self.config.mnemonic_key(filename)).await
    }

    /// Encrypt `mnemonic` and save it for `filename`, then flag the wallet's
    /// record. The wallet is expected to be registered already; no record is
    /// created for an unknown wallet.
    ///
    /// If the registry cannot be updated, the previously saved blob (or its
    /// absence) is restored so the flag keeps matching what is stored.
    pub async fn store_mnemonic(
        &self,
        filename: &str,
        mnemonic: &str,
        password: &str,
    ) -> Result<(), SecretStoreError> {
        let blob = self.encrypt(mnemonic, password).await?;
        let key = self.config.mnemonic_key(filename);
        let previous = self.store.get(&key).await?;
        self.store.set(&key, blob).await?;

        if let Err(e) = self.flag_mnemonic(filename).await {
            warn!("registry update failed, restoring previous mnemonic of wallet {filename}");
            let restored = match previous {
                Some(old) => self.store.set(&key, old).await,
                None => self.store.remove(&key).await,
            };
            if let Err(restore_error) = restored {
                warn!("could not restore mnemonic of wallet {filename}: {restore_error}");
            }
            return Err(e.into());
        }

        info!("stored encrypted mnemonic for wallet {filename}");
        Ok(())
    }

    async fn flag_mnemonic(&self, filename: &str) -> Result<(), StorageError> {
        let mut records = self.load_registry().await?;
        match records.iter_mut().find(|record| record.filename == filename) {
            Some(record) => {
                record.has_mnemonic = true;
                self.save_registry(&records).await
            }
            None => {
                warn!("stored mnemonic for unregistered wallet {filename}");
                Ok(())
            }
        }
    }

    /// Decrypt the mnemonic saved for `filename`.
    ///
    /// Returns `None` when nothing is saved and when decryption fails for any
    /// reason, so callers can simply ask for the password again.
    pub async fn retrieve_mnemonic(
        &self,
        filename: &str,
        password: &str,
    ) -> Result<Option<Zeroizing<String>>, StorageError> {
        let Some(blob) = self.store.get(&self.config.mnemonic_key(filename)).await? else {
            debug!("no mnemonic stored for wallet {filename}");
            return Ok(None);
        };

        match self.decrypt(&blob, password).await {
            Ok(mnemonic) => Ok(Some(mnemonic)),
            Err(e) => {
                warn!("could not decrypt mnemonic for wallet {filename}: {e}");
                Ok(None)
            }
        }
    }

    /// True if an encrypted mnemonic exists for `filename`. Does not decrypt.
    pub async fn has_mnemonic_stored(&self, filename: &str) -> Result<bool, StorageError> {
        Ok(self
            .store
            .get(&self.config.mnemonic_key(filename))
            .await?
            .is_some())
    }

    /// Delete the encrypted mnemonic of `filename` but keep the wallet
    /// registered, with its flag lowered.
    pub async fn clear_mnemonic(&self, filename: &str) -> Result<(), StorageError> {
        self.store.remove(&self.config.mnemonic_key(filename)).await?;

        let mut records = self.load_registry().await?;
        if let Some(record) = records
            .iter_mut()
            .find(|record| record.filename == filename && record.has_mnemonic)
        {
            record.has_mnemonic = false;
            self.save_registry(&records).await?;
            info!("cleared mnemonic of wallet {filename}");
        }
        Ok(())
    }

    /// Delete every encrypted mnemonic, registered or not, then the registry.
    pub async fn clear_all(&self) -> Result<(), StorageError> {
        let mut removed = 0;
        for key in self.store.keys().await? {
            if key.starts_with(&self.config.mnemonic_prefix) {
                self.store.remove(&key).await?;
                removed += 1;
            }
        }

        self.store.remove(&self.config.registry_key).await?;
        info!("cleared wallet vault, removed {removed} mnemonics");
        Ok(())
    }

    pub async fn storage_usage(&self) -> Result<StorageUsage, StorageError> {
        let mut total_size_estimate = 0;
        for key in self.store.keys().await? {
            if !self.config.owns_key(&key) {
                continue;
            }
            if let Some(value) = self.store.get(&key).await? {
                total_size_estimate += 2 * (key.chars().count() + value.chars().count());
            }
        }

        Ok(StorageUsage {
            wallet_count: self.list_wallets().await.len(),
            total_size_estimate,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use tracing_test::traced_test;

    use super::*;
    use crate::application::database::MemoryStore;

    const TEST_ITERATIONS: u32 = 1_000;
    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_store() -> SecretStore<MemoryStore> {
        let config = VaultConfig::default().with_kdf_iterations(TEST_ITERATIONS);
        SecretStore::new(MemoryStore::new(), config).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = VaultConfig::default().with_kdf_iterations(0);
        assert!(SecretStore::new(MemoryStore::new(), config).is_err());
    }

    #[tokio::test]
    async fn empty_store_has_no_wallets() {
        let vault = test_store();
        assert!(vault.list_wallets().await.is_empty());
        assert_eq!(None, vault.get_wallet("w1").await);
    }

    #[traced_test]
    #[tokio::test]
    async fn corrupt_registry_reads_as_empty() {
        let vault = test_store();
        vault
            .store()
            .set(&vault.config().registry_key, "{ definitely not json".to_string())
            .await
            .unwrap();

        assert!(vault.list_wallets().await.is_empty());
        assert!(logs_contain("wallet registry is corrupt"));

        // the next write replaces the corrupt value
        vault.upsert_wallet("w1", "mainnet", false).await.unwrap();
        assert_eq!(1, vault.list_wallets().await.len());
    }

    #[tokio::test]
    async fn registry_keeps_insertion_order() {
        let vault = test_store();
        for name in ["c", "a", "b"] {
            vault.upsert_wallet(name, "mainnet", false).await.unwrap();
        }
        vault.upsert_wallet("c", "testnet-10", false).await.unwrap();

        let names: Vec<_> = vault
            .list_wallets()
            .await
            .into_iter()
            .map(|record| record.filename)
            .collect();
        assert_eq!(vec!["c", "a", "b"], names);
    }

    #[tokio::test]
    async fn upsert_updates_network_and_last_used() {
        let vault = test_store();
        let first = vault.upsert_wallet("w1", "mainnet", false).await.unwrap();
        let second = vault.upsert_wallet("w1", "testnet-11", false).await.unwrap();

        assert_eq!(1, vault.list_wallets().await.len());
        assert_eq!("testnet-11", second.network);
        assert_eq!(first.created_at, second.created_at);
        assert!(second.last_used >= first.last_used);
        assert_eq!(Some(second), vault.get_wallet("w1").await);
    }

    #[tokio::test]
    async fn has_mnemonic_is_never_downgraded_by_upsert() {
        let vault = test_store();
        vault.upsert_wallet("w1", "testnet-10", true).await.unwrap();
        vault.upsert_wallet("w1", "testnet-10", false).await.unwrap();

        assert!(vault.get_wallet("w1").await.unwrap().has_mnemonic);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let vault = test_store();
        vault.upsert_wallet("w1", "mainnet", false).await.unwrap();
        vault.upsert_wallet("w2", "mainnet", false).await.unwrap();
        vault.store_mnemonic("w1", PHRASE, "pw").await.unwrap();

        vault.remove_wallet("w1").await.unwrap();
        let after_once = vault.list_wallets().await;
        vault.remove_wallet("w1").await.unwrap();
        vault.remove_wallet("never-registered").await.unwrap();

        assert_eq!(after_once, vault.list_wallets().await);
        assert_eq!(1, after_once.len());
        assert!(!vault.has_mnemonic_stored("w1").await.unwrap());
    }

    #[tokio::test]
    async fn store_and_retrieve_mnemonic() {
        let vault = test_store();
        vault.upsert_wallet("w1", "testnet-10", false).await.unwrap();
        assert!(!vault.get_wallet("w1").await.unwrap().has_mnemonic);

        vault.store_mnemonic("w1", PHRASE, "pw").await.unwrap();

        assert!(vault.get_wallet("w1").await.unwrap().has_mnemonic);
        assert!(vault.has_mnemonic_stored("w1").await.unwrap());
        let retrieved = vault.retrieve_mnemonic("w1", "pw").await.unwrap();
        assert_eq!(Some(PHRASE), retrieved.as_ref().map(|m| m.as_str()));
    }

    #[traced_test]
    #[tokio::test]
    async fn wrong_password_retrieves_nothing() {
        let vault = test_store();
        vault.upsert_wallet("w1", "testnet-10", false).await.unwrap();
        vault.store_mnemonic("w1", PHRASE, "pw").await.unwrap();

        assert!(vault.retrieve_mnemonic("w1", "wrong").await.unwrap().is_none());
        assert!(logs_contain("could not decrypt mnemonic for wallet w1"));
        assert!(!logs_contain(PHRASE));
    }

    #[tokio::test]
    async fn corrupt_blob_retrieves_nothing() {
        let vault = test_store();
        let key = vault.config().mnemonic_key("w1");
        vault.store().set(&key, "%%%".to_string()).await.unwrap();

        assert!(vault.has_mnemonic_stored("w1").await.unwrap());
        assert!(vault.retrieve_mnemonic("w1", "pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_mnemonic_retrieves_nothing() {
        let vault = test_store();
        assert!(vault.retrieve_mnemonic("w1", "pw").await.unwrap().is_none());
        assert!(!vault.has_mnemonic_stored("w1").await.unwrap());
    }

    #[traced_test]
    #[tokio::test]
    async fn store_mnemonic_does_not_register_unknown_wallet() {
        let vault = test_store();
        vault.store_mnemonic("ghost", PHRASE, "pw").await.unwrap();

        assert!(vault.list_wallets().await.is_empty());
        assert!(vault.has_mnemonic_stored("ghost").await.unwrap());
        assert!(logs_contain("stored mnemonic for unregistered wallet ghost"));
    }

    #[tokio::test]
    async fn storing_twice_keeps_latest() {
        let vault = test_store();
        vault.upsert_wallet("w1", "mainnet", false).await.unwrap();
        vault.store_mnemonic("w1", "first phrase", "pw1").await.unwrap();
        vault.store_mnemonic("w1", "second phrase", "pw2").await.unwrap();

        assert!(vault.retrieve_mnemonic("w1", "pw1").await.unwrap().is_none());
        let retrieved = vault.retrieve_mnemonic("w1", "pw2").await.unwrap();
        assert_eq!(Some("second phrase"), retrieved.as_ref().map(|m| m.as_str()));
    }

    #[tokio::test]
    async fn clear_mnemonic_lowers_flag_and_keeps_wallet() {
        let vault = test_store();
        vault.upsert_wallet("w1", "mainnet", false).await.unwrap();
        vault.store_mnemonic("w1", PHRASE, "pw").await.unwrap();

        vault.clear_mnemonic("w1").await.unwrap();
        vault.clear_mnemonic("w1").await.unwrap();

        let record = vault.get_wallet("w1").await.unwrap();
        assert!(!record.has_mnemonic);
        assert!(!vault.has_mnemonic_stored("w1").await.unwrap());
    }

    #[tokio::test]
    async fn clear_all_removes_everything_owned() {
        let vault = test_store();
        vault.upsert_wallet("w1", "mainnet", false).await.unwrap();
        vault.upsert_wallet("w2", "mainnet", false).await.unwrap();
        vault.store_mnemonic("w1", PHRASE, "pw").await.unwrap();
        vault.store_mnemonic("orphan", PHRASE, "pw").await.unwrap();
        vault
            .store()
            .set("unrelated", "keep me".to_string())
            .await
            .unwrap();

        vault.clear_all().await.unwrap();

        assert!(vault.list_wallets().await.is_empty());
        assert_eq!(vec!["unrelated".to_string()], vault.store().keys().await.unwrap());
    }

    #[tokio::test]
    async fn storage_usage_counts_only_owned_keys() {
        let vault = test_store();
        assert_eq!(
            StorageUsage {
                wallet_count: 0,
                total_size_estimate: 0
            },
            vault.storage_usage().await.unwrap()
        );

        vault.upsert_wallet("w1", "mainnet", false).await.unwrap();
        vault.store_mnemonic("w1", PHRASE, "pw").await.unwrap();
        let owned = vault.storage_usage().await.unwrap();
        assert_eq!(1, owned.wallet_count);
        assert_eq!(2 * vault.store().size().await, owned.total_size_estimate);

        vault
            .store()
            .set("unrelated", "x".repeat(100))
            .await
            .unwrap();
        assert_eq!(owned, vault.storage_usage().await.unwrap());
    }

    #[tokio::test]
    async fn quota_errors_propagate() {
        let config = VaultConfig::default().with_kdf_iterations(TEST_ITERATIONS);
        let vault = SecretStore::new(MemoryStore::with_quota(300), config).unwrap();
        vault.upsert_wallet("w1", "mainnet", false).await.unwrap();

        let err = vault
            .store_mnemonic("w1", &"word ".repeat(200), "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, SecretStoreError::Storage(ref e) if e.is_quota_exceeded()));

        // nothing half-written
        assert!(!vault.has_mnemonic_stored("w1").await.unwrap());
        assert!(!vault.get_wallet("w1").await.unwrap().has_mnemonic);
    }

    /// Store whose registry writes fail once `fail_registry_writes` is set.
    #[derive(Debug, Default)]
    struct RegistryWriteFails {
        inner: MemoryStore,
        registry_key: String,
        fail_registry_writes: AtomicBool,
    }

    #[async_trait::async_trait]
    impl KeyValueStore for RegistryWriteFails {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
            if key == self.registry_key && self.fail_registry_writes.load(Ordering::SeqCst) {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }

        async fn keys(&self) -> Result<Vec<String>, StorageError> {
            self.inner.keys().await
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn failed_registry_write_restores_previous_mnemonic() {
        let config = VaultConfig::default().with_kdf_iterations(TEST_ITERATIONS);
        let store = Arc::new(RegistryWriteFails {
            registry_key: config.registry_key.clone(),
            ..Default::default()
        });
        let vault = SecretStore::new(Arc::clone(&store), config).unwrap();
        vault.upsert_wallet("w1", "mainnet", false).await.unwrap();
        vault.upsert_wallet("w2", "mainnet", false).await.unwrap();
        vault.store_mnemonic("w1", "first phrase", "pw1").await.unwrap();

        store.fail_registry_writes.store(true, Ordering::SeqCst);

        let err = vault
            .store_mnemonic("w1", "second phrase", "pw2")
            .await
            .unwrap_err();
        assert!(matches!(err, SecretStoreError::Storage(StorageError::Io(_))));
        assert!(logs_contain("restoring previous mnemonic of wallet w1"));
        let kept = vault.retrieve_mnemonic("w1", "pw1").await.unwrap().unwrap();
        assert_eq!("first phrase", kept.as_str());
        assert!(vault.get_wallet("w1").await.unwrap().has_mnemonic);

        // no earlier blob: the new one is removed again
        assert!(vault.store_mnemonic("w2", PHRASE, "pw").await.is_err());
        assert!(!vault.has_mnemonic_stored("w2").await.unwrap());
        assert!(!vault.get_wallet("w2").await.unwrap().has_mnemonic);
    }

    #[tokio::test]
    async fn instances_over_one_store_share_state() {
        let store = Arc::new(MemoryStore::new());
        let config = VaultConfig::default().with_kdf_iterations(TEST_ITERATIONS);
        let first = SecretStore::new(Arc::clone(&store), config.clone()).unwrap();
        let second = SecretStore::new(Arc::clone(&store), config).unwrap();

        first.upsert_wallet("w1", "mainnet", false).await.unwrap();
        second.store_mnemonic("w1", PHRASE, "pw").await.unwrap();

        assert!(first.get_wallet("w1").await.unwrap().has_mnemonic);
        assert!(first.retrieve_mnemonic("w1", "pw").await.unwrap().is_some());
    }
}
