//! Persistent key-value stores backing the wallet vault.
//!
//! The vault only ever needs string keys and string values, which is the
//! lowest common denominator of browser local storage, a JSON file on disk,
//! and an in-memory map used by tests.

mod errors;
mod file_store;
mod memory_store;

pub use errors::StorageError;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// String-to-string key-value store.
///
/// Implementations must give read-your-writes consistency within a single
/// process. Nothing more is assumed: there are no transactions, so callers
/// doing read-modify-write must be the only writer.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Return the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// List every key currently present, in no particular order.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

#[async_trait::async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys().await
    }
}

/// Size in bytes a set of entries occupies, counted as key plus value length.
pub(crate) fn entries_size<'a>(
    entries: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> usize {
    entries
        .into_iter()
        .map(|(key, value)| key.len() + value.len())
        .sum()
}
