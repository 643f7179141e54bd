/// Failure of the underlying key-value store.
///
/// These are environment conditions (disk, permissions, quota) that the
/// vault cannot recover from by itself, so they always reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage quota exceeded: {required} bytes required, limit is {limit} bytes")]
    QuotaExceeded { required: usize, limit: usize },
}

impl StorageError {
    /// Returns true if the write was refused because of the size limit.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}
