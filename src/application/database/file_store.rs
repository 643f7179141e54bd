use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;

use super::KeyValueStore;
use super::StorageError;

const TEMP_FILE_SUFFIX: &str = ".tmp";

/// [`KeyValueStore`] persisted as a single JSON object on disk.
///
/// The whole file is loaded on [`FileStore::open`] and kept in memory. Every
/// mutation rewrites the file by writing a sibling temp file and renaming it
/// over the original, so a crash mid-write leaves the previous contents.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; the file
    /// is only created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no store at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        debug!("opened store at {} with {} keys", path.display(), entries.len());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(TEMP_FILE_SUFFIX);
        let temp_path = PathBuf::from(temp_path);

        let json = serde_json::to_string_pretty(entries)?;
        Self::write_temp_file(&temp_path, json.as_bytes()).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        debug!("persisted {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Write a fresh temp file. On unix it is created with mode 600 so other
    /// users on the machine cannot read the encrypted mnemonics.
    async fn write_temp_file(temp_path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        // a leftover from an interrupted write keeps its old mode when reopened
        match tokio::fs::remove_file(temp_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(temp_path).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let previous = entries.insert(key.to_string(), value);

        if let Err(e) = self.persist(&entries).await {
            // keep memory in line with what is on disk
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&entries).await {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}
