use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use directories::ProjectDirs;
use tracing::debug;

pub const VAULT_FILE_NAME: &str = "vault.json";

/// Location of the on-disk vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirectory {
    root: PathBuf,
}

impl DataDirectory {
    /// Use `root_dir` if given, else the platform data directory, e.g.
    ///
    /// Linux:   /home/alice/.local/share/wallet-vault
    ///
    /// Windows: C:\Users\Alice\AppData\Roaming\wallet-vault\data
    ///
    /// macOS:   /Users/Alice/Library/Application Support/org.wallet-vault.wallet-vault
    pub fn get(root_dir: Option<PathBuf>) -> Result<Self> {
        let root = match root_dir {
            Some(root) => root,
            None => ProjectDirs::from("org", "wallet-vault", "wallet-vault")
                .context("Could not determine a data directory for this platform")?
                .data_dir()
                .to_path_buf(),
        };
        debug!("using data directory {}", root.display());

        Ok(Self { root })
    }

    pub fn root_dir_path(&self) -> &Path {
        &self.root
    }

    pub fn vault_file_path(&self) -> PathBuf {
        self.root.join(VAULT_FILE_NAME)
    }
}
