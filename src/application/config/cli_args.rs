use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use super::network::Network;
use super::vault_config::VaultConfig;
use crate::state::wallet::encryption::DEFAULT_KDF_ITERATIONS;

/// The `wallet-vault` command-line program manages locally stored,
/// password-encrypted wallet recovery phrases.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about)]
pub struct Args {
    /// The data directory that contains the vault file
    ///
    /// The default varies by operating system, e.g.
    ///
    /// Linux:   /home/alice/.local/share/wallet-vault
    ///
    /// Windows: C:\Users\Alice\AppData\Roaming\wallet-vault\data
    ///
    /// macOS:   /Users/Alice/Library/Application Support/org.wallet-vault.wallet-vault
    #[clap(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Network recorded for newly registered wallets.
    #[clap(long, default_value_t = Network::Mainnet, global = true)]
    pub network: Network,

    /// PBKDF2 rounds used to derive encryption keys.
    ///
    /// Must match the value the vault was written with.
    #[clap(long, default_value_t = DEFAULT_KDF_ITERATIONS, global = true)]
    pub kdf_iterations: u32,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List registered wallets.
    List,

    /// Register a wallet, or refresh its network and last-used time.
    Register { filename: String },

    /// Forget a wallet and delete its saved phrase.
    Remove { filename: String },

    /// Encrypt and save the recovery phrase of a registered wallet.
    ///
    /// The phrase is read from standard input.
    Store { filename: String },

    /// Decrypt and print a saved recovery phrase.
    Retrieve { filename: String },

    /// Report whether a phrase is saved for a wallet.
    Has { filename: String },

    /// Delete a saved phrase but keep the wallet registered.
    ClearMnemonic { filename: String },

    /// Delete every saved phrase and the registry.
    ClearAll {
        /// Confirm the reset.
        #[clap(long)]
        yes: bool,
    },

    /// Show how much storage the vault occupies.
    Usage,
}

impl Args {
    pub fn vault_config(&self) -> VaultConfig {
        VaultConfig::default().with_kdf_iterations(self.kdf_iterations)
    }
}
