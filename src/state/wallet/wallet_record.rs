use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Registry entry for one locally known wallet.
///
/// Serialized with camelCase field names and ISO-8601 timestamps so the
/// registry can be shared with other tools reading the same store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    /// Unique identifier of the wallet, primary key of the registry.
    pub filename: String,

    /// Network the wallet was created for, e.g. `testnet-10`.
    pub network: String,

    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,

    /// True iff an encrypted mnemonic is stored for this wallet.
    #[serde(default)]
    pub has_mnemonic: bool,
}

impl WalletRecord {
    pub fn new(filename: &str, network: &str, has_mnemonic: bool, now: DateTime<Utc>) -> Self {
        Self {
            filename: filename.to_string(),
            network: network.to_string(),
            created_at: now,
            last_used: now,
            has_mnemonic,
        }
    }

    /// Refresh network and last-used time. `has_mnemonic` can only be raised here.
    pub fn touch(&mut self, network: &str, has_mnemonic: bool, now: DateTime<Utc>) {
        self.network = network.to_string();
        self.last_used = now;
        self.has_mnemonic |= has_mnemonic;
    }
}
