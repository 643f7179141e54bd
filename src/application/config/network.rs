use std::fmt;
use std::str::FromStr;

use strum::EnumIter;

/// Network a wallet was created for.
///
/// Wallet records keep the network as a plain string so that records written
/// for networks unknown to this build still load; this enum is what the
/// command line accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, EnumIter)]
pub enum Network {
    #[default]
    Mainnet,

    /// Long-running public testnet.
    Testnet10,

    /// Testnet for high block-rate experiments.
    Testnet11,

    /// Local development network.
    Devnet,

    /// Simulation network for tests, no peers.
    Simnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet10 => "testnet-10",
            Network::Testnet11 => "testnet-11",
            Network::Devnet => "devnet",
            Network::Simnet => "simnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;
    fn from_str(input: &str) -> Result<Network, Self::Err> {
        match input {
            "mainnet" => Ok(Network::Mainnet),
            "testnet-10" => Ok(Network::Testnet10),
            "testnet-11" => Ok(Network::Testnet11),
            "devnet" => Ok(Network::Devnet),
            "simnet" => Ok(Network::Simnet),
            _ => Err(format!("Failed to parse {} as network", input)),
        }
    }
}
