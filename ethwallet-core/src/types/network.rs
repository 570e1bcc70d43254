use super::U64;
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// Infura project id used for catalog endpoints when none is configured.
pub const DEFAULT_INFURA_PROJECT_ID: &str = "1a8e6a8ab1df44ccb77d3e954082c5d4";

/// Networks with a well-known chain id and a hosted default endpoint.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsRefStr,
    EnumString,
    EnumIter,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[repr(u64)]
pub enum KnownNetwork {
    Mainnet = 1,
    Goerli = 5,
    BinanceSmartChain = 56,
    Sepolia = 11155111,
    CeloMainnet = 42220,
    CeloAlfajores = 44787,
    AvalancheMainnet = 43114,
    AvalancheFuji = 43113,
    PalmMainnet = 11297108109,
    PalmTestnet = 11297108099,
    AuroraMainnet = 1313161554,
    AuroraTestnet = 1313161555,
}

impl KnownNetwork {
    /// The chain id of this network.
    pub const fn chain_id(self) -> u64 {
        self as u64
    }

    /// The short name used as the network's endpoint id.
    pub const fn short_name(self) -> &'static str {
        use KnownNetwork::*;

        match self {
            Mainnet => "mainnet",
            Goerli => "goerli",
            BinanceSmartChain => "binance",
            Sepolia => "sepolia",
            CeloMainnet => "celo-mainnet",
            CeloAlfajores => "celo-alfajores",
            AvalancheMainnet => "avalanche-mainnet",
            AvalancheFuji => "avalanche-fuji",
            PalmMainnet => "palm-mainnet",
            PalmTestnet => "palm-testnet",
            AuroraMainnet => "aurora-mainnet",
            AuroraTestnet => "aurora-testnet",
        }
    }

    /// Looks a network up by chain id.
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::try_from_primitive(chain_id).ok()
    }

    /// Looks a network up by its short name or kebab-case variant name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        KnownNetwork::from_str(&name)
            .ok()
            .or_else(|| Self::iter().find(|network| network.short_name() == name))
    }

    /// Default JSON-RPC endpoint for this network under the given Infura project id.
    pub fn endpoint(self, project_id: &str) -> String {
        format!("https://{}.infura.io/v3/{project_id}", self.short_name())
    }

    /// Default JSON-RPC endpoint using [`DEFAULT_INFURA_PROJECT_ID`].
    pub fn default_endpoint(self) -> String {
        self.endpoint(DEFAULT_INFURA_PROJECT_ID)
    }
}

impl fmt::Display for KnownNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.short_name())
    }
}

impl From<KnownNetwork> for u64 {
    fn from(network: KnownNetwork) -> Self {
        network.chain_id()
    }
}

impl From<KnownNetwork> for U64 {
    fn from(network: KnownNetwork) -> Self {
        network.chain_id().into()
    }
}

/// Error returned when a chain id is not part of the catalog.
pub type ParseNetworkError = TryFromPrimitiveError<KnownNetwork>;
