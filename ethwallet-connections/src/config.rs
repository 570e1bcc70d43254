use crate::WalletError;
use ethwallet_core::types::DEFAULT_INFURA_PROJECT_ID;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::Path};

/// Environment variable consulted for the Infura project id when the configuration has none
pub const INFURA_PROJECT_ID_ENV: &str = "ETHWALLET_INFURA_PROJECT_ID";

/// Connections to register at startup.
///
/// ```
/// use ethwallet_connections::WalletConfig;
///
/// let config = WalletConfig::from_json_str(r#"{
///     "networks": {
///         "local": { "provider": "http://localhost:8545", "chainId": 1337 },
///         "binance": {}
///     },
///     "defaultNetwork": "local"
/// }"#).unwrap();
/// assert_eq!(config.networks.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConfig {
    /// Connections by network name
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
    /// Network used when a call names none, `mainnet` if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_network: Option<String>,
    /// Infura project id for catalog endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infura_project_id: Option<String>,
}

/// A single configured connection
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Node URL. Defaults to the catalog endpoint of the chain id or of the network name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Chain id, cached without asking the node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Hex encoded private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
}

// do not log the key
impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("provider", &self.provider)
            .field("chain_id", &self.chain_id)
            .field("signer", &self.signer.as_ref().map(|_| ".."))
            .finish()
    }
}

impl WalletConfig {
    /// Parses a JSON configuration
    pub fn from_json_str(s: &str) -> Result<Self, WalletError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// The Infura project id: the configured one, else the environment, else the built-in one
    pub fn project_id(&self) -> String {
        self.infura_project_id
            .clone()
            .or_else(|| std::env::var(INFURA_PROJECT_ID_ENV).ok().filter(|id| !id.is_empty()))
            .unwrap_or_else(|| DEFAULT_INFURA_PROJECT_ID.to_string())
    }
}
