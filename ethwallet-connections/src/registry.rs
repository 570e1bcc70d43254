use crate::{Connection, ProviderSource, SignerSource, WalletConfig, WalletError};
use ethwallet_core::types::{KnownNetwork, DEFAULT_INFURA_PROJECT_ID};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

const MAINNET: &str = "mainnet";

/// A reference to the network a call should run against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkRef {
    /// An explicit node URL, used without a signer
    Node(String),
    /// A registered name, a chain id, or a well-known network name
    Network(String),
}

impl From<u64> for NetworkRef {
    fn from(chain_id: u64) -> Self {
        NetworkRef::Network(chain_id.to_string())
    }
}

impl From<&str> for NetworkRef {
    fn from(name: &str) -> Self {
        NetworkRef::Network(name.to_string())
    }
}

/// Wire shape of a connection reference. Absence of both fields means the default network.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRef {
    /// Node URL, takes precedence over the network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    /// Network name or decimal chain id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_name_or_chain_id: Option<String>,
}

impl ConnectionRef {
    /// Returns the network reference, `None` for the default network
    pub fn network_ref(&self) -> Option<NetworkRef> {
        match (&self.node, &self.network_name_or_chain_id) {
            (Some(node), _) => Some(NetworkRef::Node(node.clone())),
            (None, Some(network)) => Some(NetworkRef::Network(network.clone())),
            (None, None) => None,
        }
    }
}

#[derive(Debug)]
struct Networks {
    connections: HashMap<String, Arc<Connection>>,
    default_network: String,
    project_id: String,
}

impl Networks {
    fn default_connection(&self) -> Result<Arc<Connection>, WalletError> {
        self.connections
            .get(&self.default_network)
            .cloned()
            .ok_or_else(|| WalletError::NoDefaultConnection(self.default_network.clone()))
    }
}

/// Named connections plus a default network.
///
/// Names are case-insensitive and a `mainnet` entry always exists. Lookups run concurrently,
/// updates are serialized.
#[derive(Debug)]
pub struct ConnectionRegistry {
    inner: RwLock<Networks>,
}

impl ConnectionRegistry {
    /// Creates a registry from the given connections.
    ///
    /// The default network falls back to `mainnet`, which is added from the catalog when
    /// missing. Fails with [`WalletError::MissingDefaultConnection`] if the default network has
    /// no connection.
    pub fn new<I, S>(connections: I, default_network: Option<&str>) -> Result<Self, WalletError>
    where
        I: IntoIterator<Item = (S, Connection)>,
        S: AsRef<str>,
    {
        Self::with_project_id(connections, default_network, DEFAULT_INFURA_PROJECT_ID)
    }

    /// Same as [`ConnectionRegistry::new`], using the given Infura project id for catalog
    /// endpoints.
    pub fn with_project_id<I, S>(
        connections: I,
        default_network: Option<&str>,
        project_id: &str,
    ) -> Result<Self, WalletError>
    where
        I: IntoIterator<Item = (S, Connection)>,
        S: AsRef<str>,
    {
        let mut networks: HashMap<_, _> = connections
            .into_iter()
            .map(|(name, connection)| (name.as_ref().to_lowercase(), Arc::new(connection)))
            .collect();

        if !networks.contains_key(MAINNET) {
            debug!("adding the default mainnet connection");
            networks.insert(
                MAINNET.to_string(),
                Arc::new(Connection::from_network(KnownNetwork::Mainnet, project_id)?),
            );
        }

        let default_network = default_network.unwrap_or(MAINNET).to_lowercase();
        if !networks.contains_key(&default_network) {
            return Err(WalletError::MissingDefaultConnection(default_network))
        }

        Ok(Self {
            inner: RwLock::new(Networks {
                connections: networks,
                default_network,
                project_id: project_id.to_string(),
            }),
        })
    }

    /// Builds the registry described by the configuration
    pub fn from_config(config: &WalletConfig) -> Result<Self, WalletError> {
        let project_id = config.project_id();
        let mut connections = Vec::with_capacity(config.networks.len());
        for (name, network) in &config.networks {
            let known = network
                .chain_id
                .and_then(KnownNetwork::from_chain_id)
                .or_else(|| KnownNetwork::from_name(name));
            let provider = match (&network.provider, known) {
                (Some(url), _) => ProviderSource::Url(url.clone()).into_provider()?,
                (None, Some(known)) => {
                    ProviderSource::Url(known.endpoint(&project_id)).into_provider()?
                }
                (None, None) => return Err(WalletError::UnknownNetwork(name.clone())),
            };
            let provider = match network.chain_id.or_else(|| known.map(KnownNetwork::chain_id)) {
                Some(chain_id) => provider.with_chain_id(chain_id),
                None => provider,
            };
            let signer = network.signer.clone().map(SignerSource::Hex).unwrap_or_default();
            let connection = Connection::from_parts(provider, signer.into_signer()?);
            connections.push((name.as_str(), connection));
        }

        Self::with_project_id(connections, config.default_network.as_deref(), &project_id)
    }

    fn read(&self) -> RwLockReadGuard<'_, Networks> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Networks> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves a network reference into a connection.
    ///
    /// * no reference: the default network
    /// * a node URL: a new read-only connection to that node, not registered
    /// * a name or chain id, lower-cased: the registered connection of that name, else the
    ///   catalog network with that chain id, else the catalog network of that name, else the
    ///   default network
    pub fn resolve(&self, network: Option<&NetworkRef>) -> Result<Arc<Connection>, WalletError> {
        let networks = self.read();
        let name = match network {
            None => return networks.default_connection(),
            Some(NetworkRef::Node(url)) => return Ok(Arc::new(Connection::from_node(url)?)),
            Some(NetworkRef::Network(name)) => name.to_lowercase(),
        };

        if let Some(connection) = networks.connections.get(&name) {
            return Ok(connection.clone())
        }

        if let Ok(chain_id) = name.parse::<u64>() {
            let known = KnownNetwork::from_chain_id(chain_id)
                .ok_or_else(|| WalletError::UnknownNetwork(name.clone()))?;
            return Ok(Arc::new(Connection::from_network(known, &networks.project_id)?))
        }

        if let Some(known) = KnownNetwork::from_name(&name) {
            return Ok(Arc::new(Connection::from_network(known, &networks.project_id)?))
        }

        debug!(
            network = %name,
            default = %networks.default_network,
            "unknown network, using the default"
        );
        networks.default_connection()
    }

    /// Returns the registered connection, without any fallback
    pub fn get(&self, name: &str) -> Option<Arc<Connection>> {
        self.read().connections.get(&name.to_lowercase()).cloned()
    }

    /// Inserts or replaces the connection registered under `name`
    pub fn set(&self, name: &str, connection: Connection) {
        let name = name.to_lowercase();
        debug!(network = %name, "setting connection");
        self.write().connections.insert(name, Arc::new(connection));
    }

    /// Makes `name` the default network, registering `connection` under it first when given.
    ///
    /// Without a connection the name must already be registered, otherwise this fails with
    /// [`WalletError::UnknownNetwork`].
    pub fn set_default(
        &self,
        name: &str,
        connection: Option<Connection>,
    ) -> Result<(), WalletError> {
        let name = name.to_lowercase();
        let mut networks = self.write();
        match connection {
            Some(connection) => {
                networks.connections.insert(name.clone(), Arc::new(connection));
            }
            None if !networks.connections.contains_key(&name) => {
                return Err(WalletError::UnknownNetwork(name))
            }
            None => {}
        }
        debug!(network = %name, "setting default network");
        networks.default_network = name;
        Ok(())
    }

    /// The name of the default network
    pub fn default_network(&self) -> String {
        self.read().default_network.clone()
    }

    /// Names of all registered networks
    pub fn networks(&self) -> Vec<String> {
        let mut names: Vec<_> = self.read().connections.keys().cloned().collect();
        names.sort();
        names
    }
}
