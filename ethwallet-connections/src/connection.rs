use crate::WalletError;
use ethwallet_core::types::KnownNetwork;
use ethwallet_providers::{JsonRpcClient, Provider};
use ethwallet_signers::LocalWallet;
use std::{
    fmt,
    str::FromStr,
    sync::{Arc, PoisonError, RwLock},
};
use url::Url;

/// Where a connection sends its JSON-RPC requests
#[derive(Clone)]
pub enum ProviderSource {
    /// An HTTP(S) node URL
    Url(String),
    /// An already constructed transport, e.g. a wallet bridge or a mock
    Handle(Arc<dyn JsonRpcClient>),
}

impl ProviderSource {
    /// Wraps a transport
    pub fn handle<P: JsonRpcClient + 'static>(client: P) -> Self {
        ProviderSource::Handle(Arc::new(client))
    }

    /// Builds the provider handle, failing with [`WalletError::DecodingError`] on a malformed URL
    pub fn into_provider(self) -> Result<Provider, WalletError> {
        match self {
            ProviderSource::Url(url) => Ok(Provider::from(Url::parse(&url)?)),
            ProviderSource::Handle(client) => Ok(Provider::from_client(client)),
        }
    }
}

impl fmt::Debug for ProviderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderSource::Url(url) => f.debug_tuple("Url").field(url).finish(),
            ProviderSource::Handle(client) => f.debug_tuple("Handle").field(client).finish(),
        }
    }
}

impl From<&str> for ProviderSource {
    fn from(url: &str) -> Self {
        ProviderSource::Url(url.to_string())
    }
}

impl From<String> for ProviderSource {
    fn from(url: String) -> Self {
        ProviderSource::Url(url)
    }
}

impl From<Arc<dyn JsonRpcClient>> for ProviderSource {
    fn from(client: Arc<dyn JsonRpcClient>) -> Self {
        ProviderSource::Handle(client)
    }
}

/// The private key held by a connection, if any
#[derive(Clone, Default)]
pub enum SignerSource {
    /// Read-only connection
    #[default]
    None,
    /// A raw 32 byte secp256k1 scalar
    Raw(Vec<u8>),
    /// A hex encoded key, with or without the `0x` prefix
    Hex(String),
}

impl SignerSource {
    /// Parses the key material, failing with [`WalletError::DecodingError`] on an invalid key
    pub fn into_signer(self) -> Result<Option<LocalWallet>, WalletError> {
        Ok(match self {
            SignerSource::None => None,
            SignerSource::Raw(bytes) => Some(LocalWallet::from_bytes(&bytes)?),
            SignerSource::Hex(key) => Some(LocalWallet::from_str(&key)?),
        })
    }
}

// do not log the key
impl fmt::Debug for SignerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerSource::None => f.write_str("None"),
            SignerSource::Raw(_) => f.write_str("Raw(..)"),
            SignerSource::Hex(_) => f.write_str("Hex(..)"),
        }
    }
}

/// A copy of a connection's provider and signer, taken for the duration of one call.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Provider handle, sharing the connection's chain id cache
    pub provider: Provider,
    /// Local signer, if the connection holds one
    pub signer: Option<LocalWallet>,
}

/// A provider endpoint optionally paired with a local signing key.
///
/// Provider and signer can be swapped in place with [`Connection::set`], so callers holding an
/// `Arc<Connection>` observe the change.
#[derive(Debug)]
pub struct Connection {
    state: RwLock<Snapshot>,
}

impl Connection {
    /// Creates a connection from a provider and a signer source
    pub fn new(provider: ProviderSource, signer: SignerSource) -> Result<Self, WalletError> {
        Ok(Self::from_parts(provider.into_provider()?, signer.into_signer()?))
    }

    /// Creates a connection from an already built provider and signer
    pub fn from_parts(provider: Provider, signer: Option<LocalWallet>) -> Self {
        Self { state: RwLock::new(Snapshot { provider, signer }) }
    }

    /// Creates a read-only connection to the network's hosted endpoint, with its chain id
    /// already known.
    pub fn from_network(network: KnownNetwork, project_id: &str) -> Result<Self, WalletError> {
        let provider = ProviderSource::Url(network.endpoint(project_id))
            .into_provider()?
            .with_chain_id(network);
        Ok(Self::from_parts(provider, None))
    }

    /// Creates a read-only connection to the node at `url`
    pub fn from_node(url: &str) -> Result<Self, WalletError> {
        Self::new(ProviderSource::from(url), SignerSource::None)
    }

    /// Swaps provider and signer. On failure the connection is left unchanged.
    pub fn set(&self, provider: ProviderSource, signer: SignerSource) -> Result<(), WalletError> {
        let snapshot =
            Snapshot { provider: provider.into_provider()?, signer: signer.into_signer()? };
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        Ok(())
    }

    /// Swaps the signer, keeping the provider and its chain id cache.
    pub fn set_signer(&self, signer: SignerSource) -> Result<(), WalletError> {
        let signer = signer.into_signer()?;
        self.state.write().unwrap_or_else(PoisonError::into_inner).signer = signer;
        Ok(())
    }

    /// Takes a copy of the current provider and signer
    pub fn snapshot(&self) -> Snapshot {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the current provider handle
    pub fn provider(&self) -> Provider {
        self.snapshot().provider
    }

    /// Returns the current signer
    pub fn signer(&self) -> Option<LocalWallet> {
        self.snapshot().signer
    }
}
