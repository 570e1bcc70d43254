use ethwallet_core::types::{SignatureError, TxHash, U64};
use ethwallet_providers::{JsonRpcError, ProviderError, RpcError, WaitState};
use ethwallet_signers::SignerError;
use thiserror::Error;

/// Errors surfaced by the wallet to its callers
#[derive(Debug, Error)]
pub enum WalletError {
    /// The network reference matches neither a registered connection nor a known network
    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    /// The default network has no registered connection
    #[error("no connection registered for the default network {0}")]
    NoDefaultConnection(String),

    /// The registry was created with a default network that has no connection
    #[error("default network {0} is missing from the provided connections")]
    MissingDefaultConnection(String),

    /// A signer-only operation was requested on a read-only connection
    #[error("the connection has no signer")]
    NoSigner,

    /// A signer-bound method handler was invoked without a signer
    #[error("method {0} can not be handled by this connection")]
    UnsupportedMethod(String),

    /// Malformed RLP, typed data, key material or JSON parameters
    #[error("decoding error: {0}")]
    DecodingError(String),

    /// The underlying RPC call failed
    #[error("transport error: {0}")]
    TransportError(ProviderError),

    /// The confirmation wait exceeded its deadline
    #[error("transaction {tx_hash:?} timed out while {state}")]
    TransactionTimeout {
        /// The awaited transaction
        tx_hash: TxHash,
        /// The last state observed before the deadline
        state: WaitState,
    },

    /// The transaction targets another chain than the connection
    #[error("transaction chain id {tx} does not match the connection chain id {connection}")]
    ChainIdMismatch {
        /// Chain id carried by the transaction
        tx: U64,
        /// Chain id of the connection
        connection: U64,
    },

    /// The configuration file could not be read
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WalletError {
    /// Returns the peer's JSON-RPC error, if the failure came from one
    pub fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            WalletError::TransportError(err) => err.as_error_response(),
            _ => None,
        }
    }
}

impl From<ProviderError> for WalletError {
    fn from(src: ProviderError) -> Self {
        match src {
            ProviderError::TransactionTimeout { tx_hash, state } => {
                WalletError::TransactionTimeout { tx_hash, state }
            }
            other => WalletError::TransportError(other),
        }
    }
}

impl From<SignerError> for WalletError {
    fn from(src: SignerError) -> Self {
        WalletError::DecodingError(src.to_string())
    }
}

impl From<SignatureError> for WalletError {
    fn from(src: SignatureError) -> Self {
        WalletError::DecodingError(src.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(src: serde_json::Error) -> Self {
        WalletError::DecodingError(src.to_string())
    }
}

impl From<url::ParseError> for WalletError {
    fn from(src: url::ParseError) -> Self {
        WalletError::DecodingError(format!("invalid node url: {src}"))
    }
}
