use crate::{Http, JsonRpcClient, PendingTransaction, ProviderError};

use ethwallet_core::types::{Address, Bytes, TxHash, TypedTransaction, U256, U64};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{convert::TryFrom, fmt, str::FromStr, sync::Arc};
use tokio::sync::OnceCell;
use tracing::trace;
use tracing_futures::Instrument;
use url::{ParseError, Url};

/// An abstract provider for interacting with the [Ethereum JSON RPC
/// API](https://github.com/ethereum/wiki/wiki/JSON-RPC). Must be instantiated
/// with a data transport which implements the [`JsonRpcClient`](trait@crate::JsonRpcClient) trait
/// (e.g. [HTTP](crate::Http)).
///
/// Clones share the transport and the chain id cache.
///
/// # Example
///
/// ```no_run
/// use ethwallet_providers::{Http, Provider};
/// use std::convert::TryFrom;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Provider::try_from(
///     "https://mainnet.infura.io/v3/c60b0bb42f8a4c6481ecd229eddaca27"
/// ).expect("could not instantiate HTTP Provider");
///
/// let block = provider.get_block_number().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Provider {
    inner: Arc<dyn JsonRpcClient>,
    chain_id: Arc<OnceCell<U64>>,
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("inner", &self.inner)
            .field("chain_id", &self.chain_id.get())
            .finish()
    }
}

impl Provider {
    /// Instantiate a new provider with a backend.
    pub fn new<P: JsonRpcClient + 'static>(provider: P) -> Self {
        Self::from_client(Arc::new(provider))
    }

    /// Instantiate a new provider over a shared transport handle.
    pub fn from_client(inner: Arc<dyn JsonRpcClient>) -> Self {
        Self { inner, chain_id: Arc::new(OnceCell::new()) }
    }

    /// Seeds the chain id cache, e.g. with the chain id of a well-known network, so that
    /// [`Provider::chain_id`] never reaches out to the node.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: impl Into<U64>) -> Self {
        self.chain_id = Arc::new(OnceCell::new_with(Some(chain_id.into())));
        self
    }

    /// Returns the underlying transport
    pub fn as_client(&self) -> &Arc<dyn JsonRpcClient> {
        &self.inner
    }

    /// Make an RPC request via the internal connection, and return the result.
    pub async fn request<T, R>(&self, method: &str, params: T) -> Result<R, ProviderError>
    where
        T: fmt::Debug + Serialize + Send + Sync,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        let res = self.request_value(method, params).await?;
        Ok(serde_json::from_value(res)?)
    }

    /// Forwards the already encoded params to the node and returns the raw result.
    pub async fn request_value(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let span =
            tracing::trace_span!("rpc", method = method, params = ?serde_json::to_string(&params)?);
        // https://docs.rs/tracing/0.1.22/tracing/span/struct.Span.html#in-asynchronous-code
        let res = async move {
            trace!("tx");
            let res = self.inner.request(method, params).await?;
            trace!(rx = ?serde_json::to_string(&res)?);
            Ok::<_, ProviderError>(res)
        }
        .instrument(span)
        .await?;
        Ok(res)
    }

    /// Returns the chain id of the connected network.
    ///
    /// The value is fetched with `eth_chainId` on first use and cached for the lifetime of the
    /// provider.
    pub async fn chain_id(&self) -> Result<U64, ProviderError> {
        self.chain_id
            .get_or_try_init(|| async { self.request("eth_chainId", ()).await })
            .await
            .copied()
    }

    /// Returns the cached chain id, without reaching out to the node.
    pub fn cached_chain_id(&self) -> Option<U64> {
        self.chain_id.get().copied()
    }

    /// Gets the latest block number via the `eth_BlockNumber` API
    pub async fn get_block_number(&self) -> Result<U64, ProviderError> {
        self.request("eth_blockNumber", ()).await
    }

    /// Returns the number of the block including the transaction, or `None` while the
    /// transaction is pending or unknown.
    pub async fn get_transaction_block(&self, hash: TxHash) -> Result<Option<U64>, ProviderError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct MinedAt {
            block_number: Option<U64>,
        }

        let tx: Option<MinedAt> = self.request("eth_getTransactionByHash", [hash]).await?;
        Ok(tx.and_then(|tx| tx.block_number))
    }

    /// Returns the nonce of the address, counting pending transactions
    pub async fn get_transaction_count(&self, from: Address) -> Result<U256, ProviderError> {
        let from = serde_json::to_value(from)?;
        self.request("eth_getTransactionCount", [from, Value::from("pending")]).await
    }

    /// Gets the current gas price as estimated by the node
    pub async fn get_gas_price(&self) -> Result<U256, ProviderError> {
        self.request("eth_gasPrice", ()).await
    }

    /// Gets the priority fee suggested by the node for EIP-1559 transactions
    pub async fn get_max_priority_fee_per_gas(&self) -> Result<U256, ProviderError> {
        self.request("eth_maxPriorityFeePerGas", ()).await
    }

    /// Sends a transaction to a single Ethereum node and return the estimated amount of gas
    /// required (as a U256) to send it This is free, but only an estimate. Providing too little
    /// gas will result in a transaction being rejected (while still consuming all provided
    /// gas).
    pub async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256, ProviderError> {
        self.request("eth_estimateGas", [tx]).await
    }

    /// Send the raw RLP encoded transaction to the entire Ethereum network and returns the
    /// transaction's hash. This will consume gas from the account that signed the transaction.
    pub async fn send_raw_transaction(
        &self,
        tx: Bytes,
    ) -> Result<PendingTransaction<'_>, ProviderError> {
        let tx_hash = self.request("eth_sendRawTransaction", [tx]).await?;
        Ok(PendingTransaction::new(tx_hash, self))
    }

    /// Returns a waiter for a transaction submitted elsewhere
    pub fn pending_transaction(&self, tx_hash: TxHash) -> PendingTransaction<'_> {
        PendingTransaction::new(tx_hash, self)
    }
}

impl TryFrom<&str> for Provider {
    type Error = ParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Ok(Provider::new(Http::from_str(src)?))
    }
}

impl TryFrom<String> for Provider {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Provider::try_from(src.as_str())
    }
}

impl From<Url> for Provider {
    fn from(url: Url) -> Self {
        Provider::new(Http::new(url))
    }
}
