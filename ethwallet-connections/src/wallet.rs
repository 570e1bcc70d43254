use crate::{
    types::*, Connection, ConnectionRef, ConnectionRegistry, RequestDispatcher, WalletError,
    dispatcher::parse_params,
};
use ethwallet_signers::{LocalWallet, Signer};
use std::{sync::Arc, time::Duration};
use tracing::debug;

/// The method surface exposed to callers: requests, confirmation waits and local signing,
/// each against a connection picked from the registry.
#[derive(Debug)]
pub struct EthereumWallet {
    registry: ConnectionRegistry,
}

impl From<ConnectionRegistry> for EthereumWallet {
    fn from(registry: ConnectionRegistry) -> Self {
        Self::new(registry)
    }
}

impl EthereumWallet {
    /// Creates a wallet over the given connections
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// The registry, e.g. to add connections or change the default network
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    fn connection(
        &self,
        connection: Option<&ConnectionRef>,
    ) -> Result<Arc<Connection>, WalletError> {
        let network = connection.and_then(ConnectionRef::network_ref);
        self.registry.resolve(network.as_ref())
    }

    fn signer(&self, connection: Option<&ConnectionRef>) -> Result<LocalWallet, WalletError> {
        self.connection(connection)?.signer().ok_or(WalletError::NoSigner)
    }

    /// Runs a JSON-RPC request and returns its JSON encoded result
    pub async fn request(&self, args: ArgsRequest) -> Result<String, WalletError> {
        let params = parse_params(&args.method, args.params.as_deref())?;
        let snapshot = self.connection(args.connection.as_ref())?.snapshot();
        let dispatcher = RequestDispatcher::from(snapshot);
        let res = dispatcher.dispatch(&args.method, params).await?;
        Ok(serde_json::to_string(&res)?)
    }

    /// Waits until the transaction has the requested number of confirmations
    pub async fn wait_for_transaction(
        &self,
        args: ArgsWaitForTransaction,
    ) -> Result<bool, WalletError> {
        let provider = self.connection(args.connection.as_ref())?.provider();
        let mut pending =
            provider.pending_transaction(args.tx_hash).confirmations(args.confirmations as usize);
        if let Some(timeout) = args.timeout {
            pending = pending.timeout(Duration::from_millis(timeout));
        }
        pending.await?;
        Ok(true)
    }

    /// Returns the address of the connection's signer, `None` on any failure
    pub async fn signer_address(&self, args: ArgsSignerAddress) -> Option<String> {
        match self.signer(args.connection.as_ref()) {
            Ok(signer) => Some(format!("{:?}", signer.address())),
            Err(err) => {
                debug!(%err, "no signer address");
                None
            }
        }
    }

    /// Personal-signs the message, returning the `0x` prefixed 65 byte signature
    pub async fn sign_message(&self, args: ArgsSignMessage) -> Result<String, WalletError> {
        let signature = self.signer(args.connection.as_ref())?.sign_message(&args.message).await?;
        Ok(format!("{signature:#}"))
    }

    /// Signs an RLP encoded transaction with the chain id it carries
    pub async fn sign_transaction(&self, args: ArgsSignTransaction) -> Result<String, WalletError> {
        let signer = self.signer(args.connection.as_ref())?;
        let (tx, signature) = signer.sign_raw_transaction(&args.rlp)?;
        Ok(match args.output {
            SignTransactionOutput::Signature => format!("{:#}", signature.to_electrum()),
            SignTransactionOutput::SignedTransaction => tx.rlp_signed(&signature).to_string(),
        })
    }
}
