//! Decides, per JSON-RPC method, whether a request is answered locally or forwarded to the node.
use crate::{Snapshot, WalletError};
use ethwallet_core::types::{TypedData, TypedTransaction};
use ethwallet_providers::{Provider, ProviderError, RpcError};
use ethwallet_signers::{LocalWallet, Signer};
use serde_json::Value;
use tracing::{debug, warn};

/// How a locally handled method is answered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    /// Answer from the connection's chain id cache
    ChainId,
    /// Fill, sign and submit the transaction in `params[0]`
    SendTransaction,
    /// Sign the EIP-712 payload in `params[1]`
    SignTypedData,
    /// Personal-sign the message at the given position
    SignMessage {
        /// Position of the message in the params array
        message_index: usize,
    },
}

/// An entry of the [`METHOD_TABLE`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethodRule {
    /// JSON-RPC method name
    pub method: &'static str,
    /// Whether the handler needs a local signer. Without one the method is forwarded.
    pub requires_signer: bool,
    /// The local handler
    pub handler: Handler,
}

/// Methods intercepted by the dispatcher. Anything else is forwarded verbatim.
pub const METHOD_TABLE: &[MethodRule] = &[
    MethodRule { method: "eth_chainId", requires_signer: false, handler: Handler::ChainId },
    MethodRule {
        method: "eth_sendTransaction",
        requires_signer: true,
        handler: Handler::SendTransaction,
    },
    MethodRule {
        method: "eth_signTypedData_v4",
        requires_signer: true,
        handler: Handler::SignTypedData,
    },
    MethodRule {
        method: "eth_sign",
        requires_signer: true,
        handler: Handler::SignMessage { message_index: 1 },
    },
    MethodRule {
        method: "personal_sign",
        requires_signer: true,
        handler: Handler::SignMessage { message_index: 0 },
    },
];

impl MethodRule {
    /// Looks up the rule for a method
    pub fn find(method: &str) -> Option<&'static MethodRule> {
        METHOD_TABLE.iter().find(|rule| rule.method == method)
    }
}

/// Decodes the wire params of a request.
///
/// Absent, empty or `null` params become an empty array. A transaction object is accepted in
/// place of the params array for `eth_sendTransaction`.
pub fn parse_params(method: &str, params: Option<&str>) -> Result<Value, WalletError> {
    let params: Value = match params.map(str::trim) {
        None | Some("") => Value::Null,
        Some(params) => serde_json::from_str(params)?,
    };
    match params {
        Value::Null => Ok(Value::Array(vec![])),
        Value::Array(_) => Ok(params),
        Value::Object(_) if method == "eth_sendTransaction" => Ok(Value::Array(vec![params])),
        Value::Object(_) => Ok(params),
        other => {
            Err(WalletError::DecodingError(format!("params must be a JSON array, got {other}")))
        }
    }
}

/// Decodes a `0x` prefixed hex message, anything else is signed as UTF-8
fn message_bytes(message: &str) -> Vec<u8> {
    message
        .strip_prefix("0x")
        .and_then(|hex| hex::decode(hex).ok())
        .unwrap_or_else(|| message.as_bytes().to_vec())
}

/// Returns the params to retry with when the node rejected a `"0x02"` transaction type and
/// expects the compact `"0x2"`.
///
/// Only the peer's error message is inspected, its `data` may carry arbitrary revert bytes.
fn compact_type_retry(params: &Value, err: &ProviderError) -> Option<Value> {
    let first = params.as_array()?.first()?;
    if first.get("type")?.as_str()? != "0x02" {
        return None
    }
    let rejected = match err.as_error_response() {
        Some(response) => response.message.contains("0x2"),
        None => err.to_string().contains("0x2"),
    };
    if !rejected {
        return None
    }
    let mut params = params.clone();
    params[0]["type"] = Value::from("0x2");
    Some(params)
}

/// Runs requests against a snapshot of a connection.
#[derive(Clone, Debug)]
pub struct RequestDispatcher {
    provider: Provider,
    signer: Option<LocalWallet>,
}

impl From<Snapshot> for RequestDispatcher {
    fn from(snapshot: Snapshot) -> Self {
        Self { provider: snapshot.provider, signer: snapshot.signer }
    }
}

impl RequestDispatcher {
    /// Creates a dispatcher over the given provider and signer
    pub fn new(provider: Provider, signer: Option<LocalWallet>) -> Self {
        Self { provider, signer }
    }

    /// Answers the request locally when the [`METHOD_TABLE`] says so, forwards it otherwise.
    pub async fn dispatch(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        match MethodRule::find(method) {
            Some(rule) if !rule.requires_signer || self.signer.is_some() => {
                debug!(method, "handling request locally");
                self.handle(rule, params).await
            }
            _ => self.forward(method, params).await,
        }
    }

    /// Runs the rule's handler. Fails with [`WalletError::UnsupportedMethod`] if the handler
    /// needs a signer and there is none.
    pub async fn handle(&self, rule: &MethodRule, params: Value) -> Result<Value, WalletError> {
        match rule.handler {
            Handler::ChainId => Ok(serde_json::to_value(self.provider.chain_id().await?)?),
            Handler::SendTransaction => self.send_transaction(self.signer_for(rule)?, params).await,
            Handler::SignTypedData => {
                let payload = params.get(1).ok_or_else(|| {
                    WalletError::DecodingError("missing typed data payload".to_string())
                })?;
                let payload: TypedData = serde_json::from_value(payload.clone())?;
                let signature = self.signer_for(rule)?.sign_typed_data(&payload).await?;
                Ok(Value::String(format!("{signature:#}")))
            }
            Handler::SignMessage { message_index } => {
                let message =
                    params.get(message_index).and_then(Value::as_str).ok_or_else(|| {
                        WalletError::DecodingError(format!(
                            "missing message at position {message_index}"
                        ))
                    })?;
                let signature =
                    self.signer_for(rule)?.sign_message(message_bytes(message)).await?;
                Ok(Value::String(format!("{signature:#}")))
            }
        }
    }

    /// Forwards the request to the node, retrying once with a compact `"0x2"` transaction type
    /// if the node rejected `"0x02"`.
    pub async fn forward(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        match self.provider.request_value(method, params.clone()).await {
            Ok(res) => Ok(res),
            Err(err) => match compact_type_retry(&params, &err) {
                Some(params) => {
                    warn!(method, %err, "node rejected transaction type 0x02, retrying with 0x2");
                    Ok(self.provider.request_value(method, params).await?)
                }
                None => Err(err.into()),
            },
        }
    }

    fn signer_for(&self, rule: &MethodRule) -> Result<&LocalWallet, WalletError> {
        self.signer.as_ref().ok_or_else(|| WalletError::UnsupportedMethod(rule.method.to_string()))
    }

    async fn send_transaction(
        &self,
        signer: &LocalWallet,
        params: Value,
    ) -> Result<Value, WalletError> {
        let tx = params
            .get(0)
            .ok_or_else(|| WalletError::DecodingError("missing transaction".to_string()))?;
        let mut tx: TypedTransaction = serde_json::from_value(tx.clone())?;

        // the node may hold the key of another sender
        let address = signer.address();
        if matches!(tx.from(), Some(from) if *from != address) {
            debug!(from = ?tx.from(), "sender is not the local signer, forwarding");
            return self.forward("eth_sendTransaction", params).await
        }
        tx.set_from(address);

        let chain_id = self.provider.chain_id().await?;
        match tx.chain_id() {
            Some(id) if id != chain_id => {
                return Err(WalletError::ChainIdMismatch { tx: id, connection: chain_id })
            }
            Some(_) => {}
            None => {
                tx.set_chain_id(chain_id);
            }
        }

        if tx.nonce().is_none() {
            let nonce = self.provider.get_transaction_count(address).await?;
            tx.set_nonce(nonce);
        }
        if tx.gas().is_none() {
            let gas = self.provider.estimate_gas(&tx).await?;
            tx.set_gas(gas);
        }
        self.fill_fees(&mut tx).await?;

        let signature = signer.sign_transaction(&tx).await?;
        let pending = self.provider.send_raw_transaction(tx.rlp_signed(&signature)).await?;
        debug!(tx_hash = ?pending.tx_hash(), "submitted signed transaction");
        Ok(serde_json::to_value(pending.tx_hash())?)
    }

    async fn fill_fees(&self, tx: &mut TypedTransaction) -> Result<(), ProviderError> {
        match tx {
            TypedTransaction::Legacy(inner) => {
                if inner.gas_price.is_none() {
                    inner.gas_price = Some(self.provider.get_gas_price().await?);
                }
            }
            TypedTransaction::Eip2930(inner) => {
                if inner.tx.gas_price.is_none() {
                    inner.tx.gas_price = Some(self.provider.get_gas_price().await?);
                }
            }
            TypedTransaction::Eip1559(inner) => {
                let tip = match inner.max_priority_fee_per_gas {
                    Some(tip) => tip,
                    None => self.provider.get_max_priority_fee_per_gas().await?,
                };
                inner.max_priority_fee_per_gas = Some(tip);
                if inner.max_fee_per_gas.is_none() {
                    let gas_price = self.provider.get_gas_price().await?;
                    inner.max_fee_per_gas = Some(gas_price.max(tip));
                }
            }
        }
        Ok(())
    }
}
