//! Argument shapes of the methods exposed by [`EthereumWallet`](crate::EthereumWallet).
use crate::ConnectionRef;
use ethwallet_core::types::{Bytes, TxHash};
use serde::{Deserialize, Serialize};

/// Arguments of [`EthereumWallet::request`](crate::EthereumWallet::request)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsRequest {
    /// JSON-RPC method name
    pub method: String,
    /// JSON encoded params array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionRef>,
}

/// Arguments of [`EthereumWallet::wait_for_transaction`](crate::EthereumWallet::wait_for_transaction)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsWaitForTransaction {
    pub tx_hash: TxHash,
    pub confirmations: u32,
    /// Deadline in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionRef>,
}

/// Arguments of [`EthereumWallet::signer_address`](crate::EthereumWallet::signer_address)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsSignerAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionRef>,
}

/// Arguments of [`EthereumWallet::sign_message`](crate::EthereumWallet::sign_message)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsSignMessage {
    pub message: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionRef>,
}

/// What [`EthereumWallet::sign_transaction`](crate::EthereumWallet::sign_transaction) returns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignTransactionOutput {
    /// The joined 65 byte `r || s || v` signature, `v` being 27 or 28
    #[default]
    Signature,
    /// The signed transaction, ready for `eth_sendRawTransaction`
    SignedTransaction,
}

/// Arguments of [`EthereumWallet::sign_transaction`](crate::EthereumWallet::sign_transaction)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsSignTransaction {
    /// RLP encoded transaction, typed transactions prefixed with their type byte
    pub rlp: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionRef>,
    #[serde(default)]
    pub output: SignTransactionOutput,
}
