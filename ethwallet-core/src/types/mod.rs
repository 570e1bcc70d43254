pub use ethabi::ethereum_types::{Address, H160, H256, U256, U64};

/// A transaction Hash
pub type TxHash = H256;

mod bytes;
pub use self::bytes::{deserialize_bytes, serialize_bytes, Bytes, ParseBytesError};

mod signature;
pub use signature::*;

mod network;
pub use network::{KnownNetwork, ParseNetworkError, DEFAULT_INFURA_PROJECT_ID};

pub mod serde_helpers;

pub mod transaction;
pub use transaction::{
    eip1559::Eip1559TransactionRequest,
    eip2718::{DecodeTransactionError, TypedTransaction},
    eip2930::{AccessList, AccessListItem, Eip2930TransactionRequest},
    eip712::{Eip712Error, TypedData},
    request::TransactionRequest,
};
