//! Local private-key signing for Ethereum messages, typed data and transactions.
//!
//! The exposed interfaces return a recoverable [`Signature`]. Encoding the signature into a raw
//! transaction is done with [`TypedTransaction::rlp_signed`].
//!
//! ```
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! use ethwallet_signers::{LocalWallet, Signer};
//!
//! // instantiate the wallet
//! let wallet = "0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d"
//!     .parse::<LocalWallet>()?;
//!
//! // sign a message
//! let signature = wallet.sign_message("hello world").await?;
//! signature.verify("hello world", wallet.address())?;
//! # Ok(())
//! # }
//! ```
mod wallet;
pub use wallet::{SignerError, Wallet};

use async_trait::async_trait;
use ethwallet_core::types::{Address, Signature, TypedData, TypedTransaction};
use std::error::Error;

/// A wallet instantiated with a locally stored private key
pub type LocalWallet = Wallet<k256::ecdsa::SigningKey>;

/// Applies [EIP155](https://github.com/ethereum/EIPs/blob/master/EIPS/eip-155.md)
pub fn to_eip155_v<T: Into<u8>>(recovery_id: T, chain_id: Option<u64>) -> u64 {
    let standard_v: u8 = recovery_id.into();
    if let Some(chain_id) = chain_id {
        // When signing with a chain ID, add chain replay protection.
        (standard_v as u64) + 35 + chain_id * 2
    } else {
        // Otherwise, convert to 'Electrum' notation.
        (standard_v as u64) + 27
    }
}

/// Trait for signing transactions and messages
///
/// Implement this trait to support different signing modes, e.g. Ledger, hosted etc.
#[async_trait]
pub trait Signer: std::fmt::Debug + Send + Sync {
    type Error: Error + Send + Sync;

    /// Signs the hash of the provided message after prefixing it
    async fn sign_message<S: Send + Sync + AsRef<[u8]>>(
        &self,
        message: S,
    ) -> Result<Signature, Self::Error>;

    /// Signs the transaction
    async fn sign_transaction(&self, message: &TypedTransaction) -> Result<Signature, Self::Error>;

    /// Signs the EIP-712 digest of the typed data, without the message prefix
    async fn sign_typed_data(&self, payload: &TypedData) -> Result<Signature, Self::Error>;

    /// Returns the signer's Ethereum Address
    fn address(&self) -> Address;

    /// Returns the signer's chain id
    fn chain_id(&self) -> Option<u64>;

    /// Sets the signer's chain id
    #[must_use]
    fn with_chain_id<T: Into<u64>>(self, chain_id: T) -> Self;
}
