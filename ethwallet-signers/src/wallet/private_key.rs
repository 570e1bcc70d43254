//! Specific helper functions for loading an offline K256 Private Key stored on disk
use super::Wallet;

use ethwallet_core::{
    types::{DecodeTransactionError, Signature, TypedTransaction},
    utils::secret_key_to_address,
};
use k256::ecdsa::{self, SigningKey};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error thrown by the Wallet module
pub enum SignerError {
    /// Error propagated from the underlying ECDSA library, e.g. for a zero or out of range scalar
    #[error(transparent)]
    EcdsaError(#[from] ecdsa::Error),
    /// The private key is not 32 bytes long
    #[error("invalid private key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    /// Error propagated by the hex crate
    #[error(transparent)]
    HexError(#[from] hex::FromHexError),
    /// The typed data could not be encoded
    #[error("failed to encode eip712 payload: {0}")]
    Eip712Error(String),
    /// The raw transaction could not be decoded
    #[error(transparent)]
    DecodeTransaction(#[from] DecodeTransactionError),
}

impl Wallet<SigningKey> {
    /// Creates a new Wallet instance from a raw 32 byte scalar value (big endian).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        if bytes.len() != 32 {
            return Err(SignerError::InvalidKeyLength(bytes.len()))
        }
        let signer = SigningKey::from_slice(bytes)?;
        let address = secret_key_to_address(&signer);
        Ok(Self { signer, address, chain_id: None })
    }

    /// Decodes an unsigned raw transaction and signs it with the chain id it carries.
    ///
    /// Returns the decoded transaction along with its signature, any signature already present
    /// in the payload is ignored.
    pub fn sign_raw_transaction(
        &self,
        rlp: &[u8],
    ) -> Result<(TypedTransaction, Signature), SignerError> {
        let (tx, _) = TypedTransaction::decode(rlp)?;
        let signature = self.sign_transaction_sync(&tx)?;
        Ok((tx, signature))
    }
}

impl From<SigningKey> for Wallet<SigningKey> {
    fn from(signer: SigningKey) -> Self {
        let address = secret_key_to_address(&signer);

        Self { signer, address, chain_id: None }
    }
}

impl FromStr for Wallet<SigningKey> {
    type Err = SignerError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.strip_prefix("0x").or_else(|| src.strip_prefix("0X")).unwrap_or(src);
        let src = hex::decode(src)?;
        Self::from_bytes(&src)
    }
}

impl TryFrom<&str> for Wallet<SigningKey> {
    type Error = SignerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Wallet<SigningKey> {
    type Error = SignerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
