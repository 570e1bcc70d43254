mod private_key;
pub use private_key::SignerError;

use crate::{to_eip155_v, Signer};
use ethwallet_core::{
    types::{Address, Signature, TypedData, TypedTransaction, H256, U256},
    utils::hash_message,
};

use async_trait::async_trait;
use k256::ecdsa::{
    signature::hazmat::PrehashSigner, RecoveryId, Signature as RecoverableSignature,
};
use std::fmt;

/// An Ethereum private-public key pair which can be used for signing messages.
///
/// # Examples
///
/// ## Signing and Verifying a message
///
/// The wallet can be used to produce ECDSA [`Signature`] objects, which can be
/// then verified. Note that this uses [`hash_message`] under the hood which will
/// prefix the message being hashed with the `Ethereum Signed Message` domain separator.
///
/// ```
/// use ethwallet_signers::{LocalWallet, Signer};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet: LocalWallet =
///     "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".parse()?;
///
/// // Optionally, the wallet's chain id can be set, in order to use EIP-155
/// // replay protection with different chains
/// let wallet = wallet.with_chain_id(1337u64);
///
/// // The wallet can be used to sign messages
/// let message = b"hello";
/// let signature = wallet.sign_message(message).await?;
/// assert_eq!(signature.recover(&message[..]).unwrap(), wallet.address());
/// # Ok(())
/// # }
/// ```
///
/// [`Signature`]: ethwallet_core::types::Signature
/// [`hash_message`]: fn@ethwallet_core::utils::hash_message
#[derive(Clone)]
pub struct Wallet<D: PrehashSigner<(RecoverableSignature, RecoveryId)>> {
    /// The Wallet's private Key
    pub(crate) signer: D,
    /// The wallet's address
    pub(crate) address: Address,
    /// The wallet's chain id (for EIP-155), signs w/o replay protection if left unset
    pub(crate) chain_id: Option<u64>,
}

#[async_trait]
impl<D: Sync + Send + PrehashSigner<(RecoverableSignature, RecoveryId)>> Signer for Wallet<D> {
    type Error = SignerError;

    async fn sign_message<S: Send + Sync + AsRef<[u8]>>(
        &self,
        message: S,
    ) -> Result<Signature, Self::Error> {
        let message_hash = hash_message(message.as_ref());
        self.sign_hash(message_hash)
    }

    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Signature, Self::Error> {
        self.sign_transaction_sync(tx)
    }

    async fn sign_typed_data(&self, payload: &TypedData) -> Result<Signature, Self::Error> {
        let encoded =
            payload.encode_eip712().map_err(|e| SignerError::Eip712Error(e.to_string()))?;
        self.sign_hash(H256::from(encoded))
    }

    fn address(&self) -> Address {
        self.address
    }

    fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    fn with_chain_id<T: Into<u64>>(mut self, chain_id: T) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }
}

impl<D: PrehashSigner<(RecoverableSignature, RecoveryId)>> Wallet<D> {
    /// Synchronously signs the transaction as encoded, i.e. with the chain id it carries.
    ///
    /// Legacy transactions get an EIP-155 `v` when they carry a chain id and an Electrum `v`
    /// otherwise. Typed transactions get the bare y-parity.
    pub fn sign_transaction_sync(&self, tx: &TypedTransaction) -> Result<Signature, SignerError> {
        let sighash = tx.sighash();
        let (signature, recovery_id) = self.sign_prehash(sighash)?;
        let v = match tx {
            TypedTransaction::Legacy(_) => {
                to_eip155_v(recovery_id.to_byte(), tx.chain_id().map(|id| id.as_u64()))
            }
            _ => recovery_id.to_byte() as u64,
        };
        Ok(Self::to_signature(signature, v))
    }

    /// Signs the provided hash, returning an Electrum notation (27/28) signature.
    pub fn sign_hash(&self, hash: H256) -> Result<Signature, SignerError> {
        let (signature, recovery_id) = self.sign_prehash(hash)?;
        Ok(Self::to_signature(signature, to_eip155_v(recovery_id.to_byte(), None)))
    }

    fn sign_prehash(
        &self,
        hash: H256,
    ) -> Result<(RecoverableSignature, RecoveryId), SignerError> {
        Ok(self.signer.sign_prehash(hash.as_ref())?)
    }

    fn to_signature(signature: RecoverableSignature, v: u64) -> Signature {
        let bytes = signature.to_bytes();
        let r = U256::from_big_endian(&bytes[..32]);
        let s = U256::from_big_endian(&bytes[32..]);
        Signature { r, s, v }
    }

    /// Gets the wallet's signer
    pub fn signer(&self) -> &D {
        &self.signer
    }

    /// Returns the wallet's address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Gets the wallet's chain id
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }
}

// do not log the signer
impl<D: PrehashSigner<(RecoverableSignature, RecoveryId)>> fmt::Debug for Wallet<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
