//! Legacy (pre EIP-2718) transaction requests.
use super::{decode_data, decode_signature, decode_to, extract_chain_id, rlp_opt};
use crate::{
    types::{
        serde_helpers::{deserialize_stringified_eth_u64_opt, deserialize_stringified_numeric_opt},
        Address, Bytes, Signature, H256, U256, U64,
    },
    utils::keccak256,
};
use rlp::RlpStream;
use serde::{Deserialize, Serialize};

/// Number of fields in an EIP-155 encoded legacy transaction
const NUM_TX_FIELDS: usize = 9;
/// Number of fields in a pre EIP-155 unsigned legacy transaction
const NUM_BASE_FIELDS: usize = 6;

/// Parameters for sending a legacy transaction
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Sender address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,

    /// Recipient address (None for contract creation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,

    /// Supplied gas (None for sensible default)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_numeric_opt"
    )]
    pub gas: Option<U256>,

    /// Gas price (None for sensible default)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_numeric_opt"
    )]
    pub gas_price: Option<U256>,

    /// Transferred value (None for no transfer)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_numeric_opt"
    )]
    pub value: Option<U256>,

    /// The compiled code of a contract OR the first 4 bytes of the hash of the
    /// invoked method signature and encoded parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,

    /// Transaction nonce (None for next available nonce)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_numeric_opt"
    )]
    pub nonce: Option<U256>,

    /// Chain ID (None for pre EIP-155 replay unprotected transactions)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_eth_u64_opt"
    )]
    pub chain_id: Option<U64>,
}

impl TransactionRequest {
    /// Creates an empty transaction request with all fields left empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience function for sending a new payment transaction to the receiver.
    pub fn pay<T: Into<Address>, V: Into<U256>>(to: T, value: V) -> Self {
        TransactionRequest { to: Some(to.into()), value: Some(value.into()), ..Default::default() }
    }

    // Builder pattern helpers

    /// Sets the `from` field in the transaction to the provided value
    #[must_use]
    pub fn from<T: Into<Address>>(mut self, from: T) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the `to` field in the transaction to the provided value
    #[must_use]
    pub fn to<T: Into<Address>>(mut self, to: T) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Sets the `gas` field in the transaction to the provided value
    #[must_use]
    pub fn gas<T: Into<U256>>(mut self, gas: T) -> Self {
        self.gas = Some(gas.into());
        self
    }

    /// Sets the `gas_price` field in the transaction to the provided value
    #[must_use]
    pub fn gas_price<T: Into<U256>>(mut self, gas_price: T) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    /// Sets the `value` field in the transaction to the provided value
    #[must_use]
    pub fn value<T: Into<U256>>(mut self, value: T) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the `data` field in the transaction to the provided value
    #[must_use]
    pub fn data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the `nonce` field in the transaction to the provided value
    #[must_use]
    pub fn nonce<T: Into<U256>>(mut self, nonce: T) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Sets the `chain_id` field in the transaction to the provided value
    #[must_use]
    pub fn chain_id<T: Into<U64>>(mut self, chain_id: T) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    /// Hashes the transaction's data with the included chain id
    pub fn sighash(&self) -> H256 {
        keccak256(self.rlp().as_ref()).into()
    }

    /// Gets the transaction's RLP encoding, prepared with the chain_id and extra fields for
    /// signing. Assumes the chainid exists.
    pub fn rlp(&self) -> Bytes {
        let mut rlp = RlpStream::new();
        if let Some(chain_id) = self.chain_id {
            rlp.begin_list(NUM_TX_FIELDS);
            self.rlp_base(&mut rlp);
            rlp.append(&chain_id);
            rlp.append(&0u8);
            rlp.append(&0u8);
        } else {
            rlp.begin_list(NUM_BASE_FIELDS);
            self.rlp_base(&mut rlp);
        }
        rlp.out().freeze().into()
    }

    /// Produces the RLP encoding of the transaction with the provided signature
    pub fn rlp_signed(&self, signature: &Signature) -> Bytes {
        let mut rlp = RlpStream::new();
        rlp.begin_list(NUM_TX_FIELDS);
        self.rlp_base(&mut rlp);

        // append the signature
        rlp.append(&signature.v);
        rlp.append(&signature.r);
        rlp.append(&signature.s);
        rlp.out().freeze().into()
    }

    pub(crate) fn rlp_base(&self, rlp: &mut RlpStream) {
        rlp_opt(rlp, &self.nonce);
        rlp_opt(rlp, &self.gas_price);
        rlp_opt(rlp, &self.gas);
        rlp_opt(rlp, &self.to);
        rlp_opt(rlp, &self.value);
        rlp_opt(rlp, &self.data);
    }

    /// Decodes the unsigned rlp, returning the transaction request and incrementing the counter
    /// passed as we are traversing the rlp list.
    pub(crate) fn decode_unsigned_rlp_base(
        rlp: &rlp::Rlp,
        offset: &mut usize,
    ) -> Result<Self, rlp::DecoderError> {
        let mut txn = TransactionRequest::new();
        txn.nonce = Some(rlp.val_at(*offset)?);
        *offset += 1;
        txn.gas_price = Some(rlp.val_at(*offset)?);
        *offset += 1;
        txn.gas = Some(rlp.val_at(*offset)?);
        *offset += 1;
        txn.to = decode_to(rlp, offset)?;
        txn.value = Some(rlp.val_at(*offset)?);
        *offset += 1;
        txn.data = decode_data(rlp, offset)?;
        Ok(txn)
    }

    /// Decodes an unsigned transaction: six fields, or nine when EIP-155 appends
    /// `chain_id, 0, 0`.
    pub fn decode_unsigned_rlp(rlp: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        let mut offset = 0;
        let mut txn = Self::decode_unsigned_rlp_base(rlp, &mut offset)?;

        if rlp.item_count()? == NUM_TX_FIELDS {
            txn.chain_id = Some(rlp.val_at(offset)?);
        }

        Ok(txn)
    }

    /// Decodes the given RLP into a transaction, attempting to decode its signature as well.
    pub fn decode_signed_rlp(rlp: &rlp::Rlp) -> Result<(Self, Signature), rlp::DecoderError> {
        let mut offset = 0;
        let mut txn = Self::decode_unsigned_rlp_base(rlp, &mut offset)?;
        let sig = decode_signature(rlp, &mut offset)?;
        // populate chainid from v in case the signature follows EIP155
        txn.chain_id = extract_chain_id(sig.v);
        Ok((txn, sig))
    }

    /// Returns true when the nine field list carries a signature rather than the EIP-155
    /// `chain_id, 0, 0` placeholder.
    pub(crate) fn is_signed_rlp(rlp: &rlp::Rlp) -> Result<bool, rlp::DecoderError> {
        if rlp.item_count()? != NUM_TX_FIELDS {
            return Ok(false)
        }
        Ok(!(rlp.at(7)?.is_empty() && rlp.at(8)?.is_empty()))
    }

    pub(crate) fn is_valid_field_count(count: usize) -> bool {
        count == NUM_BASE_FIELDS || count == NUM_TX_FIELDS
    }
}
