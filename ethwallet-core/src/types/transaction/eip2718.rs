use super::{
    eip1559::Eip1559TransactionRequest,
    eip2930::{AccessList, Eip2930TransactionRequest},
    request::TransactionRequest,
};
use crate::{
    types::{
        serde_helpers::{deserialize_stringified_eth_u64_opt, deserialize_stringified_numeric_opt},
        Address, Bytes, Signature, H256, U256, U64,
    },
    utils::keccak256,
};
use rlp::Rlp;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// An error decoding a raw transaction envelope.
#[derive(Debug, Error)]
pub enum DecodeTransactionError {
    /// The input was empty
    #[error("empty transaction bytes")]
    Empty,
    /// The envelope type byte is not one of the supported transaction types
    #[error("unsupported transaction type 0x{0:02x}")]
    UnsupportedType(u8),
    /// The legacy list has neither six nor nine fields
    #[error("unexpected legacy transaction field count {0}")]
    FieldCount(usize),
    /// Malformed RLP
    #[error(transparent)]
    Rlp(#[from] rlp::DecoderError),
}

/// The TypedTransaction enum represents all Ethereum transaction types.
///
/// Its variants correspond to specific allowed transactions:
/// 1. Legacy (pre-EIP2718) [`TransactionRequest`]
/// 2. EIP2930 (state access lists) [`Eip2930TransactionRequest`]
/// 3. EIP1559 [`Eip1559TransactionRequest`]
///
/// In JSON the type is read from the `type` field, which may be `"0x2"`, `"0x02"`, `2` or absent.
/// When absent, the presence of `maxFeePerGas` or `maxPriorityFeePerGas` selects EIP-1559.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypedTransaction {
    Legacy(TransactionRequest),
    Eip2930(Eip2930TransactionRequest),
    Eip1559(Eip1559TransactionRequest),
}

use TypedTransaction::*;

impl TypedTransaction {
    /// The EIP-2718 type byte.
    pub fn tx_type(&self) -> u8 {
        match self {
            Legacy(_) => 0x00,
            Eip2930(_) => 0x01,
            Eip1559(_) => 0x02,
        }
    }

    pub fn from(&self) -> Option<&Address> {
        match self {
            Legacy(inner) => inner.from.as_ref(),
            Eip2930(inner) => inner.tx.from.as_ref(),
            Eip1559(inner) => inner.from.as_ref(),
        }
    }

    pub fn set_from(&mut self, from: Address) -> &mut Self {
        match self {
            Legacy(inner) => inner.from = Some(from),
            Eip2930(inner) => inner.tx.from = Some(from),
            Eip1559(inner) => inner.from = Some(from),
        };
        self
    }

    pub fn to(&self) -> Option<&Address> {
        match self {
            Legacy(inner) => inner.to.as_ref(),
            Eip2930(inner) => inner.tx.to.as_ref(),
            Eip1559(inner) => inner.to.as_ref(),
        }
    }

    pub fn nonce(&self) -> Option<&U256> {
        match self {
            Legacy(inner) => inner.nonce.as_ref(),
            Eip2930(inner) => inner.tx.nonce.as_ref(),
            Eip1559(inner) => inner.nonce.as_ref(),
        }
    }

    pub fn set_nonce<T: Into<U256>>(&mut self, nonce: T) -> &mut Self {
        let nonce = nonce.into();
        match self {
            Legacy(inner) => inner.nonce = Some(nonce),
            Eip2930(inner) => inner.tx.nonce = Some(nonce),
            Eip1559(inner) => inner.nonce = Some(nonce),
        };
        self
    }

    pub fn value(&self) -> Option<&U256> {
        match self {
            Legacy(inner) => inner.value.as_ref(),
            Eip2930(inner) => inner.tx.value.as_ref(),
            Eip1559(inner) => inner.value.as_ref(),
        }
    }

    pub fn gas(&self) -> Option<&U256> {
        match self {
            Legacy(inner) => inner.gas.as_ref(),
            Eip2930(inner) => inner.tx.gas.as_ref(),
            Eip1559(inner) => inner.gas.as_ref(),
        }
    }

    pub fn set_gas<T: Into<U256>>(&mut self, gas: T) -> &mut Self {
        let gas = gas.into();
        match self {
            Legacy(inner) => inner.gas = Some(gas),
            Eip2930(inner) => inner.tx.gas = Some(gas),
            Eip1559(inner) => inner.gas = Some(gas),
        };
        self
    }

    /// The legacy gas price, or the EIP-1559 max fee per gas.
    pub fn gas_price(&self) -> Option<U256> {
        match self {
            Legacy(inner) => inner.gas_price,
            Eip2930(inner) => inner.tx.gas_price,
            Eip1559(inner) => inner.max_fee_per_gas,
        }
    }

    pub fn data(&self) -> Option<&Bytes> {
        match self {
            Legacy(inner) => inner.data.as_ref(),
            Eip2930(inner) => inner.tx.data.as_ref(),
            Eip1559(inner) => inner.data.as_ref(),
        }
    }

    pub fn chain_id(&self) -> Option<U64> {
        match self {
            Legacy(inner) => inner.chain_id,
            Eip2930(inner) => inner.tx.chain_id,
            Eip1559(inner) => inner.chain_id,
        }
    }

    pub fn set_chain_id<T: Into<U64>>(&mut self, chain_id: T) -> &mut Self {
        let chain_id = chain_id.into();
        match self {
            Legacy(inner) => inner.chain_id = Some(chain_id),
            Eip2930(inner) => inner.tx.chain_id = Some(chain_id),
            Eip1559(inner) => inner.chain_id = Some(chain_id),
        };
        self
    }

    /// Returns the unsigned encoding the signature commits to, with the type prefix for typed
    /// transactions.
    pub fn rlp(&self) -> Bytes {
        let mut encoded = vec![];
        match self {
            Legacy(ref tx) => {
                encoded.extend_from_slice(tx.rlp().as_ref());
            }
            Eip2930(inner) => {
                encoded.extend_from_slice(&[0x1]);
                encoded.extend_from_slice(inner.rlp().as_ref());
            }
            Eip1559(inner) => {
                encoded.extend_from_slice(&[0x2]);
                encoded.extend_from_slice(inner.rlp().as_ref());
            }
        };
        encoded.into()
    }

    /// Hashes the transaction's data. Legacy transactions without a chain id produce a pre
    /// EIP-155 sighash.
    pub fn sighash(&self) -> H256 {
        keccak256(self.rlp()).into()
    }

    /// Returns the signed encoding, ready for `eth_sendRawTransaction`.
    pub fn rlp_signed(&self, signature: &Signature) -> Bytes {
        let mut encoded = vec![];
        match self {
            Legacy(ref tx) => {
                encoded.extend_from_slice(tx.rlp_signed(signature).as_ref());
            }
            Eip2930(inner) => {
                encoded.extend_from_slice(&[0x1]);
                encoded.extend_from_slice(inner.rlp_signed(signature).as_ref());
            }
            Eip1559(inner) => {
                encoded.extend_from_slice(&[0x2]);
                encoded.extend_from_slice(inner.rlp_signed(signature).as_ref());
            }
        };
        encoded.into()
    }

    /// Decodes a raw transaction envelope.
    ///
    /// A leading byte of `0xc0` or above is a legacy RLP list, `0x01` an EIP-2930 and `0x02` an
    /// EIP-1559 transaction. An already present signature is returned alongside the transaction.
    pub fn decode(raw: &[u8]) -> Result<(Self, Option<Signature>), DecodeTransactionError> {
        let first = *raw.first().ok_or(DecodeTransactionError::Empty)?;
        match first {
            0x01 => {
                let (tx, sig) = Eip2930TransactionRequest::decode_base(&Rlp::new(&raw[1..]))?;
                Ok((Eip2930(tx), sig))
            }
            0x02 => {
                let (tx, sig) = Eip1559TransactionRequest::decode_base(&Rlp::new(&raw[1..]))?;
                Ok((Eip1559(tx), sig))
            }
            b if b >= 0xc0 => {
                let rlp = Rlp::new(raw);
                let count = rlp.item_count()?;
                if !TransactionRequest::is_valid_field_count(count) {
                    return Err(DecodeTransactionError::FieldCount(count))
                }
                if TransactionRequest::is_signed_rlp(&rlp)? {
                    let (tx, sig) = TransactionRequest::decode_signed_rlp(&rlp)?;
                    Ok((Legacy(tx), Some(sig)))
                } else {
                    Ok((Legacy(TransactionRequest::decode_unsigned_rlp(&rlp)?), None))
                }
            }
            other => Err(DecodeTransactionError::UnsupportedType(other)),
        }
    }
}

impl From<TransactionRequest> for TypedTransaction {
    fn from(src: TransactionRequest) -> TypedTransaction {
        TypedTransaction::Legacy(src)
    }
}

impl From<Eip2930TransactionRequest> for TypedTransaction {
    fn from(src: Eip2930TransactionRequest) -> TypedTransaction {
        TypedTransaction::Eip2930(src)
    }
}

impl From<Eip1559TransactionRequest> for TypedTransaction {
    fn from(src: Eip1559TransactionRequest) -> TypedTransaction {
        TypedTransaction::Eip1559(src)
    }
}

/// Flat JSON shape shared by all transaction types.
#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionObject {
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_eth_u64_opt"
    )]
    tx_type: Option<U64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<Address>,
    #[serde(
        default,
        alias = "gasLimit",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_numeric_opt"
    )]
    gas: Option<U256>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_numeric_opt"
    )]
    gas_price: Option<U256>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_numeric_opt"
    )]
    max_fee_per_gas: Option<U256>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_numeric_opt"
    )]
    max_priority_fee_per_gas: Option<U256>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_numeric_opt"
    )]
    value: Option<U256>,
    #[serde(default, alias = "input", skip_serializing_if = "Option::is_none")]
    data: Option<Bytes>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_numeric_opt"
    )]
    nonce: Option<U256>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_stringified_eth_u64_opt"
    )]
    chain_id: Option<U64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_list: Option<AccessList>,
}

impl Serialize for TypedTransaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let object = match self.clone() {
            Legacy(tx) => TransactionObject {
                tx_type: Some(0u64.into()),
                from: tx.from,
                to: tx.to,
                gas: tx.gas,
                gas_price: tx.gas_price,
                value: tx.value,
                data: tx.data,
                nonce: tx.nonce,
                chain_id: tx.chain_id,
                ..Default::default()
            },
            Eip2930(Eip2930TransactionRequest { tx, access_list }) => TransactionObject {
                tx_type: Some(1u64.into()),
                from: tx.from,
                to: tx.to,
                gas: tx.gas,
                gas_price: tx.gas_price,
                value: tx.value,
                data: tx.data,
                nonce: tx.nonce,
                chain_id: tx.chain_id,
                access_list: Some(access_list),
                ..Default::default()
            },
            Eip1559(tx) => TransactionObject {
                tx_type: Some(2u64.into()),
                from: tx.from,
                to: tx.to,
                gas: tx.gas,
                max_fee_per_gas: tx.max_fee_per_gas,
                max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
                value: tx.value,
                data: tx.data,
                nonce: tx.nonce,
                chain_id: tx.chain_id,
                access_list: Some(tx.access_list),
                ..Default::default()
            },
        };
        object.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TypedTransaction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = TransactionObject::deserialize(deserializer)?;
        let tx_type = match object.tx_type {
            Some(ty) => ty.as_u64(),
            None if object.max_fee_per_gas.is_some() ||
                object.max_priority_fee_per_gas.is_some() =>
            {
                2
            }
            None => 0,
        };

        let legacy = TransactionRequest {
            from: object.from,
            to: object.to,
            gas: object.gas,
            gas_price: object.gas_price,
            value: object.value,
            data: object.data.clone(),
            nonce: object.nonce,
            chain_id: object.chain_id,
        };

        match tx_type {
            0 => Ok(Legacy(legacy)),
            1 => Ok(Eip2930(Eip2930TransactionRequest::new(
                legacy,
                object.access_list.unwrap_or_default(),
            ))),
            2 => Ok(Eip1559(Eip1559TransactionRequest {
                from: object.from,
                to: object.to,
                gas: object.gas,
                value: object.value,
                data: object.data,
                nonce: object.nonce,
                access_list: object.access_list.unwrap_or_default(),
                max_priority_fee_per_gas: object.max_priority_fee_per_gas,
                max_fee_per_gas: object.max_fee_per_gas,
                chain_id: object.chain_id,
            })),
            other => {
                Err(serde::de::Error::custom(format!("unsupported transaction type {other}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn json_type_accepts_padded_and_compact_forms() {
        for ty in ["\"0x2\"", "\"0x02\"", "2"] {
            let to = "0x3535353535353535353535353535353535353535";
            let json = format!(r#"{{"type":{ty},"to":"{to}","value":"0x1"}}"#);
            let tx: TypedTransaction = serde_json::from_str(&json).unwrap();
            assert_eq!(tx.tx_type(), 2, "{ty}");
        }

        let tx: TypedTransaction = serde_json::from_str(r#"{"maxFeePerGas":"0x10"}"#).unwrap();
        assert_eq!(tx.tx_type(), 2);

        let tx: TypedTransaction = serde_json::from_str(r#"{"gasPrice":"0x10"}"#).unwrap();
        assert_eq!(tx.tx_type(), 0);

        assert!(serde_json::from_str::<TypedTransaction>(r#"{"type":"0x7e"}"#).is_err());
    }

    #[test]
    fn serializes_compact_type() {
        let tx: TypedTransaction = Eip1559TransactionRequest::new().nonce(1).into();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "0x2");
        assert_eq!(json["nonce"], "0x1");
    }

    #[test]
    fn input_is_an_alias_of_data() {
        let tx: TypedTransaction = serde_json::from_str(r#"{"input":"0xabcd"}"#).unwrap();
        assert_eq!(tx.data().map(|d| d.to_vec()), Some(vec![0xab, 0xcd]));
    }

    #[test]
    fn decode_envelopes() {
        let legacy = hex::decode("ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080").unwrap();
        let (tx, sig) = TypedTransaction::decode(&legacy).unwrap();
        assert_eq!(tx.tx_type(), 0);
        assert_eq!(tx.chain_id(), Some(1u64.into()));
        assert_eq!(
            tx.to(),
            Some(&Address::from_str("3535353535353535353535353535353535353535").unwrap())
        );
        assert!(sig.is_none());
        assert_eq!(tx.rlp().to_vec(), legacy);

        let typed: TypedTransaction =
            Eip1559TransactionRequest::new()
            .chain_id(5)
            .nonce(1)
            .max_priority_fee_per_gas(1)
            .max_fee_per_gas(2)
            .gas(21000)
            .value(0)
            .into();
        let (decoded, _) = TypedTransaction::decode(&typed.rlp()).unwrap();
        assert_eq!(decoded, typed);

        assert!(matches!(
            TypedTransaction::decode(&[0x03, 0xc0]),
            Err(DecodeTransactionError::UnsupportedType(0x03))
        ));
        assert!(matches!(TypedTransaction::decode(&[]), Err(DecodeTransactionError::Empty)));
        assert!(TypedTransaction::decode(&[0xc1, 0x80]).is_err());
    }
}
