use super::{decode_data, decode_signature, decode_to, normalize_v, request::TransactionRequest};
use crate::types::{Address, Bytes, Signature, H256, U64};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

/// Unsigned EIP-2930 transactions have 8 fields
const NUM_EIP2930_FIELDS: usize = 8;

/// Access list
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessList(pub Vec<AccessListItem>);

impl From<Vec<AccessListItem>> for AccessList {
    fn from(src: Vec<AccessListItem>) -> AccessList {
        AccessList(src)
    }
}

impl Encodable for AccessList {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append_list::<AccessListItem, _>(&self.0);
    }
}

impl Decodable for AccessList {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Ok(AccessList(rlp.as_list()?))
    }
}

/// Access list item
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    /// Accessed address
    pub address: Address,
    /// Accessed storage keys
    pub storage_keys: Vec<H256>,
}

impl Encodable for AccessListItem {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.address);
        s.append_list::<H256, _>(&self.storage_keys);
    }
}

impl Decodable for AccessListItem {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Ok(AccessListItem { address: rlp.val_at(0)?, storage_keys: rlp.list_at(1)? })
    }
}

/// An EIP-2930 transaction is a legacy transaction including an [`AccessList`].
#[derive(Clone, Default, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Eip2930TransactionRequest {
    #[serde(flatten)]
    pub tx: TransactionRequest,
    #[serde(rename = "accessList", default)]
    pub access_list: AccessList,
}

impl Eip2930TransactionRequest {
    pub fn new(tx: TransactionRequest, access_list: AccessList) -> Self {
        Self { tx, access_list }
    }

    /// Gets the unsigned transaction's RLP encoding, without the type prefix
    pub fn rlp(&self) -> Bytes {
        let mut rlp = RlpStream::new();
        rlp.begin_list(NUM_EIP2930_FIELDS);
        self.rlp_base(&mut rlp);
        rlp.out().freeze().into()
    }

    /// Produces the RLP encoding of the transaction with the provided signature, without the
    /// type prefix
    pub fn rlp_signed(&self, signature: &Signature) -> Bytes {
        let mut rlp = RlpStream::new();
        rlp.begin_list(NUM_EIP2930_FIELDS + 3);
        self.rlp_base(&mut rlp);

        rlp.append(&normalize_v(signature.v));
        rlp.append(&signature.r);
        rlp.append(&signature.s);
        rlp.out().freeze().into()
    }

    fn rlp_base(&self, rlp: &mut RlpStream) {
        rlp.append(&self.tx.chain_id.unwrap_or_default());
        self.tx.rlp_base(rlp);
        rlp.append(&self.access_list);
    }

    /// Decodes fields of the type 1 transaction response, ignoring a trailing signature.
    pub fn decode_base(rlp: &Rlp) -> Result<(Self, Option<Signature>), DecoderError> {
        let count = rlp.item_count()?;
        if count != NUM_EIP2930_FIELDS && count != NUM_EIP2930_FIELDS + 3 {
            return Err(DecoderError::RlpIncorrectListLen)
        }

        let mut offset = 0;
        let chain_id: U64 = rlp.val_at(offset)?;
        offset += 1;
        let mut tx = TransactionRequest::new().chain_id(chain_id);
        tx.nonce = Some(rlp.val_at(offset)?);
        offset += 1;
        tx.gas_price = Some(rlp.val_at(offset)?);
        offset += 1;
        tx.gas = Some(rlp.val_at(offset)?);
        offset += 1;
        tx.to = decode_to(rlp, &mut offset)?;
        tx.value = Some(rlp.val_at(offset)?);
        offset += 1;
        tx.data = decode_data(rlp, &mut offset)?;
        let access_list = rlp.val_at(offset)?;
        offset += 1;

        let signature = if count > NUM_EIP2930_FIELDS {
            Some(decode_signature(rlp, &mut offset)?)
        } else {
            None
        };

        Ok((Self { tx, access_list }, signature))
    }
}
