//! Transaction envelopes and the EIP-712 typed data hasher.
pub mod request;

pub mod eip1559;
pub mod eip2718;
pub mod eip2930;

pub mod eip712;

use crate::types::{Address, Signature, U64};

pub(super) fn rlp_opt<T: rlp::Encodable>(rlp: &mut rlp::RlpStream, opt: &Option<T>) {
    if let Some(inner) = opt {
        rlp.append(inner);
    } else {
        rlp.append(&"");
    }
}

/// normalizes the signature back to 0/1
pub(crate) fn normalize_v(v: u64) -> u64 {
    match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        v if v >= 35 => (v - 35) % 2,
        v => v & 1,
    }
}

/// extracts the chainid from the signature v value based on EIP-155
pub(crate) fn extract_chain_id(v: u64) -> Option<U64> {
    // https://eips.ethereum.org/EIPS/eip-155
    // if chainid is available, v = {0, 1} + CHAIN_ID * 2 + 35
    if v >= 35 {
        return Some(U64::from((v - 35) >> 1))
    }
    None
}

/// Decodes the signature portion of the RLP encoding based on the RLP offset passed.
/// Increments the offset for each element parsed.
#[inline]
fn decode_signature(rlp: &rlp::Rlp, offset: &mut usize) -> Result<Signature, rlp::DecoderError> {
    let sig = Signature {
        v: rlp.val_at(*offset)?,
        r: rlp.val_at(*offset + 1)?,
        s: rlp.val_at(*offset + 2)?,
    };
    *offset += 3;
    Ok(sig)
}

/// Decodes the `to` field of the RLP encoding based on the RLP offset passed. Increments the offset
/// by one.
#[inline]
fn decode_to(rlp: &rlp::Rlp, offset: &mut usize) -> Result<Option<Address>, rlp::DecoderError> {
    let to = {
        let to = rlp.at(*offset)?;
        if to.is_empty() {
            if to.is_data() {
                None
            } else {
                return Err(rlp::DecoderError::RlpExpectedToBeData)
            }
        } else {
            Some(to.as_val()?)
        }
    };
    *offset += 1;

    Ok(to)
}

/// Decodes an optional data field, mapping the empty string to `None`.
#[inline]
fn decode_data(
    rlp: &rlp::Rlp,
    offset: &mut usize,
) -> Result<Option<crate::types::Bytes>, rlp::DecoderError> {
    let data: crate::types::Bytes = rlp.val_at(*offset)?;
    *offset += 1;
    Ok(if data.is_empty() { None } else { Some(data) })
}
