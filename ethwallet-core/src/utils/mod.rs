//! Hashing and key utilities.
mod hash;
pub use hash::{hash_message, keccak256};

use crate::types::{Address, H256};
use k256::{ecdsa::SigningKey, elliptic_curve::sec1::ToEncodedPoint, PublicKey};

/// Converts a K256 SigningKey to an Ethereum Address
pub fn secret_key_to_address(secret_key: &SigningKey) -> Address {
    let public_key = PublicKey::from(secret_key.verifying_key());
    public_key_to_address(&public_key)
}

/// Converts a public key to an Ethereum address: the last 20 bytes of the Keccak-256 hash of
/// the uncompressed point without its `0x04` tag.
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let encoded = public_key.to_encoded_point(/* compress = */ false);
    let encoded = encoded.as_bytes();
    debug_assert_eq!(encoded[0], 0x04);
    let hash = keccak256(&encoded[1..]);
    Address::from_slice(&hash[12..])
}

/// Strips an optional `0x` prefix and decodes the remaining hex.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let value = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")).unwrap_or(value);
    hex::decode(value)
}

/// Formats a 32 byte hash as a `0x` prefixed lowercase hex string.
pub fn format_hash(hash: &H256) -> String {
    format!("{hash:?}")
}
