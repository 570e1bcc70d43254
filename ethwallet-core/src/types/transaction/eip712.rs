//! [EIP-712](https://eips.ethereum.org/EIPS/eip-712) typed structured data hashing.
use crate::{
    types::{serde_helpers::StringifiedNumeric, Address, Bytes, H256, U256},
    utils::keccak256,
};
use ethabi::{encode, param_type::Reader, ParamType, Token};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    collections::{BTreeMap, HashSet},
    convert::TryInto,
};

/// Custom types for `TypedData`
pub type Types = BTreeMap<String, Vec<Eip712DomainType>>;

/// An EIP-712 error.
#[derive(Debug, thiserror::Error)]
pub enum Eip712Error {
    #[error("Failed to serialize serde JSON object")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Failed to decode hex value")]
    FromHexError(#[from] hex::FromHexError),
    #[error("Error from Eip712 struct: {0:?}")]
    Message(String),
}

/// Eip712 Domain attributes used in determining the domain separator;
/// Unused fields are left out of the struct type.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EIP712Domain {
    ///  The user readable name of signing domain, i.e. the name of the DApp or the protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The current major version of the signing domain. Signatures from different versions are not
    /// compatible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// The EIP-155 chain id.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::types::serde_helpers::deserialize_stringified_numeric_opt"
    )]
    pub chain_id: Option<U256>,

    /// The address of the contract that will verify the signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<Address>,

    /// A disambiguating salt for the protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<H256>,
}

impl EIP712Domain {
    /// Compute the domain separator over the fields that are present.
    pub fn separator(&self) -> [u8; 32] {
        let mut fields = Vec::new();
        let mut tokens = Vec::new();

        if let Some(ref name) = self.name {
            fields.push("string name");
            tokens.push(Token::Uint(U256::from(keccak256(name))));
        }
        if let Some(ref version) = self.version {
            fields.push("string version");
            tokens.push(Token::Uint(U256::from(keccak256(version))));
        }
        if let Some(chain_id) = self.chain_id {
            fields.push("uint256 chainId");
            tokens.push(Token::Uint(chain_id));
        }
        if let Some(verifying_contract) = self.verifying_contract {
            fields.push("address verifyingContract");
            tokens.push(Token::Address(verifying_contract));
        }
        if let Some(salt) = self.salt {
            fields.push("bytes32 salt");
            tokens.push(Token::Uint(U256::from(salt.as_bytes())));
        }

        let ty = format!("EIP712Domain({})", fields.join(","));
        tokens.insert(0, Token::Uint(U256::from(keccak256(ty))));

        keccak256(encode(&tokens))
    }
}

/// Represents the [EIP-712](https://eips.ethereum.org/EIPS/eip-712) typed data object.
///
/// Typed data is a JSON object containing type information, domain separator parameters and the
/// message object:
///
/// ```json
/// {
///     "types": { "EIP712Domain": [ ... ], "Mail": [ { "name": "from", "type": "Person" } ] },
///     "primaryType": "Mail",
///     "domain": { "name": "Ether Mail", "version": "1", "chainId": 1 },
///     "message": { "from": { ... } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedData {
    /// Signing domain metadata, used to construct the domain separator.
    pub domain: EIP712Domain,
    /// The custom types used by this message.
    pub types: Types,
    #[serde(rename = "primaryType")]
    /// The type of the message.
    pub primary_type: String,
    /// The message to be signed.
    pub message: BTreeMap<String, serde_json::Value>,
}

/// According to the MetaMask implementation,
/// the message parameter may be JSON stringified in versions later than V1
/// See <https://github.com/MetaMask/metamask-extension/blob/0dfdd44ae7728ed02cbf32c564c75b74f37acf77/app/scripts/metamask-controller.js#L1736>
/// In fact, ethers.js JSON stringifies the message at the time of writing.
impl<'de> Deserialize<'de> for TypedData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct TypedDataHelper {
            #[serde(default)]
            domain: EIP712Domain,
            types: Types,
            #[serde(rename = "primaryType")]
            primary_type: String,
            #[serde(default)]
            message: BTreeMap<String, serde_json::Value>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Type {
            Val(TypedDataHelper),
            String(String),
        }

        let TypedDataHelper { domain, types, primary_type, message } =
            match Type::deserialize(deserializer)? {
                Type::Val(v) => v,
                Type::String(s) => serde_json::from_str(&s).map_err(serde::de::Error::custom)?,
            };
        Ok(TypedData { domain, types, primary_type, message })
    }
}

// === impl TypedData ===

impl TypedData {
    /// The domain separator of this payload's domain.
    pub fn domain_separator(&self) -> [u8; 32] {
        self.domain.separator()
    }

    /// Hash of the message, according to EIP-712 definition of `hashStruct`
    pub fn struct_hash(&self) -> Result<[u8; 32], Eip712Error> {
        let message = serde_json::Value::Object(self.message.clone().into_iter().collect());
        hash_struct(&self.primary_type, &message, &self.types)
    }

    /// Hash a typed message according to EIP-712. The returned message starts with the EIP-712
    /// prefix, which is "1901", followed by the hash of the domain separator, then the data (if
    /// any). The result is hashed again and returned.
    pub fn encode_eip712(&self) -> Result<[u8; 32], Eip712Error> {
        let domain_separator = self.domain_separator();
        let mut digest_input = [&[0x19, 0x01], &domain_separator[..]].concat();

        if self.primary_type != "EIP712Domain" {
            // compatibility with <https://github.com/MetaMask/eth-sig-util>
            digest_input.extend(&self.struct_hash()?[..])
        }
        Ok(keccak256(digest_input))
    }
}

/// Represents the name and type pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Eip712DomainType {
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
}

/// Encodes an object by encoding and concatenating each of its members.
///
/// The encoding of a struct instance is `enc(value₁) ‖ enc(value₂) ‖ … ‖ enc(valueₙ)`, i.e. the
/// concatenation of the encoded member values in the order that they appear in the type. Each
/// encoded member value is exactly 32-byte long.
pub fn encode_data(
    primary_type: &str,
    data: &serde_json::Value,
    types: &Types,
) -> Result<Vec<Token>, Eip712Error> {
    let hash = hash_type(primary_type, types)?;
    let mut tokens = vec![Token::Uint(U256::from(hash))];

    if let Some(fields) = types.get(primary_type) {
        for field in fields {
            // handle recursive types
            if let Some(value) = data.get(&field.name) {
                let field = encode_field(types, &field.r#type, value)?;
                tokens.push(field);
            } else if types.contains_key(&field.r#type) {
                tokens.push(Token::Uint(U256::zero()));
            } else {
                return Err(Eip712Error::Message(format!("No data found for: `{}`", field.name)))
            }
        }
    }

    Ok(tokens)
}

/// Hashes an object, returning the hash of the `primary_type` object
pub fn hash_struct(
    primary_type: &str,
    data: &serde_json::Value,
    types: &Types,
) -> Result<[u8; 32], Eip712Error> {
    let tokens = encode_data(primary_type, data, types)?;
    let encoded = encode(&tokens);
    Ok(keccak256(encoded))
}

/// Returns the hashed encoded type of `primary_type`
pub fn hash_type(primary_type: &str, types: &Types) -> Result<[u8; 32], Eip712Error> {
    encode_type(primary_type, types).map(keccak256)
}

/// Encodes the type of an object by encoding a comma delimited list of its members, followed by
/// its dependencies sorted by name.
pub fn encode_type(primary_type: &str, types: &Types) -> Result<String, Eip712Error> {
    let mut names = HashSet::new();
    find_type_dependencies(primary_type, types, &mut names);
    // need to ensure primary_type is first in the list
    names.remove(primary_type);
    let mut deps: Vec<_> = names.into_iter().collect();
    deps.sort_unstable();
    deps.insert(0, primary_type);

    let mut res = String::new();

    for dep in deps.into_iter() {
        let fields = types.get(dep).ok_or_else(|| {
            Eip712Error::Message(format!("No type definition found for: `{dep}`"))
        })?;

        res += dep;
        res.push('(');
        res += &fields
            .iter()
            .map(|ty| format!("{} {}", ty.r#type, ty.name))
            .collect::<Vec<_>>()
            .join(",");

        res.push(')');
    }
    Ok(res)
}

/// Returns all the custom types used in the `primary_type`
fn find_type_dependencies<'a>(
    primary_type: &'a str,
    types: &'a Types,
    found: &mut HashSet<&'a str>,
) {
    if found.contains(primary_type) {
        return
    }
    if let Some(fields) = types.get(primary_type) {
        found.insert(primary_type);
        for field in fields {
            // need to strip the array tail
            let ty = field.r#type.split('[').next().unwrap_or_default();
            find_type_dependencies(ty, types, found)
        }
    }
}

/// Encode a single field of type `field_type`.
pub fn encode_field(
    types: &Types,
    field_type: &str,
    value: &serde_json::Value,
) -> Result<Token, Eip712Error> {
    // check if field is custom data type
    if types.contains_key(field_type) {
        let tokens = encode_data(field_type, value, types)?;
        let encoded = encode(&tokens);
        return Ok(encode_eip712_type(Token::Bytes(encoded)))
    }

    if let Some((stripped_type, _)) = field_type.rsplit_once('[') {
        let values = value.as_array().ok_or_else(|| {
            Eip712Error::Message(format!("Expected array for type `{field_type}`, but got `{value}`"))
        })?;
        let tokens = values
            .iter()
            .map(|value| encode_field(types, stripped_type, value))
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(encode_eip712_type(Token::Bytes(encode(&tokens))))
    }

    let param = Reader::read(field_type).map_err(|err| {
        Eip712Error::Message(format!("Failed to parse type {field_type}: {err}"))
    })?;

    let token = match param {
        ParamType::Address => Token::Address(serde_json::from_value(value.clone())?),
        ParamType::Bytes => {
            let data: Bytes = serde_json::from_value(value.clone())?;
            encode_eip712_type(Token::Bytes(data.to_vec()))
        }
        ParamType::Int(_) => Token::Uint(parse_int(value)?),
        ParamType::Uint(_) => {
            // uints are commonly stringified due to how ethers-js encodes
            let val: StringifiedNumeric = serde_json::from_value(value.clone())?;
            let val = val
                .try_into()
                .map_err(|err| Eip712Error::Message(format!("Failed to parse uint {err}")))?;

            Token::Uint(val)
        }
        ParamType::Bool => encode_eip712_type(Token::Bool(serde_json::from_value(value.clone())?)),
        ParamType::String => {
            let s: String = serde_json::from_value(value.clone())?;
            encode_eip712_type(Token::String(s))
        }
        ParamType::FixedBytes(size) => {
            let data: Bytes = serde_json::from_value(value.clone())?;
            if data.len() > size {
                return Err(Eip712Error::Message(format!(
                    "Value of {} bytes does not fit into bytes{size}",
                    data.len()
                )))
            }
            encode_eip712_type(Token::FixedBytes(data.to_vec()))
        }
        ParamType::Array(_) | ParamType::FixedArray(_, _) | ParamType::Tuple(_) => {
            return Err(Eip712Error::Message(format!("Unexpected type {field_type}")))
        }
    };

    Ok(token)
}

/// Parses a signed integer given as a JSON number, a decimal string (optionally negative) or a
/// hex string, returning its 256 bit two's complement.
fn parse_int(value: &serde_json::Value) -> Result<U256, Eip712Error> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => return Err(Eip712Error::Message(format!("Failed to parse int {other}"))),
    };
    let (negative, digits) = match text.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, text.as_str()),
    };
    let magnitude: U256 = StringifiedNumeric::String(digits.to_string())
        .try_into()
        .map_err(|err| Eip712Error::Message(format!("Failed to parse int {err}")))?;

    Ok(if negative { (!magnitude).overflowing_add(U256::one()).0 } else { magnitude })
}

/// Parse token into Eip712 compliant ABI encoding
pub fn encode_eip712_type(token: Token) -> Token {
    match token {
        Token::Bytes(t) => Token::Uint(U256::from(keccak256(t))),
        Token::FixedBytes(t) => {
            // right padded to a full word
            let mut word = [0u8; 32];
            word[..t.len()].copy_from_slice(&t);
            Token::Uint(U256::from(word))
        }
        Token::String(t) => Token::Uint(U256::from(keccak256(t))),
        Token::Bool(t) => {
            // Boolean false and true are encoded as uint256 values 0 and 1 respectively
            Token::Uint(U256::from(t as i32))
        }
        Token::Int(t) => {
            // Integer values are sign-extended to 256-bit and encoded in big endian order.
            Token::Uint(t)
        }
        Token::Array(tokens) | Token::FixedArray(tokens) | Token::Tuple(tokens) => {
            Token::Uint(U256::from(keccak256(encode(
                &tokens.into_iter().map(encode_eip712_type).collect::<Vec<Token>>(),
            ))))
        }
        _ => {
            // Return the ABI encoded token;
            token
        }
    }
}
