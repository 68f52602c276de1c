//! `eth_signTypedData` JSON documents.
//!
//! JSON carries no type tags, so message values are converted by walking the
//! schema alongside the data.

use alloy_primitives::{Address, Bytes, I256, U256};
use serde::Deserialize;
use serde_json::Value;

use super::types::{Eip712Domain, TypedData, TypedMessage, TypedValue, Types};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypedData {
    types: Types,
    primary_type: String,
    domain: RawDomain,
    message: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDomain {
    name: String,
    version: String,
    #[serde(default)]
    chain_id: Option<Value>,
    verifying_contract: String,
}

impl TypedData {
    /// Parse a typed-data document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTypedData = serde_json::from_str(json)?;

        let chain_id = match raw.domain.chain_id {
            None | Some(Value::Null) => 0,
            Some(value) => {
                let id = json_uint("chainId", "uint256", &value)?;
                u64::try_from(id).map_err(|_| Error::Overflow {
                    field: "chainId".to_string(),
                    type_name: "uint64".to_string(),
                })?
            }
        };
        let verifying_contract = parse_address("verifyingContract", &raw.domain.verifying_contract)?;

        let message = struct_from_json(&raw.types, &raw.primary_type, &raw.message)?;

        Ok(Self {
            domain: Eip712Domain::new(raw.domain.name, raw.domain.version, chain_id, verifying_contract),
            types: raw.types,
            primary_type: raw.primary_type,
            message,
        })
    }
}

fn struct_from_json(
    types: &Types,
    struct_name: &str,
    object: &serde_json::Map<String, Value>,
) -> Result<TypedMessage> {
    let fields = types
        .get(struct_name)
        .ok_or_else(|| Error::UnknownType(struct_name.to_string()))?;

    let mut message = TypedMessage::new();
    for field in fields {
        let Some(value) = object.get(&field.name) else {
            continue;
        };
        let converted = value_from_json(types, &field.name, &field.type_name, value)?;
        message.insert(field.name.clone(), converted);
    }
    Ok(message)
}

fn value_from_json(types: &Types, field: &str, type_name: &str, value: &Value) -> Result<TypedValue> {
    if let Some(idx) = type_name.find('[') {
        return array_from_json(types, field, &type_name[..idx], value);
    }

    if types.contains_key(type_name) {
        let Value::Object(object) = value else {
            return Err(unexpected(field, type_name, value));
        };
        return Ok(TypedValue::Struct(struct_from_json(types, type_name, object)?));
    }

    match (type_name, value) {
        ("string", Value::String(s)) => Ok(TypedValue::String(s.clone())),
        ("address", Value::String(s)) => Ok(TypedValue::Address(parse_address(field, s)?)),
        ("bool", Value::Bool(flag)) => Ok(TypedValue::Bool(*flag)),
        (t, Value::String(s)) if t.starts_with("bytes") => crate::hex_codec::decode_prefixed(s)
            .map(|bytes| TypedValue::Bytes(Bytes::from(bytes)))
            .map_err(|err| Error::InvalidValue {
                field: field.to_string(),
                type_name: type_name.to_string(),
                message: err.to_string(),
            }),
        (t, _) if t.starts_with("uint") => Ok(TypedValue::Uint(json_uint(field, type_name, value)?)),
        (t, Value::Number(n)) if t.starts_with("int") => n
            .as_i64()
            .and_then(|n| I256::try_from(n).ok())
            .map(TypedValue::Int)
            .ok_or_else(|| unexpected(field, type_name, value)),
        (t, Value::String(s)) if t.starts_with("int") => I256::from_dec_str(s)
            .map(TypedValue::Int)
            .map_err(|err| Error::InvalidValue {
                field: field.to_string(),
                type_name: type_name.to_string(),
                message: err.to_string(),
            }),
        _ => Err(unexpected(field, type_name, value)),
    }
}

/// Nested lists keep their shape; dimension checks happen at encoding time.
fn array_from_json(types: &Types, field: &str, base: &str, value: &Value) -> Result<TypedValue> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| array_from_json(types, field, base, item))
            .collect::<Result<Vec<_>>>()
            .map(TypedValue::Array),
        leaf => value_from_json(types, field, base, leaf),
    }
}

fn json_uint(field: &str, type_name: &str, value: &Value) -> Result<U256> {
    let invalid = |message: String| Error::InvalidValue {
        field: field.to_string(),
        type_name: type_name.to_string(),
        message,
    };
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| invalid(format!("{} is not an unsigned integer", n))),
        Value::String(s) => {
            let parsed = match s.strip_prefix("0x") {
                Some(hex) => U256::from_str_radix(hex, 16),
                None => U256::from_str_radix(s, 10),
            };
            parsed.map_err(|err| invalid(err.to_string()))
        }
        other => Err(invalid(format!("unexpected JSON value {}", other))),
    }
}

fn parse_address(field: &str, s: &str) -> Result<Address> {
    s.parse::<Address>().map_err(|err| Error::InvalidValue {
        field: field.to_string(),
        type_name: "address".to_string(),
        message: err.to_string(),
    })
}

fn unexpected(field: &str, type_name: &str, value: &Value) -> Error {
    Error::InvalidValue {
        field: field.to_string(),
        type_name: type_name.to_string(),
        message: format!("unexpected JSON value {}", value),
    }
}
