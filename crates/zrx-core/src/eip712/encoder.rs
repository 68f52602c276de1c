//! EIP-712 structured-data hashing.
//!
//! Resolves the struct dependency graph, encodes values field by field and
//! produces the `0x1901`-prefixed digest that gets signed.

use alloy_primitives::{keccak256, Address, Bytes, B256, I256, U256};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::types::{TypedData, TypedField, TypedMessage, TypedValue, Types, EIP712_DOMAIN_TYPE};
use crate::{Error, Result};

/// A valid name; no array suffix allowed.
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_$][a-zA-Z_$0-9]*$").expect("valid identifier regex"));

/// A valid name optionally followed by array dimensions.
static TYPE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z_$][a-zA-Z_$0-9]*(\[([1-9]\d*)*\])*$").expect("valid type regex")
});

/// Array declarations like `arr[5][10]`, `arr[][]`. A zero dimension never matches.
static ARRAY_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z_$][a-zA-Z_$0-9]*)((\[([1-9]\d*)?\])+)$").expect("valid array regex")
});

static ARRAY_DIMENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([1-9]\d*)?\]").expect("valid dimension regex"));

/// Check every field name and type of every struct in the schema.
pub fn validate_structured_data(types: &Types) -> Result<()> {
    for (struct_name, fields) in types {
        for field in fields {
            if !IDENTIFIER.is_match(&field.name) {
                return Err(Error::InvalidIdentifier {
                    name: field.name.clone(),
                    struct_name: struct_name.clone(),
                });
            }
            if !TYPE_NAME.is_match(&field.type_name) {
                return Err(Error::InvalidType {
                    type_name: field.type_name.clone(),
                    struct_name: struct_name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Strip any array suffix: `Person[2][]` -> `Person`.
fn base_type(type_name: &str) -> &str {
    type_name
        .find('[')
        .map_or(type_name, |idx| &type_name[..idx])
}

/// Encoder over one validated typed-data document.
#[derive(Debug, Clone)]
pub struct TypedDataEncoder {
    data: TypedData,
}

impl TypedDataEncoder {
    /// Validate the schema and wrap the document.
    ///
    /// A schema without an `EIP712Domain` entry gets the canonical one for
    /// its domain.
    pub fn new(mut data: TypedData) -> Result<Self> {
        validate_structured_data(&data.types)?;
        if !data.types.contains_key(EIP712_DOMAIN_TYPE) {
            data.types
                .insert(EIP712_DOMAIN_TYPE.to_string(), data.domain.schema());
        }
        Ok(Self { data })
    }

    /// Parse an `eth_signTypedData` JSON document and wrap it.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(TypedData::from_json(json)?)
    }

    pub fn typed_data(&self) -> &TypedData {
        &self.data
    }

    fn struct_fields(&self, struct_name: &str) -> Result<&[TypedField]> {
        self.data
            .types
            .get(struct_name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownType(struct_name.to_string()))
    }

    /// All user-defined structs reachable from `primary_type`, itself included.
    fn dependencies(&self, primary_type: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        if !self.data.types.contains_key(primary_type) {
            return visited;
        }

        let mut remaining = vec![primary_type.to_string()];
        while let Some(struct_name) = remaining.pop() {
            if !visited.insert(struct_name.clone()) {
                continue;
            }
            for field in &self.data.types[&struct_name] {
                let dependency = base_type(&field.type_name);
                if self.data.types.contains_key(dependency) && !visited.contains(dependency) {
                    remaining.push(dependency.to_string());
                }
            }
        }

        visited
    }

    fn encode_struct_signature(&self, struct_name: &str) -> Result<String> {
        let fields = self
            .struct_fields(struct_name)?
            .iter()
            .map(|field| format!("{} {}", field.type_name, field.name))
            .collect::<Vec<_>>()
            .join(",");
        Ok(format!("{}({})", struct_name, fields))
    }

    /// `Primary(...)` followed by its dependencies in lexicographic order.
    pub fn encode_type(&self, primary_type: &str) -> Result<String> {
        let mut deps = self.dependencies(primary_type);
        if !deps.remove(primary_type) {
            return Err(Error::UnknownType(primary_type.to_string()));
        }

        let mut encoded = self.encode_struct_signature(primary_type)?;
        for dep in &deps {
            encoded.push_str(&self.encode_struct_signature(dep)?);
        }
        Ok(encoded)
    }

    pub fn hash_type(&self, primary_type: &str) -> Result<B256> {
        Ok(keccak256(self.encode_type(primary_type)?.as_bytes()))
    }

    /// `hashType` followed by one 32-byte word per present field.
    ///
    /// Fields missing from `values` are skipped.
    pub fn encode_data(&self, primary_type: &str, values: &TypedMessage) -> Result<Vec<u8>> {
        let fields = self.struct_fields(primary_type)?;
        let mut out = Vec::with_capacity(32 * (fields.len() + 1));
        out.extend_from_slice(self.hash_type(primary_type)?.as_slice());

        for field in fields {
            let Some(value) = values.get(&field.name) else {
                continue;
            };
            self.encode_field(&field.name, &field.type_name, value, &mut out)?;
        }

        Ok(out)
    }

    pub fn hash_message(&self, primary_type: &str, values: &TypedMessage) -> Result<B256> {
        Ok(keccak256(self.encode_data(primary_type, values)?))
    }

    pub fn hash_domain(&self) -> Result<B256> {
        self.hash_message(EIP712_DOMAIN_TYPE, &self.data.domain.to_message())
    }

    /// The signable digest: `keccak256(0x1901 ‖ domainHash ‖ messageHash)`.
    pub fn hash_structured_data(&self) -> Result<B256> {
        let domain_hash = self.hash_domain()?;
        let message_hash = self.hash_message(&self.data.primary_type, &self.data.message)?;

        let mut buf = [0u8; 66];
        buf[0] = 0x19;
        buf[1] = 0x01;
        buf[2..34].copy_from_slice(domain_hash.as_slice());
        buf[34..].copy_from_slice(message_hash.as_slice());
        let digest = keccak256(buf);

        debug!(
            primary_type = %self.data.primary_type,
            domain = %self.data.domain.name,
            digest = %digest,
            "Hashed structured data"
        );
        Ok(digest)
    }

    fn encode_field(
        &self,
        field: &str,
        type_name: &str,
        value: &TypedValue,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        match type_name {
            "string" => {
                let TypedValue::String(s) = value else {
                    return Err(invalid_value(field, type_name, value));
                };
                out.extend_from_slice(keccak256(s.as_bytes()).as_slice());
            }
            "bytes" => {
                let bytes = value_bytes(field, type_name, value)?;
                out.extend_from_slice(keccak256(&bytes).as_slice());
            }
            _ if self.data.types.contains_key(type_name) => {
                let TypedValue::Struct(nested) = value else {
                    return Err(invalid_value(field, type_name, value));
                };
                out.extend_from_slice(self.hash_message(type_name, nested)?.as_slice());
            }
            _ if ARRAY_TYPE.is_match(type_name) => {
                out.extend_from_slice(self.hash_array(field, type_name, value)?.as_slice());
            }
            _ => out.extend_from_slice(encode_atomic(field, type_name, value)?.as_slice()),
        }
        Ok(())
    }

    fn hash_array(&self, field: &str, type_name: &str, value: &TypedValue) -> Result<B256> {
        let base = base_type(type_name);
        let expected = declared_dimensions(type_name);
        let actual = data_dimensions(value).ok_or_else(|| invalid_value(field, type_name, value))?;

        let mismatch = || Error::ArrayDimensionMismatch {
            value: value.to_string(),
            actual: actual.clone().unwrap_or_default(),
            expected: expected.clone(),
        };
        let actual_dims = actual.as_ref().ok_or_else(mismatch)?;
        if actual_dims.len() != expected.len() {
            return Err(mismatch());
        }
        for (declared, found) in expected.iter().zip(actual_dims) {
            if matches!(declared, Some(size) if size != found) {
                return Err(mismatch());
            }
        }

        let mut leaves = Vec::new();
        flatten(value, &mut leaves);

        let mut concatenated = Vec::with_capacity(32 * leaves.len());
        for leaf in leaves {
            if self.data.types.contains_key(base) {
                let TypedValue::Struct(nested) = leaf else {
                    return Err(invalid_value(field, base, leaf));
                };
                concatenated.extend(self.encode_data(base, nested)?);
            } else {
                self.encode_field(field, base, leaf, &mut concatenated)?;
            }
        }

        Ok(keccak256(concatenated))
    }
}

/// Dimensions as declared, left to right. `None` marks a dynamic dimension.
fn declared_dimensions(type_name: &str) -> Vec<Option<usize>> {
    let suffix = &type_name[base_type(type_name).len()..];
    ARRAY_DIMENSION
        .captures_iter(suffix)
        .map(|caps| caps.get(1).and_then(|m| m.as_str().parse().ok()))
        .collect()
}

/// Shape of nested array data, outermost first.
///
/// Returns `None` for a non-array value and `Some(None)` when some depth
/// holds more than one length or mixes lists with scalars.
fn data_dimensions(value: &TypedValue) -> Option<Option<Vec<usize>>> {
    let TypedValue::Array(_) = value else {
        return None;
    };

    let mut by_depth: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    let mut ragged = false;
    let mut stack = vec![(value, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let TypedValue::Array(items) = node else {
            continue;
        };
        by_depth.entry(depth).or_default().insert(items.len());

        let nested = items
            .iter()
            .filter(|item| matches!(item, TypedValue::Array(_)))
            .count();
        if nested != 0 && nested != items.len() {
            ragged = true;
        }
        stack.extend(items.iter().map(|item| (item, depth + 1)));
    }

    if ragged || by_depth.values().any(|sizes| sizes.len() != 1) {
        return Some(None);
    }
    Some(Some(
        by_depth
            .into_values()
            .filter_map(|sizes| sizes.into_iter().next())
            .collect(),
    ))
}

/// Depth-first, left-to-right leaves.
fn flatten<'a>(value: &'a TypedValue, out: &mut Vec<&'a TypedValue>) {
    match value {
        TypedValue::Array(items) => items.iter().for_each(|item| flatten(item, out)),
        leaf => out.push(leaf),
    }
}

fn invalid_value(field: &str, type_name: &str, value: &TypedValue) -> Error {
    Error::InvalidValue {
        field: field.to_string(),
        type_name: type_name.to_string(),
        message: format!("unexpected {} value {}", value.kind(), value),
    }
}

fn value_bytes(field: &str, type_name: &str, value: &TypedValue) -> Result<Bytes> {
    match value {
        TypedValue::Bytes(bytes) => Ok(bytes.clone()),
        TypedValue::String(s) => crate::hex_codec::decode_prefixed(s)
            .map(Bytes::from)
            .map_err(|err| Error::InvalidValue {
                field: field.to_string(),
                type_name: type_name.to_string(),
                message: err.to_string(),
            }),
        other => Err(invalid_value(field, type_name, other)),
    }
}

/// Bit width of `uintN` / `intN`; an empty suffix means 256.
fn integer_bits(field: &str, type_name: &str, suffix: &str) -> Result<usize> {
    if suffix.is_empty() {
        return Ok(256);
    }
    match suffix.parse::<usize>() {
        Ok(bits) if bits > 0 && bits <= 256 && bits % 8 == 0 => Ok(bits),
        _ => Err(Error::UnsupportedType {
            field: field.to_string(),
            type_name: type_name.to_string(),
        }),
    }
}

fn parse_uint(field: &str, type_name: &str, s: &str) -> Result<U256> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(s, 10),
    };
    parsed.map_err(|err| Error::InvalidValue {
        field: field.to_string(),
        type_name: type_name.to_string(),
        message: err.to_string(),
    })
}

fn word(value: U256) -> B256 {
    B256::from(value.to_be_bytes::<32>())
}

/// The single 32-byte ABI word for an elementary value.
fn encode_atomic(field: &str, type_name: &str, value: &TypedValue) -> Result<B256> {
    let overflow = || Error::Overflow {
        field: field.to_string(),
        type_name: type_name.to_string(),
    };

    if type_name == "address" {
        let address = match value {
            TypedValue::Address(address) => *address,
            TypedValue::String(s) => s.parse::<Address>().map_err(|err| Error::InvalidValue {
                field: field.to_string(),
                type_name: type_name.to_string(),
                message: err.to_string(),
            })?,
            other => return Err(invalid_value(field, type_name, other)),
        };
        return Ok(B256::left_padding_from(address.as_slice()));
    }

    if type_name == "bool" {
        let TypedValue::Bool(flag) = value else {
            return Err(invalid_value(field, type_name, value));
        };
        return Ok(word(U256::from(u8::from(*flag))));
    }

    if let Some(suffix) = type_name.strip_prefix("uint") {
        let bits = integer_bits(field, type_name, suffix)?;
        let number = match value {
            TypedValue::Uint(n) => *n,
            TypedValue::Int(n) if !n.is_negative() => n.into_raw(),
            TypedValue::Int(_) => return Err(overflow()),
            TypedValue::String(s) => parse_uint(field, type_name, s)?,
            other => return Err(invalid_value(field, type_name, other)),
        };
        if number.bit_len() > bits {
            return Err(overflow());
        }
        return Ok(word(number));
    }

    if let Some(suffix) = type_name.strip_prefix("int") {
        let bits = integer_bits(field, type_name, suffix)?;
        let number = match value {
            TypedValue::Int(n) => *n,
            TypedValue::Uint(n) => {
                let signed = I256::from_raw(*n);
                if signed.is_negative() {
                    return Err(overflow());
                }
                signed
            }
            TypedValue::String(s) => I256::from_dec_str(s).map_err(|err| Error::InvalidValue {
                field: field.to_string(),
                type_name: type_name.to_string(),
                message: err.to_string(),
            })?,
            other => return Err(invalid_value(field, type_name, other)),
        };
        // Fits in N bits when everything above the sign bit matches the sign.
        let magnitude = if number.is_negative() {
            !number.into_raw()
        } else {
            number.into_raw()
        };
        if magnitude >> (bits - 1) != U256::ZERO {
            return Err(overflow());
        }
        return Ok(word(number.into_raw()));
    }

    if let Some(suffix) = type_name.strip_prefix("bytes") {
        let size = match suffix.parse::<usize>() {
            Ok(size) if (1..=32).contains(&size) => size,
            _ => {
                return Err(Error::UnsupportedType {
                    field: field.to_string(),
                    type_name: type_name.to_string(),
                })
            }
        };
        let bytes = value_bytes(field, type_name, value)?;
        if bytes.len() != size {
            return Err(Error::InvalidValue {
                field: field.to_string(),
                type_name: type_name.to_string(),
                message: format!("expected {} bytes, got {}", size, bytes.len()),
            });
        }
        return Ok(B256::right_padding_from(&bytes));
    }

    Err(Error::UnsupportedType {
        field: field.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eip712::types::Eip712Domain;
    use alloy_primitives::{address, b256};

    fn person(name: &str, wallet: Address) -> TypedValue {
        let mut fields = TypedMessage::new();
        fields.insert("name".to_string(), name.into());
        fields.insert("wallet".to_string(), wallet.into());
        TypedValue::Struct(fields)
    }

    fn mail_types() -> Types {
        let mut types = Types::new();
        types.insert(
            "EIP712Domain".to_string(),
            vec![
                TypedField::new("name", "string"),
                TypedField::new("version", "string"),
                TypedField::new("chainId", "uint256"),
                TypedField::new("verifyingContract", "address"),
            ],
        );
        types.insert(
            "Mail".to_string(),
            vec![
                TypedField::new("from", "Person"),
                TypedField::new("to", "Person"),
                TypedField::new("contents", "string"),
            ],
        );
        types.insert(
            "Person".to_string(),
            vec![
                TypedField::new("name", "string"),
                TypedField::new("wallet", "address"),
            ],
        );
        types
    }

    fn mail_data() -> TypedData {
        let mut message = TypedMessage::new();
        message.insert(
            "from".to_string(),
            person("Cow", address!("CD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826")),
        );
        message.insert(
            "to".to_string(),
            person("Bob", address!("bBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB")),
        );
        message.insert("contents".to_string(), "Hello, Bob!".into());

        TypedData {
            types: mail_types(),
            primary_type: "Mail".to_string(),
            message,
            domain: Eip712Domain::new(
                "Ether Mail",
                "1",
                1,
                address!("CcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"),
            ),
        }
    }

    fn encoder_with(types: Types) -> TypedDataEncoder {
        TypedDataEncoder::new(TypedData {
            types,
            primary_type: "Test".to_string(),
            message: TypedMessage::new(),
            domain: Eip712Domain::new("Test", "1", 0, Address::ZERO),
        })
        .unwrap()
    }

    #[test]
    fn test_mail_encode_type() {
        let encoder = TypedDataEncoder::new(mail_data()).unwrap();
        assert_eq!(
            encoder.encode_type("Mail").unwrap(),
            "Mail(Person from,Person to,string contents)Person(string name,address wallet)"
        );
        assert_eq!(
            encoder.hash_type("Mail").unwrap(),
            b256!("a0cedeb2dc280ba39b857546d74f5549c3a1d7bdc2dd96bf881f76108e23dac2")
        );
    }

    #[test]
    fn test_mail_encode_data() {
        let data = mail_data();
        let encoder = TypedDataEncoder::new(data.clone()).unwrap();
        let encoded = encoder.encode_data("Mail", &data.message).unwrap();
        let expected = [
            "a0cedeb2dc280ba39b857546d74f5549c3a1d7bdc2dd96bf881f76108e23dac2",
            "fc71e5fa27ff56c350aa531bc129ebdf613b772b6604664f5d8dbe21b85eb0c8",
            "cd54f074a4af31b4411ff6a60c9719dbd559c221c8ac3492d9d872b041d703d1",
            "b5aadf3154a261abdd9086fc627b61efca26ae5702701d05cd2305f7c52a2fc8",
        ]
        .concat();
        assert_eq!(crate::hex_codec::to_hex_prefixed(&encoded), format!("0x{}", expected));
    }

    #[test]
    fn test_mail_hashes() {
        let data = mail_data();
        let encoder = TypedDataEncoder::new(data.clone()).unwrap();
        assert_eq!(
            encoder.hash_message("Mail", &data.message).unwrap(),
            b256!("c52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e")
        );
        assert_eq!(
            encoder.hash_domain().unwrap(),
            b256!("f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f")
        );
        assert_eq!(
            encoder.hash_structured_data().unwrap(),
            b256!("be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2")
        );
    }

    #[test]
    fn test_missing_domain_schema_uses_canonical_one() {
        let mut data = mail_data();
        data.types.remove("EIP712Domain");
        let encoder = TypedDataEncoder::new(data).unwrap();
        assert_eq!(
            encoder.hash_domain().unwrap(),
            b256!("f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f")
        );
    }

    #[test]
    fn test_hash_type_ignores_unrelated_structs() {
        let mut types = mail_types();
        types.insert(
            "Unrelated".to_string(),
            vec![TypedField::new("a", "uint256"), TypedField::new("b", "bool")],
        );
        let mut data = mail_data();
        data.types = types.clone();
        let before = TypedDataEncoder::new(data.clone()).unwrap().hash_type("Mail").unwrap();

        types.get_mut("Unrelated").unwrap().reverse();
        data.types = types;
        let after = TypedDataEncoder::new(data).unwrap().hash_type("Mail").unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_hash_type_sensitive_to_primary_field_order() {
        let mut data = mail_data();
        let before = TypedDataEncoder::new(data.clone()).unwrap().hash_type("Mail").unwrap();

        data.types.get_mut("Mail").unwrap().swap(0, 1);
        let after = TypedDataEncoder::new(data).unwrap().hash_type("Mail").unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let mut data = mail_data();
        data.message.remove("contents");
        let encoder = TypedDataEncoder::new(data.clone()).unwrap();
        let encoded = encoder.encode_data("Mail", &data.message).unwrap();
        assert_eq!(encoded.len(), 32 * 3);
    }

    #[test]
    fn test_cyclic_schema_terminates() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("next", "Node")]);
        types.insert(
            "Node".to_string(),
            vec![TypedField::new("parent", "Test"), TypedField::new("children", "Node[]")],
        );
        let encoder = encoder_with(types);
        assert_eq!(
            encoder.encode_type("Test").unwrap(),
            "Test(Node next)Node(Test parent,Node[] children)"
        );
    }

    #[test]
    fn test_array_of_structs_is_a_dependency() {
        let mut types = mail_types();
        types.insert(
            "Group".to_string(),
            vec![TypedField::new("members", "Person[]")],
        );
        let mut data = mail_data();
        data.types = types;
        let encoder = TypedDataEncoder::new(data).unwrap();
        assert_eq!(
            encoder.encode_type("Group").unwrap(),
            "Group(Person[] members)Person(string name,address wallet)"
        );
    }

    #[test]
    fn test_unknown_primary_type() {
        let encoder = TypedDataEncoder::new(mail_data()).unwrap();
        assert!(matches!(
            encoder.encode_type("Letter"),
            Err(Error::UnknownType(name)) if name == "Letter"
        ));
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        let mut data = mail_data();
        data.types
            .get_mut("Person")
            .unwrap()
            .push(TypedField::new("1st", "string"));
        let err = TypedDataEncoder::new(data).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIdentifier { ref name, ref struct_name } if name == "1st" && struct_name == "Person"
        ));
    }

    #[test]
    fn test_invalid_type_rejected() {
        let mut data = mail_data();
        data.types
            .get_mut("Person")
            .unwrap()
            .push(TypedField::new("scores", "uint256[0]"));
        let err = TypedDataEncoder::new(data).unwrap_err();
        assert!(matches!(err, Error::InvalidType { ref type_name, .. } if type_name == "uint256[0]"));
    }

    #[test]
    fn test_fixed_array_encoding() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("values", "uint256[2]")]);
        let encoder = encoder_with(types);

        let mut values = TypedMessage::new();
        values.insert("values".to_string(), vec![1u64, 2].into());
        let encoded = encoder.encode_data("Test", &values).unwrap();

        let mut words = Vec::new();
        words.extend_from_slice(word(U256::from(1u64)).as_slice());
        words.extend_from_slice(word(U256::from(2u64)).as_slice());
        assert_eq!(&encoded[32..], keccak256(words).as_slice());
    }

    #[test]
    fn test_array_dimension_mismatch() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("values", "uint256[3]")]);
        let encoder = encoder_with(types);

        let mut values = TypedMessage::new();
        values.insert("values".to_string(), vec![1u64, 2].into());
        let err = encoder.encode_data("Test", &values).unwrap_err();
        assert!(matches!(
            err,
            Error::ArrayDimensionMismatch { ref actual, ref expected, .. }
                if actual == &vec![2] && expected == &vec![Some(3)]
        ));
    }

    #[test]
    fn test_nested_dynamic_array() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("grid", "uint8[][2]")]);
        let encoder = encoder_with(types);

        let mut values = TypedMessage::new();
        values.insert(
            "grid".to_string(),
            TypedValue::Array(vec![vec![1u64, 2].into(), vec![3u64, 4].into(), vec![5u64, 6].into()]),
        );
        let encoded = encoder.encode_data("Test", &values).unwrap();

        let words: Vec<u8> = (1u64..=6)
            .flat_map(|n| word(U256::from(n)).0)
            .collect();
        assert_eq!(&encoded[32..], keccak256(words).as_slice());
    }

    #[test]
    fn test_ragged_array_rejected() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("grid", "uint8[][]")]);
        let encoder = encoder_with(types);

        let mut values = TypedMessage::new();
        values.insert(
            "grid".to_string(),
            TypedValue::Array(vec![vec![1u64, 2].into(), vec![3u64].into()]),
        );
        assert!(matches!(
            encoder.encode_data("Test", &values),
            Err(Error::ArrayDimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_wrong_dimensionality_rejected() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("grid", "uint8[][]")]);
        let encoder = encoder_with(types);

        let mut values = TypedMessage::new();
        values.insert("grid".to_string(), vec![1u64, 2].into());
        assert!(matches!(
            encoder.encode_data("Test", &values),
            Err(Error::ArrayDimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_struct_array_leaves_use_encode_data() {
        let mut data = mail_data();
        data.types.insert(
            "Group".to_string(),
            vec![TypedField::new("members", "Person[]")],
        );
        let encoder = TypedDataEncoder::new(data).unwrap();

        let bob = person("Bob", address!("bBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"));
        let mut values = TypedMessage::new();
        values.insert("members".to_string(), TypedValue::Array(vec![bob.clone()]));
        let encoded = encoder.encode_data("Group", &values).unwrap();

        let TypedValue::Struct(bob_fields) = bob else {
            unreachable!()
        };
        let leaf = encoder.encode_data("Person", &bob_fields).unwrap();
        assert_eq!(&encoded[32..], keccak256(leaf).as_slice());
    }

    #[test]
    fn test_uint_overflow_rejected() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("small", "uint8")]);
        let encoder = encoder_with(types);

        let mut values = TypedMessage::new();
        values.insert("small".to_string(), 255u64.into());
        assert!(encoder.encode_data("Test", &values).is_ok());

        values.insert("small".to_string(), 256u64.into());
        assert!(matches!(
            encoder.encode_data("Test", &values),
            Err(Error::Overflow { ref field, .. }) if field == "small"
        ));
    }

    #[test]
    fn test_int_range_and_twos_complement() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("delta", "int8")]);
        let encoder = encoder_with(types);

        let mut values = TypedMessage::new();
        values.insert("delta".to_string(), TypedValue::Int(I256::try_from(-128i64).unwrap()));
        let encoded = encoder.encode_data("Test", &values).unwrap();
        assert_eq!(&encoded[32..63], &[0xff; 31]);
        assert_eq!(encoded[63], 0x80);

        values.insert("delta".to_string(), TypedValue::Int(I256::try_from(-129i64).unwrap()));
        assert!(matches!(encoder.encode_data("Test", &values), Err(Error::Overflow { .. })));

        values.insert("delta".to_string(), TypedValue::Int(I256::try_from(128i64).unwrap()));
        assert!(matches!(encoder.encode_data("Test", &values), Err(Error::Overflow { .. })));
    }

    #[test]
    fn test_fixed_bytes_right_padded() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("tag", "bytes4")]);
        let encoder = encoder_with(types);

        let mut values = TypedMessage::new();
        values.insert("tag".to_string(), Bytes::from(vec![0xf4, 0x72, 0x61, 0xb0]).into());
        let encoded = encoder.encode_data("Test", &values).unwrap();
        assert_eq!(&encoded[32..36], &[0xf4, 0x72, 0x61, 0xb0]);
        assert_eq!(&encoded[36..], &[0u8; 28]);

        values.insert("tag".to_string(), Bytes::from(vec![0xf4]).into());
        assert!(matches!(
            encoder.encode_data("Test", &values),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_wrong_value_kind_rejected() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("flag", "bool")]);
        let encoder = encoder_with(types);

        let mut values = TypedMessage::new();
        values.insert("flag".to_string(), "yes".into());
        assert!(matches!(
            encoder.encode_data("Test", &values),
            Err(Error::InvalidValue { ref field, ref type_name, .. }) if field == "flag" && type_name == "bool"
        ));
    }

    #[test]
    fn test_unsupported_elementary_type() {
        let mut types = Types::new();
        types.insert("Test".to_string(), vec![TypedField::new("ratio", "fixed128x18")]);
        let encoder = encoder_with(types);

        let mut values = TypedMessage::new();
        values.insert("ratio".to_string(), 1u64.into());
        assert!(matches!(
            encoder.encode_data("Test", &values),
            Err(Error::UnsupportedType { .. })
        ));
    }
}
