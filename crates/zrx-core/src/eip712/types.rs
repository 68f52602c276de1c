//! Typed-data model: struct schemas, field values and the signing domain.

use alloy_primitives::{Address, Bytes, I256, U256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Name of the reserved domain struct.
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

/// One `(name, type)` entry of a struct schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Struct name to ordered field list.
pub type Types = HashMap<String, Vec<TypedField>>;

/// Field name to value for one struct instance.
pub type TypedMessage = BTreeMap<String, TypedValue>;

/// A value carried by a typed-data message.
///
/// Encoding dispatches on the tag together with the declared field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    String(String),
    Bytes(Bytes),
    Uint(U256),
    Int(I256),
    Address(Address),
    Bool(bool),
    Struct(TypedMessage),
    Array(Vec<TypedValue>),
}

impl TypedValue {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            TypedValue::String(_) => "string",
            TypedValue::Bytes(_) => "bytes",
            TypedValue::Uint(_) => "uint",
            TypedValue::Int(_) => "int",
            TypedValue::Address(_) => "address",
            TypedValue::Bool(_) => "bool",
            TypedValue::Struct(_) => "struct",
            TypedValue::Array(_) => "array",
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) => write!(f, "{:?}", s),
            TypedValue::Bytes(b) => write!(f, "{}", crate::hex_codec::to_hex_prefixed(b)),
            TypedValue::Uint(v) => write!(f, "{}", v),
            TypedValue::Int(v) => write!(f, "{}", v),
            TypedValue::Address(a) => write!(f, "{:#x}", a),
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", name, value)?;
                }
                write!(f, "}}")
            }
            TypedValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::String(value)
    }
}

impl From<U256> for TypedValue {
    fn from(value: U256) -> Self {
        TypedValue::Uint(value)
    }
}

impl From<u64> for TypedValue {
    fn from(value: u64) -> Self {
        TypedValue::Uint(U256::from(value))
    }
}

impl From<I256> for TypedValue {
    fn from(value: I256) -> Self {
        TypedValue::Int(value)
    }
}

impl From<Address> for TypedValue {
    fn from(value: Address) -> Self {
        TypedValue::Address(value)
    }
}

impl From<Bytes> for TypedValue {
    fn from(value: Bytes) -> Self {
        TypedValue::Bytes(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Bool(value)
    }
}

impl From<TypedMessage> for TypedValue {
    fn from(value: TypedMessage) -> Self {
        TypedValue::Struct(value)
    }
}

impl<T: Into<TypedValue>> From<Vec<T>> for TypedValue {
    fn from(value: Vec<T>) -> Self {
        TypedValue::Array(value.into_iter().map(Into::into).collect())
    }
}

/// Signing domain.
///
/// A `chain_id` of zero leaves the chain binding out of the domain hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Eip712Domain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// Field values keyed the way the `EIP712Domain` schema names them.
    pub fn to_message(&self) -> TypedMessage {
        let mut message = TypedMessage::new();
        message.insert("name".to_string(), self.name.clone().into());
        message.insert("version".to_string(), self.version.clone().into());
        if self.chain_id > 0 {
            message.insert("chainId".to_string(), self.chain_id.into());
        }
        message.insert(
            "verifyingContract".to_string(),
            self.verifying_contract.into(),
        );
        message
    }

    /// The canonical `EIP712Domain` schema for this domain.
    pub fn schema(&self) -> Vec<TypedField> {
        let mut fields = vec![
            TypedField::new("name", "string"),
            TypedField::new("version", "string"),
        ];
        if self.chain_id > 0 {
            fields.push(TypedField::new("chainId", "uint256"));
        }
        fields.push(TypedField::new("verifyingContract", "address"));
        fields
    }
}

/// A complete structured-data document: schemas, primary type, message and domain.
#[derive(Debug, Clone)]
pub struct TypedData {
    pub types: Types,
    pub primary_type: String,
    pub message: TypedMessage,
    pub domain: Eip712Domain,
}
