//! Serde adapters for the relayer wire format.
//!
//! Relayers exchange 256-bit integers as decimal strings and byte strings as
//! `0x` hex. Native JSON numbers are never emitted for amounts.

use serde::{de, Deserialize, Deserializer, Serializer};
use std::fmt;

/// `U256` as a decimal string.
pub mod decimal_u256 {
    use super::*;
    use alloy_primitives::U256;

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a u256 encoded as a decimal string")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                U256::from_str_radix(s, 10).map_err(|err| {
                    de::Error::custom(format!("failed to decode {:?} as decimal u256: {}", s, err))
                })
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

/// `U256` that may arrive as either a JSON number or a decimal string.
///
/// Always serialized as a string.
pub mod string_or_number {
    use super::*;
    use alloy_primitives::U256;

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        super::decimal_u256::serialize(value, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(U256::from(n)),
            Raw::Text(s) => U256::from_str_radix(&s, 10).map_err(|err| {
                de::Error::custom(format!("failed to decode {:?} as u256: {}", s, err))
            }),
        }
    }
}

/// `Address` as lowercase `0x` hex.
pub mod lower_address {
    use super::*;
    use alloy_primitives::Address;

    pub fn serialize<S>(value: &Address, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:#x}", value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Address>()
            .map_err(|err| de::Error::custom(format!("invalid address {:?}: {}", s, err)))
    }
}

/// `Bytes` as `0x` hex.
pub mod prefixed_bytes {
    use super::*;
    use alloy_primitives::Bytes;

    pub fn serialize<S>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&crate::hex_codec::to_hex_prefixed(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        crate::hex_codec::decode_prefixed(&s)
            .map(Bytes::from)
            .map_err(de::Error::custom)
    }
}

/// Optional `Bytes`; absent or `null` maps to `None`.
pub mod opt_prefixed_bytes {
    use super::*;
    use alloy_primitives::Bytes;

    pub fn serialize<S>(value: &Option<Bytes>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => super::prefixed_bytes::serialize(bytes, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|s| crate::hex_codec::decode_prefixed(&s).map(Bytes::from))
            .transpose()
            .map_err(de::Error::custom)
    }
}
