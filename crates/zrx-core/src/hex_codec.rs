//! `0x`-prefixed hex helpers shared by the codecs and wire types.

use crate::Result;

/// Lowercase hex with a `0x` prefix.
pub fn to_hex_prefixed(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes.as_ref()))
}

/// Strip a leading `0x` / `0X` if present.
pub fn clear_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Ensure the string carries a `0x` prefix.
pub fn prefixed(value: &str) -> String {
    format!("0x{}", clear_prefix(value))
}

/// Decode hex with or without a prefix.
pub fn decode_prefixed(value: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(clear_prefix(value))?)
}
