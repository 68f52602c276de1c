//! EIP-712 typed structured-data hashing.
//!
//! # Example
//!
//! ```ignore
//! use zrx_core::eip712::TypedDataEncoder;
//!
//! let encoder = TypedDataEncoder::from_json(document)?;
//! let digest = encoder.hash_structured_data()?;
//! ```

pub mod encoder;
pub mod json;
pub mod types;

pub use encoder::{validate_structured_data, TypedDataEncoder};
pub use types::{
    Eip712Domain, TypedData, TypedField, TypedMessage, TypedValue, Types, EIP712_DOMAIN_TYPE,
};
