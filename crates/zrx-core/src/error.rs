//! Error types for the 0x order toolkit.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("ABI decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Invalid identifier {name} in {struct_name}")]
    InvalidIdentifier { name: String, struct_name: String },

    #[error("Invalid type {type_name} in {struct_name}")]
    InvalidType {
        type_name: String,
        struct_name: String,
    },

    #[error("Unknown struct type: {0}")]
    UnknownType(String),

    #[error("Unsupported field type {type_name} for field {field}")]
    UnsupportedType { field: String, type_name: String },

    #[error("Array data {value} has dimensions {actual:?}, but expected dimensions are {expected:?}")]
    ArrayDimensionMismatch {
        value: String,
        actual: Vec<usize>,
        expected: Vec<Option<usize>>,
    },

    #[error("Invalid value for field {field} of type {type_name}: {message}")]
    InvalidValue {
        field: String,
        type_name: String,
        message: String,
    },

    #[error("Value for field {field} overflows {type_name}")]
    Overflow { field: String, type_name: String },

    #[error("Unsupported signature type: {0}")]
    UnsupportedSignatureType(u8),

    #[error("Invalid signature: {message}")]
    InvalidSignature { message: String },

    #[error("Signing error: {message}")]
    Signing { message: String },

    #[error("Asset proxy {proxy} is not implemented")]
    NotImplemented { proxy: String },

    #[error("Relayer index {index} is out of bounds ({total} relayers configured)")]
    RelayerIndexOutOfBounds { index: usize, total: usize },

    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },

    #[error("Chain error: {message}")]
    Chain { message: String },

    #[error("Order error: {message}")]
    Order { message: String },
}

impl Error {
    /// Whether a relayer request that failed with this error may be retried
    /// against the next configured backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Api { .. } | Error::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
