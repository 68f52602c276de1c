//! zrx Core Library
//!
//! EIP-712 hashing, 0x order signing, exchange call encoding, relayer clients
//! and transaction submission for the 0x protocol (v2 and v3 orders).

pub mod assets;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod eip712;
pub mod error;
pub mod hex_codec;
pub mod kit;
pub mod relayer;
pub mod serialization;
pub mod signing;

pub use error::{Error, Result};
pub use kit::ZrxKit;
