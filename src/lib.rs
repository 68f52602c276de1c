//! zrx-kit: 0x protocol order toolkit
//!
//! This is the root crate that provides benchmark and integration-test access
//! to the workspace. For actual functionality, use the individual crates:
//!
//! - `zrx-core`: EIP-712 hashing, order signing, exchange encoding, relayers
//! - `zrx-cli`: the `zrx` command-line front-end

pub use zrx_core as core;
pub use zrx_core::{Error, Result, ZrxKit};
