//! Signing module for 0x exchange orders.
//!
//! This module builds the EIP-712 typed-data message for an order, signs its
//! digest and validates packed maker signatures.
//!
//! # Architecture
//!
//! ```text
//! OrderBuilder ──► Order
//!                    │
//!                    ▼
//!              Order::typed_data (v2 / v3 schema + domain)
//!                    │
//!                    ▼
//!              TypedDataEncoder ── digest ──► OrderSigner ──► SignedOrder
//!                                                                 │
//!                      is_valid_signature ◄──────────────────────┤
//!                                                                 ▼
//!                                            RelayerManager / ExchangeClient
//! ```
//!
//! # Example
//!
//! ```ignore
//! use zrx_core::signing::{NetworkType, OrderSigner, ProtocolVersion};
//! use zrx_core::assets::AssetItem;
//!
//! let signer = OrderSigner::from_env(ProtocolVersion::V3)?;
//! let network = NetworkType::Ropsten;
//!
//! let order = signer
//!     .order_builder()
//!     .chain_id(network.id())
//!     .exchange(network.exchange_address())
//!     .maker_asset(AssetItem::for_address(network.weth_address()).asset_data, maker_amount)
//!     .taker_asset(AssetItem::for_address(token).asset_data, taker_amount)
//!     .expires_in(3600)
//!     .build()
//!     .unwrap();
//!
//! let signed_order = signer.sign_order(&order)?;
//! ```

pub mod domain;
pub mod order_types;
pub mod signer;

pub use domain::{
    NetworkType, OrderSide, ProtocolVersion, SignatureType, EXCHANGE_DOMAIN_NAME, ORDER_TYPE,
};

pub use order_types::{Order, OrderBuilder, SignedOrder};

pub use signer::{is_valid_signature, order_hash, signature_type, OrderSigner, SIGNATURE_LENGTH};
