//! Order types for 0x exchange signing.
//!
//! Defines the order data structures used for EIP-712 signing, relayer
//! submission and on-chain settlement.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use super::domain::{ProtocolVersion, ORDER_TYPE};
use crate::eip712::{TypedData, TypedMessage, TypedValue, Types, EIP712_DOMAIN_TYPE};
use crate::serialization::{decimal_u256, lower_address, opt_prefixed_bytes, prefixed_bytes};
use crate::Result;

/// An unsigned 0x limit order.
///
/// Amounts travel as decimal strings and addresses as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Chain the order is bound to (v3 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(with = "lower_address")]
    pub exchange_address: Address,
    #[serde(with = "lower_address")]
    pub maker_address: Address,
    /// Zero for any taker.
    #[serde(with = "lower_address")]
    pub taker_address: Address,
    #[serde(with = "lower_address")]
    pub fee_recipient_address: Address,
    #[serde(with = "lower_address")]
    pub sender_address: Address,
    #[serde(with = "decimal_u256")]
    pub maker_asset_amount: U256,
    #[serde(with = "decimal_u256")]
    pub taker_asset_amount: U256,
    #[serde(with = "decimal_u256")]
    pub maker_fee: U256,
    #[serde(with = "decimal_u256")]
    pub taker_fee: U256,
    /// Unix seconds.
    #[serde(with = "decimal_u256")]
    pub expiration_time_seconds: U256,
    #[serde(with = "decimal_u256")]
    pub salt: U256,
    #[serde(with = "prefixed_bytes")]
    pub maker_asset_data: Bytes,
    #[serde(with = "prefixed_bytes")]
    pub taker_asset_data: Bytes,
    #[serde(
        default,
        with = "opt_prefixed_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub maker_fee_asset_data: Option<Bytes>,
    #[serde(
        default,
        with = "opt_prefixed_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub taker_fee_asset_data: Option<Bytes>,
}

impl Order {
    /// Field values keyed by their schema names.
    ///
    /// v3 fee asset data defaults to empty bytes when the order carries none.
    pub fn to_typed_message(&self, version: ProtocolVersion) -> TypedMessage {
        let mut message = TypedMessage::new();
        let mut put = |name: &str, value: TypedValue| {
            message.insert(name.to_string(), value);
        };

        put("makerAddress", self.maker_address.into());
        put("takerAddress", self.taker_address.into());
        put("feeRecipientAddress", self.fee_recipient_address.into());
        put("senderAddress", self.sender_address.into());
        put("makerAssetAmount", self.maker_asset_amount.into());
        put("takerAssetAmount", self.taker_asset_amount.into());
        put("makerFee", self.maker_fee.into());
        put("takerFee", self.taker_fee.into());
        put("expirationTimeSeconds", self.expiration_time_seconds.into());
        put("salt", self.salt.into());
        put("makerAssetData", self.maker_asset_data.clone().into());
        put("takerAssetData", self.taker_asset_data.clone().into());

        if version == ProtocolVersion::V3 {
            put(
                "makerFeeAssetData",
                self.maker_fee_asset_data.clone().unwrap_or_default().into(),
            );
            put(
                "takerFeeAssetData",
                self.taker_fee_asset_data.clone().unwrap_or_default().into(),
            );
        }

        message
    }

    /// The complete typed-data document for signing this order.
    pub fn typed_data(&self, version: ProtocolVersion) -> Result<TypedData> {
        let domain = version.domain(self.exchange_address, self.chain_id)?;

        let mut types = Types::new();
        types.insert(EIP712_DOMAIN_TYPE.to_string(), domain.schema());
        types.insert(ORDER_TYPE.to_string(), version.order_schema());

        Ok(TypedData {
            types,
            primary_type: ORDER_TYPE.to_string(),
            message: self.to_typed_message(version),
            domain,
        })
    }
}

/// An order plus its maker signature.
///
/// Produced by [`OrderSigner`](super::OrderSigner) or received from a relayer;
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOrder {
    #[serde(flatten)]
    order: Order,
    /// `v ‖ r ‖ s ‖ signatureType`.
    #[serde(with = "prefixed_bytes")]
    signature: Bytes,
}

impl SignedOrder {
    pub(crate) fn new(order: Order, signature: Bytes) -> Self {
        Self { order, signature }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn signature(&self) -> &Bytes {
        &self.signature
    }

    pub fn into_parts(self) -> (Order, Bytes) {
        (self.order, self.signature)
    }
}

impl std::ops::Deref for SignedOrder {
    type Target = Order;

    fn deref(&self) -> &Order {
        &self.order
    }
}

/// Current unix time in milliseconds, used as a default salt.
fn millis_salt() -> U256 {
    U256::from(chrono::Utc::now().timestamp_millis().max(0) as u64)
}

/// Order builder for creating orders with a fluent API.
#[derive(Debug, Clone, Default)]
pub struct OrderBuilder {
    chain_id: Option<u64>,
    exchange: Option<Address>,
    maker: Option<Address>,
    taker: Address,
    fee_recipient: Address,
    sender: Address,
    maker_asset_data: Option<Bytes>,
    taker_asset_data: Option<Bytes>,
    maker_asset_amount: Option<U256>,
    taker_asset_amount: Option<U256>,
    maker_fee: U256,
    taker_fee: U256,
    maker_fee_asset_data: Option<Bytes>,
    taker_fee_asset_data: Option<Bytes>,
    expiration_secs: Option<u64>,
    salt: Option<U256>,
}

impl OrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn exchange(mut self, exchange: Address) -> Self {
        self.exchange = Some(exchange);
        self
    }

    pub fn maker(mut self, maker: Address) -> Self {
        self.maker = Some(maker);
        self
    }

    pub fn taker(mut self, taker: Address) -> Self {
        self.taker = taker;
        self
    }

    pub fn fee_recipient(mut self, fee_recipient: Address) -> Self {
        self.fee_recipient = fee_recipient;
        self
    }

    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = sender;
        self
    }

    /// Asset given by the maker and its amount in base units.
    pub fn maker_asset(mut self, asset_data: Bytes, amount: U256) -> Self {
        self.maker_asset_data = Some(asset_data);
        self.maker_asset_amount = Some(amount);
        self
    }

    /// Asset wanted from the taker and its amount in base units.
    pub fn taker_asset(mut self, asset_data: Bytes, amount: U256) -> Self {
        self.taker_asset_data = Some(asset_data);
        self.taker_asset_amount = Some(amount);
        self
    }

    pub fn maker_fee(mut self, fee: U256, fee_asset_data: Option<Bytes>) -> Self {
        self.maker_fee = fee;
        self.maker_fee_asset_data = fee_asset_data;
        self
    }

    pub fn taker_fee(mut self, fee: U256, fee_asset_data: Option<Bytes>) -> Self {
        self.taker_fee = fee;
        self.taker_fee_asset_data = fee_asset_data;
        self
    }

    /// Set expiration in seconds from now.
    pub fn expires_in(mut self, seconds: u64) -> Self {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.expiration_secs = Some(now.saturating_add(seconds));
        self
    }

    /// Set absolute expiration timestamp.
    pub fn expires_at(mut self, timestamp: u64) -> Self {
        self.expiration_secs = Some(timestamp);
        self
    }

    pub fn salt(mut self, salt: U256) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Build the order.
    ///
    /// Returns None if the exchange, maker, either asset or the expiration
    /// is missing. Orders bound to a chain always carry fee asset data,
    /// empty when no fee asset was given.
    pub fn build(self) -> Option<Order> {
        let (maker_fee_asset_data, taker_fee_asset_data) = match self.chain_id {
            Some(_) => (
                Some(self.maker_fee_asset_data.unwrap_or_default()),
                Some(self.taker_fee_asset_data.unwrap_or_default()),
            ),
            None => (self.maker_fee_asset_data, self.taker_fee_asset_data),
        };

        Some(Order {
            chain_id: self.chain_id,
            exchange_address: self.exchange?,
            maker_address: self.maker?,
            taker_address: self.taker,
            fee_recipient_address: self.fee_recipient,
            sender_address: self.sender,
            maker_asset_amount: self.maker_asset_amount?,
            taker_asset_amount: self.taker_asset_amount?,
            maker_fee: self.maker_fee,
            taker_fee: self.taker_fee,
            expiration_time_seconds: U256::from(self.expiration_secs?),
            salt: self.salt.unwrap_or_else(millis_salt),
            maker_asset_data: self.maker_asset_data?,
            taker_asset_data: self.taker_asset_data?,
            maker_fee_asset_data,
            taker_fee_asset_data,
        })
    }
}
