//! Call data for the 0x exchange contract.
//!
//! Orders travel as the 12-field tuple
//! `(address,address,address,address,uint256×6,bytes,bytes)`; selectors are
//! derived from the canonical function signatures by `sol!`.

use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::{sol_data, SolCall, SolType};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::signing::{Order, SignedOrder};
use crate::{Error, Result};

pub mod abi {
    use alloy_sol_types::sol;

    sol! {
        struct OrderTuple {
            address makerAddress;
            address takerAddress;
            address feeRecipientAddress;
            address senderAddress;
            uint256 makerAssetAmount;
            uint256 takerAssetAmount;
            uint256 makerFee;
            uint256 takerFee;
            uint256 expirationTimeSeconds;
            uint256 salt;
            bytes makerAssetData;
            bytes takerAssetData;
        }

        struct OrderInfoTuple {
            uint256 orderStatus;
            bytes32 orderHash;
            uint256 orderTakerAssetFilledAmount;
        }

        function fillOrder(OrderTuple order, uint256 takerAssetFillAmount, bytes signature);
        function marketBuyOrders(OrderTuple[] orders, uint256 makerAssetFillAmount, bytes[] signatures);
        function marketSellOrders(OrderTuple[] orders, uint256 takerAssetFillAmount, bytes[] signatures);
        function cancelOrder(OrderTuple order);
        function batchCancelOrders(OrderTuple[] orders);
        function getOrdersInfo(OrderTuple[] orders) returns (OrderInfoTuple[] ordersInfo);
    }
}

/// Exchange functions this crate encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeFunction {
    FillOrder,
    MarketBuyOrders,
    MarketSellOrders,
    CancelOrder,
    BatchCancelOrders,
    GetOrdersInfo,
}

impl ExchangeFunction {
    pub fn name(&self) -> &'static str {
        match self {
            ExchangeFunction::FillOrder => "fillOrder",
            ExchangeFunction::MarketBuyOrders => "marketBuyOrders",
            ExchangeFunction::MarketSellOrders => "marketSellOrders",
            ExchangeFunction::CancelOrder => "cancelOrder",
            ExchangeFunction::BatchCancelOrders => "batchCancelOrders",
            ExchangeFunction::GetOrdersInfo => "getOrdersInfo",
        }
    }

    pub fn signature(&self) -> &'static str {
        match self {
            ExchangeFunction::FillOrder => abi::fillOrderCall::SIGNATURE,
            ExchangeFunction::MarketBuyOrders => abi::marketBuyOrdersCall::SIGNATURE,
            ExchangeFunction::MarketSellOrders => abi::marketSellOrdersCall::SIGNATURE,
            ExchangeFunction::CancelOrder => abi::cancelOrderCall::SIGNATURE,
            ExchangeFunction::BatchCancelOrders => abi::batchCancelOrdersCall::SIGNATURE,
            ExchangeFunction::GetOrdersInfo => abi::getOrdersInfoCall::SIGNATURE,
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        match self {
            ExchangeFunction::FillOrder => abi::fillOrderCall::SELECTOR,
            ExchangeFunction::MarketBuyOrders => abi::marketBuyOrdersCall::SELECTOR,
            ExchangeFunction::MarketSellOrders => abi::marketSellOrdersCall::SELECTOR,
            ExchangeFunction::CancelOrder => abi::cancelOrderCall::SELECTOR,
            ExchangeFunction::BatchCancelOrders => abi::batchCancelOrdersCall::SELECTOR,
            ExchangeFunction::GetOrdersInfo => abi::getOrdersInfoCall::SELECTOR,
        }
    }
}

impl fmt::Display for ExchangeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// On-chain status of an order as reported by `getOrdersInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Invalid = 0,
    InvalidMakerAssetAmount = 1,
    InvalidTakerAssetAmount = 2,
    Fillable = 3,
    Expired = 4,
    FullyFilled = 5,
    Cancelled = 6,
}

impl TryFrom<U256> for OrderStatus {
    type Error = Error;

    fn try_from(code: U256) -> Result<Self> {
        Ok(match u8::try_from(code).ok() {
            Some(0) => OrderStatus::Invalid,
            Some(1) => OrderStatus::InvalidMakerAssetAmount,
            Some(2) => OrderStatus::InvalidTakerAssetAmount,
            Some(3) => OrderStatus::Fillable,
            Some(4) => OrderStatus::Expired,
            Some(5) => OrderStatus::FullyFilled,
            Some(6) => OrderStatus::Cancelled,
            _ => {
                return Err(Error::Order {
                    message: format!("unknown order status code {}", code),
                })
            }
        })
    }
}

/// Decoded `getOrdersInfo` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderInfo {
    pub status: OrderStatus,
    pub order_hash: B256,
    pub taker_asset_filled_amount: U256,
}

impl From<&Order> for abi::OrderTuple {
    fn from(order: &Order) -> Self {
        Self {
            makerAddress: order.maker_address,
            takerAddress: order.taker_address,
            feeRecipientAddress: order.fee_recipient_address,
            senderAddress: order.sender_address,
            makerAssetAmount: order.maker_asset_amount,
            takerAssetAmount: order.taker_asset_amount,
            makerFee: order.maker_fee,
            takerFee: order.taker_fee,
            expirationTimeSeconds: order.expiration_time_seconds,
            salt: order.salt,
            makerAssetData: order.maker_asset_data.clone(),
            takerAssetData: order.taker_asset_data.clone(),
        }
    }
}

fn non_empty<'a>(function: ExchangeFunction, orders: &'a [SignedOrder]) -> Result<&'a [SignedOrder]> {
    if orders.is_empty() {
        return Err(Error::Order {
            message: format!("{} requires at least one order", function),
        });
    }
    Ok(orders)
}

fn tuples(orders: &[SignedOrder]) -> Vec<abi::OrderTuple> {
    orders.iter().map(|o| abi::OrderTuple::from(o.order())).collect()
}

fn signatures(orders: &[SignedOrder]) -> Vec<Bytes> {
    orders.iter().map(|o| o.signature().clone()).collect()
}

/// `fillOrder(order, takerAssetFillAmount, signature)`.
pub fn encode_fill_order(order: &SignedOrder, taker_asset_fill_amount: U256) -> Bytes {
    abi::fillOrderCall {
        order: order.order().into(),
        takerAssetFillAmount: taker_asset_fill_amount,
        signature: order.signature().clone(),
    }
    .abi_encode()
    .into()
}

/// `marketBuyOrders(orders, makerAssetFillAmount, signatures)`.
pub fn encode_market_buy_orders(orders: &[SignedOrder], maker_asset_fill_amount: U256) -> Result<Bytes> {
    let orders = non_empty(ExchangeFunction::MarketBuyOrders, orders)?;
    Ok(abi::marketBuyOrdersCall {
        orders: tuples(orders),
        makerAssetFillAmount: maker_asset_fill_amount,
        signatures: signatures(orders),
    }
    .abi_encode()
    .into())
}

/// `marketSellOrders(orders, takerAssetFillAmount, signatures)`.
pub fn encode_market_sell_orders(orders: &[SignedOrder], taker_asset_fill_amount: U256) -> Result<Bytes> {
    let orders = non_empty(ExchangeFunction::MarketSellOrders, orders)?;
    Ok(abi::marketSellOrdersCall {
        orders: tuples(orders),
        takerAssetFillAmount: taker_asset_fill_amount,
        signatures: signatures(orders),
    }
    .abi_encode()
    .into())
}

/// `cancelOrder(order)`.
pub fn encode_cancel_order(order: &SignedOrder) -> Bytes {
    abi::cancelOrderCall {
        order: order.order().into(),
    }
    .abi_encode()
    .into()
}

/// `batchCancelOrders(orders)`.
pub fn encode_batch_cancel_orders(orders: &[SignedOrder]) -> Result<Bytes> {
    let orders = non_empty(ExchangeFunction::BatchCancelOrders, orders)?;
    Ok(abi::batchCancelOrdersCall {
        orders: tuples(orders),
    }
    .abi_encode()
    .into())
}

/// `getOrdersInfo(orders)`.
pub fn encode_get_orders_info(orders: &[SignedOrder]) -> Result<Bytes> {
    let orders = non_empty(ExchangeFunction::GetOrdersInfo, orders)?;
    Ok(abi::getOrdersInfoCall {
        orders: tuples(orders),
    }
    .abi_encode()
    .into())
}

/// Decode the `(uint256,bytes32,uint256)[]` returned by `getOrdersInfo`.
///
/// Any malformed entry fails the whole decode.
pub fn decode_orders_info(data: &[u8]) -> Result<Vec<OrderInfo>> {
    let decoded = <sol_data::Array<abi::OrderInfoTuple> as SolType>::abi_decode(data)?;
    debug!(count = decoded.len(), "Decoded orders info");

    decoded
        .into_iter()
        .map(|info| {
            Ok(OrderInfo {
                status: OrderStatus::try_from(info.orderStatus)?,
                order_hash: info.orderHash,
                taker_asset_filled_amount: info.orderTakerAssetFilledAmount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::erc20_asset_data;
    use crate::signing::OrderBuilder;
    use alloy_primitives::{address, keccak256};

    fn signed(salt: u64) -> SignedOrder {
        let order = OrderBuilder::new()
            .exchange(address!("35dd2932454449b14cee11a94d3674a936d5d7b2"))
            .maker(address!("e2507b493bef003030f0a053d55af80237a44c64"))
            .maker_asset(
                erc20_asset_data(address!("2002d3812f58e35f0ea1ffbf80a75a38c32175fa")),
                U256::from(10u64),
            )
            .taker_asset(
                erc20_asset_data(address!("d0a1e359811322d97991e03f863a0c30c2cf029c")),
                U256::from(20u64),
            )
            .expires_at(1561628788)
            .salt(U256::from(salt))
            .build()
            .unwrap();
        SignedOrder::new(order, Bytes::from(vec![0x1c; 66]))
    }

    fn info_tuple(status: u64, hash: B256, filled: u64) -> abi::OrderInfoTuple {
        abi::OrderInfoTuple {
            orderStatus: U256::from(status),
            orderHash: hash,
            orderTakerAssetFilledAmount: U256::from(filled),
        }
    }

    const ORDER_TUPLE: &str = "(address,address,address,address,uint256,uint256,uint256,uint256,uint256,uint256,bytes,bytes)";

    #[test]
    fn test_selectors_match_canonical_signatures() {
        let cases = [
            (ExchangeFunction::FillOrder, format!("fillOrder({},uint256,bytes)", ORDER_TUPLE)),
            (
                ExchangeFunction::MarketBuyOrders,
                format!("marketBuyOrders({}[],uint256,bytes[])", ORDER_TUPLE),
            ),
            (
                ExchangeFunction::MarketSellOrders,
                format!("marketSellOrders({}[],uint256,bytes[])", ORDER_TUPLE),
            ),
            (ExchangeFunction::CancelOrder, format!("cancelOrder({})", ORDER_TUPLE)),
            (
                ExchangeFunction::BatchCancelOrders,
                format!("batchCancelOrders({}[])", ORDER_TUPLE),
            ),
            (ExchangeFunction::GetOrdersInfo, format!("getOrdersInfo({}[])", ORDER_TUPLE)),
        ];
        for (function, signature) in cases {
            assert_eq!(function.signature(), signature);
            assert_eq!(function.selector(), keccak256(signature.as_bytes())[..4]);
        }
    }

    #[test]
    fn test_fill_order_layout() {
        let order = signed(1);
        let data = encode_fill_order(&order, U256::from(5u64));
        assert_eq!(data[..4], ExchangeFunction::FillOrder.selector());

        let decoded = abi::fillOrderCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.order.makerAddress, order.maker_address);
        assert_eq!(decoded.order.salt, U256::from(1u64));
        assert_eq!(decoded.takerAssetFillAmount, U256::from(5u64));
        assert_eq!(&decoded.signature, order.signature());
    }

    #[test]
    fn test_market_orders_carry_all_signatures() {
        let orders = vec![signed(1), signed(2)];
        let data = encode_market_sell_orders(&orders, U256::from(7u64)).unwrap();
        let decoded = abi::marketSellOrdersCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.orders.len(), 2);
        assert_eq!(decoded.orders[1].salt, U256::from(2u64));
        assert_eq!(decoded.signatures.len(), 2);

        let buy = encode_market_buy_orders(&orders, U256::from(7u64)).unwrap();
        assert_eq!(buy[..4], ExchangeFunction::MarketBuyOrders.selector());
        assert_eq!(buy[4..], data[4..]);
    }

    #[test]
    fn test_cancel_encodings() {
        let order = signed(3);
        let single = encode_cancel_order(&order);
        assert_eq!(
            abi::cancelOrderCall::abi_decode(&single).unwrap().order.salt,
            U256::from(3u64)
        );

        let batch = encode_batch_cancel_orders(&[order.clone(), signed(4)]).unwrap();
        let decoded = abi::batchCancelOrdersCall::abi_decode(&batch).unwrap();
        assert_eq!(decoded.orders.len(), 2);
    }

    #[test]
    fn test_empty_batches_rejected() {
        assert!(matches!(encode_batch_cancel_orders(&[]), Err(Error::Order { .. })));
        assert!(matches!(
            encode_market_buy_orders(&[], U256::ZERO),
            Err(Error::Order { .. })
        ));
        assert!(encode_get_orders_info(&[]).is_err());
    }

    #[test]
    fn test_orders_info_round_trip() {
        let hashes = [B256::repeat_byte(0x11), B256::repeat_byte(0x22)];
        let returned = vec![info_tuple(3, hashes[0], 0), info_tuple(5, hashes[1], 1_000)];
        let data = <sol_data::Array<abi::OrderInfoTuple> as SolType>::abi_encode(&returned);

        let infos = decode_orders_info(&data).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].status, OrderStatus::Fillable);
        assert_eq!(infos[0].order_hash, hashes[0]);
        assert_eq!(infos[1].status, OrderStatus::FullyFilled);
        assert_eq!(infos[1].taker_asset_filled_amount, U256::from(1_000u64));
    }

    #[test]
    fn test_unknown_status_fails_whole_decode() {
        let returned = vec![info_tuple(3, B256::ZERO, 0), info_tuple(9, B256::ZERO, 0)];
        let data = <sol_data::Array<abi::OrderInfoTuple> as SolType>::abi_encode(&returned);
        assert!(matches!(decode_orders_info(&data), Err(Error::Order { .. })));
    }

    #[test]
    fn test_truncated_return_data_rejected() {
        let returned = vec![info_tuple(3, B256::ZERO, 0)];
        let data = <sol_data::Array<abi::OrderInfoTuple> as SolType>::abi_encode(&returned);
        assert!(matches!(
            decode_orders_info(&data[..data.len() - 32]),
            Err(Error::Abi(_))
        ));
    }
}
