//! Contract call data and transaction building for the exchange, ERC-20
//! proxies and WETH.

pub mod exchange;
pub mod token;
pub mod transaction;

pub use exchange::{
    decode_orders_info, encode_batch_cancel_orders, encode_cancel_order, encode_fill_order,
    encode_get_orders_info, encode_market_buy_orders, encode_market_sell_orders,
    ExchangeFunction, OrderInfo, OrderStatus,
};
pub use token::{TokenFunction, MAX_ALLOWANCE};
pub use transaction::{
    protocol_fee, sign_transaction, wei_to_eth, DefaultGasProvider, ExchangeTransactionBuilder,
    GasInfoProvider, SignedTransaction, ETH_DECIMALS, PROTOCOL_FEE_MULTIPLIER,
};
