//! Unsigned and signed legacy transactions against the exchange and token
//! contracts.
//!
//! Nonces are supplied by the caller; nothing here talks to a node.

use alloy_consensus::transaction::RlpEcdsaEncodableTx;
use alloy_consensus::TxLegacy;
use alloy_network::TxSignerSync;
use alloy_primitives::{keccak256, Address, Bytes, TxKind, B256, U256};
use alloy_signer_local::PrivateKeySigner;
use rust_decimal::Decimal;
use tracing::debug;

use super::exchange::{self, ExchangeFunction};
use super::token::{self, TokenFunction};
use crate::signing::{OrderSide, SignedOrder};
use crate::{Error, Result};

/// Gas charged by the exchange per filled order, multiplied by the gas price.
pub const PROTOCOL_FEE_MULTIPLIER: u64 = 150_000;

pub const ETH_DECIMALS: u32 = 18;

/// Gas limits and prices keyed by contract function name.
pub trait GasInfoProvider: Send + Sync {
    fn gas_limit(&self, function: &str) -> u64;

    /// Price in wei. The empty name asks for the default price.
    fn gas_price(&self, function: &str) -> u128;
}

/// Built-in per-function limits and one price (5 gwei unless set).
///
/// A configured gas limit replaces the built-in table for every function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultGasProvider {
    gas_price: u128,
    gas_limit: Option<u64>,
}

impl DefaultGasProvider {
    pub const DEFAULT_GAS_PRICE: u128 = 5_000_000_000;

    pub fn with_gas_price(gas_price: u128) -> Self {
        Self {
            gas_price,
            gas_limit: None,
        }
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

impl Default for DefaultGasProvider {
    fn default() -> Self {
        Self::with_gas_price(Self::DEFAULT_GAS_PRICE)
    }
}

impl GasInfoProvider for DefaultGasProvider {
    fn gas_limit(&self, function: &str) -> u64 {
        if let Some(limit) = self.gas_limit {
            return limit;
        }
        match function {
            "deposit" => 40_000,
            "withdraw" => 60_000,
            "approve" => 80_000,
            _ => 400_000,
        }
    }

    fn gas_price(&self, _function: &str) -> u128 {
        self.gas_price
    }
}

/// `PROTOCOL_FEE_MULTIPLIER × orders × gas_price`, in wei.
pub fn protocol_fee(gas: &dyn GasInfoProvider, order_count: usize) -> U256 {
    U256::from(PROTOCOL_FEE_MULTIPLIER)
        * U256::from(order_count)
        * U256::from(gas.gas_price(""))
}

/// Convert a wei amount to ether.
pub fn wei_to_eth(wei: U256) -> Result<Decimal> {
    let wei = i128::try_from(wei).map_err(|_| Error::Order {
        message: format!("{} wei does not fit a decimal", wei),
    })?;
    Decimal::try_from_i128_with_scale(wei, ETH_DECIMALS)
        .map(|eth| eth.normalize())
        .map_err(|e| Error::Order {
            message: format!("{} wei does not fit a decimal: {}", wei, e),
        })
}

/// Signed RLP bytes ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub hash: B256,
}

/// Sign a legacy transaction (EIP-155 when it carries a chain id).
pub fn sign_transaction(signer: &PrivateKeySigner, mut tx: TxLegacy) -> Result<SignedTransaction> {
    let sig = signer
        .sign_transaction_sync(&mut tx)
        .map_err(|e| Error::Signing {
            message: format!("failed to sign transaction: {}", e),
        })?;

    let mut encoded = Vec::new();
    tx.rlp_encode_signed(&sig, &mut encoded);

    let hash = keccak256(&encoded);
    debug!(tx_hash = %hash, nonce = tx.nonce, "Signed transaction");
    Ok(SignedTransaction {
        raw: encoded.into(),
        hash,
    })
}

/// Builds exchange, ERC-20 and WETH transactions for one chain.
#[derive(Debug, Clone)]
pub struct ExchangeTransactionBuilder<G = DefaultGasProvider> {
    chain_id: u64,
    gas: G,
}

impl<G: GasInfoProvider> ExchangeTransactionBuilder<G> {
    pub fn new(chain_id: u64, gas: G) -> Self {
        Self { chain_id, gas }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn gas(&self) -> &G {
        &self.gas
    }

    fn transaction(&self, nonce: u64, to: Address, function: &str, input: Bytes, value: U256) -> TxLegacy {
        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce,
            gas_price: self.gas.gas_price(function),
            gas_limit: self.gas.gas_limit(function),
            to: TxKind::Call(to),
            value,
            input,
        };
        debug!(
            function,
            to = %to,
            nonce,
            gas_limit = tx.gas_limit,
            gas_price = tx.gas_price,
            "Built transaction"
        );
        tx
    }

    fn exchange_call(&self, nonce: u64, target: Address, function: ExchangeFunction, input: Bytes) -> TxLegacy {
        self.transaction(nonce, target, function.name(), input, U256::ZERO)
    }

    pub fn fill_order(&self, nonce: u64, order: &SignedOrder, taker_asset_fill_amount: U256) -> TxLegacy {
        self.exchange_call(
            nonce,
            order.exchange_address,
            ExchangeFunction::FillOrder,
            exchange::encode_fill_order(order, taker_asset_fill_amount),
        )
    }

    pub fn market_buy_orders(
        &self,
        nonce: u64,
        orders: &[SignedOrder],
        maker_asset_fill_amount: U256,
    ) -> Result<TxLegacy> {
        let input = exchange::encode_market_buy_orders(orders, maker_asset_fill_amount)?;
        Ok(self.exchange_call(nonce, orders[0].exchange_address, ExchangeFunction::MarketBuyOrders, input))
    }

    pub fn market_sell_orders(
        &self,
        nonce: u64,
        orders: &[SignedOrder],
        taker_asset_fill_amount: U256,
    ) -> Result<TxLegacy> {
        let input = exchange::encode_market_sell_orders(orders, taker_asset_fill_amount)?;
        Ok(self.exchange_call(nonce, orders[0].exchange_address, ExchangeFunction::MarketSellOrders, input))
    }

    /// Take the opposite side of a book.
    ///
    /// Filling asks buys the maker asset; filling bids sells the taker asset.
    pub fn fill_by_side(
        &self,
        nonce: u64,
        side: OrderSide,
        orders: &[SignedOrder],
        fill_amount: U256,
    ) -> Result<TxLegacy> {
        match side {
            OrderSide::Ask => self.market_buy_orders(nonce, orders, fill_amount),
            OrderSide::Bid => self.market_sell_orders(nonce, orders, fill_amount),
        }
    }

    pub fn cancel_order(&self, nonce: u64, order: &SignedOrder) -> TxLegacy {
        self.exchange_call(
            nonce,
            order.exchange_address,
            ExchangeFunction::CancelOrder,
            exchange::encode_cancel_order(order),
        )
    }

    pub fn batch_cancel_orders(&self, nonce: u64, orders: &[SignedOrder]) -> Result<TxLegacy> {
        let input = exchange::encode_batch_cancel_orders(orders)?;
        Ok(self.exchange_call(nonce, orders[0].exchange_address, ExchangeFunction::BatchCancelOrders, input))
    }

    pub fn approve(&self, nonce: u64, token_address: Address, spender: Address, amount: U256) -> TxLegacy {
        self.transaction(
            nonce,
            token_address,
            TokenFunction::Approve.name(),
            token::encode_approve(spender, amount),
            U256::ZERO,
        )
    }

    /// Wrap `amount` wei into WETH.
    pub fn deposit(&self, nonce: u64, weth: Address, amount: U256) -> TxLegacy {
        self.transaction(nonce, weth, TokenFunction::Deposit.name(), token::encode_deposit(), amount)
    }

    pub fn withdraw(&self, nonce: u64, weth: Address, amount: U256) -> TxLegacy {
        self.transaction(
            nonce,
            weth,
            TokenFunction::Withdraw.name(),
            token::encode_withdraw(amount),
            U256::ZERO,
        )
    }

    pub fn protocol_fee(&self, order_count: usize) -> U256 {
        protocol_fee(&self.gas, order_count)
    }

    pub fn protocol_fee_in_eth(&self, order_count: usize) -> Result<Decimal> {
        wei_to_eth(self.protocol_fee(order_count))
    }

    /// Gas limit × price of a function, in ether.
    pub fn estimated_cost_in_eth(&self, function: &str) -> Result<Decimal> {
        let wei = U256::from(self.gas.gas_limit(function)) * U256::from(self.gas.gas_price(function));
        wei_to_eth(wei)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::erc20_asset_data;
    use crate::signing::{OrderSigner, ProtocolVersion};
    use alloy_primitives::address;
    use std::str::FromStr;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const EXCHANGE: Address = address!("35dd2932454449b14cee11a94d3674a936d5d7b2");
    const WETH: Address = address!("d0a1e359811322d97991e03f863a0c30c2cf029c");

    fn signer() -> OrderSigner {
        OrderSigner::from_private_key(KEY, ProtocolVersion::V2).unwrap()
    }

    fn signed_order(signer: &OrderSigner, salt: u64) -> SignedOrder {
        let order = signer
            .order_builder()
            .exchange(EXCHANGE)
            .maker_asset(erc20_asset_data(WETH), U256::from(10u64))
            .taker_asset(
                erc20_asset_data(address!("2002d3812f58e35f0ea1ffbf80a75a38c32175fa")),
                U256::from(20u64),
            )
            .expires_at(1561628788)
            .salt(U256::from(salt))
            .build()
            .unwrap();
        signer.sign_order(&order).unwrap()
    }

    fn builder() -> ExchangeTransactionBuilder {
        ExchangeTransactionBuilder::new(42, DefaultGasProvider::default())
    }

    #[test]
    fn test_default_gas_table() {
        let gas = DefaultGasProvider::default();
        assert_eq!(gas.gas_limit("deposit"), 40_000);
        assert_eq!(gas.gas_limit("withdraw"), 60_000);
        assert_eq!(gas.gas_limit("approve"), 80_000);
        assert_eq!(gas.gas_limit("fillOrder"), 400_000);
        assert_eq!(gas.gas_price("marketBuyOrders"), 5_000_000_000);
    }

    #[test]
    fn test_protocol_fee() {
        let builder = builder();
        assert_eq!(builder.protocol_fee(2), U256::from(1_500_000_000_000_000u64));
        assert_eq!(
            builder.protocol_fee_in_eth(2).unwrap(),
            Decimal::from_str("0.0015").unwrap()
        );
        assert_eq!(builder.protocol_fee(0), U256::ZERO);
    }

    #[test]
    fn test_estimated_cost() {
        assert_eq!(
            builder().estimated_cost_in_eth("marketBuyOrders").unwrap(),
            Decimal::from_str("0.002").unwrap()
        );
    }

    #[test]
    fn test_wei_to_eth_overflow() {
        assert!(wei_to_eth(U256::MAX).is_err());
    }

    #[test]
    fn test_fill_by_side_mapping() {
        let signer = signer();
        let orders = vec![signed_order(&signer, 1)];
        let builder = builder();

        let ask = builder.fill_by_side(7, OrderSide::Ask, &orders, U256::from(5u64)).unwrap();
        assert_eq!(ask.input[..4], ExchangeFunction::MarketBuyOrders.selector());

        let bid = builder.fill_by_side(7, OrderSide::Bid, &orders, U256::from(5u64)).unwrap();
        assert_eq!(bid.input[..4], ExchangeFunction::MarketSellOrders.selector());
        assert_eq!(bid.to, TxKind::Call(EXCHANGE));
        assert_eq!(bid.nonce, 7);
        assert_eq!(bid.chain_id, Some(42));
        assert_eq!(bid.gas_limit, 400_000);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let builder = builder();
        assert!(builder.batch_cancel_orders(0, &[]).is_err());
        assert!(builder.fill_by_side(0, OrderSide::Ask, &[], U256::ZERO).is_err());
    }

    #[test]
    fn test_weth_transactions() {
        let builder = builder();
        let deposit = builder.deposit(1, WETH, U256::from(1_000u64));
        assert_eq!(deposit.value, U256::from(1_000u64));
        assert_eq!(deposit.gas_limit, 40_000);

        let withdraw = builder.withdraw(2, WETH, U256::from(1_000u64));
        assert_eq!(withdraw.value, U256::ZERO);
        assert_eq!(withdraw.gas_limit, 60_000);
    }

    #[test]
    fn test_configured_gas_limit() {
        let builder = ExchangeTransactionBuilder::new(
            1,
            DefaultGasProvider::with_gas_price(1).with_gas_limit(250_000),
        );
        let tx = builder.approve(0, WETH, EXCHANGE, token::MAX_ALLOWANCE);
        assert_eq!(tx.gas_limit, 250_000);
        assert_eq!(tx.gas_price, 1);
    }

    #[test]
    fn test_sign_transaction() {
        let signer = signer();
        let order = signed_order(&signer, 3);
        let tx = builder().cancel_order(0, &order);

        let key = PrivateKeySigner::from_str(KEY).unwrap();
        let first = sign_transaction(&key, tx.clone()).unwrap();
        let second = sign_transaction(&key, tx).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.hash, keccak256(&first.raw));
        // RLP list header
        assert!(first.raw[0] >= 0xc0);
    }
}
