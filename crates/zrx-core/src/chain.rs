//! Minimal chain access for submitting exchange transactions.
//!
//! `ChainClient` covers only what order settlement needs: nonce, gas price,
//! `eth_call` and raw transaction broadcast. Node errors are surfaced as
//! [`Error::Chain`] with the node's own message and are never retried.

use alloy_consensus::TxLegacy;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::contracts::exchange::{self, OrderInfo};
use crate::contracts::token;
use crate::contracts::transaction::{
    sign_transaction, DefaultGasProvider, ExchangeTransactionBuilder, GasInfoProvider,
};
use crate::hex_codec::{clear_prefix, decode_prefixed, to_hex_prefixed};
use crate::signing::{NetworkType, OrderSide, SignedOrder};
use crate::{Error, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Pending nonce of `address`.
    async fn get_transaction_count(&self, address: Address) -> Result<u64>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> Result<u128>;

    /// `eth_call` against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Broadcast signed RLP bytes; returns the transaction hash.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256>;
}

/// Ethereum JSON-RPC client over HTTP.
pub struct RpcChainClient {
    rpc_url: String,
    http_client: reqwest::Client,
}

impl RpcChainClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Infura endpoint for a network.
    pub fn with_infura(network: NetworkType, infura_key: &str) -> Self {
        Self::new(network.infura_url(infura_key))
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn rpc_call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Chain {
                message: format!("RPC request {} failed: {}", method, response.status()),
            });
        }

        let body: JsonRpcResponse<T> = response.json().await?;
        if let Some(error) = body.error {
            return Err(Error::Chain {
                message: error.message,
            });
        }

        body.result.ok_or_else(|| Error::Chain {
            message: format!("No result in {} response", method),
        })
    }
}

fn parse_quantity(method: &str, value: &str) -> Result<U256> {
    U256::from_str_radix(clear_prefix(value), 16).map_err(|e| Error::Chain {
        message: format!("Failed to parse {} result {}: {}", method, value, e),
    })
}

fn narrow<T: TryFrom<U256>>(method: &str, value: U256) -> Result<T> {
    T::try_from(value).map_err(|_| Error::Chain {
        message: format!("{} result {} out of range", method, value),
    })
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_transaction_count(&self, address: Address) -> Result<u64> {
        let method = "eth_getTransactionCount";
        let hex: String = self
            .rpc_call(method, serde_json::json!([format!("{:#x}", address), "pending"]))
            .await?;
        narrow(method, parse_quantity(method, &hex)?)
    }

    async fn gas_price(&self) -> Result<u128> {
        let method = "eth_gasPrice";
        let hex: String = self.rpc_call(method, serde_json::json!([])).await?;
        narrow(method, parse_quantity(method, &hex)?)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let params = serde_json::json!([
            { "to": format!("{:#x}", to), "data": to_hex_prefixed(&data) },
            "latest"
        ]);
        let hex: String = self.rpc_call("eth_call", params).await?;
        Ok(decode_prefixed(&hex)?.into())
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256> {
        let hash: String = self
            .rpc_call("eth_sendRawTransaction", serde_json::json!([to_hex_prefixed(&raw)]))
            .await?;
        B256::from_str(&hash).map_err(|e| Error::Chain {
            message: format!("Invalid transaction hash {}: {}", hash, e),
        })
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Signs and broadcasts exchange, WETH and ERC-20 proxy transactions for one
/// wallet.
pub struct ExchangeClient<G = DefaultGasProvider> {
    chain: Arc<dyn ChainClient>,
    signer: PrivateKeySigner,
    network: NetworkType,
    builder: ExchangeTransactionBuilder<G>,
}

impl<G: GasInfoProvider> ExchangeClient<G> {
    pub fn new(chain: Arc<dyn ChainClient>, signer: PrivateKeySigner, network: NetworkType, gas: G) -> Self {
        Self {
            chain,
            signer,
            network,
            builder: ExchangeTransactionBuilder::new(network.id(), gas),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn builder(&self) -> &ExchangeTransactionBuilder<G> {
        &self.builder
    }

    async fn submit(
        &self,
        build: impl FnOnce(u64) -> Result<TxLegacy>,
    ) -> Result<B256> {
        let nonce = self.chain.get_transaction_count(self.address()).await?;
        let tx = build(nonce)?;
        let signed = sign_transaction(&self.signer, tx)?;
        let hash = self.chain.send_raw_transaction(signed.raw).await?;
        info!(tx_hash = %hash, nonce, "Transaction submitted");
        Ok(hash)
    }

    pub async fn fill_order(&self, order: &SignedOrder, taker_asset_fill_amount: U256) -> Result<B256> {
        self.submit(|nonce| Ok(self.builder.fill_order(nonce, order, taker_asset_fill_amount)))
            .await
    }

    pub async fn market_buy_orders(&self, orders: &[SignedOrder], maker_asset_fill_amount: U256) -> Result<B256> {
        self.submit(|nonce| self.builder.market_buy_orders(nonce, orders, maker_asset_fill_amount))
            .await
    }

    pub async fn market_sell_orders(&self, orders: &[SignedOrder], taker_asset_fill_amount: U256) -> Result<B256> {
        self.submit(|nonce| self.builder.market_sell_orders(nonce, orders, taker_asset_fill_amount))
            .await
    }

    /// Fill against one side of an order book.
    pub async fn fill_by_side(&self, side: OrderSide, orders: &[SignedOrder], fill_amount: U256) -> Result<B256> {
        self.submit(|nonce| self.builder.fill_by_side(nonce, side, orders, fill_amount))
            .await
    }

    pub async fn cancel_order(&self, order: &SignedOrder) -> Result<B256> {
        self.submit(|nonce| Ok(self.builder.cancel_order(nonce, order))).await
    }

    pub async fn batch_cancel_orders(&self, orders: &[SignedOrder]) -> Result<B256> {
        self.submit(|nonce| self.builder.batch_cancel_orders(nonce, orders)).await
    }

    /// Status, hash and filled amount of each order, in input order.
    pub async fn orders_info(&self, orders: &[SignedOrder]) -> Result<Vec<OrderInfo>> {
        let data = exchange::encode_get_orders_info(orders)?;
        let returned = self.chain.call(orders[0].exchange_address, data).await?;
        exchange::decode_orders_info(&returned)
    }

    /// Wrap ether into the network's WETH.
    pub async fn deposit(&self, amount: U256) -> Result<B256> {
        let weth = self.network.weth_address();
        self.submit(|nonce| Ok(self.builder.deposit(nonce, weth, amount))).await
    }

    pub async fn withdraw(&self, amount: U256) -> Result<B256> {
        let weth = self.network.weth_address();
        self.submit(|nonce| Ok(self.builder.withdraw(nonce, weth, amount))).await
    }

    /// Approve the ERC-20 proxy to move `token` without limit.
    pub async fn set_unlimited_proxy_allowance(&self, token_address: Address) -> Result<B256> {
        self.approve_proxy(token_address, token::MAX_ALLOWANCE).await
    }

    /// Revoke the ERC-20 proxy allowance for `token`.
    pub async fn lock_proxy(&self, token_address: Address) -> Result<B256> {
        self.approve_proxy(token_address, U256::ZERO).await
    }

    async fn approve_proxy(&self, token_address: Address, amount: U256) -> Result<B256> {
        let proxy = self.network.erc20_proxy_address();
        self.submit(|nonce| Ok(self.builder.approve(nonce, token_address, proxy, amount)))
            .await
    }

    /// Allowance `owner` granted to the ERC-20 proxy.
    pub async fn proxy_allowance(&self, token_address: Address, owner: Address) -> Result<U256> {
        let data = token::encode_allowance(owner, self.network.erc20_proxy_address());
        let returned = self.chain.call(token_address, data).await?;
        token::decode_uint(&returned)
    }

    pub async fn balance_of(&self, token_address: Address, owner: Address) -> Result<U256> {
        let returned = self
            .chain
            .call(token_address, token::encode_balance_of(owner))
            .await?;
        debug!(token = %token_address, owner = %owner, "Fetched token balance");
        token::decode_uint(&returned)
    }
}
