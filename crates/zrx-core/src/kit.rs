//! Entry point tying the signer, relayers and chain access together.

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

use crate::assets::AssetItem;
use crate::chain::{ChainClient, ExchangeClient, RpcChainClient};
use crate::config::Config;
use crate::contracts::exchange::ExchangeFunction;
use crate::contracts::transaction::{self, DefaultGasProvider, GasInfoProvider};
use crate::relayer::{Relayer, RelayerManager};
use crate::signing::{
    is_valid_signature, NetworkType, Order, OrderBuilder, OrderSigner, ProtocolVersion,
    SignedOrder,
};
use crate::Result;

pub struct ZrxKit<G = DefaultGasProvider> {
    relayer_manager: RelayerManager,
    signer: OrderSigner,
    network: NetworkType,
    gas: G,
}

impl ZrxKit<DefaultGasProvider> {
    /// Build from configuration, with the key taken from `WALLET_PRIVATE_KEY`.
    #[allow(clippy::result_large_err)]
    pub fn from_config(config: &Config) -> Result<Self> {
        let signer = OrderSigner::from_env(config.protocol()?)?;
        Self::new(
            config.relayers()?,
            signer,
            config.network_type()?,
            config.gas_provider(),
        )
    }
}

impl<G: GasInfoProvider + Clone> ZrxKit<G> {
    pub fn new(relayers: Vec<Relayer>, signer: OrderSigner, network: NetworkType, gas: G) -> Result<Self> {
        let relayer_manager = RelayerManager::new(relayers, network)?;
        Ok(Self::with_relayer_manager(relayer_manager, signer, network, gas))
    }

    pub fn with_relayer_manager(
        relayer_manager: RelayerManager,
        signer: OrderSigner,
        network: NetworkType,
        gas: G,
    ) -> Self {
        info!(
            address = %signer.address(),
            network = %network,
            version = ?signer.version(),
            relayers = relayer_manager.available_relayers().len(),
            "ZrxKit initialized"
        );
        Self {
            relayer_manager,
            signer,
            network,
            gas,
        }
    }

    pub fn relayer_manager(&self) -> &RelayerManager {
        &self.relayer_manager
    }

    pub fn network(&self) -> NetworkType {
        self.network
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn version(&self) -> ProtocolVersion {
        self.signer.version()
    }

    /// Order builder with maker, exchange and (for v3) chain id filled in.
    pub fn order_builder(&self) -> OrderBuilder {
        let builder = self
            .signer
            .order_builder()
            .exchange(self.network.exchange_address());
        match self.signer.version() {
            ProtocolVersion::V3 => builder.chain_id(self.network.id()),
            ProtocolVersion::V2 => builder,
        }
    }

    pub fn sign_order(&self, order: &Order) -> Result<SignedOrder> {
        self.signer.sign_order(order)
    }

    pub fn is_valid_signature(&self, order: &SignedOrder) -> Result<bool> {
        is_valid_signature(order, self.signer.version())
    }

    /// Fee in wei for filling `order_count` orders.
    pub fn protocol_fee(&self, order_count: usize) -> U256 {
        transaction::protocol_fee(&self.gas, order_count)
    }

    pub fn protocol_fee_in_eth(&self, order_count: usize) -> Result<Decimal> {
        transaction::wei_to_eth(self.protocol_fee(order_count))
    }

    /// Gas cost of a `marketBuyOrders` transaction, in ether.
    pub fn market_buy_estimated_price(&self) -> Result<Decimal> {
        let function = ExchangeFunction::MarketBuyOrders.name();
        let wei = U256::from(self.gas.gas_limit(function)) * U256::from(self.gas.gas_price(function));
        transaction::wei_to_eth(wei)
    }

    pub fn weth_asset(&self) -> AssetItem {
        AssetItem::for_address(self.network.weth_address())
    }

    /// ERC-20 asset with default bounds.
    pub fn asset_item_for_address(address: Address) -> AssetItem {
        AssetItem::for_address(address)
    }

    /// Transaction client for this wallet over any chain client.
    pub fn exchange_client(&self, chain: Arc<dyn ChainClient>) -> ExchangeClient<G> {
        ExchangeClient::new(
            chain,
            self.signer.signer().clone(),
            self.network,
            self.gas.clone(),
        )
    }

    /// Transaction client over JSON-RPC.
    pub fn rpc_exchange_client(&self, rpc_url: &str) -> ExchangeClient<G> {
        self.exchange_client(Arc::new(RpcChainClient::new(rpc_url)))
    }
}
