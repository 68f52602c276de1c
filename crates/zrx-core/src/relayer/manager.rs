//! Ordered failover across configured relayers.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::client::{RelayerApiClient, RelayerBackend, DEFAULT_PER_PAGE};
use super::types::{AssetPair, OrderBook, OrderBookResponse, Relayer};
use crate::signing::{NetworkType, SignedOrder};
use crate::{Error, Result};

/// Dispatches relayer requests by index.
///
/// A request for index `i` is tried against `i`, then `i + 1` and so on while
/// the failures are transport errors. The last backend's error is returned
/// as-is; there is no wrap-around to index 0.
pub struct RelayerManager {
    relayers: Vec<Relayer>,
    backends: Vec<Arc<dyn RelayerBackend>>,
    network_id: u64,
}

impl RelayerManager {
    /// One HTTP client per relayer.
    pub fn new(relayers: Vec<Relayer>, network: NetworkType) -> Result<Self> {
        let backends = relayers
            .iter()
            .map(|relayer| {
                RelayerApiClient::new(&relayer.config)
                    .map(|client| Arc::new(client) as Arc<dyn RelayerBackend>)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::with_backends(relayers, backends, network)
    }

    pub fn with_backends(
        relayers: Vec<Relayer>,
        backends: Vec<Arc<dyn RelayerBackend>>,
        network: NetworkType,
    ) -> Result<Self> {
        if relayers.len() != backends.len() {
            return Err(Error::Config {
                message: format!(
                    "{} relayers configured but {} backends supplied",
                    relayers.len(),
                    backends.len()
                ),
            });
        }
        Ok(Self {
            relayers,
            backends,
            network_id: network.id(),
        })
    }

    pub fn available_relayers(&self) -> &[Relayer] {
        &self.relayers
    }

    async fn dispatch<T, F, Fut>(&self, index: usize, operation: &str, call: F) -> Result<T>
    where
        F: Fn(Arc<dyn RelayerBackend>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let total = self.backends.len();
        if index >= total {
            return Err(Error::RelayerIndexOutOfBounds { index, total });
        }

        let mut current = index;
        loop {
            debug!(relayer = current, operation, "Relayer request");
            match call(Arc::clone(&self.backends[current])).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transport() && current + 1 < total => {
                    warn!(
                        relayer = current,
                        next = current + 1,
                        operation,
                        error = %e,
                        "Relayer request failed, trying next relayer"
                    );
                    current += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn get_asset_pairs(&self, index: usize) -> Result<Vec<AssetPair>> {
        let network_id = self.network_id;
        self.dispatch(index, "asset_pairs", |backend| async move {
            backend.get_asset_pairs(DEFAULT_PER_PAGE, network_id).await
        })
        .await
    }

    pub async fn get_orderbook(
        &self,
        index: usize,
        base_asset_data: &str,
        quote_asset_data: &str,
        per_page: u32,
    ) -> Result<OrderBookResponse> {
        let network_id = self.network_id;
        self.dispatch(index, "orderbook", |backend| {
            let base = base_asset_data.to_string();
            let quote = quote_asset_data.to_string();
            async move { backend.get_orderbook(base, quote, per_page, network_id).await }
        })
        .await
    }

    pub async fn post_order(&self, index: usize, order: &SignedOrder) -> Result<()> {
        let network_id = self.network_id;
        self.dispatch(index, "post_order", |backend| {
            let order = order.clone();
            async move { backend.post_order(order, network_id).await }
        })
        .await
    }

    /// Orders on a relayer, optionally filtered by maker (matched lowercase).
    pub async fn get_orders(
        &self,
        index: usize,
        maker_address: Option<&str>,
        per_page: u32,
    ) -> Result<OrderBook> {
        let network_id = self.network_id;
        let maker = maker_address.map(str::to_lowercase);
        self.dispatch(index, "orders", |backend| {
            let maker = maker.clone();
            async move { backend.get_orders(maker, per_page, network_id).await }
        })
        .await
    }

    pub async fn get_fee_recipients(&self, index: usize) -> Result<Vec<String>> {
        let network_id = self.network_id;
        self.dispatch(index, "fee_recipients", |backend| async move {
            backend.get_fee_recipients(network_id).await
        })
        .await
    }
}
