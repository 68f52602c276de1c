//! Standard relayer API access with ordered failover.

pub mod client;
pub mod manager;
pub mod types;

pub use client::{RelayerApiClient, RelayerBackend, DEFAULT_PER_PAGE};
pub use manager::RelayerManager;
pub use types::{
    Asset, AssetPair, AssetPairsResponse, FeeRecipientsResponse, OrderBook, OrderBookResponse,
    OrderMetaData, OrderRecord, Relayer, RelayerConfig,
};
