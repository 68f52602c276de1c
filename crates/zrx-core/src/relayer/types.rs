//! Standard relayer API models.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::assets::AssetItem;
use crate::serialization::string_or_number;
use crate::signing::SignedOrder;

/// Where a relayer's API lives: `{base_url}/{suffix}/{version}/...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerConfig {
    pub base_url: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub version: String,
}

impl RelayerConfig {
    pub fn new(base_url: impl Into<String>, suffix: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            suffix: suffix.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relayer {
    pub id: usize,
    pub name: String,
    pub available_pairs: Vec<(AssetItem, AssetItem)>,
    pub fee_recipients: Vec<Address>,
    pub exchange_address: Address,
    pub config: RelayerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(with = "string_or_number")]
    pub min_amount: U256,
    #[serde(with = "string_or_number")]
    pub max_amount: U256,
    pub asset_data: String,
    pub precision: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPair {
    pub asset_data_a: Asset,
    pub asset_data_b: Asset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPairsResponse {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub records: Vec<AssetPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMetaData {
    #[serde(default)]
    pub order_hash: Option<String>,
    #[serde(default)]
    pub remaining_fillable_taker_asset_amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order: SignedOrder,
    #[serde(default)]
    pub meta_data: Option<OrderMetaData>,
}

/// One page of orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub records: Vec<OrderRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookResponse {
    pub bids: OrderBook,
    pub asks: OrderBook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecipientsResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub per_page: u64,
    pub records: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_pairs_decode() {
        let json = r#"{
            "total": 1, "page": 1, "perPage": 100,
            "records": [{
                "assetDataA": {"minAmount": "0", "maxAmount": "999999999999999999999",
                    "assetData": "0xf47261b0000000000000000000000000d0a1e359811322d97991e03f863a0c30c2cf029c",
                    "precision": 18},
                "assetDataB": {"minAmount": 5, "maxAmount": 1000,
                    "assetData": "0xf47261b00000000000000000000000002002d3812f58e35f0ea1ffbf80a75a38c32175fa",
                    "precision": 18}
            }]
        }"#;
        let response: AssetPairsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.per_page, 100);
        let pair = &response.records[0];
        assert_eq!(
            pair.asset_data_a.max_amount,
            U256::from(999_999_999_999_999_999_999u128)
        );
        assert_eq!(pair.asset_data_b.max_amount, U256::from(1000u64));
        assert_eq!(pair.asset_data_a.min_amount, U256::ZERO);
        assert_eq!(pair.asset_data_b.min_amount, U256::from(5u64));
    }

    #[test]
    fn test_order_record_without_meta() {
        let json = r#"{
            "order": {
                "exchangeAddress": "0x35dd2932454449b14cee11a94d3674a936d5d7b2",
                "makerAddress": "0xe2507b493bef003030f0a053d55af80237a44c64",
                "takerAddress": "0x0000000000000000000000000000000000000000",
                "feeRecipientAddress": "0xa258b39954cef5cb142fd567a46cddb31a670124",
                "senderAddress": "0x0000000000000000000000000000000000000000",
                "makerAssetAmount": "10000000000000000000",
                "takerAssetAmount": "10000000000000000",
                "makerFee": "0",
                "takerFee": "0",
                "expirationTimeSeconds": "1561628788",
                "salt": "1561542388954",
                "makerAssetData": "0xf47261b00000000000000000000000002002d3812f58e35f0ea1ffbf80a75a38c32175fa",
                "takerAssetData": "0xf47261b0000000000000000000000000d0a1e359811322d97991e03f863a0c30c2cf029c",
                "signature": "0x1c02"
            }
        }"#;
        let record: OrderRecord = serde_json::from_str(json).unwrap();
        assert!(record.meta_data.is_none());
        assert_eq!(record.order.salt, U256::from(1561542388954u64));
        assert_eq!(record.order.signature().len(), 2);
    }

    #[test]
    fn test_relayer_config_defaults() {
        let config: RelayerConfig =
            serde_json::from_str(r#"{"baseUrl": "https://relayer.example"}"#).unwrap();
        assert_eq!(config.suffix, "");
        assert_eq!(config.version, "");
    }
}
