//! Configuration for the 0x toolkit.
//!
//! Values come from an optional TOML file and `ZRX__`-prefixed environment
//! variables (`ZRX__NETWORK=kovan`, `ZRX__GAS__PRICE_GWEI=20`). The signing key
//! is never part of this struct; it is read from `WALLET_PRIVATE_KEY`.

use alloy_primitives::Address;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::assets::AssetItem;
use crate::contracts::DefaultGasProvider;
use crate::relayer::{Relayer, RelayerConfig};
use crate::signing::{NetworkType, ProtocolVersion};
use crate::{Error, Result};

const GWEI: u128 = 1_000_000_000;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub network: String,
    pub protocol_version: String,
    pub rpc_url: Option<String>,
    pub infura_key: Option<String>,
    #[serde(default)]
    pub gas: GasConfig,
    #[serde(default)]
    pub relayers: Vec<RelayerEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GasConfig {
    pub limit: Option<u64>,
    pub price_gwei: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayerEntry {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub version: String,
    /// Defaults to the network's exchange deployment.
    pub exchange_address: Option<String>,
    #[serde(default)]
    pub fee_recipients: Vec<String>,
    /// Token contract address pairs traded on this relayer.
    #[serde(default)]
    pub pairs: Vec<(String, String)>,
}

fn parse_address(value: &str) -> Result<Address> {
    Address::from_str(value.trim()).map_err(|e| Error::Config {
        message: format!("Invalid address {}: {}", value, e),
    })
}

impl Config {
    /// Load configuration from an optional file plus environment overrides.
    #[allow(clippy::result_large_err)]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder()
            .set_default("network", "ropsten")?
            .set_default("protocol_version", "v3")?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("ZRX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load configuration from environment variables only.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    pub fn network_type(&self) -> Result<NetworkType> {
        self.network.parse()
    }

    pub fn protocol(&self) -> Result<ProtocolVersion> {
        self.protocol_version.parse()
    }

    /// Explicit RPC url, falling back to Infura when a key is set.
    pub fn get_rpc_url(&self) -> Result<Option<String>> {
        if let Some(url) = &self.rpc_url {
            return Ok(Some(url.clone()));
        }
        let network = self.network_type()?;
        Ok(self
            .infura_key
            .as_ref()
            .map(|key| network.infura_url(key)))
    }

    pub fn gas_provider(&self) -> DefaultGasProvider {
        let provider = self
            .gas
            .price_gwei
            .map(|gwei| DefaultGasProvider::with_gas_price(u128::from(gwei) * GWEI))
            .unwrap_or_default();
        match self.gas.limit {
            Some(limit) => provider.with_gas_limit(limit),
            None => provider,
        }
    }

    /// Relayers in configured order; the position is the relayer index.
    pub fn relayers(&self) -> Result<Vec<Relayer>> {
        let network = self.network_type()?;
        self.relayers
            .iter()
            .enumerate()
            .map(|(id, entry)| {
                let exchange_address = match &entry.exchange_address {
                    Some(address) => parse_address(address)?,
                    None => network.exchange_address(),
                };
                let fee_recipients = entry
                    .fee_recipients
                    .iter()
                    .map(|a| parse_address(a))
                    .collect::<Result<Vec<_>>>()?;
                let available_pairs = entry
                    .pairs
                    .iter()
                    .map(|(base, quote)| {
                        Ok((
                            AssetItem::for_address(parse_address(base)?),
                            AssetItem::for_address(parse_address(quote)?),
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(Relayer {
                    id,
                    name: entry.name.clone(),
                    available_pairs,
                    fee_recipients,
                    exchange_address,
                    config: RelayerConfig::new(&entry.base_url, &entry.suffix, &entry.version),
                })
            })
            .collect()
    }

    /// Load configuration for testing (with defaults).
    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            network: "kovan".to_string(),
            protocol_version: "v3".to_string(),
            rpc_url: None,
            infura_key: Some("test-key".to_string()),
            gas: GasConfig::default(),
            relayers: vec![RelayerEntry {
                name: "Radar Relay".to_string(),
                base_url: "https://kovan.api.radarrelay.com".to_string(),
                suffix: "0x".to_string(),
                version: "v3".to_string(),
                exchange_address: None,
                fee_recipients: vec!["0xa258b39954cef5cb142fd567a46cddb31a670124".to_string()],
                pairs: vec![(
                    "0xd0a1e359811322d97991e03f863a0c30c2cf029c".to_string(),
                    "0x2002d3812f58e35f0ea1ffbf80a75a38c32175fa".to_string(),
                )],
            }],
        }
    }
}
