//! Asset proxy identifiers and ABI-encoded asset data.
//!
//! Only ERC-20 asset data is supported. The other proxies are recognised by
//! their id but encoding or decoding them fails with `NotImplemented`.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

sol! {
    /// Asset data layout of the ERC-20 proxy.
    function ERC20Token(address tokenContract);
}

/// Default lower bound for a tradable amount.
pub const DEFAULT_MIN_AMOUNT: u64 = 0;

/// Default upper bound for a tradable amount.
pub const DEFAULT_MAX_AMOUNT: u64 = 999_999_999_999_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetProxyId {
    Erc20,
    Erc721,
    MultiAsset,
    Erc1155,
}

impl AssetProxyId {
    /// The 4-byte proxy id that prefixes asset data.
    pub fn id(&self) -> [u8; 4] {
        match self {
            AssetProxyId::Erc20 => ERC20TokenCall::SELECTOR,
            AssetProxyId::Erc721 => [0x02, 0x57, 0x17, 0x92],
            AssetProxyId::MultiAsset => [0x94, 0xcf, 0xcd, 0xd7],
            AssetProxyId::Erc1155 => [0xa7, 0xcb, 0x5f, 0xb7],
        }
    }

    /// Detect the proxy from the leading bytes of asset data.
    pub fn from_asset_data(asset_data: &[u8]) -> Result<Self> {
        let prefix = asset_data.get(..4).ok_or_else(|| Error::Order {
            message: format!("asset data too short: {} bytes", asset_data.len()),
        })?;
        [
            AssetProxyId::Erc20,
            AssetProxyId::Erc721,
            AssetProxyId::MultiAsset,
            AssetProxyId::Erc1155,
        ]
        .into_iter()
        .find(|proxy| proxy.id() == prefix)
        .ok_or_else(|| Error::Order {
            message: format!("unknown asset proxy id 0x{}", hex::encode(prefix)),
        })
    }

    /// Asset data for a token contract.
    pub fn encode(&self, token: Address) -> Result<Bytes> {
        match self {
            AssetProxyId::Erc20 => Ok(erc20_asset_data(token)),
            other => Err(other.not_implemented()),
        }
    }

    /// Token contract referenced by asset data.
    pub fn decode(&self, asset_data: &[u8]) -> Result<Address> {
        match self {
            AssetProxyId::Erc20 => Ok(ERC20TokenCall::abi_decode(asset_data)?.tokenContract),
            other => Err(other.not_implemented()),
        }
    }

    fn not_implemented(&self) -> Error {
        Error::NotImplemented {
            proxy: self.to_string(),
        }
    }
}

impl fmt::Display for AssetProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetProxyId::Erc20 => write!(f, "ERC20"),
            AssetProxyId::Erc721 => write!(f, "ERC721"),
            AssetProxyId::MultiAsset => write!(f, "MultiAsset"),
            AssetProxyId::Erc1155 => write!(f, "ERC1155"),
        }
    }
}

/// `0xf47261b0 ‖ left-padded token address`.
pub fn erc20_asset_data(token: Address) -> Bytes {
    Bytes::from(ERC20TokenCall { tokenContract: token }.abi_encode())
}

/// A tradable asset with its bounds and derived asset data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetItem {
    pub min_amount: U256,
    pub max_amount: U256,
    pub address: Address,
    pub proxy_id: AssetProxyId,
    pub asset_data: Bytes,
}

impl AssetItem {
    pub fn new(
        min_amount: U256,
        max_amount: U256,
        address: Address,
        proxy_id: AssetProxyId,
    ) -> Result<Self> {
        Ok(Self {
            min_amount,
            max_amount,
            address,
            proxy_id,
            asset_data: proxy_id.encode(address)?,
        })
    }

    /// ERC-20 asset with the default amount bounds.
    pub fn for_address(address: Address) -> Self {
        Self {
            min_amount: U256::from(DEFAULT_MIN_AMOUNT),
            max_amount: U256::from(DEFAULT_MAX_AMOUNT),
            address,
            proxy_id: AssetProxyId::Erc20,
            asset_data: erc20_asset_data(address),
        }
    }

    /// Rebuild an asset from relayer-supplied asset data.
    pub fn from_asset_data(asset_data: &[u8], min_amount: U256, max_amount: U256) -> Result<Self> {
        let proxy_id = AssetProxyId::from_asset_data(asset_data)?;
        Ok(Self {
            min_amount,
            max_amount,
            address: proxy_id.decode(asset_data)?,
            proxy_id,
            asset_data: Bytes::copy_from_slice(asset_data),
        })
    }
}
