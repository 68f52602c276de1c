//! EIP-712 domains, order schemas and deployment addresses for the 0x exchange.
//!
//! The v2 exchange binds signatures to the exchange contract only; v3 also
//! binds them to the chain id.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::eip712::{Eip712Domain, TypedField};
use crate::{Error, Result};

/// Domain name shared by every exchange version.
pub const EXCHANGE_DOMAIN_NAME: &str = "0x Protocol";

/// Struct name of the signed order in the typed-data schema.
pub const ORDER_TYPE: &str = "Order";

/// Deployed 0x contracts and the Infura endpoint for a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    MainNet,
    Ropsten,
    Kovan,
}

impl NetworkType {
    pub fn id(&self) -> u64 {
        match self {
            NetworkType::MainNet => 1,
            NetworkType::Ropsten => 3,
            NetworkType::Kovan => 42,
        }
    }

    pub fn exchange_address(&self) -> Address {
        match self {
            NetworkType::MainNet => address!("61935cbdd02287b511119ddb11aeb42f1593b7ef"),
            NetworkType::Ropsten => address!("fb2dd2a1366de37f7241c83d47da58fd503e2c64"),
            NetworkType::Kovan => address!("4eacd0af335451709e1e7b570b8ea68edec8bc97"),
        }
    }

    pub fn erc20_proxy_address(&self) -> Address {
        match self {
            NetworkType::MainNet => address!("95e6f48254609a6ee006f7d493c8e5fb97094cef"),
            NetworkType::Ropsten => address!("b1408f4c245a23c31b98d2c626777d4c0d766caa"),
            NetworkType::Kovan => address!("f1ec01d6236d3cd881a0bf0130ea25fe4234003e"),
        }
    }

    pub fn erc721_proxy_address(&self) -> Address {
        match self {
            NetworkType::MainNet => address!("efc70a1b18c432bdc64b596838b4d138f6bc6cad"),
            NetworkType::Ropsten => address!("e654aac058bfbf9f83fcaee7793311dd82f6ddb4"),
            NetworkType::Kovan => address!("2a9127c745688a165106c11cd4d647d2220af821"),
        }
    }

    pub fn weth_address(&self) -> Address {
        match self {
            NetworkType::MainNet => address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
            NetworkType::Ropsten => address!("c778417e063141139fce010982780140aa0cd5ab"),
            NetworkType::Kovan => address!("d0a1e359811322d97991e03f863a0c30c2cf029c"),
        }
    }

    fn subdomain(&self) -> &'static str {
        match self {
            NetworkType::MainNet => "mainnet",
            NetworkType::Ropsten => "ropsten",
            NetworkType::Kovan => "kovan",
        }
    }

    pub fn infura_url(&self, infura_key: &str) -> String {
        format!("https://{}.infura.io/{}", self.subdomain(), infura_key)
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subdomain())
    }
}

impl FromStr for NetworkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "1" => Ok(NetworkType::MainNet),
            "ropsten" | "3" => Ok(NetworkType::Ropsten),
            "kovan" | "42" => Ok(NetworkType::Kovan),
            other => Err(Error::Config {
                message: format!("Unknown network: {}", other),
            }),
        }
    }
}

/// Exchange protocol version; selects the order schema and domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProtocolVersion {
    V2,
    #[default]
    V3,
}

impl ProtocolVersion {
    pub fn domain_version(&self) -> &'static str {
        match self {
            ProtocolVersion::V2 => "2",
            ProtocolVersion::V3 => "3.0.0",
        }
    }

    /// Signing domain for an exchange deployment.
    ///
    /// v2 domains ignore `chain_id`; v3 domains require one.
    pub fn domain(&self, exchange: Address, chain_id: Option<u64>) -> Result<Eip712Domain> {
        let chain_id = match self {
            ProtocolVersion::V2 => 0,
            ProtocolVersion::V3 => chain_id.filter(|id| *id > 0).ok_or_else(|| Error::Order {
                message: "v3 orders must carry a chain id".to_string(),
            })?,
        };
        Ok(Eip712Domain::new(
            EXCHANGE_DOMAIN_NAME,
            self.domain_version(),
            chain_id,
            exchange,
        ))
    }

    /// Fields of the `Order` struct, in signing order.
    pub fn order_schema(&self) -> Vec<TypedField> {
        let mut fields = vec![
            TypedField::new("makerAddress", "address"),
            TypedField::new("takerAddress", "address"),
            TypedField::new("feeRecipientAddress", "address"),
            TypedField::new("senderAddress", "address"),
            TypedField::new("makerAssetAmount", "uint256"),
            TypedField::new("takerAssetAmount", "uint256"),
            TypedField::new("makerFee", "uint256"),
            TypedField::new("takerFee", "uint256"),
            TypedField::new("expirationTimeSeconds", "uint256"),
            TypedField::new("salt", "uint256"),
            TypedField::new("makerAssetData", "bytes"),
            TypedField::new("takerAssetData", "bytes"),
        ];
        if *self == ProtocolVersion::V3 {
            fields.push(TypedField::new("makerFeeAssetData", "bytes"));
            fields.push(TypedField::new("takerFeeAssetData", "bytes"));
        }
        fields
    }
}

impl FromStr for ProtocolVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches(['v', 'V']) {
            "2" => Ok(ProtocolVersion::V2),
            "3" | "3.0.0" => Ok(ProtocolVersion::V3),
            other => Err(Error::Config {
                message: format!("Unknown protocol version: {}", other),
            }),
        }
    }
}

/// Order book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Bid,
    Ask,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Bid => write!(f, "BID"),
            OrderSide::Ask => write!(f, "ASK"),
        }
    }
}

/// Signature type tag, stored in the last signature byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureType {
    Illegal = 0,
    Invalid = 1,
    Eip712 = 2,
    EthSign = 3,
    Wallet = 4,
    Validator = 5,
    PreSigned = 6,
    NSignatureTypes = 7,
}

impl SignatureType {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for SignatureType {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        Ok(match tag {
            0 => SignatureType::Illegal,
            1 => SignatureType::Invalid,
            2 => SignatureType::Eip712,
            3 => SignatureType::EthSign,
            4 => SignatureType::Wallet,
            5 => SignatureType::Validator,
            6 => SignatureType::PreSigned,
            7 => SignatureType::NSignatureTypes,
            other => {
                return Err(Error::InvalidSignature {
                    message: format!("unknown signature type tag {}", other),
                })
            }
        })
    }
}
