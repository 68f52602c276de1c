//! Order signing and signature validation.
//!
//! Orders are signed over their EIP-712 digest directly (no personal-message
//! prefix) with deterministic RFC 6979 nonces, so the same order and key
//! always produce the same bytes.

use alloy_primitives::{eip191_hash_message, Address, Bytes, Signature, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use std::str::FromStr;
use tracing::{debug, warn};

use super::domain::{ProtocolVersion, SignatureType};
use super::order_types::{Order, OrderBuilder, SignedOrder};
use crate::eip712::TypedDataEncoder;
use crate::{Error, Result};

/// Packed signature length: `v(1) ‖ r(32) ‖ s(32) ‖ type(1)`.
pub const SIGNATURE_LENGTH: usize = 66;

/// Order signer bound to one key and exchange version.
#[derive(Clone)]
pub struct OrderSigner {
    signer: PrivateKeySigner,
    version: ProtocolVersion,
}

impl OrderSigner {
    pub fn new(signer: PrivateKeySigner, version: ProtocolVersion) -> Self {
        Self { signer, version }
    }

    /// Create from a hex private key, with or without `0x`.
    pub fn from_private_key(private_key: &str, version: ProtocolVersion) -> Result<Self> {
        let key = crate::hex_codec::clear_prefix(private_key.trim());
        let signer = PrivateKeySigner::from_str(key).map_err(|e| Error::Signing {
            message: format!("Invalid private key: {}", e),
        })?;
        Ok(Self::new(signer, version))
    }

    /// Create from the `WALLET_PRIVATE_KEY` environment variable.
    #[allow(clippy::result_large_err)]
    pub fn from_env(version: ProtocolVersion) -> Result<Self> {
        dotenvy::dotenv().ok();
        let key = std::env::var("WALLET_PRIVATE_KEY").map_err(|_| Error::Config {
            message: "WALLET_PRIVATE_KEY environment variable not set".to_string(),
        })?;
        Self::from_private_key(&key, version)
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// The underlying key, for signing transactions with the same wallet.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Get an order builder pre-configured with the maker address.
    pub fn order_builder(&self) -> OrderBuilder {
        OrderBuilder::new().maker(self.address())
    }

    /// Sign an order and verify the result before handing it out.
    ///
    /// A signature that does not recover to the maker is never returned.
    pub fn sign_order(&self, order: &Order) -> Result<SignedOrder> {
        let digest = order_hash(order, self.version)?;

        let signature = self
            .signer
            .sign_hash_sync(&digest)
            .map_err(|e| Error::Signing {
                message: format!("Failed to sign order: {}", e),
            })?;

        let signed = SignedOrder::new(order.clone(), pack_signature(&signature, SignatureType::Eip712));

        if !is_valid_signature(&signed, self.version)? {
            warn!(
                maker = %order.maker_address,
                signer = %self.address(),
                "Order signature failed self-verification"
            );
            return Err(Error::InvalidSignature {
                message: format!(
                    "signature does not recover to maker {:#x}",
                    order.maker_address
                ),
            });
        }

        debug!(order_hash = %digest, maker = %order.maker_address, "Signed order");
        Ok(signed)
    }
}

impl std::fmt::Debug for OrderSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSigner")
            .field("address", &format!("{:?}", self.address()))
            .field("version", &self.version)
            .finish()
    }
}

/// The EIP-712 digest of an order.
pub fn order_hash(order: &Order, version: ProtocolVersion) -> Result<B256> {
    TypedDataEncoder::new(order.typed_data(version)?)?.hash_structured_data()
}

fn pack_signature(signature: &Signature, signature_type: SignatureType) -> Bytes {
    let mut packed = Vec::with_capacity(SIGNATURE_LENGTH);
    packed.push(27 + u8::from(signature.v()));
    packed.extend_from_slice(&signature.r().to_be_bytes::<32>());
    packed.extend_from_slice(&signature.s().to_be_bytes::<32>());
    packed.push(signature_type.as_u8());
    Bytes::from(packed)
}

/// Signature type from the trailing tag byte.
pub fn signature_type(signature: &[u8]) -> Result<SignatureType> {
    let tag = signature.last().ok_or_else(|| Error::InvalidSignature {
        message: "empty signature".to_string(),
    })?;
    SignatureType::try_from(*tag)
}

/// Check that a signed order was signed by its maker.
///
/// `Ok(false)` means the signature is well formed but recovers to someone
/// else. Unsupported and illegal signature types are errors.
pub fn is_valid_signature(signed: &SignedOrder, version: ProtocolVersion) -> Result<bool> {
    let signature = signed.signature();
    let signature_type = signature_type(signature)?;

    let digest = match signature_type {
        SignatureType::Eip712 => order_hash(signed.order(), version)?,
        SignatureType::EthSign => eip191_hash_message(order_hash(signed.order(), version)?),
        SignatureType::Wallet
        | SignatureType::Validator
        | SignatureType::PreSigned
        | SignatureType::NSignatureTypes => {
            return Err(Error::UnsupportedSignatureType(signature_type.as_u8()))
        }
        SignatureType::Illegal | SignatureType::Invalid => {
            return Err(Error::InvalidSignature {
                message: format!("signature type {:?} is never valid", signature_type),
            })
        }
    };

    Ok(recover_candidates(signature, digest)?.contains(&signed.maker_address))
}

/// Candidate signers of a packed `v ‖ r ‖ s ‖ type` signature.
///
/// Both recovery ids are tried regardless of the header byte.
fn recover_candidates(signature: &[u8], digest: B256) -> Result<Vec<Address>> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(Error::InvalidSignature {
            message: format!(
                "expected {} signature bytes, got {}",
                SIGNATURE_LENGTH,
                signature.len()
            ),
        });
    }

    let header = signature[0];
    if !(27..=34).contains(&header) {
        return Err(Error::InvalidSignature {
            message: format!("header byte out of range: {}", header),
        });
    }

    let r = U256::from_be_slice(&signature[1..33]);
    let s = U256::from_be_slice(&signature[33..65]);

    let mut candidates = Vec::with_capacity(2);
    for parity in [false, true] {
        match Signature::new(r, s, parity).recover_address_from_prehash(&digest) {
            Ok(address) => candidates.push(address),
            Err(e) => debug!(error = %e, parity, "Signature recovery failed"),
        }
    }
    Ok(candidates)
}
