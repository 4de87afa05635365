//! Order types for Polymarket CLOB signing.
//!
//! Defines the order data structures used for EIP-712 signing and
//! submission to the Polymarket CLOB API.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

use super::domain::{OrderSide, SignatureType};

const ORDER_TYPE: &str = "Order(uint256 salt,address maker,address signer,address taker,uint256 tokenId,uint256 makerAmount,uint256 takerAmount,uint256 expiration,uint256 nonce,uint256 feeRateBps,uint8 side,uint8 signatureType)";

/// Canonical order fields, as hashed and signed.
///
/// This matches the struct used by the CTF Exchange contract. Optional
/// fields stay `None` until they are hashed or serialized, where they become
/// zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderData {
    /// Random salt for uniqueness.
    pub salt: u64,
    /// Address holding the funds (the funder, or the signer itself).
    pub maker: Address,
    pub signer: Address,
    /// Zero for a public order.
    pub taker: Address,
    pub token_id: U256,
    /// Maker amount in base units.
    pub maker_amount: U256,
    /// Taker amount in base units.
    pub taker_amount: U256,
    /// Unix seconds, `None` never expires.
    pub expiration: Option<u64>,
    pub nonce: Option<u64>,
    pub fee_rate_bps: Option<u64>,
    pub side: OrderSide,
    pub signature_type: SignatureType,
}

impl OrderData {
    /// Compute the EIP-712 struct hash for this order.
    pub fn struct_hash(&self) -> B256 {
        // EIP-712 encodeData: all values must be padded to 32 bytes.
        let maker_padded = B256::left_padding_from(self.maker.as_slice());
        let signer_padded = B256::left_padding_from(self.signer.as_slice());
        let taker_padded = B256::left_padding_from(self.taker.as_slice());

        let encoded = (
            keccak256(ORDER_TYPE.as_bytes()),
            U256::from(self.salt),
            maker_padded,
            signer_padded,
            taker_padded,
            self.token_id,
            self.maker_amount,
            self.taker_amount,
            U256::from(self.expiration.unwrap_or(0)),
            U256::from(self.nonce.unwrap_or(0)),
            U256::from(self.fee_rate_bps.unwrap_or(0)),
            U256::from(self.side.as_u8()),
            U256::from(self.signature_type.as_u8()),
        )
            .abi_encode_packed();

        keccak256(&encoded)
    }
}

/// Random salt for order uniqueness, masked to 2^53-1 so it survives as a
/// JSON number.
pub(crate) fn rand_salt() -> u64 {
    rand::random::<u64>() & SALT_MASK
}

const SALT_MASK: u64 = (1 << 53) - 1;

/// An order together with its signature and the exchange it was signed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrder {
    pub order: OrderData,
    /// `0x`-prefixed 65-byte signature.
    pub signature: String,
    /// Signed against the neg-risk exchange rather than the regular one.
    pub neg_risk: bool,
}

impl SignedOrder {
    /// Wire representation expected by `POST /order`.
    pub fn to_payload(&self) -> OrderPayload {
        let order = &self.order;
        OrderPayload {
            salt: order.salt,
            maker: order.maker.to_checksum(None),
            signer: order.signer.to_checksum(None),
            taker: order.taker.to_checksum(None),
            token_id: order.token_id.to_string(),
            maker_amount: order.maker_amount.to_string(),
            taker_amount: order.taker_amount.to_string(),
            expiration: order.expiration.unwrap_or(0).to_string(),
            nonce: order.nonce.unwrap_or(0).to_string(),
            fee_rate_bps: order.fee_rate_bps.unwrap_or(0).to_string(),
            side: order.side,
            signature_type: order.signature_type.as_u8(),
            signature: self.signature.clone(),
        }
    }
}

/// A signed order as submitted to the CLOB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Order salt (must be a JSON number).
    pub salt: u64,
    pub maker: String,
    pub signer: String,
    pub taker: String,
    pub token_id: String,
    pub maker_amount: String,
    pub taker_amount: String,
    pub expiration: String,
    pub nonce: String,
    pub fee_rate_bps: String,
    /// Side ("BUY" or "SELL").
    pub side: OrderSide,
    pub signature_type: u8,
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_sol_types::{sol, SolStruct};

    sol! {
        struct Order {
            uint256 salt;
            address maker;
            address signer;
            address taker;
            uint256 tokenId;
            uint256 makerAmount;
            uint256 takerAmount;
            uint256 expiration;
            uint256 nonce;
            uint256 feeRateBps;
            uint8 side;
            uint8 signatureType;
        }
    }

    fn sample_order() -> OrderData {
        let maker = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        OrderData {
            salt: 999,
            maker,
            signer: maker,
            taker: Address::ZERO,
            token_id: U256::from(123u64),
            maker_amount: U256::from(14_000_000u64),
            taker_amount: U256::from(100_000_000u64),
            expiration: None,
            nonce: None,
            fee_rate_bps: Some(10),
            side: OrderSide::Buy,
            signature_type: SignatureType::Eoa,
        }
    }

    #[test]
    fn test_order_struct_hash_matches_reference_encoder() {
        let order = sample_order();
        let reference = Order {
            salt: U256::from(999u64),
            maker: order.maker,
            signer: order.signer,
            taker: Address::ZERO,
            tokenId: U256::from(123u64),
            makerAmount: U256::from(14_000_000u64),
            takerAmount: U256::from(100_000_000u64),
            expiration: U256::ZERO,
            nonce: U256::ZERO,
            feeRateBps: U256::from(10u64),
            side: 0,
            signatureType: 0,
        };

        assert_eq!(order.struct_hash(), reference.eip712_hash_struct());
    }

    #[test]
    fn test_absent_and_zero_fields_hash_alike() {
        let absent = sample_order();
        let zero = OrderData {
            expiration: Some(0),
            nonce: Some(0),
            ..absent.clone()
        };
        assert_eq!(absent.struct_hash(), zero.struct_hash());

        let expiring = OrderData {
            expiration: Some(1_700_000_000),
            ..absent.clone()
        };
        assert_ne!(absent.struct_hash(), expiring.struct_hash());
    }

    #[test]
    fn test_salt_is_json_safe_and_unique() {
        let salts: std::collections::HashSet<u64> = (0..1000).map(|_| rand_salt()).collect();
        assert!(salts.iter().all(|salt| *salt <= SALT_MASK));
        assert_eq!(salts.len(), 1000);
    }

    #[test]
    fn test_payload_serialization() {
        let signed = SignedOrder {
            order: sample_order(),
            signature: format!("0x{}", "ab".repeat(65)),
            neg_risk: false,
        };

        let json = serde_json::to_value(signed.to_payload()).unwrap();
        assert_eq!(json["salt"], 999);
        assert_eq!(json["maker"], "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(json["taker"], "0x0000000000000000000000000000000000000000");
        assert_eq!(json["tokenId"], "123");
        assert_eq!(json["makerAmount"], "14000000");
        assert_eq!(json["takerAmount"], "100000000");
        assert_eq!(json["expiration"], "0");
        assert_eq!(json["nonce"], "0");
        assert_eq!(json["feeRateBps"], "10");
        assert_eq!(json["side"], "BUY");
        assert_eq!(json["signatureType"], 0);
    }
}
