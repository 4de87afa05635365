//! Order signing for Polymarket CLOB.
//!
//! Turns a [`UserOrder`] into a [`SignedOrder`]: the order data is built for
//! the market's tick size, hashed under the domain of the exchange that will
//! settle it, and signed through the signing capability.

use std::sync::Arc;

use alloy_primitives::{Address, B256};
use tracing::debug;

use super::domain::{Eip712Domain, SignatureType};
use super::order_builder::OrderBuilder;
use super::order_types::{OrderData, SignedOrder};
use super::signer::{request_signature, SigningCapability};
use super::typed_data::typed_data_hash;
use crate::config::ChainConfig;
use crate::rounding::TickSize;
use crate::types::{OrderType, UserOrder};
use crate::Result;

/// Order signer for Polymarket CLOB.
#[derive(Clone)]
pub struct OrderSigner {
    capability: Arc<dyn SigningCapability>,
    builder: OrderBuilder,
    chain: ChainConfig,
}

impl OrderSigner {
    pub fn new(capability: Arc<dyn SigningCapability>, signer: Address, chain: ChainConfig) -> Self {
        Self {
            capability,
            builder: OrderBuilder::new(signer, chain.contracts),
            chain,
        }
    }

    /// Trade on behalf of a proxy wallet or Safe holding the funds.
    pub fn with_funder(mut self, funder: Option<Address>, signature_type: SignatureType) -> Self {
        self.builder = self.builder.funder(funder).signature_type(signature_type);
        self
    }

    /// Get the signer's address.
    pub fn address(&self) -> Address {
        self.builder.signer()
    }

    pub fn order_builder(&self) -> &OrderBuilder {
        &self.builder
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// EIP-712 digest of an order for the regular or neg-risk exchange.
    pub fn order_digest(&self, order: &OrderData, neg_risk: bool) -> B256 {
        let domain = Eip712Domain::exchange(self.chain.chain_id, self.chain.exchange_for(neg_risk));
        typed_data_hash(domain.separator(), order.struct_hash())
    }

    /// Sign order data and return the signed order ready for submission.
    pub async fn sign_order(&self, order: OrderData, neg_risk: bool) -> Result<SignedOrder> {
        let digest = self.order_digest(&order, neg_risk);
        let signature = request_signature(self.capability.as_ref(), order.signer, digest).await?;

        Ok(SignedOrder {
            order,
            signature: format!("0x{}", hex::encode(signature)),
            neg_risk,
        })
    }

    /// Build and sign an order in one step.
    pub async fn create_order(
        &self,
        order: &UserOrder,
        order_type: OrderType,
        tick_size: TickSize,
        neg_risk: bool,
    ) -> Result<SignedOrder> {
        let data = self.builder.build(order, order_type, tick_size)?;
        debug!(
            token_id = %order.token_id,
            side = %order.side,
            order_type = %order_type,
            maker_amount = %data.maker_amount,
            taker_amount = %data.taker_amount,
            neg_risk,
            "Signing order"
        );
        self.sign_order(data, neg_risk).await
    }
}

impl std::fmt::Debug for OrderSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSigner")
            .field("address", &self.address())
            .field("maker", &self.builder.maker())
            .field("chain_id", &self.chain.chain_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::signer::MockSigningCapability;
    use crate::signing::LocalSigner;
    use alloy_primitives::Signature;
    use rust_decimal::Decimal;

    // Test private key (DO NOT USE IN PRODUCTION)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_signer() -> OrderSigner {
        let local = LocalSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let address = local.address();
        OrderSigner::new(Arc::new(local), address, ChainConfig::polygon())
    }

    fn sample_order() -> UserOrder {
        UserOrder::buy("123", Decimal::new(50, 2), Decimal::from(100u64))
    }

    #[tokio::test]
    async fn test_sign_order() {
        let signer = test_signer();
        let signed = signer
            .create_order(&sample_order(), OrderType::Gtc, TickSize::Hundredth, false)
            .await
            .unwrap();

        // Signature should be 0x + 130 hex chars (65 bytes)
        assert!(signed.signature.starts_with("0x"));
        assert_eq!(signed.signature.len(), 132);
        assert!(!signed.neg_risk);

        let raw = hex::decode(&signed.signature[2..]).unwrap();
        let digest = signer.order_digest(&signed.order, false);
        let recovered = Signature::from_raw(&raw)
            .unwrap()
            .recover_address_from_prehash(&digest)
            .unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[tokio::test]
    async fn test_signatures_are_deterministic() {
        let signer = test_signer();
        let mut order = signer
            .order_builder()
            .build(&sample_order(), OrderType::Gtc, TickSize::Hundredth)
            .unwrap();
        order.salt = 999; // Fixed salt

        let signed1 = signer.sign_order(order.clone(), false).await.unwrap();
        let signed2 = signer.sign_order(order, false).await.unwrap();

        assert_eq!(signed1.signature, signed2.signature);
    }

    #[test]
    fn test_neg_risk_selects_other_exchange() {
        let signer = test_signer();
        let order = signer
            .order_builder()
            .build(&sample_order(), OrderType::Gtc, TickSize::Hundredth)
            .unwrap();

        assert_ne!(
            signer.order_digest(&order, false),
            signer.order_digest(&order, true)
        );
    }

    #[tokio::test]
    async fn test_invalid_price_never_reaches_signer() {
        let mut capability = MockSigningCapability::new();
        capability.expect_sign_digest().never();
        let signer = OrderSigner::new(Arc::new(capability), Address::ZERO, ChainConfig::polygon());

        let order = UserOrder::buy("1", Decimal::new(999, 3), Decimal::from(5u64));
        let err = signer
            .create_order(&order, OrderType::Gtc, TickSize::Hundredth, false)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_signer_failure_is_signing_error() {
        let mut capability = MockSigningCapability::new();
        capability
            .expect_sign_digest()
            .returning(|_, _| Ok(vec![0u8; 10]));
        let signer = OrderSigner::new(Arc::new(capability), Address::ZERO, ChainConfig::polygon());

        let err = signer
            .create_order(&sample_order(), OrderType::Gtc, TickSize::Hundredth, false)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Signing { .. }));
    }

    #[test]
    fn test_funder_becomes_maker() {
        let funder = Address::repeat_byte(0x33);
        let signer = test_signer().with_funder(Some(funder), SignatureType::PolyGnosisSafe);
        let order = signer
            .order_builder()
            .build(&sample_order(), OrderType::Gtc, TickSize::Hundredth)
            .unwrap();
        assert_eq!(order.maker, funder);
        assert_eq!(order.signer, signer.address());
    }

    #[test]
    fn test_debug_does_not_expose_key() {
        let signer = test_signer();
        let debug_str = format!("{:?}", signer);

        assert!(debug_str.contains("OrderSigner"));
        assert!(!debug_str.contains(TEST_PRIVATE_KEY));
    }
}
