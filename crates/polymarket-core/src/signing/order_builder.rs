//! Conversion of a [`UserOrder`] into canonical [`OrderData`].
//!
//! Prices and sizes are rounded to the precision allowed by the market's tick
//! size, then scaled to token base units. Prices outside `[tick, 1 - tick]`
//! are rejected, never clamped.

use alloy_primitives::{Address, U256};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::domain::{OrderSide, SignatureType};
use super::order_types::{rand_salt, OrderData};
use crate::config::ContractConfig;
use crate::rounding::{fit_amount, round_down, round_normal, RoundingProfile, TickSize};
use crate::types::{OrderType, UserOrder};
use crate::{Error, Result};

/// Maker and taker amounts before scaling to base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAmounts {
    pub maker: Decimal,
    pub taker: Decimal,
}

/// Amounts of a GTC/GTD order.
#[allow(clippy::result_large_err)]
pub fn limit_order_amounts(
    side: OrderSide,
    size: Decimal,
    price: Decimal,
    profile: RoundingProfile,
) -> Result<RawAmounts> {
    let raw_price = round_normal(price, profile.price);

    match side {
        OrderSide::Buy => {
            let taker = round_down(size, profile.size);
            let maker = fit_amount(checked_mul(taker, raw_price)?, profile.amount);
            Ok(RawAmounts { maker, taker })
        }
        OrderSide::Sell => sell_amounts(size, raw_price, profile),
    }
}

/// Amounts of a FOK/FAK order.
///
/// The price is rounded down so the order never fills worse than asked. For
/// a BUY, `size` is the collateral to spend.
#[allow(clippy::result_large_err)]
pub fn market_order_amounts(
    side: OrderSide,
    size: Decimal,
    price: Decimal,
    profile: RoundingProfile,
) -> Result<RawAmounts> {
    let raw_price = round_down(price, profile.price);

    match side {
        OrderSide::Buy => {
            if raw_price.is_zero() {
                return Err(Error::validation(format!(
                    "price {} rounds to zero at {} decimals",
                    price, profile.price
                )));
            }
            let maker = round_down(size, profile.size);
            let taker = maker
                .checked_div(raw_price)
                .ok_or_else(|| Error::validation("order amount overflow"))?;
            Ok(RawAmounts {
                maker,
                taker: fit_amount(taker, profile.amount),
            })
        }
        OrderSide::Sell => sell_amounts(size, raw_price, profile),
    }
}

#[allow(clippy::result_large_err)]
fn sell_amounts(size: Decimal, raw_price: Decimal, profile: RoundingProfile) -> Result<RawAmounts> {
    let maker = round_down(size, profile.size);
    let taker = fit_amount(checked_mul(maker, raw_price)?, profile.amount);
    Ok(RawAmounts { maker, taker })
}

#[allow(clippy::result_large_err)]
fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| Error::validation("order amount overflow"))
}

/// Scale a decimal amount to integer base units, truncating any remainder.
#[allow(clippy::result_large_err)]
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<U256> {
    let scale = 10u64
        .checked_pow(decimals)
        .map(Decimal::from)
        .ok_or_else(|| Error::validation(format!("unsupported token decimals {}", decimals)))?;
    let scaled = checked_mul(amount, scale)?.abs().trunc();
    scaled
        .to_u128()
        .map(U256::from)
        .ok_or_else(|| Error::validation(format!("amount {} out of range", amount)))
}

/// Builds order data for one signer.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    signer: Address,
    funder: Option<Address>,
    signature_type: SignatureType,
    contracts: ContractConfig,
}

impl OrderBuilder {
    pub fn new(signer: Address, contracts: ContractConfig) -> Self {
        Self {
            signer,
            funder: None,
            signature_type: SignatureType::Eoa,
            contracts,
        }
    }

    /// Set the address holding the funds, when it differs from the signer.
    pub fn funder(mut self, funder: Option<Address>) -> Self {
        self.funder = funder;
        self
    }

    pub fn signature_type(mut self, signature_type: SignatureType) -> Self {
        self.signature_type = signature_type;
        self
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    /// Maker of every order: the funder if set, otherwise the signer.
    pub fn maker(&self) -> Address {
        self.funder.unwrap_or(self.signer)
    }

    /// Build the order data for `order` on a market with `tick_size`.
    #[allow(clippy::result_large_err)]
    pub fn build(
        &self,
        order: &UserOrder,
        order_type: OrderType,
        tick_size: TickSize,
    ) -> Result<OrderData> {
        if order.size <= Decimal::ZERO {
            return Err(Error::validation(format!(
                "size must be positive, got {}",
                order.size
            )));
        }
        if !tick_size.is_valid_price(order.price) {
            return Err(Error::validation(format!(
                "invalid price ({}), min: {} - max: {}",
                order.price,
                tick_size,
                Decimal::ONE - tick_size.as_decimal()
            )));
        }

        let token_id = U256::from_str_radix(order.token_id.trim(), 10).map_err(|e| {
            Error::validation(format!("invalid token id {:?}: {}", order.token_id, e))
        })?;

        let profile = tick_size.rounding_profile();
        let amounts = if order_type.is_market() {
            market_order_amounts(order.side, order.size, order.price, profile)?
        } else {
            limit_order_amounts(order.side, order.size, order.price, profile)?
        };

        // Buyers pay collateral and receive outcome tokens, sellers the reverse.
        let (maker_decimals, taker_decimals) = match order.side {
            OrderSide::Buy => (
                self.contracts.collateral_decimals,
                self.contracts.conditional_decimals,
            ),
            OrderSide::Sell => (
                self.contracts.conditional_decimals,
                self.contracts.collateral_decimals,
            ),
        };

        let maker_amount = to_base_units(amounts.maker, maker_decimals)?;
        let taker_amount = to_base_units(amounts.taker, taker_decimals)?;
        if maker_amount.is_zero() || taker_amount.is_zero() {
            return Err(Error::validation(format!(
                "size {} at price {} rounds to a zero amount",
                order.size, order.price
            )));
        }

        Ok(OrderData {
            salt: rand_salt(),
            maker: self.maker(),
            signer: self.signer,
            taker: order.taker.unwrap_or(Address::ZERO),
            token_id,
            maker_amount,
            taker_amount,
            expiration: order.expiration.filter(|v| *v > 0),
            nonce: order.nonce.filter(|v| *v > 0),
            fee_rate_bps: order.fee_rate_bps.filter(|v| *v > 0),
            side: order.side,
            signature_type: self.signature_type,
        })
    }
}
