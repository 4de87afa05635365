//! Tick-size aware decimal rounding.
//!
//! Every market trades on one of four tick sizes. The tick size fixes how
//! many decimals an order's price, size and notional amount may carry.

use crate::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tolerance used for half-up rounding and price range checks (1e-9).
pub const EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Minimum price increment of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TickSize {
    /// 0.1
    Tenth,
    /// 0.01
    Hundredth,
    /// 0.001
    Thousandth,
    /// 0.0001
    TenThousandth,
}

/// Decimal precision allowed for price, size and amount of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundingProfile {
    pub price: u32,
    pub size: u32,
    pub amount: u32,
}

impl TickSize {
    pub const ALL: [TickSize; 4] = [
        TickSize::Tenth,
        TickSize::Hundredth,
        TickSize::Thousandth,
        TickSize::TenThousandth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TickSize::Tenth => "0.1",
            TickSize::Hundredth => "0.01",
            TickSize::Thousandth => "0.001",
            TickSize::TenThousandth => "0.0001",
        }
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(1, self.decimals())
    }

    fn decimals(&self) -> u32 {
        match self {
            TickSize::Tenth => 1,
            TickSize::Hundredth => 2,
            TickSize::Thousandth => 3,
            TickSize::TenThousandth => 4,
        }
    }

    pub fn rounding_profile(&self) -> RoundingProfile {
        let price = self.decimals();
        RoundingProfile {
            price,
            size: 2,
            amount: price + 2,
        }
    }

    /// Map an arbitrary decimal (e.g. `0.010` from the API) onto a tick size.
    #[allow(clippy::result_large_err)]
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        let normalized = value.normalize();
        Self::ALL
            .into_iter()
            .find(|tick| tick.as_decimal() == normalized)
            .ok_or_else(|| Error::validation(format!("unsupported tick size {}", value)))
    }

    /// Whether `price` lies in `[tick, 1 - tick]`, with a 1e-9 tolerance.
    pub fn is_valid_price(&self, price: Decimal) -> bool {
        let tick = self.as_decimal();
        price >= tick - EPSILON && price <= Decimal::ONE - tick + EPSILON
    }
}

impl fmt::Display for TickSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TickSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| Error::validation(format!("invalid tick size {:?}: {}", s, e)))?;
        Self::from_decimal(value)
    }
}

impl TryFrom<String> for TickSize {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TickSize> for String {
    fn from(tick: TickSize) -> Self {
        tick.as_str().to_string()
    }
}

/// Number of fractional digits in the shortest representation of `x`.
pub fn decimal_places(x: Decimal) -> u32 {
    x.normalize().scale()
}

/// Round half away from zero to `dp` places, nudged up by 1e-9.
///
/// Values that already fit in `dp` places are returned unchanged.
pub fn round_normal(x: Decimal, dp: u32) -> Decimal {
    if decimal_places(x) <= dp {
        return x;
    }
    (x + EPSILON).round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Floor to `dp` places.
pub fn round_down(x: Decimal, dp: u32) -> Decimal {
    if decimal_places(x) <= dp {
        return x;
    }
    x.round_dp_with_strategy(dp, RoundingStrategy::ToNegativeInfinity)
}

/// Ceil to `dp` places.
pub fn round_up(x: Decimal, dp: u32) -> Decimal {
    if decimal_places(x) <= dp {
        return x;
    }
    x.round_dp_with_strategy(dp, RoundingStrategy::ToPositiveInfinity)
}

/// Bring an amount back within `amount_dp` decimals: first ceil at four extra
/// places, then floor if that still leaves too many.
pub fn fit_amount(x: Decimal, amount_dp: u32) -> Decimal {
    if decimal_places(x) <= amount_dp {
        return x;
    }
    let widened = round_up(x, amount_dp + 4);
    if decimal_places(widened) > amount_dp {
        round_down(widened, amount_dp)
    } else {
        widened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_profiles() {
        assert_eq!(
            TickSize::Tenth.rounding_profile(),
            RoundingProfile { price: 1, size: 2, amount: 3 }
        );
        assert_eq!(
            TickSize::Hundredth.rounding_profile(),
            RoundingProfile { price: 2, size: 2, amount: 4 }
        );
        assert_eq!(
            TickSize::Thousandth.rounding_profile(),
            RoundingProfile { price: 3, size: 2, amount: 5 }
        );
        assert_eq!(
            TickSize::TenThousandth.rounding_profile(),
            RoundingProfile { price: 4, size: 2, amount: 6 }
        );
    }

    #[test]
    fn test_price_decimals_increase_as_tick_shrinks() {
        let decimals: Vec<u32> = TickSize::ALL
            .iter()
            .map(|t| t.rounding_profile().price)
            .collect();
        assert!(decimals.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_tick_size_parsing() {
        assert_eq!("0.01".parse::<TickSize>().unwrap(), TickSize::Hundredth);
        assert_eq!("0.010".parse::<TickSize>().unwrap(), TickSize::Hundredth);
        assert_eq!("0.0001".parse::<TickSize>().unwrap(), TickSize::TenThousandth);
        assert!("0.05".parse::<TickSize>().is_err());
        assert!("abc".parse::<TickSize>().is_err());
        assert_eq!(TickSize::Thousandth.to_string(), "0.001");
    }

    #[test]
    fn test_tick_size_serde() {
        let json = serde_json::to_string(&TickSize::Tenth).unwrap();
        assert_eq!(json, "\"0.1\"");
        let back: TickSize = serde_json::from_str("\"0.001\"").unwrap();
        assert_eq!(back, TickSize::Thousandth);
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(dec("14")), 0);
        assert_eq!(decimal_places(dec("14.00")), 0);
        assert_eq!(decimal_places(dec("0.137")), 3);
        assert_eq!(decimal_places(dec("1.50")), 1);
    }

    #[test]
    fn test_round_normal() {
        assert_eq!(round_normal(dec("0.137"), 2), dec("0.14"));
        assert_eq!(round_normal(dec("0.125"), 2), dec("0.13"));
        assert_eq!(round_normal(dec("0.124"), 2), dec("0.12"));
        assert_eq!(round_normal(dec("0.5"), 2), dec("0.5"));
    }

    #[test]
    fn test_round_down_and_up() {
        assert_eq!(round_down(dec("100.129"), 2), dec("100.12"));
        assert_eq!(round_up(dec("100.121"), 2), dec("100.13"));
        assert_eq!(round_down(dec("100"), 2), dec("100"));
        assert_eq!(round_up(dec("3.1"), 2), dec("3.1"));
    }

    #[test]
    fn test_rounding_is_idempotent() {
        let samples = ["0.137", "12.34567", "0.0001", "99.999999", "5", "0.5551"];
        for s in samples {
            let x = dec(s);
            for dp in 0..6 {
                let down = round_down(x, dp);
                assert_eq!(round_down(down, dp), down, "round_down {} {}", s, dp);
                let up = round_up(x, dp);
                assert_eq!(round_up(up, dp), up, "round_up {} {}", s, dp);
                let normal = round_normal(x, dp);
                assert_eq!(round_normal(normal, dp), normal, "round_normal {} {}", s, dp);
            }
        }
    }

    #[test]
    fn test_fit_amount() {
        assert_eq!(fit_amount(dec("14.00"), 4), dec("14.00"));
        assert_eq!(fit_amount(dec("1.23456789"), 4), dec("1.2345"));
        assert_eq!(fit_amount(dec("1.234500001"), 4), dec("1.2345"));
    }

    #[test]
    fn test_price_range_per_tick() {
        for tick in TickSize::ALL {
            let t = tick.as_decimal();
            assert!(tick.is_valid_price(t));
            assert!(tick.is_valid_price(Decimal::ONE - t));
            assert!(tick.is_valid_price(Decimal::new(5, 1)));
            assert!(tick.is_valid_price(t - EPSILON));
            assert!(tick.is_valid_price(Decimal::ONE - t + EPSILON));
            assert!(!tick.is_valid_price(t - EPSILON - EPSILON));
            assert!(!tick.is_valid_price(Decimal::ONE - t + EPSILON + EPSILON));
            assert!(!tick.is_valid_price(Decimal::ZERO));
            assert!(!tick.is_valid_price(Decimal::ONE));
        }
    }
}
