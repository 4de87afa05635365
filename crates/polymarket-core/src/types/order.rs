//! Order types for the CLOB API.

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rounding::TickSize;
use crate::signing::OrderSide;

/// Time-in-force of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Good-til-cancelled.
    #[default]
    Gtc,
    /// Good-til-date, expires at the order's expiration.
    Gtd,
    /// Fill-or-kill.
    Fok,
    /// Fill-and-kill: fill what is possible, cancel the rest.
    Fak,
}

impl OrderType {
    /// FOK and FAK orders take liquidity immediately and are priced as
    /// market orders.
    pub fn is_market(&self) -> bool {
        matches!(self, OrderType::Fok | OrderType::Fak)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Gtc => "GTC",
            OrderType::Gtd => "GTD",
            OrderType::Fok => "FOK",
            OrderType::Fak => "FAK",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trade intent, before rounding and signing.
///
/// For limit orders `size` is the number of outcome tokens. For a market BUY
/// it is the amount of collateral to spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrder {
    #[serde(rename = "tokenID")]
    pub token_id: String,
    pub price: Decimal,
    pub size: Decimal,
    pub side: OrderSide,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_rate_bps: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// Unix seconds. `None` never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u64>,
    /// `None` is a public order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker: Option<Address>,
}

impl UserOrder {
    pub fn new(token_id: impl Into<String>, price: Decimal, size: Decimal, side: OrderSide) -> Self {
        Self {
            token_id: token_id.into(),
            price,
            size,
            side,
            fee_rate_bps: None,
            nonce: None,
            expiration: None,
            taker: None,
        }
    }

    pub fn buy(token_id: impl Into<String>, price: Decimal, size: Decimal) -> Self {
        Self::new(token_id, price, size, OrderSide::Buy)
    }

    pub fn sell(token_id: impl Into<String>, price: Decimal, size: Decimal) -> Self {
        Self::new(token_id, price, size, OrderSide::Sell)
    }

    pub fn with_fee_rate_bps(mut self, fee_rate_bps: u64) -> Self {
        self.fee_rate_bps = Some(fee_rate_bps);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_expiration(mut self, expiration: u64) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn with_taker(mut self, taker: Address) -> Self {
        self.taker = Some(taker);
        self
    }
}

/// Market parameters supplied by the caller for a single order.
///
/// A field left as `None` is looked up (and cached) through the CLOB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOrderOptions {
    pub tick_size: Option<TickSize>,
    pub neg_risk: Option<bool>,
}

impl CreateOrderOptions {
    pub fn with_tick_size(mut self, tick_size: TickSize) -> Self {
        self.tick_size = Some(tick_size);
        self
    }

    pub fn with_neg_risk(mut self, neg_risk: bool) -> Self {
        self.neg_risk = Some(neg_risk);
        self
    }
}

/// Response to an order submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, rename = "errorMsg")]
    pub error_msg: String,
    #[serde(default, rename = "orderID")]
    pub order_id: String,
    #[serde(default, rename = "transactionsHashes")]
    pub transactions_hashes: Vec<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "takingAmount")]
    pub taking_amount: String,
    #[serde(default, rename = "makingAmount")]
    pub making_amount: String,
}

/// An order resting on the book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenOrder {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub maker_address: String,
    #[serde(default)]
    pub market: String,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub original_size: String,
    #[serde(default)]
    pub size_matched: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub expiration: String,
    #[serde(default)]
    pub order_type: String,
    #[serde(default)]
    pub associate_trades: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
}

/// Filters for [`get_open_orders`](crate::api::ClobClient::get_open_orders).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOrderParams {
    pub id: Option<String>,
    pub market: Option<String>,
    pub asset_id: Option<String>,
}

impl OpenOrderParams {
    pub fn to_query(&self) -> Vec<(String, String)> {
        [
            ("id", &self.id),
            ("market", &self.market),
            ("asset_id", &self.asset_id),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
        .collect()
    }
}

/// One page of `GET /data/orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenOrdersPage {
    #[serde(default)]
    pub data: Vec<OpenOrder>,
    #[serde(default)]
    pub next_cursor: String,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub count: u64,
}

/// Result of a cancel request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelResponse {
    #[serde(default)]
    pub canceled: Vec<String>,
    #[serde(default)]
    pub not_canceled: HashMap<String, String>,
}
