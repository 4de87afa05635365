//! Signing module for Polymarket CLOB orders.
//!
//! This module provides EIP-712 typed data signing for orders, L1
//! authentication messages and Safe deployment requests.
//!
//! # Architecture
//!
//! ```text
//! UserOrder ── OrderBuilder ──► OrderData
//!                                  │
//!                                  ▼
//!                            OrderSigner ── digest ──► SigningCapability
//!                                  │                  (LocalSigner, KMS, ...)
//!                                  ▼
//!                             SignedOrder ──► ClobClient
//! ```
//!
//! # Example
//!
//! ```ignore
//! use polymarket_core::config::ChainConfig;
//! use polymarket_core::rounding::TickSize;
//! use polymarket_core::signing::{LocalSigner, OrderSigner};
//! use polymarket_core::types::{OrderType, UserOrder};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let local = LocalSigner::from_env()?;
//! let address = local.address();
//! let signer = OrderSigner::new(Arc::new(local), address, ChainConfig::polygon());
//!
//! let order = UserOrder::buy("12345", Decimal::new(50, 2), Decimal::from(100));
//! let signed = signer
//!     .create_order(&order, OrderType::Gtc, TickSize::Hundredth, false)
//!     .await?;
//! ```

pub mod domain;
pub mod order_builder;
pub mod order_signer;
pub mod order_types;
pub mod signer;
pub mod typed_data;

pub use domain::{Eip712Domain, OrderSide, SignatureType};
pub use order_builder::OrderBuilder;
pub use order_signer::OrderSigner;
pub use order_types::{OrderData, OrderPayload, SignedOrder};
pub use signer::{LocalSigner, SigningCapability};
pub use typed_data::SafeTxMessage;
