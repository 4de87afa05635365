//! Polymarket Core Library
//!
//! Order construction and signing, API authentication headers, Safe
//! transaction assembly, and the CLOB and relayer clients built on them.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod rounding;
pub mod safe;
pub mod signing;
pub mod types;

pub use error::{Error, Result};
