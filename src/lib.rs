//! Polymarket SDK
//!
//! Thin facade over `polymarket-core` used by the benchmarks and end-to-end
//! tests. The interesting pieces live in the core crate:
//!
//! - `signing`: order building and EIP-712 signing
//! - `auth`: L1, L2 and builder authentication headers
//! - `safe`: Safe address derivation, multisend batching, SafeTx signing
//! - `api`: CLOB and relayer clients over a pluggable transport

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use polymarket_core as core;
pub use polymarket_core::api::{ClobClient, RelayerClient};
pub use polymarket_core::{Error, Result};

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used, e.g.
/// `"polymarket_core=debug"`. Set `LOG_FORMAT=json` for JSON lines.
/// Calling this twice is a no-op.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
