//! Chain constants and client configuration.
//!
//! Contract addresses are resolved once, when a client is constructed, from
//! the chain id. An unsupported chain id is a configuration error.

use crate::signing::SignatureType;
use crate::{Error, Result};
use alloy_primitives::{address, Address};
use std::env;
use std::time::Duration;

/// Chain ID for Polygon mainnet.
pub const POLYGON_CHAIN_ID: u64 = 137;

/// Chain ID for Polygon Amoy testnet.
pub const POLYGON_AMOY_CHAIN_ID: u64 = 80002;

/// Decimals of the collateral token (USDC.e).
pub const COLLATERAL_TOKEN_DECIMALS: u32 = 6;

/// Decimals of the conditional (outcome) tokens.
pub const CONDITIONAL_TOKEN_DECIMALS: u32 = 6;

/// Default CLOB API base URL.
pub const DEFAULT_CLOB_URL: &str = "https://clob.polymarket.com";

/// Default relayer base URL.
pub const DEFAULT_RELAYER_URL: &str = "https://relayer-v2.polymarket.com";

/// Contract addresses and token precision for one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractConfig {
    pub exchange: Address,
    pub neg_risk_exchange: Address,
    pub neg_risk_adapter: Address,
    pub collateral: Address,
    pub conditional_tokens: Address,
    pub safe_factory: Address,
    pub safe_multisend: Address,
    pub collateral_decimals: u32,
    pub conditional_decimals: u32,
}

/// Chain id together with its resolved contract set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub contracts: ContractConfig,
}

impl ChainConfig {
    /// Resolve the contract set for a chain id.
    #[allow(clippy::result_large_err)]
    pub fn for_chain_id(chain_id: u64) -> Result<Self> {
        let contracts = match chain_id {
            POLYGON_CHAIN_ID => polygon_contracts(),
            POLYGON_AMOY_CHAIN_ID => amoy_contracts(),
            other => {
                return Err(Error::Config {
                    message: format!("unsupported chain id {}", other),
                })
            }
        };

        Ok(Self {
            chain_id,
            contracts,
        })
    }

    /// Polygon mainnet.
    pub fn polygon() -> Self {
        Self {
            chain_id: POLYGON_CHAIN_ID,
            contracts: polygon_contracts(),
        }
    }

    /// Exchange contract used as the order verifying contract.
    pub fn exchange_for(&self, neg_risk: bool) -> Address {
        if neg_risk {
            self.contracts.neg_risk_exchange
        } else {
            self.contracts.exchange
        }
    }
}

fn polygon_contracts() -> ContractConfig {
    ContractConfig {
        exchange: address!("4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E"),
        neg_risk_exchange: address!("C5d563A36AE78145C45a50134d48A1215220f80a"),
        neg_risk_adapter: address!("d91E80cF2E7be2e162c6513ceD06f1dD0dA35296"),
        collateral: address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
        conditional_tokens: address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045"),
        safe_factory: address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b"),
        safe_multisend: address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761"),
        collateral_decimals: COLLATERAL_TOKEN_DECIMALS,
        conditional_decimals: CONDITIONAL_TOKEN_DECIMALS,
    }
}

// Amoy shares the Safe factory and multisend deployments with mainnet.
fn amoy_contracts() -> ContractConfig {
    ContractConfig {
        exchange: address!("dFE02Eb6733538f8Ea35D585af8DE5958AD99E40"),
        neg_risk_exchange: address!("C5d563A36AE78145C45a50134d48A1215220f80a"),
        neg_risk_adapter: address!("d91E80cF2E7be2e162c6513ceD06f1dD0dA35296"),
        collateral: address!("9c4e1703476e875070ee25b56a58b008cfb8fa78"),
        conditional_tokens: address!("69308FB512518e39F9b16112fA8d994F4e2Bf8bB"),
        safe_factory: address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b"),
        safe_multisend: address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761"),
        collateral_decimals: COLLATERAL_TOKEN_DECIMALS,
        conditional_decimals: CONDITIONAL_TOKEN_DECIMALS,
    }
}

/// Client settings loaded from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub chain: ChainConfig,
    pub clob_url: String,
    pub relayer_url: String,
    /// Address holding the funds when trading through a proxy or Safe.
    pub funder: Option<Address>,
    pub signature_type: SignatureType,
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Default settings for a chain.
    #[allow(clippy::result_large_err)]
    pub fn for_chain_id(chain_id: u64) -> Result<Self> {
        Ok(Self {
            chain: ChainConfig::for_chain_id(chain_id)?,
            clob_url: DEFAULT_CLOB_URL.to_string(),
            relayer_url: DEFAULT_RELAYER_URL.to_string(),
            funder: None,
            signature_type: SignatureType::default(),
            http_timeout: Duration::from_secs(30),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured when present. Every variable is optional;
    /// `POLY_CHAIN_ID` defaults to Polygon mainnet.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let chain_id = match env::var("POLY_CHAIN_ID") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| Error::Config {
                message: format!("POLY_CHAIN_ID is not a valid chain id: {}", raw),
            })?,
            Err(_) => POLYGON_CHAIN_ID,
        };

        let funder = match env::var("POLY_FUNDER_ADDRESS") {
            Ok(raw) if !raw.trim().is_empty() => {
                Some(raw.trim().parse::<Address>().map_err(|e| Error::Config {
                    message: format!("POLY_FUNDER_ADDRESS is not a valid address: {}", e),
                })?)
            }
            _ => None,
        };

        let signature_type = match env::var("POLY_SIGNATURE_TYPE") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(SignatureType::from_u8)
                .ok_or_else(|| Error::Config {
                    message: format!("POLY_SIGNATURE_TYPE must be 0, 1 or 2, got {}", raw),
                })?,
            Err(_) => SignatureType::default(),
        };

        Ok(Self {
            chain: ChainConfig::for_chain_id(chain_id)?,
            clob_url: env::var("POLYMARKET_CLOB_URL")
                .unwrap_or_else(|_| DEFAULT_CLOB_URL.to_string()),
            relayer_url: env::var("POLYMARKET_RELAYER_URL")
                .unwrap_or_else(|_| DEFAULT_RELAYER_URL.to_string()),
            funder,
            signature_type,
            http_timeout: Duration::from_secs(
                env::var("POLY_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }
}
