//! EIP-712 domain separators.
//!
//! Four domains are in use: the CTF exchanges (orders), `ClobAuthDomain`
//! (L1 API authentication), the proxy factory (Safe deployment) and each
//! Safe itself (Safe transactions). They differ only in which of the optional
//! domain fields are present, so a single type covers all of them.

use alloy_primitives::{keccak256, Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the exchange domain used for order signing.
pub const EXCHANGE_DOMAIN_NAME: &str = "Polymarket CTF Exchange";

/// Name of the domain used for L1 API authentication.
pub const CLOB_AUTH_DOMAIN_NAME: &str = "ClobAuthDomain";

/// Name of the Safe proxy factory domain.
pub const PROXY_FACTORY_DOMAIN_NAME: &str = "Polymarket Contract Proxy Factory";

/// EIP-712 domain. Absent fields are left out of both the type string and
/// the encoded data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
    pub name: Option<String>,
    pub version: Option<String>,
    pub chain_id: U256,
    pub verifying_contract: Option<Address>,
}

impl Eip712Domain {
    /// Domain of a CTF exchange contract (regular or neg-risk).
    pub fn exchange(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: Some(EXCHANGE_DOMAIN_NAME.to_string()),
            version: Some("1".to_string()),
            chain_id: U256::from(chain_id),
            verifying_contract: Some(verifying_contract),
        }
    }

    /// `ClobAuthDomain`, which has no verifying contract.
    pub fn clob_auth(chain_id: u64) -> Self {
        Self {
            name: Some(CLOB_AUTH_DOMAIN_NAME.to_string()),
            version: Some("1".to_string()),
            chain_id: U256::from(chain_id),
            verifying_contract: None,
        }
    }

    /// Proxy factory domain, which has no version.
    pub fn proxy_factory(chain_id: u64, factory: Address) -> Self {
        Self {
            name: Some(PROXY_FACTORY_DOMAIN_NAME.to_string()),
            version: None,
            chain_id: U256::from(chain_id),
            verifying_contract: Some(factory),
        }
    }

    /// Domain of a Safe wallet: chain id and the Safe address only.
    pub fn safe(chain_id: u64, safe: Address) -> Self {
        Self {
            name: None,
            version: None,
            chain_id: U256::from(chain_id),
            verifying_contract: Some(safe),
        }
    }

    /// The `EIP712Domain(...)` type string for the fields present.
    pub fn type_string(&self) -> String {
        let mut fields = Vec::with_capacity(4);
        if self.name.is_some() {
            fields.push("string name");
        }
        if self.version.is_some() {
            fields.push("string version");
        }
        fields.push("uint256 chainId");
        if self.verifying_contract.is_some() {
            fields.push("address verifyingContract");
        }
        format!("EIP712Domain({})", fields.join(","))
    }

    /// Compute the EIP-712 domain separator hash.
    pub fn separator(&self) -> B256 {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(keccak256(self.type_string().as_bytes()).as_slice());

        if let Some(name) = &self.name {
            encoded.extend_from_slice(keccak256(name.as_bytes()).as_slice());
        }
        if let Some(version) = &self.version {
            encoded.extend_from_slice(keccak256(version.as_bytes()).as_slice());
        }
        encoded.extend_from_slice(&self.chain_id.to_be_bytes::<32>());
        if let Some(contract) = &self.verifying_contract {
            // Addresses are left-padded to a full word.
            encoded.extend_from_slice(B256::left_padding_from(contract.as_slice()).as_slice());
        }

        keccak256(&encoded)
    }
}

/// Order side (buy/sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy = 0,
    Sell = 1,
}

impl OrderSide {
    /// Get the numeric value for signing.
    pub fn as_u8(&self) -> u8 {
        match self {
            OrderSide::Buy => 0,
            OrderSide::Sell => 1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Signature type of an order's signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignatureType {
    /// Plain externally owned account.
    #[default]
    Eoa = 0,
    /// Polymarket proxy wallet.
    PolyProxy = 1,
    /// Gnosis Safe owned by the signer.
    PolyGnosisSafe = 2,
}

impl SignatureType {
    /// Get the numeric value for signing.
    pub fn as_u8(&self) -> u8 {
        match self {
            SignatureType::Eoa => 0,
            SignatureType::PolyProxy => 1,
            SignatureType::PolyGnosisSafe => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SignatureType::Eoa),
            1 => Some(SignatureType::PolyProxy),
            2 => Some(SignatureType::PolyGnosisSafe),
            _ => None,
        }
    }
}
