//! Calls executed through a Safe.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How a Safe performs a call. Serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OperationType {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl OperationType {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl From<OperationType> for u8 {
    fn from(operation: OperationType) -> Self {
        operation.as_u8()
    }
}

impl TryFrom<u8> for OperationType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(OperationType::Call),
            1 => Ok(OperationType::DelegateCall),
            other => Err(Error::validation(format!("invalid operation {}", other))),
        }
    }
}

/// One call made by a Safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeTransaction {
    pub to: Address,
    pub operation: OperationType,
    /// Calldata as `0x`-prefixed hex.
    pub data: String,
    /// Native value in wei, as a decimal string.
    pub value: String,
}

impl SafeTransaction {
    /// A plain call carrying no native value.
    pub fn call(to: Address, data: &[u8]) -> Self {
        Self {
            to,
            operation: OperationType::Call,
            data: format!("0x{}", hex::encode(data)),
            value: "0".to_string(),
        }
    }

    #[allow(clippy::result_large_err)]
    pub fn data_bytes(&self) -> Result<Bytes> {
        let raw = self.data.trim_start_matches("0x");
        hex::decode(raw)
            .map(Bytes::from)
            .map_err(|e| Error::validation(format!("invalid calldata {:?}: {}", self.data, e)))
    }

    #[allow(clippy::result_large_err)]
    pub fn value_u256(&self) -> Result<U256> {
        let value = self.value.trim();
        if value.is_empty() {
            return Ok(U256::ZERO);
        }
        U256::from_str_radix(value, 10)
            .map_err(|e| Error::validation(format!("invalid value {:?}: {}", self.value, e)))
    }
}
