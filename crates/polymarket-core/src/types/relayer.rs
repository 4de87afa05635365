//! Wire types of the Safe relayer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of relayed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "SAFE-CREATE")]
    SafeCreate,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Safe => "SAFE",
            TransactionType::SafeCreate => "SAFE-CREATE",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state reported by the relayer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayerTransactionState {
    #[serde(rename = "STATE_NEW")]
    New,
    #[serde(rename = "STATE_EXECUTED")]
    Executed,
    #[serde(rename = "STATE_MINED")]
    Mined,
    #[serde(rename = "STATE_CONFIRMED")]
    Confirmed,
    #[serde(rename = "STATE_FAILED")]
    Failed,
    #[serde(rename = "STATE_INVALID")]
    Invalid,
    /// Any state this client does not know about.
    #[serde(untagged)]
    Other(String),
}

impl RelayerTransactionState {
    pub fn as_str(&self) -> &str {
        match self {
            RelayerTransactionState::New => "STATE_NEW",
            RelayerTransactionState::Executed => "STATE_EXECUTED",
            RelayerTransactionState::Mined => "STATE_MINED",
            RelayerTransactionState::Confirmed => "STATE_CONFIRMED",
            RelayerTransactionState::Failed => "STATE_FAILED",
            RelayerTransactionState::Invalid => "STATE_INVALID",
            RelayerTransactionState::Other(s) => s,
        }
    }
}

impl fmt::Display for RelayerTransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature parameters sent alongside a relayed transaction. Safe
/// transactions fill the gas fields, Safe creations the payment fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_txn_gas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_gas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_receiver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_receiver: Option<String>,
}

/// Body of `POST /submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_wallet: Option<String>,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    pub signature: String,
    pub signature_params: SignatureParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

/// A transaction as stored by the relayer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerTransaction {
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    #[serde(default)]
    pub transaction_hash: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub proxy_address: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub value: String,
    pub state: RelayerTransactionState,
    #[serde(default, rename = "type")]
    pub transaction_type: String,
    #[serde(default)]
    pub metadata: String,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Acknowledgement of `POST /submit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerTransactionResponse {
    #[serde(default, rename = "transactionID")]
    pub transaction_id: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub transaction_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NoncePayload {
    pub nonce: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeployedPayload {
    pub deployed: bool,
}
