//! Error types for the Polymarket client core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied input was rejected (price range, address, signature v, ...).
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The signing capability failed or returned malformed output.
    #[error("Signing error: {message}")]
    Signing { message: String },

    /// ABI or typed-data construction failed.
    #[error("Encoding error: {message}")]
    Encoding { message: String },

    /// The remote service answered with a non-2xx status.
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        body: String,
    },

    #[error("Transaction {transaction_id} not in a target state after {polls} polls")]
    Timeout { transaction_id: String, polls: u32 },

    #[error("Polling for transaction {transaction_id} was cancelled")]
    Cancelled { transaction_id: String },

    #[error("Transaction {transaction_id} reached failure state {state} (hash={transaction_hash})")]
    TerminalState {
        transaction_id: String,
        state: String,
        transaction_hash: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Authentication error: {message}")]
    Auth { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Build an upstream error from a status code and raw response body.
    ///
    /// The message is taken from the body's `error`, `message` or `msg`
    /// field when the body is a JSON object, otherwise the raw body is used.
    pub fn upstream(status: u16, body: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(body).into_owned();
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["error", "message", "msg"].iter().find_map(|key| {
                    value.get(*key).and_then(|v| match v {
                        serde_json::Value::String(s) => Some(s.clone()),
                        serde_json::Value::Null => None,
                        other => Some(other.to_string()),
                    })
                })
            })
            .unwrap_or_else(|| raw.clone());

        Self::Upstream {
            status,
            message,
            body: raw,
        }
    }

    /// Whether the error was caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
