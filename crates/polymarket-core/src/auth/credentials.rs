//! API credentials.

use serde::{Deserialize, Serialize};
use std::env;

use crate::{Error, Result};

/// L2 API credentials for authenticated CLOB requests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyCreds {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// URL-safe base64 secret for HMAC signing.
    pub secret: String,
    pub passphrase: String,
}

impl std::fmt::Debug for ApiKeyCreds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyCreds")
            .field("api_key", &"[REDACTED]")
            .field("secret", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

impl ApiKeyCreds {
    pub fn new(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
        }
    }

    /// Load from `POLY_API_KEY`, `POLY_API_SECRET` and `POLY_API_PASSPHRASE`.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            api_key: required_var("POLY_API_KEY")?,
            secret: required_var("POLY_API_SECRET")?,
            passphrase: required_var("POLY_API_PASSPHRASE")?,
        })
    }
}

/// Credentials of an order-flow builder. Shaped like [`ApiKeyCreds`] but
/// used for the separate `POLY_BUILDER_*` headers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderApiKeyCreds {
    pub key: String,
    pub secret: String,
    pub passphrase: String,
}

impl std::fmt::Debug for BuilderApiKeyCreds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderApiKeyCreds")
            .field("key", &"[REDACTED]")
            .field("secret", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

impl BuilderApiKeyCreds {
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
        }
    }

    /// Load from `POLY_BUILDER_API_KEY`, `POLY_BUILDER_SECRET` and
    /// `POLY_BUILDER_PASSPHRASE`.
    ///
    /// Returns `Ok(None)` when no builder key is configured and an error when
    /// only some of the variables are set.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Option<Self>> {
        dotenvy::dotenv().ok();
        if env::var("POLY_BUILDER_API_KEY").is_err() {
            return Ok(None);
        }
        Ok(Some(Self {
            key: required_var("POLY_BUILDER_API_KEY")?,
            secret: required_var("POLY_BUILDER_SECRET")?,
            passphrase: required_var("POLY_BUILDER_PASSPHRASE")?,
        }))
    }
}

#[allow(clippy::result_large_err)]
fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config {
        message: format!("{} environment variable not set", name),
    })
}
