//! Authentication headers for the CLOB and relayer APIs.
//!
//! * L1: a `ClobAuth` wallet signature, used to create or derive API keys.
//! * L2: an HMAC over the request with the API secret.
//! * Builder: the same HMAC with a builder's secret, merged into L2 headers.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use base64::Engine;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;

use super::credentials::{ApiKeyCreds, BuilderApiKeyCreds};
use crate::signing::typed_data::sign_clob_auth;
use crate::signing::SigningCapability;
use crate::{Error, Result};

pub const POLY_ADDRESS: &str = "POLY_ADDRESS";
pub const POLY_SIGNATURE: &str = "POLY_SIGNATURE";
pub const POLY_TIMESTAMP: &str = "POLY_TIMESTAMP";
pub const POLY_NONCE: &str = "POLY_NONCE";
pub const POLY_API_KEY: &str = "POLY_API_KEY";
pub const POLY_PASSPHRASE: &str = "POLY_PASSPHRASE";
pub const POLY_BUILDER_SIGNATURE: &str = "POLY_BUILDER_SIGNATURE";
pub const POLY_BUILDER_TIMESTAMP: &str = "POLY_BUILDER_TIMESTAMP";
pub const POLY_BUILDER_API_KEY: &str = "POLY_BUILDER_API_KEY";
pub const POLY_BUILDER_PASSPHRASE: &str = "POLY_BUILDER_PASSPHRASE";

/// Header name to value.
pub type Headers = BTreeMap<String, String>;

/// The request triple covered by an HMAC signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L2HeaderArgs {
    pub method: String,
    /// Path without the query string.
    pub request_path: String,
    pub body: Option<String>,
}

impl L2HeaderArgs {
    pub fn new(method: impl Into<String>, request_path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            request_path: request_path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Current unix time in seconds.
pub fn current_timestamp() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// HMAC-SHA256 signature over `timestamp + method + path + body`, as URL-safe
/// base64.
///
/// Single quotes in the body are replaced by double quotes first, matching
/// the server's canonicalisation. An absent body contributes nothing.
#[allow(clippy::result_large_err)]
pub fn build_hmac_signature(
    secret: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: Option<&str>,
) -> Result<String> {
    let mut message = format!("{}{}{}", timestamp, method, request_path);
    if let Some(body) = body {
        message.push_str(&body.replace('\'', "\""));
    }

    // Secrets are URL-safe base64; tolerate missing padding and the standard alphabet.
    let secret_bytes = base64::engine::general_purpose::URL_SAFE
        .decode(secret)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(secret))
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(secret))
        .map_err(|e| Error::Auth {
            message: format!("Invalid API secret encoding: {}", e),
        })?;

    let mut mac = Hmac::<Sha256>::new_from_slice(&secret_bytes).map_err(|e| Error::Auth {
        message: format!("Failed to create HMAC: {}", e),
    })?;
    mac.update(message.as_bytes());

    Ok(base64::engine::general_purpose::URL_SAFE.encode(mac.finalize().into_bytes()))
}

/// L1 headers: a `ClobAuth` signature by `address`.
pub async fn create_l1_headers(
    capability: &dyn SigningCapability,
    chain_id: u64,
    address: Address,
    nonce: u64,
    timestamp: Option<u64>,
) -> Result<Headers> {
    let timestamp = timestamp.unwrap_or_else(current_timestamp).to_string();
    let signature =
        sign_clob_auth(capability, chain_id, address, &timestamp, U256::from(nonce)).await?;

    Ok(Headers::from([
        (POLY_ADDRESS.to_string(), address.to_checksum(None)),
        (POLY_SIGNATURE.to_string(), signature),
        (POLY_TIMESTAMP.to_string(), timestamp),
        (POLY_NONCE.to_string(), nonce.to_string()),
    ]))
}

/// L2 headers for a request made by `address`.
#[allow(clippy::result_large_err)]
pub fn create_l2_headers(
    address: Address,
    creds: &ApiKeyCreds,
    args: &L2HeaderArgs,
    timestamp: Option<u64>,
) -> Result<Headers> {
    let timestamp = timestamp.unwrap_or_else(current_timestamp).to_string();
    let signature = build_hmac_signature(
        &creds.secret,
        &timestamp,
        &args.method,
        &args.request_path,
        args.body.as_deref(),
    )?;

    Ok(Headers::from([
        (POLY_ADDRESS.to_string(), address.to_checksum(None)),
        (POLY_SIGNATURE.to_string(), signature),
        (POLY_TIMESTAMP.to_string(), timestamp),
        (POLY_API_KEY.to_string(), creds.api_key.clone()),
        (POLY_PASSPHRASE.to_string(), creds.passphrase.clone()),
    ]))
}

/// Builder headers for a request.
#[allow(clippy::result_large_err)]
pub fn create_builder_headers(
    creds: &BuilderApiKeyCreds,
    args: &L2HeaderArgs,
    timestamp: Option<u64>,
) -> Result<Headers> {
    let timestamp = timestamp.unwrap_or_else(current_timestamp).to_string();
    let signature = build_hmac_signature(
        &creds.secret,
        &timestamp,
        &args.method,
        &args.request_path,
        args.body.as_deref(),
    )?;

    Ok(Headers::from([
        (POLY_BUILDER_SIGNATURE.to_string(), signature),
        (POLY_BUILDER_TIMESTAMP.to_string(), timestamp),
        (POLY_BUILDER_API_KEY.to_string(), creds.key.clone()),
        (POLY_BUILDER_PASSPHRASE.to_string(), creds.passphrase.clone()),
    ]))
}

/// Merge builder headers into L2 headers. Builder values win on conflict.
pub fn inject_builder_headers(mut l2_headers: Headers, builder_headers: Headers) -> Headers {
    l2_headers.extend(builder_headers);
    l2_headers
}
