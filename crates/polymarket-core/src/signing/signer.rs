//! Signing capability.
//!
//! Everything that needs a signature goes through [`SigningCapability`], so
//! an in-memory key, a hardware wallet or a remote KMS can be swapped in
//! without touching the hashing code.

use std::env;
use std::str::FromStr;

use alloy_primitives::{Address, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use crate::{Error, Result};

/// Length of a raw `r ‖ s ‖ v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Signs 32-byte digests on behalf of an address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SigningCapability: Send + Sync {
    /// Sign `digest` as `signer`, returning the 65-byte `r ‖ s ‖ v` signature.
    async fn sign_digest(&self, signer: Address, digest: B256) -> Result<Vec<u8>>;
}

/// Ask the capability for a signature and check its shape.
pub(crate) async fn request_signature(
    capability: &dyn SigningCapability,
    signer: Address,
    digest: B256,
) -> Result<[u8; SIGNATURE_LENGTH]> {
    let raw = capability.sign_digest(signer, digest).await?;
    <[u8; SIGNATURE_LENGTH]>::try_from(raw.as_slice()).map_err(|_| {
        Error::signing(format!(
            "signer returned {} bytes, expected {}",
            raw.len(),
            SIGNATURE_LENGTH
        ))
    })
}

/// Signing capability backed by a private key held in memory.
#[derive(Clone)]
pub struct LocalSigner {
    signer: PrivateKeySigner,
}

impl LocalSigner {
    /// Create a signer from a hex-encoded private key (with or without `0x`).
    #[allow(clippy::result_large_err)]
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let key = private_key.trim().trim_start_matches("0x");
        let signer = PrivateKeySigner::from_str(key)
            .map_err(|e| Error::config(format!("Invalid private key: {}", e)))?;
        Ok(Self { signer })
    }

    /// Load the private key from `WALLET_PRIVATE_KEY`.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let key = env::var("WALLET_PRIVATE_KEY")
            .map_err(|_| Error::config("WALLET_PRIVATE_KEY environment variable not set"))?;
        Self::from_private_key(&key)
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl SigningCapability for LocalSigner {
    async fn sign_digest(&self, signer: Address, digest: B256) -> Result<Vec<u8>> {
        if signer != self.address() {
            return Err(Error::signing(format!(
                "cannot sign for {}, key belongs to {}",
                signer,
                self.address()
            )));
        }

        let signature = self
            .signer
            .sign_hash(&digest)
            .await
            .map_err(|e| Error::signing(format!("Failed to sign digest: {}", e)))?;

        Ok(signature.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address())
            .finish()
    }
}
