//! Safe relayer client.
//!
//! Deploys the counterfactual Safe of a signer and executes batches of calls
//! through it. The relayer pays gas; submissions are authenticated with
//! builder credentials.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tracing::{debug, info, instrument};

use super::poll::{self, CancelToken, PollOptions};
use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::auth::{create_builder_headers, BuilderApiKeyCreds, Headers, L2HeaderArgs};
use crate::config::{ChainConfig, ClientConfig};
use crate::safe::{aggregate_transactions, derive_safe_address, sign_safe_transaction};
use crate::signing::typed_data::sign_create_proxy;
use crate::signing::SigningCapability;
use crate::types::relayer::{DeployedPayload, NoncePayload};
use crate::types::{
    RelayerTransaction, RelayerTransactionResponse, RelayerTransactionState, SafeTransaction,
    SignatureParams, TransactionRequest, TransactionType,
};
use crate::{Error, Result};

const GET_NONCE: &str = "/nonce";
const GET_TRANSACTION: &str = "/transaction";
const GET_TRANSACTIONS: &str = "/transactions";
const GET_DEPLOYED: &str = "/deployed";
const SUBMIT_TRANSACTION: &str = "/submit";

/// Client for the Polymarket Safe relayer.
pub struct RelayerClient {
    transport: Arc<dyn Transport>,
    capability: Arc<dyn SigningCapability>,
    /// Owner of the Safe and signer of every relayed transaction.
    signer: Address,
    chain: ChainConfig,
    builder_credentials: Option<BuilderApiKeyCreds>,
}

impl RelayerClient {
    #[allow(clippy::result_large_err)]
    pub fn new(
        transport: Arc<dyn Transport>,
        capability: Arc<dyn SigningCapability>,
        signer: Address,
        chain_id: u64,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            capability,
            signer,
            chain: ChainConfig::for_chain_id(chain_id)?,
            builder_credentials: None,
        })
    }

    /// Create a client talking HTTP to `config.relayer_url`.
    #[allow(clippy::result_large_err)]
    pub fn from_config(
        config: &ClientConfig,
        capability: Arc<dyn SigningCapability>,
        signer: Address,
    ) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.relayer_url, config.http_timeout)?;
        Self::new(Arc::new(transport), capability, signer, config.chain.chain_id)
    }

    pub fn with_builder_credentials(mut self, credentials: BuilderApiKeyCreds) -> Self {
        self.builder_credentials = Some(credentials);
        self
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Current relayer nonce of `address` for transactions of `transaction_type`.
    pub async fn get_nonce(&self, address: Address, transaction_type: TransactionType) -> Result<U256> {
        let payload: NoncePayload = self
            .send(
                HttpRequest::get(GET_NONCE)
                    .with_query("address", address.to_checksum(None))
                    .with_query("type", transaction_type.as_str()),
            )
            .await?
            .json()?;

        U256::from_str_radix(payload.nonce.trim(), 10)
            .map_err(|e| Error::encoding(format!("invalid nonce {:?}: {}", payload.nonce, e)))
    }

    /// Transactions recorded under `transaction_id`. Empty while the relayer
    /// does not know the id.
    pub async fn get_transaction(&self, transaction_id: &str) -> Result<Vec<RelayerTransaction>> {
        self.send(HttpRequest::get(GET_TRANSACTION).with_query("id", transaction_id))
            .await?
            .json()
    }

    /// Recent transactions of the builder. Unauthenticated when no builder
    /// credentials are configured.
    pub async fn get_transactions(&self) -> Result<Vec<RelayerTransaction>> {
        let mut request = HttpRequest::get(GET_TRANSACTIONS);
        if let Some(credentials) = &self.builder_credentials {
            let args = L2HeaderArgs::new(request.method.as_str(), GET_TRANSACTIONS);
            request = request.with_headers(create_builder_headers(credentials, &args, None)?);
        }
        self.send(request).await?.json()
    }

    /// Whether a Safe is deployed at `safe`.
    pub async fn get_deployed(&self, safe: Address) -> Result<bool> {
        let payload: DeployedPayload = self
            .send(HttpRequest::get(GET_DEPLOYED).with_query("address", safe.to_checksum(None)))
            .await?
            .json()?;
        Ok(payload.deployed)
    }

    /// Address of the Safe owned by `owner`, deployed or not.
    pub fn expected_safe(&self, owner: Address) -> Address {
        derive_safe_address(owner, self.chain.contracts.safe_factory)
    }

    /// Deploy the signer's Safe. Fails if it is already deployed.
    #[instrument(skip(self), fields(owner = %self.signer))]
    pub async fn deploy(&self) -> Result<RelayerTransactionResponse> {
        let builder = self.require_builder_credentials()?;
        let safe = self.expected_safe(self.signer);
        if self.get_deployed(safe).await? {
            return Err(Error::validation(format!(
                "safe {} of {} is already deployed",
                safe, self.signer
            )));
        }

        let factory = self.chain.contracts.safe_factory;
        let signature = sign_create_proxy(
            self.capability.as_ref(),
            self.chain.chain_id,
            factory,
            self.signer,
            Address::ZERO,
            U256::ZERO,
            Address::ZERO,
        )
        .await?;

        let zero = Address::ZERO.to_checksum(None);
        let request = TransactionRequest {
            transaction_type: TransactionType::SafeCreate,
            from: self.signer.to_checksum(None),
            to: factory.to_checksum(None),
            proxy_wallet: Some(safe.to_checksum(None)),
            data: "0x".to_string(),
            nonce: None,
            signature,
            signature_params: SignatureParams {
                payment_token: Some(zero.clone()),
                payment: Some("0".to_string()),
                payment_receiver: Some(zero),
                ..Default::default()
            },
            metadata: None,
        };

        info!(safe = %safe, "Deploying Safe");
        self.submit(builder, &request).await
    }

    /// Execute `transactions` from the signer's Safe as one relayed
    /// transaction. The Safe must already be deployed.
    #[instrument(skip(self, transactions), fields(owner = %self.signer, count = transactions.len()))]
    pub async fn execute(
        &self,
        transactions: &[SafeTransaction],
        metadata: &str,
    ) -> Result<RelayerTransactionResponse> {
        let builder = self.require_builder_credentials()?;
        let transaction = aggregate_transactions(transactions, self.chain.contracts.safe_multisend)?;
        let safe = self.expected_safe(self.signer);
        if !self.get_deployed(safe).await? {
            return Err(Error::validation(format!("safe {} is not deployed", safe)));
        }

        let nonce = self.get_nonce(self.signer, TransactionType::Safe).await?;
        let signature = sign_safe_transaction(
            self.capability.as_ref(),
            self.signer,
            self.chain.chain_id,
            safe,
            &transaction,
            nonce,
        )
        .await?;

        let zero = Address::ZERO.to_checksum(None);
        let request = TransactionRequest {
            transaction_type: TransactionType::Safe,
            from: self.signer.to_checksum(None),
            to: transaction.to.to_checksum(None),
            proxy_wallet: Some(safe.to_checksum(None)),
            data: transaction.data.clone(),
            nonce: Some(nonce.to_string()),
            signature,
            signature_params: SignatureParams {
                gas_price: Some("0".to_string()),
                operation: Some(transaction.operation.as_u8().to_string()),
                safe_txn_gas: Some("0".to_string()),
                base_gas: Some("0".to_string()),
                gas_token: Some(zero.clone()),
                refund_receiver: Some(zero),
                ..Default::default()
            },
            metadata: Some(metadata.to_string()),
        };

        debug!(safe = %safe, nonce = %nonce, operation = ?transaction.operation, "Executing Safe transaction");
        self.submit(builder, &request).await
    }

    /// Poll a submitted transaction until it reaches one of `target_states`.
    #[instrument(skip(self, target_states, fail_state, cancel))]
    pub async fn poll_until_state(
        &self,
        transaction_id: &str,
        target_states: &[RelayerTransactionState],
        fail_state: Option<&RelayerTransactionState>,
        options: PollOptions,
        cancel: Option<&CancelToken>,
    ) -> Result<RelayerTransaction> {
        poll::poll_until_state(
            transaction_id,
            target_states,
            fail_state,
            options,
            cancel,
            move || async move {
                Ok(self.get_transaction(transaction_id).await?.into_iter().next())
            },
        )
        .await
    }

    async fn submit(
        &self,
        builder: &BuilderApiKeyCreds,
        request: &TransactionRequest,
    ) -> Result<RelayerTransactionResponse> {
        let body = serde_json::to_string(request)?;
        let args = L2HeaderArgs::new("POST", SUBMIT_TRANSACTION).with_body(body.clone());
        let headers: Headers = create_builder_headers(builder, &args, None)?;

        let response: RelayerTransactionResponse = self
            .send(HttpRequest::post(SUBMIT_TRANSACTION).with_headers(headers).with_body(body))
            .await?
            .json()?;
        info!(
            transaction_id = %response.transaction_id,
            state = %response.state,
            transaction_type = %request.transaction_type,
            "Relayer accepted transaction"
        );
        Ok(response)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.transport.send(request).await
    }

    #[allow(clippy::result_large_err)]
    fn require_builder_credentials(&self) -> Result<&BuilderApiKeyCreds> {
        self.builder_credentials.as_ref().ok_or_else(|| Error::Auth {
            message: "builder API credentials are required to submit relayer transactions"
                .to_string(),
        })
    }
}

impl std::fmt::Debug for RelayerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayerClient")
            .field("signer", &self.signer)
            .field("chain_id", &self.chain.chain_id)
            .field("has_builder_credentials", &self.builder_credentials.is_some())
            .finish()
    }
}
