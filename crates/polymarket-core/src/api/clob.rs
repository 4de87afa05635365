//! Polymarket CLOB API client.
//!
//! Covers API-key management (L1 authentication), market parameter lookups
//! and the authenticated order lifecycle (L2 authentication). When builder
//! credentials are configured, every L2 request also carries the builder
//! headers.

use std::sync::Arc;

use alloy_primitives::Address;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::auth::{
    create_builder_headers, create_l1_headers, create_l2_headers, inject_builder_headers,
    ApiKeyCreds, BuilderApiKeyCreds, Headers, L2HeaderArgs,
};
use crate::cache::MarketParamsCache;
use crate::config::{ChainConfig, ClientConfig};
use crate::rounding::TickSize;
use crate::signing::{OrderPayload, OrderSigner, SignatureType, SignedOrder, SigningCapability};
use crate::types::{
    CancelResponse, CreateOrderOptions, OpenOrder, OpenOrderParams, OpenOrdersPage, OrderResponse,
    OrderType, UserOrder,
};
use crate::{Error, Result};

const CREATE_API_KEY: &str = "/auth/api-key";
const DERIVE_API_KEY: &str = "/auth/derive-api-key";
const GET_API_KEYS: &str = "/auth/api-keys";
const GET_TICK_SIZE: &str = "/tick-size";
const GET_NEG_RISK: &str = "/neg-risk";
const GET_FEE_RATE: &str = "/fee-rate";
const POST_ORDER: &str = "/order";
const POST_ORDERS: &str = "/orders";
const GET_ORDER: &str = "/data/order/";
const GET_OPEN_ORDERS: &str = "/data/orders";
const CANCEL_ORDER: &str = "/order";
const CANCEL_ORDERS: &str = "/orders";
const CANCEL_ALL: &str = "/cancel-all";
const CANCEL_MARKET_ORDERS: &str = "/cancel-market-orders";

/// Cursor value the CLOB returns on the last page.
const END_CURSOR: &str = "LTE=";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostOrderRequest<'a> {
    order: OrderPayload,
    owner: &'a str,
    order_type: OrderType,
    defer_exec: bool,
}

#[derive(Debug, Deserialize)]
struct TickSizeResponse {
    minimum_tick_size: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct NegRiskResponse {
    neg_risk: bool,
}

#[derive(Debug, Deserialize)]
struct FeeRateResponse {
    #[serde(default)]
    base_fee: u64,
}

#[derive(Debug, Deserialize)]
struct ApiKeysResponse {
    #[serde(default, rename = "apiKeys")]
    api_keys: Vec<String>,
}

/// Authenticated client for the Polymarket CLOB.
pub struct ClobClient {
    transport: Arc<dyn Transport>,
    capability: Arc<dyn SigningCapability>,
    signer: OrderSigner,
    chain: ChainConfig,
    /// L2 credentials (unset until created, derived or supplied).
    credentials: Option<ApiKeyCreds>,
    builder_credentials: Option<BuilderApiKeyCreds>,
    cache: MarketParamsCache,
}

impl ClobClient {
    /// Create a client for `chain_id`. An unsupported chain is a
    /// configuration error.
    #[allow(clippy::result_large_err)]
    pub fn new(
        transport: Arc<dyn Transport>,
        capability: Arc<dyn SigningCapability>,
        signer: Address,
        chain_id: u64,
    ) -> Result<Self> {
        let chain = ChainConfig::for_chain_id(chain_id)?;
        Ok(Self {
            transport,
            signer: OrderSigner::new(capability.clone(), signer, chain),
            capability,
            chain,
            credentials: None,
            builder_credentials: None,
            cache: MarketParamsCache::new(),
        })
    }

    /// Create a client talking HTTP to `config.clob_url`.
    #[allow(clippy::result_large_err)]
    pub fn from_config(
        config: &ClientConfig,
        capability: Arc<dyn SigningCapability>,
        signer: Address,
    ) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.clob_url, config.http_timeout)?;
        Ok(Self::new(Arc::new(transport), capability, signer, config.chain.chain_id)?
            .with_funder(config.funder, config.signature_type))
    }

    /// Trade on behalf of a proxy wallet or Safe holding the funds.
    pub fn with_funder(mut self, funder: Option<Address>, signature_type: SignatureType) -> Self {
        self.signer = self.signer.with_funder(funder, signature_type);
        self
    }

    pub fn with_credentials(mut self, credentials: ApiKeyCreds) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_builder_credentials(mut self, credentials: BuilderApiKeyCreds) -> Self {
        self.builder_credentials = Some(credentials);
        self
    }

    /// Set API credentials directly (if already have them).
    pub fn set_credentials(&mut self, credentials: ApiKeyCreds) {
        self.credentials = Some(credentials);
    }

    pub fn credentials(&self) -> Option<&ApiKeyCreds> {
        self.credentials.as_ref()
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Address that signs orders and authenticates requests.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn order_signer(&self) -> &OrderSigner {
        &self.signer
    }

    /// Market parameter cache, e.g. to prime it ahead of trading.
    pub fn cache(&self) -> &MarketParamsCache {
        &self.cache
    }

    // ------------------------------------------------------------------
    // API keys (L1)
    // ------------------------------------------------------------------

    /// Create new API credentials via `POST /auth/api-key`.
    pub async fn create_api_key(&mut self, nonce: Option<u64>) -> Result<ApiKeyCreds> {
        let headers = self.l1_headers(nonce).await?;
        let credentials: ApiKeyCreds = self
            .send(HttpRequest::post(CREATE_API_KEY).with_headers(headers))
            .await?
            .json()?;

        self.credentials = Some(credentials.clone());
        info!(address = %self.address(), "Created API credentials");
        Ok(credentials)
    }

    /// Derive existing API credentials via `GET /auth/derive-api-key`.
    pub async fn derive_api_key(&mut self, nonce: Option<u64>) -> Result<ApiKeyCreds> {
        let headers = self.l1_headers(nonce).await?;
        let credentials: ApiKeyCreds = self
            .send(HttpRequest::get(DERIVE_API_KEY).with_headers(headers))
            .await?
            .json()?;

        self.credentials = Some(credentials.clone());
        info!(address = %self.address(), "Derived API credentials");
        Ok(credentials)
    }

    /// Derive the credentials for `nonce`, creating them if none exist yet.
    pub async fn ensure_api_key(&mut self, nonce: Option<u64>) -> Result<ApiKeyCreds> {
        match self.derive_api_key(nonce).await {
            Ok(credentials) => Ok(credentials),
            Err(e) => {
                warn!(error = %e, "derive_api_key failed, creating a new key");
                self.create_api_key(nonce).await
            }
        }
    }

    /// API keys registered for this address.
    pub async fn get_api_keys(&self) -> Result<Vec<String>> {
        let response: ApiKeysResponse = self.l2_request(HttpRequest::get(GET_API_KEYS)).await?;
        Ok(response.api_keys)
    }

    // ------------------------------------------------------------------
    // Market parameters
    // ------------------------------------------------------------------

    /// Minimum tick size of a token, cached per token.
    pub async fn get_tick_size(&self, token_id: &str) -> Result<TickSize> {
        self.cache
            .tick_size(token_id, move || async move {
                let response: TickSizeResponse = self
                    .send(HttpRequest::get(GET_TICK_SIZE).with_query("token_id", token_id))
                    .await?
                    .json()?;
                parse_tick_size(&response.minimum_tick_size)
            })
            .await
    }

    /// Whether a token trades on the neg-risk exchange, cached per token.
    pub async fn get_neg_risk(&self, token_id: &str) -> Result<bool> {
        self.cache
            .neg_risk(token_id, move || async move {
                let response: NegRiskResponse = self
                    .send(HttpRequest::get(GET_NEG_RISK).with_query("token_id", token_id))
                    .await?
                    .json()?;
                Ok(response.neg_risk)
            })
            .await
    }

    /// Base fee rate of a token in basis points, cached per token.
    pub async fn get_fee_rate_bps(&self, token_id: &str) -> Result<u64> {
        self.cache
            .fee_rate_bps(token_id, move || async move {
                let response: FeeRateResponse = self
                    .send(HttpRequest::get(GET_FEE_RATE).with_query("token_id", token_id))
                    .await?
                    .json()?;
                Ok(response.base_fee)
            })
            .await
    }

    /// Tick size for an order: the override if given, else the market's.
    ///
    /// An override is used without a lookup. It is checked against the
    /// market's tick only when that tick is already cached, and rejected if
    /// finer.
    async fn resolve_tick_size(&self, token_id: &str, tick_size: Option<TickSize>) -> Result<TickSize> {
        let Some(tick) = tick_size else {
            return self.get_tick_size(token_id).await;
        };

        match self.cache.cached_tick_size(token_id) {
            Some(market_tick) if tick.as_decimal() < market_tick.as_decimal() => {
                Err(Error::validation(format!(
                    "invalid tick size ({}), minimum for the market is {}",
                    tick, market_tick
                )))
            }
            _ => Ok(tick),
        }
    }

    async fn resolve_neg_risk(&self, token_id: &str, neg_risk: Option<bool>) -> Result<bool> {
        match neg_risk {
            Some(neg_risk) => Ok(neg_risk),
            None => self.get_neg_risk(token_id).await,
        }
    }

    // ------------------------------------------------------------------
    // Orders (L2)
    // ------------------------------------------------------------------

    /// Build and sign an order, resolving market parameters not given in
    /// `options`. A missing fee rate is taken from the market.
    pub async fn create_order(
        &self,
        order: &UserOrder,
        order_type: OrderType,
        options: CreateOrderOptions,
    ) -> Result<SignedOrder> {
        let tick_size = self.resolve_tick_size(&order.token_id, options.tick_size).await?;
        let neg_risk = self.resolve_neg_risk(&order.token_id, options.neg_risk).await?;

        let mut order = order.clone();
        if order.fee_rate_bps.is_none() {
            order.fee_rate_bps = Some(self.get_fee_rate_bps(&order.token_id).await?);
        }

        info!(
            token_id = %order.token_id,
            side = %order.side,
            price = %order.price,
            size = %order.size,
            tick_size = %tick_size,
            neg_risk,
            order_type = %order_type,
            "Building order"
        );

        self.signer
            .create_order(&order, order_type, tick_size, neg_risk)
            .await
    }

    /// Submit a signed order via `POST /order`.
    pub async fn post_order(
        &self,
        order: &SignedOrder,
        order_type: OrderType,
        defer_exec: bool,
    ) -> Result<OrderResponse> {
        let owner = self.require_credentials()?.api_key.as_str();
        let body = serde_json::to_string(&PostOrderRequest {
            order: order.to_payload(),
            owner,
            order_type,
            defer_exec,
        })?;
        debug!(payload = %body, "POST /order request body");

        let response: OrderResponse = self
            .l2_request(HttpRequest::post(POST_ORDER).with_body(body))
            .await?;

        if response.success {
            info!(order_id = %response.order_id, status = %response.status, "Order posted");
        } else {
            warn!(error = %response.error_msg, "Order rejected");
        }
        Ok(response)
    }

    /// Submit several signed orders in one `POST /orders` call.
    pub async fn post_orders(
        &self,
        orders: &[(SignedOrder, OrderType)],
        defer_exec: bool,
    ) -> Result<Vec<OrderResponse>> {
        if orders.is_empty() {
            return Err(Error::validation("no orders to post"));
        }
        let owner = self.require_credentials()?.api_key.as_str();
        let requests: Vec<PostOrderRequest<'_>> = orders
            .iter()
            .map(|(order, order_type)| PostOrderRequest {
                order: order.to_payload(),
                owner,
                order_type: *order_type,
                defer_exec,
            })
            .collect();
        let body = serde_json::to_string(&requests)?;

        let responses: Vec<OrderResponse> = self
            .l2_request(HttpRequest::post(POST_ORDERS).with_body(body))
            .await?;
        info!(count = responses.len(), "Orders posted");
        Ok(responses)
    }

    /// Build, sign and submit an order.
    pub async fn create_and_post_order(
        &self,
        order: &UserOrder,
        order_type: OrderType,
        options: CreateOrderOptions,
        defer_exec: bool,
    ) -> Result<OrderResponse> {
        // Fail before signing anything when no credentials are set.
        self.require_credentials()?;
        let signed = self.create_order(order, order_type, options).await?;
        self.post_order(&signed, order_type, defer_exec).await
    }

    /// Fetch one order by id.
    pub async fn get_order(&self, order_id: &str) -> Result<OpenOrder> {
        if order_id.is_empty() {
            return Err(Error::validation("order id is empty"));
        }
        self.l2_request(HttpRequest::get(format!("{}{}", GET_ORDER, order_id)))
            .await
    }

    /// Open orders matching `params`, following pagination to the end.
    ///
    /// The query string is not part of the signed path.
    pub async fn get_open_orders(&self, params: &OpenOrderParams) -> Result<Vec<OpenOrder>> {
        let mut orders = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = HttpRequest::get(GET_OPEN_ORDERS);
            request.query = params.to_query();
            if let Some(cursor) = &cursor {
                request = request.with_query("next_cursor", cursor.clone());
            }

            let page: OpenOrdersPage = self.l2_request(request).await?;
            orders.extend(page.data);

            if page.next_cursor.is_empty() || page.next_cursor == END_CURSOR {
                break;
            }
            cursor = Some(page.next_cursor);
        }

        debug!(count = orders.len(), "Fetched open orders");
        Ok(orders)
    }

    /// Cancel an order by id.
    pub async fn cancel_order(&self, order_id: &str) -> Result<CancelResponse> {
        if order_id.is_empty() {
            return Err(Error::validation("order id is empty"));
        }
        let body = serde_json::json!({ "orderID": order_id }).to_string();
        let response: CancelResponse = self
            .l2_request(HttpRequest::delete(CANCEL_ORDER).with_body(body))
            .await?;
        info!(order_id, canceled = response.canceled.len(), "Cancel order");
        Ok(response)
    }

    /// Cancel several orders by id.
    pub async fn cancel_orders(&self, order_ids: &[String]) -> Result<CancelResponse> {
        if order_ids.is_empty() {
            return Err(Error::validation("order ids are empty"));
        }
        let body = serde_json::to_string(order_ids)?;
        let response: CancelResponse = self
            .l2_request(HttpRequest::delete(CANCEL_ORDERS).with_body(body))
            .await?;
        info!(
            requested = order_ids.len(),
            canceled = response.canceled.len(),
            "Cancel orders"
        );
        Ok(response)
    }

    /// Cancel every open order of this account.
    pub async fn cancel_all(&self) -> Result<CancelResponse> {
        let response: CancelResponse = self.l2_request(HttpRequest::delete(CANCEL_ALL)).await?;
        info!(canceled = response.canceled.len(), "Cancel all orders");
        Ok(response)
    }

    /// Cancel the open orders of a market and/or asset.
    pub async fn cancel_market_orders(
        &self,
        market: Option<&str>,
        asset_id: Option<&str>,
    ) -> Result<CancelResponse> {
        let mut params = serde_json::Map::new();
        if let Some(market) = market.filter(|m| !m.is_empty()) {
            params.insert("market".to_string(), market.into());
        }
        if let Some(asset_id) = asset_id.filter(|a| !a.is_empty()) {
            params.insert("asset_id".to_string(), asset_id.into());
        }
        let body = serde_json::Value::Object(params).to_string();

        let response: CancelResponse = self
            .l2_request(HttpRequest::delete(CANCEL_MARKET_ORDERS).with_body(body))
            .await?;
        info!(
            market = market.unwrap_or_default(),
            asset_id = asset_id.unwrap_or_default(),
            canceled = response.canceled.len(),
            "Cancel market orders"
        );
        Ok(response)
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.transport.send(request).await
    }

    #[allow(clippy::result_large_err)]
    fn require_credentials(&self) -> Result<&ApiKeyCreds> {
        self.credentials.as_ref().ok_or_else(|| Error::Auth {
            message: "API credentials not set - call ensure_api_key() first".to_string(),
        })
    }

    async fn l1_headers(&self, nonce: Option<u64>) -> Result<Headers> {
        create_l1_headers(
            self.capability.as_ref(),
            self.chain.chain_id,
            self.address(),
            nonce.unwrap_or(0),
            None,
        )
        .await
    }

    /// L2 headers for a request, merged with builder headers when builder
    /// credentials are configured. Both share one timestamp.
    #[allow(clippy::result_large_err)]
    fn l2_headers(&self, method: &Method, path: &str, body: Option<&str>) -> Result<Headers> {
        let credentials = self.require_credentials()?;
        let mut args = L2HeaderArgs::new(method.as_str(), path);
        if let Some(body) = body {
            args = args.with_body(body);
        }

        let timestamp = crate::auth::headers::current_timestamp();
        let headers = create_l2_headers(self.address(), credentials, &args, Some(timestamp))?;
        match &self.builder_credentials {
            Some(builder) => Ok(inject_builder_headers(
                headers,
                create_builder_headers(builder, &args, Some(timestamp))?,
            )),
            None => Ok(headers),
        }
    }

    async fn l2_request<T: serde::de::DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let headers = self.l2_headers(&request.method, &request.path, request.body.as_deref())?;
        self.send(request.with_headers(headers)).await?.json()
    }
}

impl std::fmt::Debug for ClobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClobClient")
            .field("address", &self.address())
            .field("chain_id", &self.chain.chain_id)
            .field("has_credentials", &self.credentials.is_some())
            .field("has_builder_credentials", &self.builder_credentials.is_some())
            .finish()
    }
}

// The tick endpoint answers with a JSON number; strings are tolerated.
#[allow(clippy::result_large_err)]
fn parse_tick_size(value: &serde_json::Value) -> Result<TickSize> {
    match value {
        serde_json::Value::Number(n) => n.to_string().parse(),
        serde_json::Value::String(s) => s.parse(),
        other => Err(Error::validation(format!("unexpected tick size {}", other))),
    }
}
