//! # Gateway Client
//!
//! HTTP implementation of [`CheckoutGateway`]. Every call is a single JSON
//! `POST` to the sandbox or production endpoint chosen at construction. No
//! retries happen here; wrap the client if you need them.

use crate::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use yenepay_core::{
    CheckoutError, CheckoutGateway, CheckoutResult, Ipn, IpnVerification, Pdt, PdtResponse,
    WireMap,
};

/// Client for the hosted checkout API
#[derive(Debug, Clone)]
pub struct GatewayClient {
    config: GatewayConfig,
    client: Client,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                CheckoutError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Client for the sandbox deployment
    pub fn sandbox() -> CheckoutResult<Self> {
        Self::new(GatewayConfig::sandbox())
    }

    /// Client for the production deployment
    pub fn production() -> CheckoutResult<Self> {
        Self::new(GatewayConfig::production())
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// POST a JSON body; the response body is left unread
    async fn send_json<T>(&self, url: &str, body: &T) -> CheckoutResult<Response>
    where
        T: Serialize + ?Sized,
    {
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))
    }

    /// POST a JSON body and return the status with the raw response text
    async fn post_json<T>(&self, url: &str, body: &T) -> CheckoutResult<(StatusCode, String)>
    where
        T: Serialize + ?Sized,
    {
        let response = self.send_json(url, body).await?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        Ok((status, text))
    }
}

#[async_trait]
impl CheckoutGateway for GatewayClient {
    #[instrument(skip(self, payload), fields(sandbox = self.config.use_sandbox))]
    async fn checkout_url(&self, payload: &WireMap) -> CheckoutResult<String> {
        debug!(
            "Requesting checkout URL: order={:?}, process={:?}",
            payload.get("merchantOrderId"),
            payload.get("process")
        );

        let (status, body) = self
            .post_json(&self.config.endpoints.checkout_url, payload)
            .await?;

        if !status.is_success() {
            error!("Checkout URL request failed: status={}, body={}", status, body);
            return Err(CheckoutError::Gateway(format!("HTTP {}: {}", status, body)));
        }

        let response: CheckoutUrlResponse = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Gateway(format!("failed to parse checkout response: {}", e))
        })?;

        let url = response
            .result
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                CheckoutError::Gateway("checkout response has no result field".to_string())
            })?;

        info!("Created checkout URL: {}", url);
        Ok(url)
    }

    #[instrument(skip(self, ipn), fields(order_id = ?ipn.merchant_order_id(), sandbox = self.config.use_sandbox))]
    async fn verify_ipn_detailed(&self, ipn: &Ipn) -> IpnVerification {
        let payload = match ipn.as_dict() {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to encode IPN: {}", e);
                return IpnVerification::Unavailable;
            }
        };

        // Authenticity is decided by the status alone
        match self
            .send_json(&self.config.endpoints.ipn_verify_url, &payload)
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!("IPN verified: transaction={:?}", ipn.transaction_id());
                IpnVerification::Authentic
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!("IPN rejected: status={}, body={}", status, body);
                IpnVerification::NotAuthentic
            }
            Err(e) => {
                error!("IPN verification call failed: {}", e);
                IpnVerification::Unavailable
            }
        }
    }

    #[instrument(skip(self, pdt), fields(order_id = %pdt.merchant_order_id(), sandbox = self.config.use_sandbox))]
    async fn try_request_pdt(&self, pdt: &Pdt) -> CheckoutResult<PdtResponse> {
        let payload = pdt.as_dict()?;

        let (status, body) = self.post_json(&self.config.endpoints.pdt_url, &payload).await?;

        if !status.is_success() {
            warn!("PDT request failed: status={}, body={}", status, body);
            return Err(CheckoutError::Gateway(format!("HTTP {}: {}", status, body)));
        }

        let response = decode_pdt_body(&body)?;
        debug!(
            "PDT response: result={:?}, status={:?}",
            response.result(),
            response.status()
        );
        Ok(response)
    }

    fn is_sandbox(&self) -> bool {
        self.config.use_sandbox
    }
}

/// The PDT body is a JSON string holding form-encoded fields
fn decode_pdt_body(body: &str) -> CheckoutResult<PdtResponse> {
    let encoded: String = serde_json::from_str(body).map_err(|e| {
        CheckoutError::Gateway(format!("PDT response is not a JSON string: {}", e))
    })?;

    let response = PdtResponse::from_query(&encoded);
    if response.result().is_none() {
        return Err(CheckoutError::Gateway(
            "PDT response has no result field".to_string(),
        ));
    }
    Ok(response)
}

// =============================================================================
// Gateway API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct CheckoutUrlResponse {
    #[serde(default)]
    result: Option<String>,
}
