//! # Request Handlers
//!
//! Axum request handlers for the demo shop: checkout redirect, the
//! success/cancel/failure return pages and the IPN webhook.

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};
use yenepay_core::{CheckoutError, CheckoutGateway, Ipn, IpnVerification, Pdt, PdtResponse};

/// VAT rate applied to demo orders
pub const VAT_RATE: f64 = 0.15;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Checkout form posted by the shop page
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    /// Index into the item catalog
    pub index: usize,
}

/// Outcome of a PDT confirmation
#[derive(Debug, Serialize, Deserialize)]
pub struct PdtOutcome {
    pub merchant_order_id: String,
    /// Whether the gateway confirmed the expected status
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Outcome of an IPN verification
#[derive(Debug, Serialize, Deserialize)]
pub struct IpnOutcome {
    pub merchant_order_id: Option<String>,
    pub authentic: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn checkout_error_to_response(err: CheckoutError) -> HandlerError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn unavailable(message: &str) -> HandlerError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new(message, 503)),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "yenepay-demo",
        "sandbox": state.gateway.is_sandbox(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Items for sale
pub async fn list_items(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "items": state.catalog.items,
        "count": state.catalog.len()
    }))
}

/// Build a checkout for the selected item and redirect to the gateway
#[instrument(skip(state))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Form(form): Form<CheckoutForm>,
) -> Result<Redirect, HandlerError> {
    let entry = state.catalog.get(form.index).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("Item not found: {}", form.index),
                404,
            )),
        )
    })?;

    let item = entry.to_item().map_err(checkout_error_to_response)?;
    let vat = item.total() * VAT_RATE;

    let mut session = state.new_session();
    session.add_item(item).map_err(checkout_error_to_response)?;
    session.set_delivery_fee(0.0);
    session.set_handling_fee(0.0);
    session.set_discount(0.0);
    session.set_vat(vat);

    info!(
        "Creating checkout: order={}, item={}, vat={:.2}",
        session.merchant_order_id(),
        entry.id,
        vat
    );

    let url = session
        .get_checkout_url(state.gateway.as_ref())
        .await
        .map_err(|e| {
            error!("Failed to create checkout: {}", e);
            checkout_error_to_response(e)
        })?;

    Ok(Redirect::to(&url))
}

/// Gateway redirects here after a successful payment
pub async fn payment_success(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PdtOutcome>, HandlerError> {
    confirm_with_pdt(&state, &params, PdtResponse::is_paid).await
}

/// Gateway redirects here after the customer cancels
pub async fn payment_cancel(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PdtOutcome>, HandlerError> {
    confirm_with_pdt(&state, &params, PdtResponse::is_canceled).await
}

/// Gateway redirects here when a payment fails
pub async fn payment_failure(
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    warn!("Payment failed: order={:?}", params.get("MerchantOrderId"));
    Json(serde_json::json!({
        "status": "failure",
        "merchant_order_id": params.get("MerchantOrderId")
    }))
}

/// Instant payment notification webhook
#[instrument(skip(state, body))]
pub async fn ipn_webhook(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<IpnOutcome>, HandlerError> {
    let ipn = Ipn::from_form_body(&body).map_err(|e| {
        warn!("Malformed IPN: {}", e);
        checkout_error_to_response(e)
    })?;

    let merchant_order_id = ipn.merchant_order_id().map(String::from);

    match state.gateway.verify_ipn_detailed(&ipn).await {
        IpnVerification::Authentic => {
            info!("Authentic IPN: order={:?}, status={:?}", merchant_order_id, ipn.status());
            Ok(Json(IpnOutcome {
                merchant_order_id,
                authentic: true,
            }))
        }
        IpnVerification::NotAuthentic => {
            warn!("Invalid IPN: order={:?}", merchant_order_id);
            Ok(Json(IpnOutcome {
                merchant_order_id,
                authentic: false,
            }))
        }
        // Non-2xx so the gateway delivers the notification again
        IpnVerification::Unavailable => Err(unavailable("IPN verification unavailable")),
    }
}

async fn confirm_with_pdt(
    state: &AppState,
    params: &HashMap<String, String>,
    expected: fn(&PdtResponse) -> bool,
) -> Result<Json<PdtOutcome>, HandlerError> {
    let pdt = Pdt::from_redirect_query(&state.config.pdt_token, params)
        .map_err(checkout_error_to_response)?;

    let response = state.gateway.request_pdt(&pdt).await.ok_or_else(|| {
        error!("PDT confirmation unavailable: order={}", pdt.merchant_order_id());
        unavailable("PDT confirmation unavailable")
    })?;

    let confirmed = expected(&response);
    info!(
        "PDT: order={}, result={:?}, status={:?}, confirmed={}",
        pdt.merchant_order_id(),
        response.result(),
        response.status(),
        confirmed
    );

    Ok(Json(PdtOutcome {
        merchant_order_id: pdt.merchant_order_id().to_string(),
        confirmed,
        result: response.result().map(String::from),
        status: response.status().map(String::from),
    }))
}
