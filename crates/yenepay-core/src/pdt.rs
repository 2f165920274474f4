//! # Payment Data Transfer
//!
//! After the customer is redirected back, the merchant asks the gateway to
//! confirm the transaction using its secret PDT token.

use crate::error::CheckoutResult;
use crate::wire::{decode_form, require, to_wire_map, WireMap};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Request type marker sent with every PDT request
pub const PDT_REQUEST_TYPE: &str = "PDT";

/// Value of `result` in a successful PDT response
pub const PDT_SUCCESS: &str = "SUCCESS";

/// A PDT confirmation request
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pdt {
    request_type: &'static str,
    pdt_token: String,
    transaction_id: String,
    merchant_order_id: String,
}

impl Pdt {
    pub fn new(pdt_token: impl Into<String>) -> Self {
        Self {
            request_type: PDT_REQUEST_TYPE,
            pdt_token: pdt_token.into(),
            transaction_id: String::new(),
            merchant_order_id: String::new(),
        }
    }

    /// Build a request from the query parameters of a success/cancel redirect.
    ///
    /// Both `MerchantOrderId` and `TransactionId` must be present.
    pub fn from_redirect_query(
        pdt_token: impl Into<String>,
        query: &HashMap<String, String>,
    ) -> CheckoutResult<Self> {
        let merchant_order_id = require(query, "MerchantOrderId")?.to_string();
        let transaction_id = require(query, "TransactionId")?.to_string();

        Ok(Self::new(pdt_token)
            .with_merchant_order_id(merchant_order_id)
            .with_transaction_id(transaction_id))
    }

    /// Builder: set transaction ID
    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = transaction_id.into();
        self
    }

    /// Builder: set merchant order ID
    pub fn with_merchant_order_id(mut self, merchant_order_id: impl Into<String>) -> Self {
        self.merchant_order_id = merchant_order_id.into();
        self
    }

    pub fn set_transaction_id(&mut self, transaction_id: impl Into<String>) {
        self.transaction_id = transaction_id.into();
    }

    pub fn set_merchant_order_id(&mut self, merchant_order_id: impl Into<String>) {
        self.merchant_order_id = merchant_order_id.into();
    }

    pub fn request_type(&self) -> &str {
        self.request_type
    }

    pub fn pdt_token(&self) -> &str {
        &self.pdt_token
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn merchant_order_id(&self) -> &str {
        &self.merchant_order_id
    }

    /// Outbound representation sent to the PDT endpoint
    pub fn as_dict(&self) -> CheckoutResult<WireMap> {
        to_wire_map(self)
    }
}

// The token is a merchant secret
impl fmt::Debug for Pdt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pdt")
            .field("request_type", &self.request_type)
            .field("pdt_token", &"<redacted>")
            .field("transaction_id", &self.transaction_id)
            .field("merchant_order_id", &self.merchant_order_id)
            .finish()
    }
}

/// Decoded body of a PDT response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdtResponse {
    fields: HashMap<String, String>,
}

impl PdtResponse {
    /// Decode the URL-encoded query string the gateway wraps in its JSON body
    pub fn from_query(encoded: &str) -> Self {
        Self {
            fields: decode_form(encoded),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The `result` marker, "SUCCESS" when the request was accepted
    pub fn result(&self) -> Option<&str> {
        self.get("result")
    }

    /// Payment status, e.g. "Paid" or "Canceled"
    pub fn status(&self) -> Option<&str> {
        self.get("Status")
    }

    pub fn total_amount(&self) -> Option<f64> {
        self.get("TotalAmount").and_then(|v| v.trim().parse().ok())
    }

    pub fn is_success(&self) -> bool {
        self.result() == Some(PDT_SUCCESS)
    }

    /// Successful request reporting a paid order
    pub fn is_paid(&self) -> bool {
        self.is_success() && self.status() == Some("Paid")
    }

    /// Successful request reporting a cancelled order
    pub fn is_canceled(&self) -> bool {
        self.is_success() && self.status() == Some("Canceled")
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    pub fn into_fields(self) -> HashMap<String, String> {
        self.fields
    }
}
