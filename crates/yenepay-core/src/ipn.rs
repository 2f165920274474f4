//! # Instant Payment Notification
//!
//! The gateway posts an IPN to the merchant's webhook when a payment changes
//! state. The record is filled from the inbound form fields and re-posted to
//! the gateway for verification; nothing is checked locally.

use crate::error::CheckoutResult;
use crate::wire::{decode_form_all, require, to_wire_map, WireMap};
use serde::Serialize;
use std::collections::HashMap;

/// Inbound field names, in the order they are read
pub const IPN_FIELDS: [&str; 10] = [
    "TotalAmount",
    "BuyerId",
    "MerchantOrderId",
    "MerchantId",
    "MerchantCode",
    "TransactionId",
    "TransactionCode",
    "Status",
    "Currency",
    "Signature",
];

/// An instant payment notification
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ipn {
    /// Total amount paid, kept in the exact form the gateway sent it
    #[serde(skip_serializing_if = "Option::is_none")]
    total_amount: Option<String>,

    /// The customer's id on the gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    buyer_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_order_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_id: Option<String>,

    /// Merchant account code (minimum 4 digits)
    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_code: Option<String>,

    /// Order status, e.g. "Paid"
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,

    /// Gateway signature over the notification
    #[serde(skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
}

impl Ipn {
    /// Fill every field from an inbound payload.
    ///
    /// All ten fields must be present; the first missing one is reported as a
    /// `CheckoutError::Validation`. Values are stored as received, blank ones
    /// included.
    pub fn from_wire_payload(payload: &HashMap<String, String>) -> CheckoutResult<Self> {
        let field = |key: &str| require(payload, key).map(|v| Some(v.to_string()));

        Ok(Self {
            total_amount: field("TotalAmount")?,
            buyer_id: field("BuyerId")?,
            merchant_order_id: field("MerchantOrderId")?,
            merchant_id: field("MerchantId")?,
            merchant_code: field("MerchantCode")?,
            transaction_id: field("TransactionId")?,
            transaction_code: field("TransactionCode")?,
            status: field("Status")?,
            currency: field("Currency")?,
            signature: field("Signature")?,
        })
    }

    /// Parse a form-encoded webhook body
    pub fn from_form_body(body: &str) -> CheckoutResult<Self> {
        Self::from_wire_payload(&decode_form_all(body))
    }

    /// Total amount as a number
    pub fn total_amount(&self) -> Option<f64> {
        self.total_amount
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn buyer_id(&self) -> Option<&str> {
        self.buyer_id.as_deref()
    }

    pub fn merchant_order_id(&self) -> Option<&str> {
        self.merchant_order_id.as_deref()
    }

    pub fn merchant_id(&self) -> Option<&str> {
        self.merchant_id.as_deref()
    }

    pub fn merchant_code(&self) -> Option<&str> {
        self.merchant_code.as_deref()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn transaction_code(&self) -> Option<&str> {
        self.transaction_code.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Whether the notification reports a completed payment
    pub fn is_paid(&self) -> bool {
        self.status() == Some("Paid")
    }

    /// Outbound representation sent to the verification endpoint
    pub fn as_dict(&self) -> CheckoutResult<WireMap> {
        to_wire_map(self)
    }
}
