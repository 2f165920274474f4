//! # Checkout Session
//!
//! The mutable builder for one checkout attempt: merchant identity, process
//! mode, items, fees and callback URLs. It produces the outbound payload and,
//! through a [`CheckoutGateway`], the URL the customer is redirected to.
//!
//! A session is not meant to be shared between concurrent checkouts. Create
//! one per checkout (cloning a configured template works well).

use crate::error::{CheckoutError, CheckoutResult};
use crate::gateway::CheckoutGateway;
use crate::item::Item;
use crate::wire::{to_wire_map, WireMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of checkout process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessMode {
    /// Single distinct item, paid immediately
    Express,
    /// Any number of distinct items
    Cart,
}

impl ProcessMode {
    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessMode::Express => "Express",
            ProcessMode::Cart => "Cart",
        }
    }
}

impl Default for ProcessMode {
    fn default() -> Self {
        ProcessMode::Cart
    }
}

impl fmt::Display for ProcessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessMode {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Express" => Ok(ProcessMode::Express),
            "Cart" => Ok(ProcessMode::Cart),
            other => Err(CheckoutError::Validation(format!(
                "unknown process type: {}",
                other
            ))),
        }
    }
}

/// Order id used until the caller sets one
pub const DEFAULT_MERCHANT_ORDER_ID: &str = "0";

/// One in-progress checkout
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    /// Merchant code (all-numeral, minimum 4 digits, "SB" prefixed in sandbox)
    merchant_id: String,
    process: ProcessMode,
    /// Order id on the merchant side
    merchant_order_id: String,
    items: Vec<Item>,

    // Callback endpoints on the merchant site. These are configuration and
    // survive `clear()`.
    ipn_url: Option<String>,
    success_url: Option<String>,
    cancel_url: Option<String>,
    failure_url: Option<String>,

    expires_after: Option<u32>,
    expires_in_days: Option<u32>,

    delivery_fee: Option<f64>,
    handling_fee: Option<f64>,
    discount: Option<f64>,
    vat: Option<f64>,
    tot: Option<f64>,
}

impl CheckoutSession {
    /// Create a session in Cart mode with order id "0"
    pub fn new(merchant_id: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            process: ProcessMode::Cart,
            merchant_order_id: DEFAULT_MERCHANT_ORDER_ID.to_string(),
            items: Vec::new(),
            ipn_url: None,
            success_url: None,
            cancel_url: None,
            failure_url: None,
            expires_after: None,
            expires_in_days: None,
            delivery_fee: None,
            handling_fee: None,
            discount: None,
            vat: None,
            tot: None,
        }
    }

    // -------------------------------------------------------------------------
    // Identity and mode
    // -------------------------------------------------------------------------

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn set_merchant_id(&mut self, merchant_id: impl Into<String>) {
        self.merchant_id = merchant_id.into();
    }

    pub fn process_mode(&self) -> ProcessMode {
        self.process
    }

    /// Change the process mode.
    ///
    /// Switching to Express while more than one distinct item is present
    /// fails with `CheckoutError::State`.
    pub fn set_process_mode(&mut self, mode: ProcessMode) -> CheckoutResult<()> {
        if mode == ProcessMode::Express && self.items.len() > 1 {
            return Err(CheckoutError::State(format!(
                "cannot switch to Express mode with {} distinct items",
                self.items.len()
            )));
        }
        self.process = mode;
        Ok(())
    }

    pub fn merchant_order_id(&self) -> &str {
        &self.merchant_order_id
    }

    pub fn set_merchant_order_id(&mut self, order_id: impl Into<String>) {
        self.merchant_order_id = order_id.into();
    }

    // -------------------------------------------------------------------------
    // Callback URLs
    // -------------------------------------------------------------------------

    pub fn ipn_url(&self) -> Option<&str> {
        self.ipn_url.as_deref()
    }

    pub fn success_url(&self) -> Option<&str> {
        self.success_url.as_deref()
    }

    pub fn cancel_url(&self) -> Option<&str> {
        self.cancel_url.as_deref()
    }

    pub fn failure_url(&self) -> Option<&str> {
        self.failure_url.as_deref()
    }

    pub fn set_ipn_url(&mut self, url: impl Into<String>) {
        self.ipn_url = Some(url.into());
    }

    pub fn set_success_url(&mut self, url: impl Into<String>) {
        self.success_url = Some(url.into());
    }

    pub fn set_cancel_url(&mut self, url: impl Into<String>) {
        self.cancel_url = Some(url.into());
    }

    pub fn set_failure_url(&mut self, url: impl Into<String>) {
        self.failure_url = Some(url.into());
    }

    /// Builder: set IPN URL
    pub fn with_ipn_url(mut self, url: impl Into<String>) -> Self {
        self.set_ipn_url(url);
        self
    }

    /// Builder: set success URL
    pub fn with_success_url(mut self, url: impl Into<String>) -> Self {
        self.set_success_url(url);
        self
    }

    /// Builder: set cancel URL
    pub fn with_cancel_url(mut self, url: impl Into<String>) -> Self {
        self.set_cancel_url(url);
        self
    }

    /// Builder: set failure URL
    pub fn with_failure_url(mut self, url: impl Into<String>) -> Self {
        self.set_failure_url(url);
        self
    }

    // -------------------------------------------------------------------------
    // Expiry
    // -------------------------------------------------------------------------

    /// Minutes before the order expires
    pub fn expires_after(&self) -> Option<u32> {
        self.expires_after
    }

    pub fn set_expires_after(&mut self, minutes: u32) {
        self.expires_after = Some(minutes);
    }

    pub fn expires_in_days(&self) -> Option<u32> {
        self.expires_in_days
    }

    /// Kept on the session only; the gateway payload carries `expiresAfter`
    pub fn set_expires_in_days(&mut self, days: u32) {
        self.expires_in_days = Some(days);
    }

    // -------------------------------------------------------------------------
    // Fees (negative input is stored as 0)
    // -------------------------------------------------------------------------

    pub fn delivery_fee(&self) -> Option<f64> {
        self.delivery_fee
    }

    pub fn handling_fee(&self) -> Option<f64> {
        self.handling_fee
    }

    pub fn discount(&self) -> Option<f64> {
        self.discount
    }

    /// Total VAT, for VAT registered merchants
    pub fn vat(&self) -> Option<f64> {
        self.vat
    }

    /// Total TOT, for TOT registered merchants
    pub fn tot(&self) -> Option<f64> {
        self.tot
    }

    pub fn set_delivery_fee(&mut self, fee: f64) {
        self.delivery_fee = Some(clamp_fee(fee));
    }

    pub fn set_handling_fee(&mut self, fee: f64) {
        self.handling_fee = Some(clamp_fee(fee));
    }

    pub fn set_discount(&mut self, discount: f64) {
        self.discount = Some(clamp_fee(discount));
    }

    pub fn set_vat(&mut self, vat: f64) {
        self.vat = Some(clamp_fee(vat));
    }

    pub fn set_tot(&mut self, tot: f64) {
        self.tot = Some(clamp_fee(tot));
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// Add an item, merging quantities for a repeated id.
    ///
    /// In Express mode a second distinct item is rejected with
    /// `CheckoutError::State`.
    pub fn add_item(&mut self, item: Item) -> CheckoutResult<()> {
        if self.process == ProcessMode::Express {
            if let [existing] = self.items.as_slice() {
                if existing.item_id() != item.item_id() {
                    return Err(CheckoutError::State(
                        "cannot add a second distinct item in Express mode, use Cart mode instead"
                            .to_string(),
                    ));
                }
            }
        }

        match self
            .items
            .iter_mut()
            .find(|existing| existing.item_id() == item.item_id())
        {
            Some(existing) => existing.merge_quantity(item.quantity()),
            None => self.items.push(item),
        }
        Ok(())
    }

    /// Remove the item with the given id, if present
    pub fn remove_item(&mut self, item_id: &str) {
        if let Some(pos) = self.items.iter().position(|i| i.item_id() == item_id) {
            self.items.remove(pos);
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get_item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.item_id() == item_id)
    }

    /// Number of distinct items
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all items
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity())).sum()
    }

    /// Sum of item totals, before fees and taxes
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(Item::total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // -------------------------------------------------------------------------
    // Lifecycle and wire format
    // -------------------------------------------------------------------------

    /// Reset to a new checkout, keeping merchant identity and callback URLs
    pub fn clear(&mut self) {
        self.process = ProcessMode::Cart;
        self.merchant_order_id = DEFAULT_MERCHANT_ORDER_ID.to_string();
        self.items.clear();
        self.expires_after = None;
        self.expires_in_days = None;
        self.delivery_fee = None;
        self.handling_fee = None;
        self.discount = None;
        self.vat = None;
        self.tot = None;
    }

    /// Gateway payload with only the fields that are currently set
    pub fn build_checkout_payload(&self) -> CheckoutResult<WireMap> {
        to_wire_map(&CheckoutPayload {
            merchant_id: &self.merchant_id,
            process: self.process,
            merchant_order_id: &self.merchant_order_id,
            items: &self.items,
            ipn_url: self.ipn_url.as_deref(),
            success_url: self.success_url.as_deref(),
            cancel_url: self.cancel_url.as_deref(),
            failure_url: self.failure_url.as_deref(),
            expires_after: self.expires_after,
            total_items_delivery_fee: self.delivery_fee,
            total_items_handling_fee: self.handling_fee,
            total_items_discount: self.discount,
            total_items_tax1: self.vat,
            total_items_tax2: self.tot,
        })
    }

    /// Ask the gateway for the URL to redirect the customer to
    pub async fn get_checkout_url<G>(&self, gateway: &G) -> CheckoutResult<String>
    where
        G: CheckoutGateway + ?Sized,
    {
        let payload = self.build_checkout_payload()?;
        gateway.checkout_url(&payload).await
    }
}

fn clamp_fee(fee: f64) -> f64 {
    // Also maps NaN and -0.0 to 0
    if fee > 0.0 {
        fee
    } else {
        0.0
    }
}

fn no_items(items: &&[Item]) -> bool {
    items.is_empty()
}

/// Keys the gateway recognises, in wire order
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutPayload<'a> {
    merchant_id: &'a str,
    process: ProcessMode,
    merchant_order_id: &'a str,
    #[serde(skip_serializing_if = "no_items")]
    items: &'a [Item],
    #[serde(skip_serializing_if = "Option::is_none")]
    ipn_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    success_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancel_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_after: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_items_delivery_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_items_handling_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_items_discount: Option<f64>,
    #[serde(rename = "totalItemsTax1", skip_serializing_if = "Option::is_none")]
    total_items_tax1: Option<f64>,
    #[serde(rename = "totalItemsTax2", skip_serializing_if = "Option::is_none")]
    total_items_tax2: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::IpnVerification;
    use crate::ipn::Ipn;
    use crate::pdt::{Pdt, PdtResponse};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    fn item(id: &str, qty: i64) -> Item {
        Item::new(id, format!("Item {}", id), 100.0, qty).unwrap()
    }

    fn configured_session() -> CheckoutSession {
        CheckoutSession::new("SB1286")
            .with_ipn_url("http://localhost:5000/ipn")
            .with_success_url("http://localhost:5000/success")
            .with_cancel_url("http://localhost:5000/cancel")
            .with_failure_url("http://localhost:5000/failure")
    }

    #[test]
    fn test_process_mode_parsing() {
        assert_eq!("Express".parse::<ProcessMode>().unwrap(), ProcessMode::Express);
        assert_eq!("Cart".parse::<ProcessMode>().unwrap(), ProcessMode::Cart);

        let err = "Subscription".parse::<ProcessMode>().unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[test]
    fn test_defaults() {
        let session = CheckoutSession::new("SB1286");

        assert_eq!(session.process_mode(), ProcessMode::Cart);
        assert_eq!(session.merchant_order_id(), "0");
        assert!(session.is_empty());
    }

    #[test]
    fn test_same_id_accumulates_quantity() {
        let mut session = CheckoutSession::new("SB1286");
        session.add_item(item("X", 2)).unwrap();
        session.add_item(item("X", 3)).unwrap();

        assert_eq!(session.item_count(), 1);
        assert_eq!(session.items()[0].quantity(), 5);
        assert_eq!(session.total_quantity(), 5);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut session = CheckoutSession::new("SB1286");
        for id in ["c", "a", "b"] {
            session.add_item(item(id, 1)).unwrap();
        }
        session.add_item(item("a", 1)).unwrap();

        let ids: Vec<_> = session.items().iter().map(Item::item_id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(session.item_count(), 3);
        assert_eq!(session.total_quantity(), 4);
    }

    #[test]
    fn test_express_rejects_second_item() {
        let mut session = CheckoutSession::new("SB1286");
        session.set_process_mode(ProcessMode::Express).unwrap();

        session.add_item(item("A", 1)).unwrap();
        let err = session.add_item(item("B", 1)).unwrap_err();
        assert!(matches!(err, CheckoutError::State(_)));
        assert_eq!(session.item_count(), 1);

        // Same id still merges
        session.add_item(item("A", 1)).unwrap();
        assert_eq!(session.items()[0].quantity(), 2);

        session.remove_item("A");
        session.add_item(item("B", 1)).unwrap();
        assert_eq!(session.items()[0].item_id(), "B");
    }

    #[test]
    fn test_switch_to_express_with_many_items() {
        let mut session = CheckoutSession::new("SB1286");
        session.add_item(item("A", 1)).unwrap();
        session.add_item(item("B", 1)).unwrap();

        let err = session.set_process_mode(ProcessMode::Express).unwrap_err();
        assert!(matches!(err, CheckoutError::State(_)));
        assert_eq!(session.process_mode(), ProcessMode::Cart);

        session.remove_item("B");
        session.set_process_mode(ProcessMode::Express).unwrap();
    }

    #[test]
    fn test_remove_missing_item_is_noop() {
        let mut session = CheckoutSession::new("SB1286");
        session.add_item(item("A", 1)).unwrap();
        session.remove_item("nope");
        assert_eq!(session.item_count(), 1);
    }

    #[test]
    fn test_fee_setters_clamp() {
        let mut session = CheckoutSession::new("SB1286");
        session.set_delivery_fee(-5.0);
        session.set_handling_fee(f64::NAN);
        session.set_discount(12.5);
        session.set_vat(-0.0);
        session.set_tot(3.0);

        assert_eq!(session.delivery_fee(), Some(0.0));
        assert_eq!(session.handling_fee(), Some(0.0));
        assert_eq!(session.discount(), Some(12.5));
        assert_eq!(session.vat(), Some(0.0));
        assert!(session.vat().unwrap().is_sign_positive());
        assert_eq!(session.tot(), Some(3.0));
    }

    #[test]
    fn test_vat_and_tot_are_independent() {
        let mut session = CheckoutSession::new("SB1286");
        session.set_vat(15.0);
        session.set_tot(2.0);

        let payload = session.build_checkout_payload().unwrap();
        assert_eq!(payload["totalItemsTax1"], json!(15.0));
        assert_eq!(payload["totalItemsTax2"], json!(2.0));
    }

    #[test]
    fn test_clear_keeps_identity_and_callbacks() {
        let mut session = configured_session();
        session.set_process_mode(ProcessMode::Express).unwrap();
        session.set_merchant_order_id("order-001");
        session.add_item(item("A", 1)).unwrap();
        session.set_expires_after(600);
        session.set_expires_in_days(2);
        session.set_delivery_fee(10.0);
        session.set_handling_fee(1.0);
        session.set_discount(5.0);
        session.set_vat(15.0);
        session.set_tot(2.0);

        session.clear();
        let payload = session.build_checkout_payload().unwrap();

        let keys: Vec<_> = payload.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "merchantId",
                "process",
                "merchantOrderId",
                "ipnUrl",
                "successUrl",
                "cancelUrl",
                "failureUrl",
            ]
        );
        assert_eq!(payload["merchantId"], "SB1286");
        assert_eq!(payload["process"], "Cart");
        assert_eq!(payload["merchantOrderId"], "0");
    }

    #[test]
    fn test_express_payload_scenario() {
        let mut session = CheckoutSession::new("SB1286");
        session.set_process_mode(ProcessMode::Express).unwrap();
        session
            .add_item(Item::new("item-0", "Car", 100.0, 1).unwrap())
            .unwrap();
        session.set_vat(15.0);

        let payload = session.build_checkout_payload().unwrap();

        assert_eq!(payload["process"], "Express");
        assert_eq!(
            payload["items"],
            json!([{ "itemId": "item-0", "itemName": "Car", "unitPrice": 100.0, "quantity": 1 }])
        );
        assert_eq!(payload["totalItemsTax1"], json!(15.0));
        assert!(!payload.contains_key("totalItemsDeliveryFee"));
        assert!(!payload.contains_key("totalItemsTax2"));
    }

    #[test]
    fn test_full_payload_key_order() {
        let mut session = configured_session();
        session.add_item(item("A", 1)).unwrap();
        session.set_expires_after(600);
        session.set_expires_in_days(1);
        session.set_delivery_fee(1.0);
        session.set_handling_fee(1.0);
        session.set_discount(1.0);
        session.set_vat(1.0);
        session.set_tot(1.0);

        let payload = session.build_checkout_payload().unwrap();
        let keys: Vec<_> = payload.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "merchantId",
                "process",
                "merchantOrderId",
                "items",
                "ipnUrl",
                "successUrl",
                "cancelUrl",
                "failureUrl",
                "expiresAfter",
                "totalItemsDeliveryFee",
                "totalItemsHandlingFee",
                "totalItemsDiscount",
                "totalItemsTax1",
                "totalItemsTax2",
            ]
        );
    }

    #[test]
    fn test_expires_in_days_stays_off_the_wire() {
        let mut session = CheckoutSession::new("SB1286");
        session.set_expires_in_days(3);

        assert_eq!(session.expires_in_days(), Some(3));
        let payload = session.build_checkout_payload().unwrap();
        assert!(!payload.contains_key("expiresInDays"));

        session.clear();
        assert_eq!(session.expires_in_days(), None);
    }

    struct RecordingGateway {
        seen: Mutex<Option<WireMap>>,
    }

    #[async_trait]
    impl CheckoutGateway for RecordingGateway {
        async fn checkout_url(&self, payload: &WireMap) -> CheckoutResult<String> {
            *self.seen.lock().unwrap() = Some(payload.clone());
            Ok("https://test.yenepay.com/Home/Process/?q=abc".to_string())
        }

        async fn verify_ipn_detailed(&self, _ipn: &Ipn) -> IpnVerification {
            IpnVerification::Unavailable
        }

        async fn try_request_pdt(&self, _pdt: &Pdt) -> CheckoutResult<PdtResponse> {
            Err(CheckoutError::Network("unused".to_string()))
        }

        fn is_sandbox(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_get_checkout_url_posts_payload() {
        let gateway = RecordingGateway {
            seen: Mutex::new(None),
        };
        let mut session = configured_session();
        session.add_item(item("A", 2)).unwrap();

        let url = session.get_checkout_url(&gateway).await.unwrap();

        assert_eq!(url, "https://test.yenepay.com/Home/Process/?q=abc");
        let seen = gateway.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen, session.build_checkout_payload().unwrap());
    }
}
