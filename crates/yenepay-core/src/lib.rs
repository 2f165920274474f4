//! # yenepay-core
//!
//! Core types and traits for the yenepay-rs checkout client.
//!
//! This crate provides:
//! - `Item` and `CheckoutSession` for building a checkout
//! - `Ipn` and `Pdt` verification records and `PdtResponse`
//! - `CheckoutGateway` trait for the transport talking to the gateway
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use yenepay_core::{CheckoutSession, Item, ProcessMode};
//!
//! let mut session = CheckoutSession::new("SB1286")
//!     .with_success_url("https://shop.example/success")
//!     .with_ipn_url("https://shop.example/ipn");
//!
//! session.set_process_mode(ProcessMode::Express)?;
//! session.add_item(Item::new("item-0", "Car", 100.0, 1)?)?;
//! session.set_vat(15.0);
//!
//! // Redirect the customer to this URL
//! let url = session.get_checkout_url(&gateway).await?;
//! ```

pub mod checkout;
pub mod error;
pub mod gateway;
pub mod ipn;
pub mod item;
pub mod pdt;
pub mod wire;

// Re-exports for convenience
pub use checkout::{CheckoutSession, ProcessMode, DEFAULT_MERCHANT_ORDER_ID};
pub use error::{CheckoutError, CheckoutResult};
pub use gateway::{BoxedCheckoutGateway, CheckoutGateway, IpnVerification};
pub use ipn::{Ipn, IPN_FIELDS};
pub use item::Item;
pub use pdt::{Pdt, PdtResponse, PDT_REQUEST_TYPE, PDT_SUCCESS};
pub use wire::{decode_form, decode_form_all, to_wire_map, WireMap};
