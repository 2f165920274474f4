//! # yenepay-client
//!
//! HTTP gateway client for yenepay-rs.
//!
//! `GatewayClient` implements [`yenepay_core::CheckoutGateway`] against the
//! hosted checkout API:
//!
//! 1. **Checkout URL** - posts a session's payload, returns the redirect URL
//! 2. **IPN verification** - re-posts a notification, authentic iff 2xx
//! 3. **PDT** - confirms a transaction after the customer is redirected back
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use yenepay_client::GatewayClient;
//! use yenepay_core::{CheckoutGateway, CheckoutSession, Item, Pdt};
//!
//! let gateway = GatewayClient::from_env()?;
//!
//! let mut session = CheckoutSession::new("SB1286");
//! session.add_item(Item::new("item-0", "Car", 100.0, 1)?)?;
//! let url = session.get_checkout_url(&gateway).await?;
//!
//! // Later, on the success redirect:
//! let pdt = Pdt::from_redirect_query(pdt_token, &query)?;
//! match gateway.request_pdt(&pdt).await {
//!     Some(resp) if resp.is_paid() => { /* mark order paid */ }
//!     Some(_) => { /* not paid */ }
//!     None => { /* confirmation unavailable, try again later */ }
//! }
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::GatewayClient;
pub use config::{Endpoints, GatewayConfig, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
