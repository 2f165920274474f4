//! # Checkout Gateway Trait
//!
//! Seam between the checkout types and the transport that talks to the
//! hosted checkout service. The HTTP implementation lives in `yenepay-client`;
//! tests and alternative transports implement the same trait.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            CheckoutGateway (trait)           │
//! │  ├── checkout_url()         get-checkout-url │
//! │  ├── verify_ipn_detailed()  verify-ipn       │
//! │  └── try_request_pdt()      verify-pdt       │
//! └──────────────────────────────────────────────┘
//! ```

use crate::error::CheckoutResult;
use crate::ipn::Ipn;
use crate::pdt::{Pdt, PdtResponse};
use crate::wire::WireMap;
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of re-posting an IPN to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpnVerification {
    /// The gateway acknowledged the notification (2xx)
    Authentic,
    /// The gateway answered with a non-success status
    NotAuthentic,
    /// The verification call itself failed (transport error)
    Unavailable,
}

impl IpnVerification {
    pub fn is_authentic(&self) -> bool {
        matches!(self, IpnVerification::Authentic)
    }
}

/// Operations offered by the hosted checkout service.
///
/// Implementations must be re-entrant: IPN calls arrive from the gateway at
/// arbitrary times and never touch checkout session state.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Post a checkout payload and return the URL to redirect the customer to.
    ///
    /// # Errors
    /// `CheckoutError::Network` on transport failure, `CheckoutError::Gateway`
    /// if the response reports failure or lacks the `result` field.
    async fn checkout_url(&self, payload: &WireMap) -> CheckoutResult<String>;

    /// Re-post an IPN to the gateway, keeping transport failure distinct
    /// from a negative answer.
    async fn verify_ipn_detailed(&self, ipn: &Ipn) -> IpnVerification;

    /// Ask the gateway to confirm a transaction after a redirect.
    async fn try_request_pdt(&self, pdt: &Pdt) -> CheckoutResult<PdtResponse>;

    /// True iff the gateway answered with a success status.
    ///
    /// A failed call also yields false, so "not authentic" and "could not
    /// verify" look the same here. Use `verify_ipn_detailed` to tell them apart.
    async fn verify_ipn(&self, ipn: &Ipn) -> bool {
        self.verify_ipn_detailed(ipn).await.is_authentic()
    }

    /// Decoded PDT response, or `None` if confirmation is unavailable.
    ///
    /// `None` does not mean "not paid"; it means the gateway could not be
    /// asked or did not answer successfully.
    async fn request_pdt(&self, pdt: &Pdt) -> Option<PdtResponse> {
        self.try_request_pdt(pdt).await.ok()
    }

    /// Whether calls go to the sandbox deployment
    fn is_sandbox(&self) -> bool;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedCheckoutGateway = Arc<dyn CheckoutGateway>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;

    struct FixedGateway {
        verification: IpnVerification,
        pdt_body: Option<&'static str>,
    }

    #[async_trait]
    impl CheckoutGateway for FixedGateway {
        async fn checkout_url(&self, _payload: &WireMap) -> CheckoutResult<String> {
            Ok("https://test.yenepay.com/checkout".to_string())
        }

        async fn verify_ipn_detailed(&self, _ipn: &Ipn) -> IpnVerification {
            self.verification
        }

        async fn try_request_pdt(&self, _pdt: &Pdt) -> CheckoutResult<PdtResponse> {
            match self.pdt_body {
                Some(body) => Ok(PdtResponse::from_query(body)),
                None => Err(CheckoutError::Network("connection refused".to_string())),
            }
        }

        fn is_sandbox(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_verify_ipn_collapses_failures() {
        let ipn = Ipn::default();

        for (verification, expected) in [
            (IpnVerification::Authentic, true),
            (IpnVerification::NotAuthentic, false),
            (IpnVerification::Unavailable, false),
        ] {
            let gateway = FixedGateway {
                verification,
                pdt_body: None,
            };
            assert_eq!(gateway.verify_ipn(&ipn).await, expected);
        }
    }

    #[tokio::test]
    async fn test_request_pdt_maps_errors_to_none() {
        let pdt = Pdt::new("token");

        let failing = FixedGateway {
            verification: IpnVerification::Unavailable,
            pdt_body: None,
        };
        assert!(failing.request_pdt(&pdt).await.is_none());

        let working = FixedGateway {
            verification: IpnVerification::Authentic,
            pdt_body: Some("result=SUCCESS&Status=Paid"),
        };
        let response = working.request_pdt(&pdt).await.unwrap();
        assert!(response.is_paid());
    }
}
