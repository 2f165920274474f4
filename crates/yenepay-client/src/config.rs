//! # Gateway Configuration
//!
//! Endpoint selection and HTTP settings for the gateway client.
//! Values can be loaded from environment variables (and a `.env` file).

use std::env;
use std::time::Duration;
use url::Url;
use yenepay_core::{CheckoutError, CheckoutResult};

/// Base URL of the sandbox deployment
pub const SANDBOX_BASE_URL: &str = "https://testapi.yenepay.com";

/// Base URL of the production deployment
pub const PRODUCTION_BASE_URL: &str = "https://endpoints.yenepay.com";

const CHECKOUT_PATH: &str = "/api/urlgenerate/getcheckouturl/";
const IPN_VERIFY_PATH: &str = "/api/verify/ipn/";
const PDT_PATH: &str = "/api/verify/pdt/";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The three gateway endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Checkout URL generation
    pub checkout_url: String,
    /// IPN verification
    pub ipn_verify_url: String,
    /// PDT verification
    pub pdt_url: String,
}

impl Endpoints {
    /// Endpoints rooted at an arbitrary base URL (mock servers, proxies)
    pub fn for_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            checkout_url: format!("{}{}", base, CHECKOUT_PATH),
            ipn_verify_url: format!("{}{}", base, IPN_VERIFY_PATH),
            pdt_url: format!("{}{}", base, PDT_PATH),
        }
    }

    pub fn sandbox() -> Self {
        Self::for_base_url(SANDBOX_BASE_URL)
    }

    pub fn production() -> Self {
        Self::for_base_url(PRODUCTION_BASE_URL)
    }
}

/// Gateway client configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Whether requests go to the sandbox deployment
    pub use_sandbox: bool,

    /// Endpoint set, derived from `use_sandbox` unless overridden
    pub endpoints: Endpoints,

    /// Per-request timeout
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Config for the sandbox or production deployment
    pub fn new(use_sandbox: bool) -> Self {
        let endpoints = if use_sandbox {
            Endpoints::sandbox()
        } else {
            Endpoints::production()
        };

        Self {
            use_sandbox,
            endpoints,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn sandbox() -> Self {
        Self::new(true)
    }

    pub fn production() -> Self {
        Self::new(false)
    }

    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `YENEPAY_USE_SANDBOX` (default `true`)
    /// - `YENEPAY_API_BASE_URL` (overrides the deployment base URL)
    /// - `YENEPAY_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> CheckoutResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup (the environment, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> CheckoutResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_sandbox = match lookup("YENEPAY_USE_SANDBOX") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                CheckoutError::Configuration(format!(
                    "YENEPAY_USE_SANDBOX must be true or false, got {}",
                    raw
                ))
            })?,
            None => true,
        };

        let mut config = Self::new(use_sandbox);

        if let Some(base_url) = lookup("YENEPAY_API_BASE_URL") {
            Url::parse(&base_url).map_err(|e| {
                CheckoutError::Configuration(format!("YENEPAY_API_BASE_URL is not a URL: {}", e))
            })?;
            config = config.with_api_base_url(base_url);
        }

        if let Some(raw) = lookup("YENEPAY_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                CheckoutError::Configuration(format!(
                    "YENEPAY_TIMEOUT_SECS must be a number of seconds, got {}",
                    raw
                ))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Builder: point every endpoint at a custom base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.endpoints = Endpoints::for_base_url(url.as_ref());
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_sandbox(&self) -> bool {
        self.use_sandbox
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::sandbox()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
