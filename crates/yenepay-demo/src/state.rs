//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the gateway client, the item catalog and the checkout template.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use yenepay_client::GatewayClient;
use yenepay_core::{BoxedCheckoutGateway, CheckoutResult, CheckoutSession, Item, ProcessMode};

/// Minutes before a demo order expires
pub const ORDER_EXPIRY_MINUTES: u32 = 600;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL the gateway redirects and posts back to
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Merchant code from the merchant dashboard
    pub merchant_code: String,
    /// PDT token from the merchant dashboard
    pub pdt_token: String,
}

impl AppConfig {
    /// Load from environment variables.
    ///
    /// `YENEPAY_MERCHANT_CODE` and `YENEPAY_PDT_TOKEN` are required.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let merchant_code = std::env::var("YENEPAY_MERCHANT_CODE")
            .map_err(|_| anyhow::anyhow!("YENEPAY_MERCHANT_CODE not set"))?;
        let pdt_token = std::env::var("YENEPAY_PDT_TOKEN")
            .map_err(|_| anyhow::anyhow!("YENEPAY_PDT_TOKEN not set"))?;

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            merchant_code,
            pdt_token,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    fn callback_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// An item offered by the shop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl CatalogEntry {
    /// Validated checkout item for this entry
    pub fn to_item(&self) -> CheckoutResult<Item> {
        Item::new(&self.id, &self.name, self.price, self.quantity)
    }
}

/// Item catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<CatalogEntry>,
}

impl ItemCatalog {
    /// The two items of the stock demo
    pub fn builtin() -> Self {
        Self {
            items: vec![
                CatalogEntry {
                    id: "item-0".to_string(),
                    name: "Car".to_string(),
                    price: 100.0,
                    quantity: 1,
                },
                CatalogEntry {
                    id: "item-1".to_string(),
                    name: "Plane".to_string(),
                    price: 120.0,
                    quantity: 1,
                },
            ],
        }
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Gateway used for checkout and verification
    pub gateway: BoxedCheckoutGateway,
    /// Items for sale
    pub catalog: Arc<ItemCatalog>,
    /// Configured session cloned for every checkout
    pub template: CheckoutSession,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState with the HTTP gateway client
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let catalog = load_item_catalog()?;

        let gateway = GatewayClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize gateway client: {}", e))?;

        Ok(Self::with_gateway(config, catalog, Arc::new(gateway))?)
    }

    /// Assemble state around any gateway implementation
    pub fn with_gateway(
        config: AppConfig,
        catalog: ItemCatalog,
        gateway: BoxedCheckoutGateway,
    ) -> CheckoutResult<Self> {
        let template = checkout_template(&config)?;

        Ok(Self {
            gateway,
            catalog: Arc::new(catalog),
            template,
            config,
        })
    }

    /// Fresh session for one checkout, with its own merchant order id
    pub fn new_session(&self) -> CheckoutSession {
        let mut session = self.template.clone();
        session.set_merchant_order_id(format!("order-{}", uuid::Uuid::new_v4()));
        session
    }
}

/// Merchant identity, callbacks, mode and expiry shared by all checkouts
fn checkout_template(config: &AppConfig) -> CheckoutResult<CheckoutSession> {
    let mut session = CheckoutSession::new(&config.merchant_code)
        .with_success_url(config.callback_url("/success"))
        .with_cancel_url(config.callback_url("/cancel"))
        .with_failure_url(config.callback_url("/failure"))
        .with_ipn_url(config.callback_url("/ipn"));

    session.set_process_mode(ProcessMode::Express)?;
    session.set_expires_after(ORDER_EXPIRY_MINUTES);
    Ok(session)
}

/// Load item catalog from config file
fn load_item_catalog() -> anyhow::Result<ItemCatalog> {
    let config_paths = [
        "config/items.toml",
        "crates/yenepay-demo/config/items.toml",
        "../config/items.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = ItemCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} items from {}", catalog.len(), path);
            return Ok(catalog);
        }
    }

    tracing::warn!("No item catalog found, using built-in items");
    Ok(ItemCatalog::builtin())
}
