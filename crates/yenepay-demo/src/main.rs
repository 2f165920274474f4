//! # yenepay-demo
//!
//! Sample shop that takes payments through the hosted checkout.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export YENEPAY_MERCHANT_CODE=SB1286
//! export YENEPAY_PDT_TOKEN=...
//! export YENEPAY_USE_SANDBOX=true
//!
//! # Run the server
//! yenepay-demo
//! ```

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use yenepay_core::CheckoutGateway;
use yenepay_demo::{routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!(
        "yenepay-demo v{} ({})",
        env!("CARGO_PKG_VERSION"),
        state.config.environment
    );
    info!("Merchant: {}", state.config.merchant_code);
    info!("Gateway: {}", if state.gateway.is_sandbox() { "sandbox" } else { "production" });
    info!("Items loaded: {}", state.catalog.len());

    let app = routes::create_router(state);

    info!("Listening on http://{}", addr);

    if !is_prod {
        info!("Checkout: POST http://{}/checkout (form field: index)", addr);
        info!("IPN webhook: POST http://{}/ipn", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
