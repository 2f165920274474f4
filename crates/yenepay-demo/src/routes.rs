//! # Routes
//!
//! Axum router configuration for the demo shop.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - GET  /items - Items for sale
/// - POST /checkout - Create checkout and redirect to the gateway
/// - GET  /success, /cancel - Return pages, confirmed through PDT
/// - GET  /failure - Failure return page
/// - POST /ipn - Instant payment notification webhook
pub fn create_router(state: AppState) -> Router {
    // Pages the gateway sends the customer back to
    let return_routes = Router::new()
        .route("/success", get(handlers::payment_success))
        .route("/cancel", get(handlers::payment_cancel))
        .route("/failure", get(handlers::payment_failure));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .route("/items", get(handlers::list_items))
        .route("/checkout", post(handlers::create_checkout))
        .route("/ipn", post(handlers::ipn_webhook))
        .merge(return_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
