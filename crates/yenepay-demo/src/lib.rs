//! # yenepay-demo
//!
//! Sample merchant web app for yenepay-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Checkout redirect for a small item catalog
//! - PDT confirmation on the success/cancel return pages
//! - IPN webhook verification
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/items` | List items |
//! | POST | `/checkout` | Create checkout, redirect to gateway |
//! | GET | `/success` | Return page, PDT confirms "Paid" |
//! | GET | `/cancel` | Return page, PDT confirms "Canceled" |
//! | GET | `/failure` | Return page for failed payments |
//! | POST | `/ipn` | IPN webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
