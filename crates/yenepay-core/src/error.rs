//! # Checkout Error Types
//!
//! Typed error handling for yenepay-rs.
//! All fallible checkout operations return `Result<T, CheckoutError>`.

use thiserror::Error;

/// Core error type for checkout and verification operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Bad input: negative price/quantity, missing IPN field, unknown process mode
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not allowed in the session's current state
    #[error("Invalid state: {0}")]
    State(String),

    /// Transport-level failure (DNS, connection, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Well-formed response from the gateway that we cannot use
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Configuration errors (missing or malformed settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CheckoutError {
    /// Shorthand for a missing wire field
    pub fn missing_field(key: &str) -> Self {
        CheckoutError::Validation(format!("missing field: {}", key))
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckoutError::Network(_) | CheckoutError::Gateway(_))
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Validation(_) => 400,
            CheckoutError::State(_) => 409,
            CheckoutError::Network(_) => 503,
            CheckoutError::Gateway(_) => 502,
            CheckoutError::Configuration(_) => 500,
            CheckoutError::Serialization(_) => 500,
        }
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        CheckoutError::Serialization(err.to_string())
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
