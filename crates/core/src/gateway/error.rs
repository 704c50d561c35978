//! Gateway error types.

use thiserror::Error;

/// Errors raised by the payment gateway adapter.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Checkout creation failed; the pending transaction is not created.
    #[error("Checkout creation failed: {0}")]
    Checkout(String),

    /// Callback payload could not be understood.
    #[error("Malformed gateway callback: {0}")]
    MalformedCallback(String),
}

impl GatewayError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Checkout(_) => "GATEWAY_CHECKOUT_FAILED",
            Self::MalformedCallback(_) => "GATEWAY_MALFORMED_CALLBACK",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Checkout(_) | Self::MalformedCallback(_) => 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GatewayError::Checkout("down".into()).error_code(),
            "GATEWAY_CHECKOUT_FAILED"
        );
        assert_eq!(
            GatewayError::MalformedCallback("bad json".into()).error_code(),
            "GATEWAY_MALFORMED_CALLBACK"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(GatewayError::Checkout(String::new()).http_status_code(), 502);
    }
}
