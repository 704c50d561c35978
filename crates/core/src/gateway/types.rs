//! Gateway request, session, and callback types.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::GatewayError;

/// Request to create a hosted checkout for a bank-transfer tender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Exact amount the checkout will collect; fixed once created.
    pub amount: Decimal,
    /// Reference naming the invoice or debt being settled.
    pub invoice_ref: String,
    /// Where the gateway sends the payer after checkout.
    pub return_url: String,
}

/// A hosted checkout created by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// URL the payer is redirected to.
    pub checkout_url: String,
    /// Gateway-assigned reference used to correlate the callback.
    pub gateway_reference: String,
}

/// Outcome reported by the gateway callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackOutcome {
    /// The transfer completed.
    Succeeded,
    /// The transfer failed or was abandoned.
    Failed,
}

impl CallbackOutcome {
    /// Returns the string representation of the outcome.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Parses an outcome from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for CallbackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Asynchronous confirmation delivered out-of-band by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCallback {
    /// Reference of the checkout this callback resolves.
    pub gateway_reference: String,
    /// Amount the gateway reports as transferred.
    pub amount: Decimal,
    /// Whether the transfer succeeded.
    pub outcome: CallbackOutcome,
}

/// Payment gateway adapter.
///
/// Implemented by the reqwest-backed hosted-checkout client in the api
/// crate; the core only depends on this seam.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a hosted checkout and returns its URL and reference.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Checkout`] if the gateway refuses or the
    /// call fails; the transaction must not be marked successful in that
    /// case.
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_parse() {
        assert_eq!(
            CallbackOutcome::parse("succeeded"),
            Some(CallbackOutcome::Succeeded)
        );
        assert_eq!(CallbackOutcome::parse("FAILED"), Some(CallbackOutcome::Failed));
        assert_eq!(CallbackOutcome::parse("pending"), None);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(CallbackOutcome::Succeeded.to_string(), "succeeded");
        assert_eq!(CallbackOutcome::Failed.to_string(), "failed");
    }
}
