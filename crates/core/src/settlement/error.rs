//! Settlement error types.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::SettlementStatus;

/// Errors that can occur during settlement operations.
#[derive(Debug, Error)]
pub enum SettlementError {
    // ========== Validation Errors ==========
    /// Tender amount must be positive.
    #[error("Tender amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Bank-transfer amount exceeds the remaining balance. The checkout
    /// amount is fixed once created, so overshoot is rejected, never
    /// clamped.
    #[error("Amount {requested} exceeds remaining balance {remaining}")]
    AmountExceedsBalance {
        /// Remaining balance at validation time.
        remaining: Decimal,
        /// Amount the caller requested.
        requested: Decimal,
    },

    /// Nothing is outstanding on the target.
    #[error("Nothing outstanding to settle")]
    NothingOutstanding,

    // ========== State Errors ==========
    /// The target aggregate does not accept tenders in its current state.
    #[error("Target is not payable in its current state")]
    NotPayable,

    /// Only a pending gateway transaction can be cancelled.
    #[error("Transaction in status {0} cannot be cancelled")]
    NotCancellable(SettlementStatus),

    // ========== Gateway Errors ==========
    /// The transaction carries no gateway reference.
    #[error("Transaction has no gateway reference")]
    MissingGatewayReference,

    /// The callback reference does not match the transaction.
    #[error("Gateway reference mismatch: expected {expected}, got {actual}")]
    ReferenceMismatch {
        /// Reference stored on the transaction.
        expected: String,
        /// Reference carried by the callback.
        actual: String,
    },

    /// The callback amount does not match the pending transaction.
    #[error("Callback amount mismatch: expected {expected}, got {actual}")]
    CallbackAmountMismatch {
        /// Amount on the pending transaction.
        expected: Decimal,
        /// Amount reported by the gateway.
        actual: Decimal,
    },

    /// The gateway reported success for a transaction it previously failed.
    #[error("Gateway reported success for a transaction already marked failed")]
    ConflictingOutcome,
}

impl SettlementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::AmountExceedsBalance { .. } => "AMOUNT_EXCEEDS_BALANCE",
            Self::NothingOutstanding => "NOTHING_OUTSTANDING",
            Self::NotPayable => "NOT_PAYABLE",
            Self::NotCancellable(_) => "NOT_CANCELLABLE",
            Self::MissingGatewayReference => "MISSING_GATEWAY_REFERENCE",
            Self::ReferenceMismatch { .. } => "REFERENCE_MISMATCH",
            Self::CallbackAmountMismatch { .. } => "CALLBACK_AMOUNT_MISMATCH",
            Self::ConflictingOutcome => "CONFLICTING_OUTCOME",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::NonPositiveAmount(_) | Self::AmountExceedsBalance { .. } => 400,

            // 422 Unprocessable - aggregate state forbids the action
            Self::NothingOutstanding | Self::NotPayable | Self::NotCancellable(_) => 422,

            // 409 Conflict - contradictory gateway report
            Self::ConflictingOutcome => 409,

            // 502 Bad Gateway - malformed or mismatched callback payload
            Self::MissingGatewayReference
            | Self::ReferenceMismatch { .. }
            | Self::CallbackAmountMismatch { .. } => 502,
        }
    }
}
