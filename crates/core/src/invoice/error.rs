//! Invoice error types.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::InvoiceStatus;

/// Errors raised by invoice aggregate operations.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Applying the tender would push deposit + payments past the
    /// discounted estimate.
    #[error(
        "Settlement would exceed invoice total: net total {net_total}, attempted {attempted}"
    )]
    SettlementExceedsTotal {
        /// Estimate net of discount.
        net_total: Decimal,
        /// Sum of deposit and payments after the attempted tender.
        attempted: Decimal,
    },

    /// Discount percentage outside 0..=100.
    #[error("Invalid discount percent: {0}")]
    InvalidDiscountPercent(Decimal),

    /// Estimate amount must not be negative.
    #[error("Invalid estimate amount: {0}")]
    InvalidEstimateAmount(Decimal),

    /// The invoice's status forbids the attempted action.
    #[error("Invoice is not payable in status {0}")]
    NotPayable(InvoiceStatus),
}

impl InvoiceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::SettlementExceedsTotal { .. } => "SETTLEMENT_EXCEEDS_TOTAL",
            Self::InvalidDiscountPercent(_) => "INVALID_DISCOUNT_PERCENT",
            Self::InvalidEstimateAmount(_) => "INVALID_ESTIMATE_AMOUNT",
            Self::NotPayable(_) => "INVOICE_NOT_PAYABLE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDiscountPercent(_) | Self::InvalidEstimateAmount(_) => 400,
            Self::SettlementExceedsTotal { .. } | Self::NotPayable(_) => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            InvoiceError::SettlementExceedsTotal {
                net_total: dec!(100),
                attempted: dec!(150),
            }
            .error_code(),
            "SETTLEMENT_EXCEEDS_TOTAL"
        );
        assert_eq!(
            InvoiceError::NotPayable(InvoiceStatus::Settled).error_code(),
            "INVOICE_NOT_PAYABLE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            InvoiceError::InvalidDiscountPercent(dec!(120)).http_status_code(),
            400
        );
        assert_eq!(
            InvoiceError::NotPayable(InvoiceStatus::ConvertedToDebt).http_status_code(),
            422
        );
    }
}
