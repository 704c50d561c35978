//! Debt ledger errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::invoice::TicketStage;

/// Errors raised by debt conversion and repayment rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebtError {
    /// Conversion requested for an invoice with no outstanding remainder.
    #[error("invoice has no outstanding remainder to convert")]
    NothingToConvert,

    /// The invoice has already been converted into a debt.
    #[error("invoice has already been converted to a debt")]
    AlreadyConverted,

    /// Conversion requires the vehicle to be handed over first.
    #[error("ticket stage {0} does not allow debt conversion")]
    TicketNotHandedOver(TicketStage),

    /// Due dates must lie strictly after today.
    #[error("due date {0} is not in the future")]
    DueDateNotInFuture(NaiveDate),

    /// The debt is settled and accepts no further changes.
    #[error("debt is already settled")]
    AlreadySettled,

    /// A repayment that would push `paid_amount` past the total.
    #[error("repayment of {attempted} exceeds outstanding debt of {outstanding}")]
    RepaymentExceedsDebt {
        /// Amount still owed.
        outstanding: Decimal,
        /// Repayment that was attempted.
        attempted: Decimal,
    },
}

impl DebtError {
    /// Stable machine-readable code for API payloads.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NothingToConvert => "DEBT_NOTHING_TO_CONVERT",
            Self::AlreadyConverted => "DEBT_ALREADY_CONVERTED",
            Self::TicketNotHandedOver(_) => "DEBT_TICKET_NOT_HANDED_OVER",
            Self::DueDateNotInFuture(_) => "DEBT_DUE_DATE_NOT_IN_FUTURE",
            Self::AlreadySettled => "DEBT_ALREADY_SETTLED",
            Self::RepaymentExceedsDebt { .. } => "DEBT_REPAYMENT_EXCEEDS_DEBT",
        }
    }

    /// HTTP status code this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::DueDateNotInFuture(_) | Self::RepaymentExceedsDebt { .. } => 400,
            Self::NothingToConvert
            | Self::AlreadyConverted
            | Self::TicketNotHandedOver(_)
            | Self::AlreadySettled => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_state_errors_map_to_422() {
        assert_eq!(DebtError::NothingToConvert.http_status_code(), 422);
        assert_eq!(DebtError::AlreadyConverted.http_status_code(), 422);
        assert_eq!(DebtError::AlreadySettled.http_status_code(), 422);
    }

    #[test]
    fn test_input_errors_map_to_400() {
        let err = DebtError::RepaymentExceedsDebt {
            outstanding: dec!(100),
            attempted: dec!(200),
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "DEBT_REPAYMENT_EXCEEDS_DEBT");
    }
}
