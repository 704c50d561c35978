//! Debt domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use gearbox_shared::types::money::clamped_sub;
use gearbox_shared::types::{CustomerId, DebtId, InvoiceId};

/// Debt lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    /// Balance still owed.
    Outstanding,
    /// Fully repaid; `paid_amount == total_amount`.
    Settled,
}

impl DebtStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outstanding => "outstanding",
            Self::Settled => "settled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "outstanding" => Some(Self::Outstanding),
            "settled" => Some(Self::Settled),
            _ => None,
        }
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tracked, due-dated remainder converted from an invoice.
///
/// Never deleted; settles exactly when `paid_amount == total_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    /// The debt ID.
    pub id: DebtId,
    /// The customer who owes.
    pub customer_id: CustomerId,
    /// The invoice whose remainder this debt tracks.
    pub invoice_id: InvoiceId,
    /// The remainder at conversion time; immutable afterwards.
    pub total_amount: Decimal,
    /// Cumulative successful repayments.
    pub paid_amount: Decimal,
    /// When the debt falls due.
    pub due_date: NaiveDate,
    /// Lifecycle status.
    pub status: DebtStatus,
}

impl Debt {
    /// Returns the amount still owed.
    #[must_use]
    pub fn outstanding_amount(&self) -> Decimal {
        clamped_sub(self.total_amount, self.paid_amount)
    }

    /// Returns true if repayments are still accepted.
    #[must_use]
    pub fn accepts_repayments(&self) -> bool {
        matches!(self.status, DebtStatus::Outstanding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_debt(total: Decimal, paid: Decimal, status: DebtStatus) -> Debt {
        Debt {
            id: DebtId::new(),
            customer_id: CustomerId::new(),
            invoice_id: InvoiceId::new(),
            total_amount: total,
            paid_amount: paid,
            due_date: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            status,
        }
    }

    #[test]
    fn test_outstanding_amount() {
        let debt = make_debt(dec!(3_000_000), dec!(1_000_000), DebtStatus::Outstanding);
        assert_eq!(debt.outstanding_amount(), dec!(2_000_000));
    }

    #[test]
    fn test_settled_debt_rejects_repayments() {
        let debt = make_debt(dec!(3_000_000), dec!(3_000_000), DebtStatus::Settled);
        assert!(!debt.accepts_repayments());
        assert_eq!(debt.outstanding_amount(), dec!(0));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(DebtStatus::parse("outstanding"), Some(DebtStatus::Outstanding));
        assert_eq!(DebtStatus::parse("SETTLED"), Some(DebtStatus::Settled));
        assert_eq!(DebtStatus::parse("overdue"), None);
    }
}
