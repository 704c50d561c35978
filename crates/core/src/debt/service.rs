//! Debt ledger service.
//!
//! Validates converting an invoice remainder into a debt, applying
//! repayments, and moving due dates. Pure logic; the repository layer
//! re-reads balances and persists under its transaction boundary.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use gearbox_shared::types::money::is_positive_amount;

use super::error::DebtError;
use super::types::DebtStatus;
use crate::invoice::{InvoiceStatus, TicketStage};

/// A validated conversion plan: what the new debt will hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebtConversion {
    /// The invoice remainder becoming the debt's total.
    pub total_amount: Decimal,
    /// The due date for the new debt.
    pub due_date: NaiveDate,
}

/// Result of applying a successful repayment to a debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebtRepayment {
    /// Updated cumulative repayment.
    pub paid_amount: Decimal,
    /// Status after the repayment; `Settled` exactly at full repayment.
    pub status: DebtStatus,
}

/// Stateless debt ledger service.
pub struct DebtService;

impl DebtService {
    /// Validates converting an invoice's remainder into a debt.
    ///
    /// Preconditions: a non-zero remainder, a ticket past handover, an
    /// invoice that has not already been settled or converted, and a due
    /// date strictly after today. The UI prevents most of these, but the
    /// service enforces them independently.
    ///
    /// # Errors
    ///
    /// Returns `DebtError` describing the violated precondition.
    pub fn plan_conversion(
        remaining_amount: Decimal,
        invoice_status: InvoiceStatus,
        ticket_stage: TicketStage,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<DebtConversion, DebtError> {
        match invoice_status {
            InvoiceStatus::ConvertedToDebt => return Err(DebtError::AlreadyConverted),
            InvoiceStatus::Settled => return Err(DebtError::NothingToConvert),
            InvoiceStatus::Open => {}
        }
        if !ticket_stage.allows_debt_conversion() {
            return Err(DebtError::TicketNotHandedOver(ticket_stage));
        }
        if !is_positive_amount(remaining_amount) {
            return Err(DebtError::NothingToConvert);
        }
        Self::validate_due_date(due_date, today)?;

        Ok(DebtConversion {
            total_amount: remaining_amount,
            due_date,
        })
    }

    /// Applies a successful repayment to a debt's stored amounts.
    ///
    /// Called only after the repayment transaction has reached `Success`.
    /// The settlement service has already validated and, for cash, clamped
    /// the amount; this guard keeps `paid_amount <= total_amount` an
    /// invariant even so.
    ///
    /// # Errors
    ///
    /// Returns `DebtError` if the debt is settled or the repayment would
    /// exceed the total.
    pub fn apply_repayment(
        total_amount: Decimal,
        paid_amount: Decimal,
        status: DebtStatus,
        amount: Decimal,
    ) -> Result<DebtRepayment, DebtError> {
        if status == DebtStatus::Settled {
            return Err(DebtError::AlreadySettled);
        }
        let new_paid = paid_amount + amount;
        if new_paid > total_amount {
            return Err(DebtError::RepaymentExceedsDebt {
                outstanding: total_amount - paid_amount,
                attempted: amount,
            });
        }

        let status = if new_paid == total_amount {
            DebtStatus::Settled
        } else {
            DebtStatus::Outstanding
        };
        Ok(DebtRepayment {
            paid_amount: new_paid,
            status,
        })
    }

    /// Validates a due-date change.
    ///
    /// # Errors
    ///
    /// Returns `DebtError` if the debt is settled or the new date is not
    /// strictly in the future.
    pub fn validate_due_date_change(
        status: DebtStatus,
        new_due_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), DebtError> {
        if status == DebtStatus::Settled {
            return Err(DebtError::AlreadySettled);
        }
        Self::validate_due_date(new_due_date, today)
    }

    // Today is disallowed, matching the observed UI rule.
    fn validate_due_date(due_date: NaiveDate, today: NaiveDate) -> Result<(), DebtError> {
        if due_date <= today {
            return Err(DebtError::DueDateNotInFuture(due_date));
        }
        Ok(())
    }
}
