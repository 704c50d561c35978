//! Settlement state machine.
//!
//! Stateless service validating settlement requests, gateway callbacks, and
//! cancellations. Persistence and locking live in the repository layer; this
//! module decides which transition is legal and what it produces.

use rust_decimal::Decimal;

use gearbox_shared::types::money::is_positive_amount;

use super::error::SettlementError;
use super::types::{PaymentMethod, SettlementStatus};
use crate::gateway::{CallbackOutcome, GatewayCallback};

/// Outcome of validating a settlement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementPlan {
    /// Cash tender: record the transaction as `Success` and apply it
    /// immediately. `clamped` is true when the requested amount exceeded
    /// the remaining balance and was reduced to it.
    CashSettled {
        /// The amount to record, possibly clamped.
        amount: Decimal,
        /// Whether the requested amount was clamped to the balance.
        clamped: bool,
    },
    /// Bank transfer: record the transaction as `Pending`, create a hosted
    /// checkout, and wait for the callback.
    GatewayPending {
        /// The exact checkout amount; never clamped.
        amount: Decimal,
    },
}

/// Outcome of processing a gateway callback against a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Transition the pending transaction to `Success` and apply it.
    Confirm,
    /// The caller cancelled before the callback arrived, but the gateway
    /// confirmed the money moved. The payment is honored and the earlier
    /// cancellation is corrected; the repository flags it for review.
    ConfirmAfterCancellation,
    /// Transition the pending transaction to `Failed`. No balance change.
    MarkFailed,
    /// The transaction is already `Success`; a replayed callback changes
    /// nothing. This is the idempotency guard against gateway retries.
    AlreadySettled,
    /// The callback matches a resolved non-success state (e.g. a failure
    /// report replayed against a failed or cancelled transaction).
    NoEffect,
}

/// Stateless settlement service.
pub struct SettlementService;

impl SettlementService {
    /// Validates a settlement request against the target's fresh balance.
    ///
    /// `remaining_amount` must be recomputed by the caller immediately
    /// before this call, never cached. `payable` reflects whether the
    /// target aggregate currently accepts tenders (invoice open and ticket
    /// not completed, or debt outstanding).
    ///
    /// Overshoot policy is asymmetric by design: a cash tender larger than
    /// the remaining balance is clamped to it (don't overcharge), while a
    /// bank transfer is rejected because the checkout amount is fixed once
    /// created and cannot be silently altered.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError` if the request is invalid.
    pub fn request(
        method: PaymentMethod,
        amount: Decimal,
        remaining_amount: Decimal,
        payable: bool,
    ) -> Result<SettlementPlan, SettlementError> {
        if !payable {
            return Err(SettlementError::NotPayable);
        }
        if !is_positive_amount(amount) {
            return Err(SettlementError::NonPositiveAmount(amount));
        }
        if !is_positive_amount(remaining_amount) {
            return Err(SettlementError::NothingOutstanding);
        }

        match method {
            PaymentMethod::Cash => {
                let clamped = amount > remaining_amount;
                Ok(SettlementPlan::CashSettled {
                    amount: amount.min(remaining_amount),
                    clamped,
                })
            }
            PaymentMethod::BankTransfer => {
                if amount > remaining_amount {
                    return Err(SettlementError::AmountExceedsBalance {
                        remaining: remaining_amount,
                        requested: amount,
                    });
                }
                Ok(SettlementPlan::GatewayPending { amount })
            }
        }
    }

    /// Decides what a gateway callback does to a transaction.
    ///
    /// Must be safe to invoke any number of times with the same reference:
    /// a transaction already `Success` yields [`CallbackAction::AlreadySettled`]
    /// and no balance change. A success callback arriving after a
    /// user-initiated cancellation is honored; a confirmed external payment
    /// is never silently dropped.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError` if the callback payload does not match the
    /// transaction or reports a contradictory outcome.
    pub fn confirm_callback(
        status: SettlementStatus,
        tx_amount: Decimal,
        tx_reference: Option<&str>,
        callback: &GatewayCallback,
    ) -> Result<CallbackAction, SettlementError> {
        let Some(reference) = tx_reference else {
            return Err(SettlementError::MissingGatewayReference);
        };
        if reference != callback.gateway_reference {
            return Err(SettlementError::ReferenceMismatch {
                expected: reference.to_string(),
                actual: callback.gateway_reference.clone(),
            });
        }

        // Replay guard first: once Success, nothing else matters.
        if status == SettlementStatus::Success {
            return Ok(CallbackAction::AlreadySettled);
        }

        match (status, callback.outcome) {
            (SettlementStatus::Pending, CallbackOutcome::Succeeded) => {
                Self::require_amount_match(tx_amount, callback.amount)?;
                Ok(CallbackAction::Confirm)
            }
            (SettlementStatus::Pending, CallbackOutcome::Failed) => Ok(CallbackAction::MarkFailed),
            (SettlementStatus::Cancelled, CallbackOutcome::Succeeded) => {
                Self::require_amount_match(tx_amount, callback.amount)?;
                Ok(CallbackAction::ConfirmAfterCancellation)
            }
            (SettlementStatus::Cancelled | SettlementStatus::Failed, CallbackOutcome::Failed) => {
                Ok(CallbackAction::NoEffect)
            }
            (SettlementStatus::Failed, CallbackOutcome::Succeeded) => {
                // The gateway already reported failure for this reference;
                // refuse to flip it without operator review.
                Err(SettlementError::ConflictingOutcome)
            }
            (SettlementStatus::Success, _) => Ok(CallbackAction::AlreadySettled),
        }
    }

    /// Validates a user-initiated cancellation.
    ///
    /// Only a `Pending` gateway transaction can be cancelled; cash settles
    /// synchronously and resolved transactions are immutable.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::NotCancellable`] for any other status.
    pub fn cancel(status: SettlementStatus) -> Result<(), SettlementError> {
        match status {
            SettlementStatus::Pending => Ok(()),
            other => Err(SettlementError::NotCancellable(other)),
        }
    }

    fn require_amount_match(expected: Decimal, actual: Decimal) -> Result<(), SettlementError> {
        if expected == actual {
            Ok(())
        } else {
            Err(SettlementError::CallbackAmountMismatch { expected, actual })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn callback(reference: &str, amount: Decimal, outcome: CallbackOutcome) -> GatewayCallback {
        GatewayCallback {
            gateway_reference: reference.to_string(),
            amount,
            outcome,
        }
    }

    // ------------------------------------------------------------------
    // request()
    // ------------------------------------------------------------------

    #[test]
    fn test_cash_within_balance_settles() {
        let plan = SettlementService::request(
            PaymentMethod::Cash,
            dec!(4_000_000),
            dec!(10_000_000),
            true,
        )
        .unwrap();
        assert_eq!(
            plan,
            SettlementPlan::CashSettled {
                amount: dec!(4_000_000),
                clamped: false,
            }
        );
    }

    #[test]
    fn test_cash_overshoot_is_clamped() {
        let plan = SettlementService::request(
            PaymentMethod::Cash,
            dec!(7_000_000),
            dec!(6_000_000),
            true,
        )
        .unwrap();
        assert_eq!(
            plan,
            SettlementPlan::CashSettled {
                amount: dec!(6_000_000),
                clamped: true,
            }
        );
    }

    #[test]
    fn test_bank_transfer_within_balance_goes_pending() {
        let plan = SettlementService::request(
            PaymentMethod::BankTransfer,
            dec!(6_000_000),
            dec!(6_000_000),
            true,
        )
        .unwrap();
        assert_eq!(
            plan,
            SettlementPlan::GatewayPending {
                amount: dec!(6_000_000)
            }
        );
    }

    #[test]
    fn test_bank_transfer_overshoot_is_rejected_not_clamped() {
        // The checkout amount is fixed once created; overshoot must be
        // rejected outright, unlike cash.
        let result = SettlementService::request(
            PaymentMethod::BankTransfer,
            dec!(7_000_000),
            dec!(6_000_000),
            true,
        );
        assert!(matches!(
            result,
            Err(SettlementError::AmountExceedsBalance {
                remaining,
                requested,
            }) if remaining == dec!(6_000_000) && requested == dec!(7_000_000)
        ));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        for amount in [dec!(0), dec!(-100)] {
            let result =
                SettlementService::request(PaymentMethod::Cash, amount, dec!(1_000), true);
            assert!(matches!(result, Err(SettlementError::NonPositiveAmount(_))));
        }
    }

    #[test]
    fn test_zero_remaining_rejected_even_for_cash() {
        let result =
            SettlementService::request(PaymentMethod::Cash, dec!(100), dec!(0), true);
        assert!(matches!(result, Err(SettlementError::NothingOutstanding)));
    }

    #[test]
    fn test_unpayable_target_rejected() {
        let result =
            SettlementService::request(PaymentMethod::Cash, dec!(100), dec!(1_000), false);
        assert!(matches!(result, Err(SettlementError::NotPayable)));
    }

    // ------------------------------------------------------------------
    // confirm_callback()
    // ------------------------------------------------------------------

    #[test]
    fn test_pending_success_confirms() {
        let action = SettlementService::confirm_callback(
            SettlementStatus::Pending,
            dec!(6_000_000),
            Some("gw-1"),
            &callback("gw-1", dec!(6_000_000), CallbackOutcome::Succeeded),
        )
        .unwrap();
        assert_eq!(action, CallbackAction::Confirm);
    }

    #[test]
    fn test_pending_failure_marks_failed() {
        let action = SettlementService::confirm_callback(
            SettlementStatus::Pending,
            dec!(6_000_000),
            Some("gw-1"),
            &callback("gw-1", dec!(6_000_000), CallbackOutcome::Failed),
        )
        .unwrap();
        assert_eq!(action, CallbackAction::MarkFailed);
    }

    #[test]
    fn test_replayed_callback_is_noop() {
        // Same reference, same outcome, transaction already Success.
        let action = SettlementService::confirm_callback(
            SettlementStatus::Success,
            dec!(6_000_000),
            Some("gw-1"),
            &callback("gw-1", dec!(6_000_000), CallbackOutcome::Succeeded),
        )
        .unwrap();
        assert_eq!(action, CallbackAction::AlreadySettled);
    }

    #[test]
    fn test_replayed_callback_with_mismatched_amount_is_still_noop() {
        // Once Success, even a garbled retry must not error or double-credit.
        let action = SettlementService::confirm_callback(
            SettlementStatus::Success,
            dec!(6_000_000),
            Some("gw-1"),
            &callback("gw-1", dec!(1), CallbackOutcome::Succeeded),
        )
        .unwrap();
        assert_eq!(action, CallbackAction::AlreadySettled);
    }

    #[test]
    fn test_amount_mismatch_rejected_before_credit() {
        let result = SettlementService::confirm_callback(
            SettlementStatus::Pending,
            dec!(6_000_000),
            Some("gw-1"),
            &callback("gw-1", dec!(5_000_000), CallbackOutcome::Succeeded),
        );
        assert!(matches!(
            result,
            Err(SettlementError::CallbackAmountMismatch { .. })
        ));
    }

    #[test]
    fn test_reference_mismatch_rejected() {
        let result = SettlementService::confirm_callback(
            SettlementStatus::Pending,
            dec!(6_000_000),
            Some("gw-1"),
            &callback("gw-2", dec!(6_000_000), CallbackOutcome::Succeeded),
        );
        assert!(matches!(
            result,
            Err(SettlementError::ReferenceMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_reference_rejected() {
        let result = SettlementService::confirm_callback(
            SettlementStatus::Pending,
            dec!(6_000_000),
            None,
            &callback("gw-1", dec!(6_000_000), CallbackOutcome::Succeeded),
        );
        assert!(matches!(
            result,
            Err(SettlementError::MissingGatewayReference)
        ));
    }

    #[test]
    fn test_late_success_after_cancellation_is_honored() {
        // Money-safety: the gateway says the customer paid; the earlier
        // cancellation is corrected, not the payment dropped.
        let action = SettlementService::confirm_callback(
            SettlementStatus::Cancelled,
            dec!(6_000_000),
            Some("gw-1"),
            &callback("gw-1", dec!(6_000_000), CallbackOutcome::Succeeded),
        )
        .unwrap();
        assert_eq!(action, CallbackAction::ConfirmAfterCancellation);
    }

    #[test]
    fn test_failure_report_after_cancellation_has_no_effect() {
        let action = SettlementService::confirm_callback(
            SettlementStatus::Cancelled,
            dec!(6_000_000),
            Some("gw-1"),
            &callback("gw-1", dec!(6_000_000), CallbackOutcome::Failed),
        )
        .unwrap();
        assert_eq!(action, CallbackAction::NoEffect);
    }

    #[test]
    fn test_success_report_for_failed_transaction_conflicts() {
        let result = SettlementService::confirm_callback(
            SettlementStatus::Failed,
            dec!(6_000_000),
            Some("gw-1"),
            &callback("gw-1", dec!(6_000_000), CallbackOutcome::Succeeded),
        );
        assert!(matches!(result, Err(SettlementError::ConflictingOutcome)));
    }

    // ------------------------------------------------------------------
    // cancel()
    // ------------------------------------------------------------------

    #[test]
    fn test_cancel_pending_allowed() {
        assert!(SettlementService::cancel(SettlementStatus::Pending).is_ok());
    }

    #[test]
    fn test_cancel_resolved_rejected() {
        for status in [
            SettlementStatus::Success,
            SettlementStatus::Failed,
            SettlementStatus::Cancelled,
        ] {
            assert!(matches!(
                SettlementService::cancel(status),
                Err(SettlementError::NotCancellable(_))
            ));
        }
    }

    // ------------------------------------------------------------------
    // End-to-end balance scenarios
    // ------------------------------------------------------------------

    #[test]
    fn test_scenario_cash_then_gateway_settles_invoice() {
        use crate::invoice::{apply_transaction, compute_balances};
        use crate::settlement::TenderPurpose;

        let estimate = dec!(10_000_000);
        let mut deposit = dec!(0);
        let mut paid = dec!(0);

        // Cash 4,000,000
        let balances = compute_balances(estimate, None, Some(deposit), Some(paid));
        let plan = SettlementService::request(
            PaymentMethod::Cash,
            dec!(4_000_000),
            balances.remaining_amount,
            true,
        )
        .unwrap();
        let SettlementPlan::CashSettled { amount, .. } = plan else {
            panic!("expected cash plan");
        };
        let applied =
            apply_transaction(estimate, None, deposit, paid, TenderPurpose::Payment, amount)
                .unwrap();
        deposit = applied.deposit_received;
        paid = applied.paid_amount;

        let balances = compute_balances(estimate, None, Some(deposit), Some(paid));
        assert_eq!(paid, dec!(4_000_000));
        assert_eq!(balances.final_amount, dec!(6_000_000));

        // Bank transfer 6,000,000, gateway confirms
        let plan = SettlementService::request(
            PaymentMethod::BankTransfer,
            dec!(6_000_000),
            balances.remaining_amount,
            true,
        )
        .unwrap();
        let SettlementPlan::GatewayPending { amount } = plan else {
            panic!("expected gateway plan");
        };
        let action = SettlementService::confirm_callback(
            SettlementStatus::Pending,
            amount,
            Some("gw-final"),
            &callback("gw-final", amount, CallbackOutcome::Succeeded),
        )
        .unwrap();
        assert_eq!(action, CallbackAction::Confirm);

        let applied =
            apply_transaction(estimate, None, deposit, paid, TenderPurpose::Payment, amount)
                .unwrap();
        let balances =
            compute_balances(estimate, None, Some(applied.deposit_received), Some(applied.paid_amount));
        assert_eq!(balances.final_amount, dec!(0));
    }

    #[test]
    fn test_scenario_gateway_overshoot_rejected_at_six_million_remaining() {
        let result = SettlementService::request(
            PaymentMethod::BankTransfer,
            dec!(7_000_000),
            dec!(6_000_000),
            true,
        );
        assert!(matches!(
            result,
            Err(SettlementError::AmountExceedsBalance { .. })
        ));
    }
}
