//! Derived balance computation for invoices.
//!
//! `final_amount` is never stored as an independent mutable field; it is
//! recomputed from its inputs on every read. Negative intermediate results
//! are clamped to zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gearbox_shared::types::money::{clamped_sub, net_of_discount};

use super::error::InvoiceError;
use crate::settlement::TenderPurpose;

/// Balances derived from an invoice's stored amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceBalances {
    /// Estimate net of discount; the ceiling for deposit + payments.
    pub net_total: Decimal,
    /// What is still owed: `net_total - deposit - paid`, floored at zero.
    pub final_amount: Decimal,
    /// The amount a new tender may claim. Numerically equal to
    /// `final_amount`; settlement validates against this view.
    pub remaining_amount: Decimal,
}

/// Amounts on an invoice after a successful tender has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedAmounts {
    /// Updated cumulative deposit.
    pub deposit_received: Decimal,
    /// Updated cumulative settled payments.
    pub paid_amount: Decimal,
}

/// Computes derived balances from an invoice's stored amounts.
///
/// Missing optional inputs are treated as zero; the result is clamped so
/// `final_amount >= 0` under any input combination. This function never
/// fails.
#[must_use]
pub fn compute_balances(
    estimate_amount: Decimal,
    discount_percent: Option<Decimal>,
    deposit_received: Option<Decimal>,
    paid_amount: Option<Decimal>,
) -> InvoiceBalances {
    let discount = discount_percent.unwrap_or(Decimal::ZERO);
    let deposit = deposit_received.unwrap_or(Decimal::ZERO);
    let paid = paid_amount.unwrap_or(Decimal::ZERO);

    let net_total = net_of_discount(estimate_amount, discount);
    let final_amount = clamped_sub(net_total, deposit + paid);

    InvoiceBalances {
        net_total,
        final_amount,
        remaining_amount: final_amount,
    }
}

/// Applies a successful tender to an invoice's stored amounts.
///
/// Called only after the settlement transaction has reached `Success`.
/// A `Payment` increments `paid_amount`; a `Deposit` increments
/// `deposit_received`.
///
/// # Errors
///
/// Returns [`InvoiceError::SettlementExceedsTotal`] if applying the tender
/// would push `deposit + paid` past the discounted estimate.
pub fn apply_transaction(
    estimate_amount: Decimal,
    discount_percent: Option<Decimal>,
    deposit_received: Decimal,
    paid_amount: Decimal,
    purpose: TenderPurpose,
    amount: Decimal,
) -> Result<AppliedAmounts, InvoiceError> {
    let discount = discount_percent.unwrap_or(Decimal::ZERO);
    let net_total = net_of_discount(estimate_amount, discount);

    let (new_deposit, new_paid) = match purpose {
        TenderPurpose::Deposit => (deposit_received + amount, paid_amount),
        TenderPurpose::Payment => (deposit_received, paid_amount + amount),
    };

    if new_deposit + new_paid > net_total {
        return Err(InvoiceError::SettlementExceedsTotal {
            net_total,
            attempted: new_deposit + new_paid,
        });
    }

    Ok(AppliedAmounts {
        deposit_received: new_deposit,
        paid_amount: new_paid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balances_no_discount_no_tenders() {
        let b = compute_balances(dec!(10_000_000), None, None, None);
        assert_eq!(b.net_total, dec!(10_000_000));
        assert_eq!(b.final_amount, dec!(10_000_000));
        assert_eq!(b.remaining_amount, b.final_amount);
    }

    #[test]
    fn test_balances_with_discount() {
        let b = compute_balances(dec!(10_000_000), Some(dec!(10)), None, None);
        assert_eq!(b.net_total, dec!(9_000_000));
        assert_eq!(b.final_amount, dec!(9_000_000));
    }

    #[test]
    fn test_balances_after_deposit_and_payment() {
        let b = compute_balances(
            dec!(10_000_000),
            None,
            Some(dec!(1_000_000)),
            Some(dec!(4_000_000)),
        );
        assert_eq!(b.final_amount, dec!(5_000_000));
    }

    #[test]
    fn test_balances_clamped_at_zero() {
        let b = compute_balances(dec!(100), Some(dec!(50)), Some(dec!(40)), Some(dec!(40)));
        // net 50, tendered 80 -> clamped
        assert_eq!(b.final_amount, dec!(0));
    }

    #[test]
    fn test_apply_payment_increments_paid() {
        let applied = apply_transaction(
            dec!(10_000_000),
            None,
            dec!(0),
            dec!(0),
            TenderPurpose::Payment,
            dec!(4_000_000),
        )
        .unwrap();
        assert_eq!(applied.paid_amount, dec!(4_000_000));
        assert_eq!(applied.deposit_received, dec!(0));
    }

    #[test]
    fn test_apply_deposit_increments_deposit() {
        let applied = apply_transaction(
            dec!(10_000_000),
            None,
            dec!(500_000),
            dec!(0),
            TenderPurpose::Deposit,
            dec!(500_000),
        )
        .unwrap();
        assert_eq!(applied.deposit_received, dec!(1_000_000));
        assert_eq!(applied.paid_amount, dec!(0));
    }

    #[test]
    fn test_apply_rejects_overpayment_past_net_total() {
        let result = apply_transaction(
            dec!(10_000_000),
            Some(dec!(10)),
            dec!(0),
            dec!(8_000_000),
            TenderPurpose::Payment,
            dec!(2_000_000),
        );
        // net total is 9,000,000; 8M + 2M exceeds it
        assert!(matches!(
            result,
            Err(InvoiceError::SettlementExceedsTotal { .. })
        ));
    }

    #[test]
    fn test_apply_allows_exact_settlement() {
        let applied = apply_transaction(
            dec!(10_000_000),
            None,
            dec!(0),
            dec!(4_000_000),
            TenderPurpose::Payment,
            dec!(6_000_000),
        )
        .unwrap();
        let b = compute_balances(
            dec!(10_000_000),
            None,
            Some(applied.deposit_received),
            Some(applied.paid_amount),
        );
        assert_eq!(b.final_amount, dec!(0));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..100_000_000i64).prop_map(Decimal::from)
    }

    fn discount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100i64).prop_map(Decimal::from)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// `final_amount == max(0, estimate*(1-disc/100) - deposit - paid)`
        /// for any input combination.
        #[test]
        fn prop_final_amount_formula(
            estimate in amount_strategy(),
            discount in discount_strategy(),
            deposit in amount_strategy(),
            paid in amount_strategy(),
        ) {
            let b = compute_balances(estimate, Some(discount), Some(deposit), Some(paid));
            let net = estimate * (Decimal::ONE_HUNDRED - discount) / Decimal::ONE_HUNDRED;
            let expected = (net - deposit - paid).max(Decimal::ZERO);
            prop_assert_eq!(b.final_amount, expected);
            prop_assert!(b.final_amount >= Decimal::ZERO);
            prop_assert_eq!(b.remaining_amount, b.final_amount);
        }

        /// Applying any accepted tender never drives the remainder negative.
        #[test]
        fn prop_applied_tender_keeps_remainder_non_negative(
            estimate in amount_strategy(),
            paid in amount_strategy(),
            tender in amount_strategy(),
        ) {
            if let Ok(applied) = apply_transaction(
                estimate, None, Decimal::ZERO, paid, TenderPurpose::Payment, tender,
            ) {
                let b = compute_balances(
                    estimate, None, Some(applied.deposit_received), Some(applied.paid_amount),
                );
                prop_assert!(b.final_amount >= Decimal::ZERO);
                prop_assert!(applied.paid_amount <= estimate);
            }
        }
    }
}
