//! Monetary arithmetic helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal`; balances are derived, clamped at
//! zero, and missing optional inputs are treated as zero by callers.

use rust_decimal::Decimal;

/// One hundred, for percentage math.
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Applies a percentage discount to a gross amount.
///
/// `net_of_discount(10_000, 25)` is `7_500`. A zero discount returns the
/// gross amount unchanged.
#[must_use]
pub fn net_of_discount(gross: Decimal, discount_percent: Decimal) -> Decimal {
    gross * (HUNDRED - discount_percent) / HUNDRED
}

/// Subtracts `b` from `a`, flooring the result at zero.
///
/// Derived balances are never negative; overshoot from rounding or
/// over-tender is clamped rather than surfaced as a negative amount.
#[must_use]
pub fn clamped_sub(a: Decimal, b: Decimal) -> Decimal {
    (a - b).max(Decimal::ZERO)
}

/// Returns true if the value is a usable discount percentage (0..=100).
#[must_use]
pub fn is_valid_discount_percent(percent: Decimal) -> bool {
    percent >= Decimal::ZERO && percent <= HUNDRED
}

/// Returns true if the value is a positive, non-zero tender amount.
#[must_use]
pub fn is_positive_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO
}
