//! Voucher approval state machine.

use chrono::Utc;
use rust_decimal::Decimal;

use gearbox_shared::types::StaffId;
use gearbox_shared::types::money::is_positive_amount;

use crate::voucher::error::VoucherError;
use crate::voucher::types::{VoucherAction, VoucherStatus};

/// Stateless service for voucher workflow transitions.
///
/// All methods are associated functions that validate and execute
/// state transitions, returning the appropriate `VoucherAction`
/// with audit trail information.
pub struct VoucherService;

impl VoucherService {
    /// Validates the amount of a newly created voucher.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::NonPositiveAmount` for zero or negative amounts.
    pub fn validate_amount(amount: Decimal) -> Result<(), VoucherError> {
        if !is_positive_amount(amount) {
            return Err(VoucherError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Approve a pending voucher.
    ///
    /// The approver must be a different staff member than the creator;
    /// nobody signs off their own voucher.
    ///
    /// # Errors
    ///
    /// * `VoucherError::SelfApprovalForbidden` if approver and creator match
    /// * `VoucherError::InvalidTransition` if not in Pending status
    pub fn approve(
        current_status: VoucherStatus,
        created_by: StaffId,
        approved_by: StaffId,
    ) -> Result<VoucherAction, VoucherError> {
        if approved_by == created_by {
            return Err(VoucherError::SelfApprovalForbidden);
        }

        match current_status {
            VoucherStatus::Pending => Ok(VoucherAction::Approve {
                new_status: VoucherStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
            }),
            _ => Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Approved,
            }),
        }
    }

    /// Reject a pending voucher.
    ///
    /// # Errors
    ///
    /// * `VoucherError::SelfApprovalForbidden` if rejecter and creator match
    /// * `VoucherError::RejectionReasonRequired` if the reason is empty
    /// * `VoucherError::InvalidTransition` if not in Pending status
    pub fn reject(
        current_status: VoucherStatus,
        created_by: StaffId,
        rejected_by: StaffId,
        rejection_reason: String,
    ) -> Result<VoucherAction, VoucherError> {
        if rejected_by == created_by {
            return Err(VoucherError::SelfApprovalForbidden);
        }
        if rejection_reason.trim().is_empty() {
            return Err(VoucherError::RejectionReasonRequired);
        }

        match current_status {
            VoucherStatus::Pending => Ok(VoucherAction::Reject {
                new_status: VoucherStatus::Rejected,
                rejected_by,
                rejected_at: Utc::now(),
                rejection_reason,
            }),
            _ => Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Rejected,
            }),
        }
    }

    /// Record disbursement of an approved voucher.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::InvalidTransition` if not in Approved status.
    pub fn disburse(current_status: VoucherStatus) -> Result<VoucherAction, VoucherError> {
        match current_status {
            VoucherStatus::Approved => Ok(VoucherAction::Disburse {
                new_status: VoucherStatus::Finished,
                disbursed_at: Utc::now(),
            }),
            _ => Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Finished,
            }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Approved (approve)
    /// - Pending → Rejected (reject)
    /// - Approved → Finished (disburse)
    #[must_use]
    pub fn is_valid_transition(from: VoucherStatus, to: VoucherStatus) -> bool {
        matches!(
            (from, to),
            (
                VoucherStatus::Pending,
                VoucherStatus::Approved | VoucherStatus::Rejected
            ) | (VoucherStatus::Approved, VoucherStatus::Finished)
        )
    }
}
