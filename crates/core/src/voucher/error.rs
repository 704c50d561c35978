//! Voucher workflow errors.

use crate::voucher::types::VoucherStatus;

/// Errors raised by the voucher approval workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoucherError {
    /// Voucher amounts must be strictly positive.
    #[error("voucher amount must be positive")]
    NonPositiveAmount,

    /// A transition the state machine does not allow.
    #[error("invalid voucher transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: VoucherStatus,
        /// The attempted target status.
        to: VoucherStatus,
    },

    /// The approver must differ from the voucher's creator.
    #[error("a voucher cannot be approved or rejected by its creator")]
    SelfApprovalForbidden,

    /// Rejections must carry a reason.
    #[error("rejection reason is required")]
    RejectionReasonRequired,
}

impl VoucherError {
    /// Stable machine-readable code for API payloads.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "VOUCHER_NON_POSITIVE_AMOUNT",
            Self::InvalidTransition { .. } => "VOUCHER_INVALID_TRANSITION",
            Self::SelfApprovalForbidden => "VOUCHER_SELF_APPROVAL_FORBIDDEN",
            Self::RejectionReasonRequired => "VOUCHER_REJECTION_REASON_REQUIRED",
        }
    }

    /// HTTP status code this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount | Self::RejectionReasonRequired => 400,
            Self::SelfApprovalForbidden => 403,
            Self::InvalidTransition { .. } => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            VoucherError::SelfApprovalForbidden.error_code(),
            "VOUCHER_SELF_APPROVAL_FORBIDDEN"
        );
        assert_eq!(
            VoucherError::RejectionReasonRequired.error_code(),
            "VOUCHER_REJECTION_REASON_REQUIRED"
        );
    }

    #[test]
    fn test_http_mapping() {
        assert_eq!(VoucherError::NonPositiveAmount.http_status_code(), 400);
        assert_eq!(VoucherError::SelfApprovalForbidden.http_status_code(), 403);
        assert_eq!(
            VoucherError::InvalidTransition {
                from: VoucherStatus::Rejected,
                to: VoucherStatus::Approved,
            }
            .http_status_code(),
            422
        );
    }
}
