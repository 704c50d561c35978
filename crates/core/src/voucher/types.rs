//! Voucher domain types.
//!
//! Valid status transitions:
//! - Pending → Approved (approve)
//! - Pending → Rejected (reject)
//! - Approved → Finished (disburse)
//!
//! Rejected and Finished are terminal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use gearbox_shared::types::{StaffId, VoucherId};

/// Whether a voucher records money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherKind {
    /// Money received outside the invoice flow.
    Income,
    /// Money paid out, e.g. a parts purchase.
    Expense,
}

impl VoucherKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for VoucherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Voucher status in the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    /// Awaiting a manager's decision.
    Pending,
    /// Approved and ready for disbursement.
    Approved,
    /// Rejected; terminal.
    Rejected,
    /// Disbursed; terminal.
    Finished,
}

impl VoucherStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Finished => "finished",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }

    /// Returns true if no further transition exists from this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Finished)
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A manual income or expense voucher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    /// The voucher ID.
    pub id: VoucherId,
    /// Income or expense.
    pub kind: VoucherKind,
    /// Amount to be received or disbursed.
    pub amount: Decimal,
    /// Who the money comes from or goes to.
    pub target_name: String,
    /// Current workflow status.
    pub status: VoucherStatus,
    /// The staff member who created the voucher.
    pub created_by: StaffId,
    /// The manager who approved or rejected it, once decided.
    pub approver_id: Option<StaffId>,
}

/// Voucher action representing a state transition with audit data.
#[derive(Debug, Clone)]
pub enum VoucherAction {
    /// Approve a pending voucher.
    Approve {
        /// The new status after approval.
        new_status: VoucherStatus,
        /// The manager who approved the voucher.
        approved_by: StaffId,
        /// When the voucher was approved.
        approved_at: DateTime<Utc>,
    },
    /// Reject a pending voucher.
    Reject {
        /// The new status after rejection.
        new_status: VoucherStatus,
        /// The manager who rejected the voucher.
        rejected_by: StaffId,
        /// When the voucher was rejected.
        rejected_at: DateTime<Utc>,
        /// The reason for rejection.
        rejection_reason: String,
    },
    /// Record disbursement of an approved voucher.
    Disburse {
        /// The new status after disbursement.
        new_status: VoucherStatus,
        /// When the money moved.
        disbursed_at: DateTime<Utc>,
    },
}

impl VoucherAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> VoucherStatus {
        match self {
            Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Disburse { new_status, .. } => *new_status,
        }
    }
}
