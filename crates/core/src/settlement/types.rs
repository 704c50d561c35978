//! Settlement domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use gearbox_shared::types::{DebtId, InvoiceId, SettlementId, StaffId};

/// How a tender was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash over the counter; settles synchronously.
    Cash,
    /// Hosted gateway checkout; settles on callback.
    BankTransfer,
}

impl PaymentMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::BankTransfer => "bank_transfer",
        }
    }

    /// Parses a method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "bank_transfer" => Some(Self::BankTransfer),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a tender is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderPurpose {
    /// Up-front deposit against the estimate.
    Deposit,
    /// Payment against the outstanding balance.
    Payment,
}

impl TenderPurpose {
    /// Returns the string representation of the purpose.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Payment => "payment",
        }
    }

    /// Parses a purpose from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(Self::Deposit),
            "payment" => Some(Self::Payment),
            _ => None,
        }
    }
}

impl fmt::Display for TenderPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settlement transaction status.
///
/// Cash transactions go straight to `Success`; bank transfers start
/// `Pending` and only the gateway callback may move them to `Success` or
/// `Failed`. A transaction is immutable once `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Awaiting the gateway outcome.
    Pending,
    /// Tender confirmed and applied to the target balance.
    Success,
    /// Gateway reported failure; never retried automatically.
    Failed,
    /// Cancelled by the caller before a callback arrived.
    Cancelled,
}

impl SettlementStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further transition is expected.
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The aggregate a tender is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum SettlementTarget {
    /// Tender against an invoice balance.
    Invoice(InvoiceId),
    /// Repayment against a tracked debt.
    Debt(DebtId),
}

/// An immutable tender event. Part of the audit trail; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementTransaction {
    /// The transaction ID.
    pub id: SettlementId,
    /// The invoice or debt this tender targets.
    pub target: SettlementTarget,
    /// How the tender was made.
    pub method: PaymentMethod,
    /// What the tender is for. Debt repayments are always `Payment`.
    pub purpose: TenderPurpose,
    /// Tender amount; positive, validated against the balance at creation.
    pub amount: Decimal,
    /// Current status.
    pub status: SettlementStatus,
    /// Gateway reference; set only for `BankTransfer`.
    pub gateway_reference: Option<String>,
    /// Staff member who recorded the tender.
    pub created_by: StaffId,
    /// When the tender was recorded.
    pub created_at: DateTime<Utc>,
}
