//! Invoice domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use gearbox_shared::types::{CustomerId, InvoiceId, ServiceTicketId};

use super::balance::{InvoiceBalances, compute_balances};

/// Snapshot of the owning service ticket's stage, supplied by the external
/// ticket provider. Settlement and debt conversion are gated on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStage {
    /// Quotation accepted, work not started.
    Quoted,
    /// Work in progress.
    InProgress,
    /// Vehicle handed over to the customer.
    HandedOver,
    /// Ticket closed out.
    Completed,
}

impl TicketStage {
    /// Returns the string representation of the stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quoted => "quoted",
            Self::InProgress => "in_progress",
            Self::HandedOver => "handed_over",
            Self::Completed => "completed",
        }
    }

    /// Parses a stage from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quoted" => Some(Self::Quoted),
            "in_progress" => Some(Self::InProgress),
            "handed_over" => Some(Self::HandedOver),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns true if tenders may still be recorded against the invoice.
    #[must_use]
    pub fn allows_settlement(&self) -> bool {
        !matches!(self, Self::Completed)
    }

    /// Returns true if the unpaid remainder may be converted into a debt.
    ///
    /// Conversion requires the vehicle to have left the garage; a ticket
    /// still in progress keeps its remainder on the invoice.
    #[must_use]
    pub fn allows_debt_conversion(&self) -> bool {
        matches!(self, Self::HandedOver | Self::Completed)
    }
}

impl fmt::Display for TicketStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Balance outstanding, tenders accepted.
    Open,
    /// Remainder reached zero.
    Settled,
    /// Remainder was converted into a tracked debt; the invoice no longer
    /// accepts tenders and cannot be converted again.
    ConvertedToDebt,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Settled => "settled",
            Self::ConvertedToDebt => "converted_to_debt",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "settled" => Some(Self::Settled),
            "converted_to_debt" => Some(Self::ConvertedToDebt),
            _ => None,
        }
    }

    /// Returns true if the invoice can still accept tenders.
    #[must_use]
    pub fn is_payable(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Invoice aggregate snapshot.
///
/// `discount_percent` is optional on purpose: quotations without a discount
/// simply omit it, and balance math treats it as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// The invoice ID.
    pub id: InvoiceId,
    /// The service ticket this invoice bills.
    pub service_ticket_id: ServiceTicketId,
    /// The customer being billed.
    pub customer_id: CustomerId,
    /// Sum of quotation line items.
    pub estimate_amount: Decimal,
    /// Percentage discount on the estimate, if any.
    pub discount_percent: Option<Decimal>,
    /// Deposit tendered up front.
    pub deposit_received: Decimal,
    /// Cumulative settled payment tenders.
    pub paid_amount: Decimal,
    /// Lifecycle status.
    pub status: InvoiceStatus,
    /// Snapshot of the owning ticket's stage.
    pub ticket_stage: TicketStage,
}

impl Invoice {
    /// Computes the derived balances for this invoice.
    #[must_use]
    pub fn balances(&self) -> InvoiceBalances {
        compute_balances(
            self.estimate_amount,
            self.discount_percent,
            Some(self.deposit_received),
            Some(self.paid_amount),
        )
    }

    /// Returns true if a tender may currently be recorded.
    #[must_use]
    pub fn accepts_tenders(&self) -> bool {
        self.status.is_payable() && self.ticket_stage.allows_settlement()
    }
}
