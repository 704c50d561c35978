//! Database enum mappings.
//!
//! Each enum mirrors a Postgres enum type created by the initial
//! migration, with conversions to and from the core domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use gearbox_core::debt;
use gearbox_core::invoice;
use gearbox_core::settlement;
use gearbox_core::voucher;

/// Service ticket stage, as stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_stage")]
pub enum TicketStage {
    #[sea_orm(string_value = "quoted")]
    Quoted,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "handed_over")]
    HandedOver,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl From<invoice::TicketStage> for TicketStage {
    fn from(stage: invoice::TicketStage) -> Self {
        match stage {
            invoice::TicketStage::Quoted => Self::Quoted,
            invoice::TicketStage::InProgress => Self::InProgress,
            invoice::TicketStage::HandedOver => Self::HandedOver,
            invoice::TicketStage::Completed => Self::Completed,
        }
    }
}

impl From<TicketStage> for invoice::TicketStage {
    fn from(stage: TicketStage) -> Self {
        match stage {
            TicketStage::Quoted => Self::Quoted,
            TicketStage::InProgress => Self::InProgress,
            TicketStage::HandedOver => Self::HandedOver,
            TicketStage::Completed => Self::Completed,
        }
    }
}

/// Invoice status, as stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "settled")]
    Settled,
    #[sea_orm(string_value = "converted_to_debt")]
    ConvertedToDebt,
}

impl From<invoice::InvoiceStatus> for InvoiceStatus {
    fn from(status: invoice::InvoiceStatus) -> Self {
        match status {
            invoice::InvoiceStatus::Open => Self::Open,
            invoice::InvoiceStatus::Settled => Self::Settled,
            invoice::InvoiceStatus::ConvertedToDebt => Self::ConvertedToDebt,
        }
    }
}

impl From<InvoiceStatus> for invoice::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Open => Self::Open,
            InvoiceStatus::Settled => Self::Settled,
            InvoiceStatus::ConvertedToDebt => Self::ConvertedToDebt,
        }
    }
}

/// Payment method, as stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
}

impl From<settlement::PaymentMethod> for PaymentMethod {
    fn from(method: settlement::PaymentMethod) -> Self {
        match method {
            settlement::PaymentMethod::Cash => Self::Cash,
            settlement::PaymentMethod::BankTransfer => Self::BankTransfer,
        }
    }
}

impl From<PaymentMethod> for settlement::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::BankTransfer => Self::BankTransfer,
        }
    }
}

/// Tender purpose, as stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tender_purpose")]
pub enum TenderPurpose {
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "payment")]
    Payment,
}

impl From<settlement::TenderPurpose> for TenderPurpose {
    fn from(purpose: settlement::TenderPurpose) -> Self {
        match purpose {
            settlement::TenderPurpose::Deposit => Self::Deposit,
            settlement::TenderPurpose::Payment => Self::Payment,
        }
    }
}

impl From<TenderPurpose> for settlement::TenderPurpose {
    fn from(purpose: TenderPurpose) -> Self {
        match purpose {
            TenderPurpose::Deposit => Self::Deposit,
            TenderPurpose::Payment => Self::Payment,
        }
    }
}

/// Settlement transaction status, as stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "settlement_status")]
pub enum SettlementStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<settlement::SettlementStatus> for SettlementStatus {
    fn from(status: settlement::SettlementStatus) -> Self {
        match status {
            settlement::SettlementStatus::Pending => Self::Pending,
            settlement::SettlementStatus::Success => Self::Success,
            settlement::SettlementStatus::Failed => Self::Failed,
            settlement::SettlementStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<SettlementStatus> for settlement::SettlementStatus {
    fn from(status: SettlementStatus) -> Self {
        match status {
            SettlementStatus::Pending => Self::Pending,
            SettlementStatus::Success => Self::Success,
            SettlementStatus::Failed => Self::Failed,
            SettlementStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Which aggregate a settlement transaction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "settlement_target_kind")]
pub enum SettlementTargetKind {
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "debt")]
    Debt,
}

/// Debt status, as stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "debt_status")]
pub enum DebtStatus {
    #[sea_orm(string_value = "outstanding")]
    Outstanding,
    #[sea_orm(string_value = "settled")]
    Settled,
}

impl From<debt::DebtStatus> for DebtStatus {
    fn from(status: debt::DebtStatus) -> Self {
        match status {
            debt::DebtStatus::Outstanding => Self::Outstanding,
            debt::DebtStatus::Settled => Self::Settled,
        }
    }
}

impl From<DebtStatus> for debt::DebtStatus {
    fn from(status: DebtStatus) -> Self {
        match status {
            DebtStatus::Outstanding => Self::Outstanding,
            DebtStatus::Settled => Self::Settled,
        }
    }
}

/// Voucher kind, as stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_kind")]
pub enum VoucherKind {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<voucher::VoucherKind> for VoucherKind {
    fn from(kind: voucher::VoucherKind) -> Self {
        match kind {
            voucher::VoucherKind::Income => Self::Income,
            voucher::VoucherKind::Expense => Self::Expense,
        }
    }
}

impl From<VoucherKind> for voucher::VoucherKind {
    fn from(kind: VoucherKind) -> Self {
        match kind {
            VoucherKind::Income => Self::Income,
            VoucherKind::Expense => Self::Expense,
        }
    }
}

/// Voucher status, as stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_status")]
pub enum VoucherStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "finished")]
    Finished,
}

impl From<voucher::VoucherStatus> for VoucherStatus {
    fn from(status: voucher::VoucherStatus) -> Self {
        match status {
            voucher::VoucherStatus::Pending => Self::Pending,
            voucher::VoucherStatus::Approved => Self::Approved,
            voucher::VoucherStatus::Rejected => Self::Rejected,
            voucher::VoucherStatus::Finished => Self::Finished,
        }
    }
}

impl From<VoucherStatus> for voucher::VoucherStatus {
    fn from(status: VoucherStatus) -> Self {
        match status {
            VoucherStatus::Pending => Self::Pending,
            VoucherStatus::Approved => Self::Approved,
            VoucherStatus::Rejected => Self::Rejected,
            VoucherStatus::Finished => Self::Finished,
        }
    }
}
