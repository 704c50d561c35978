//! `SeaORM` Entity for the settlement_transactions table.
//!
//! Rows are append-only audit records; only the status column (and the
//! review flag for a cancellation overridden by a late success callback)
//! ever changes after insert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{
    PaymentMethod, SettlementStatus, SettlementTargetKind, TenderPurpose,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "settlement_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub target_kind: SettlementTargetKind,
    pub invoice_id: Option<Uuid>,
    pub debt_id: Option<Uuid>,
    pub method: PaymentMethod,
    pub purpose: TenderPurpose,
    pub amount: Decimal,
    pub status: SettlementStatus,
    #[sea_orm(unique)]
    pub gateway_reference: Option<String>,
    /// Set when a success callback overrode an earlier cancellation;
    /// surfaced for operator review.
    pub cancellation_overridden: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
    #[sea_orm(
        belongs_to = "super::debts::Entity",
        from = "Column::DebtId",
        to = "super::debts::Column::Id"
    )]
    Debts,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
