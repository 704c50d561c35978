//! `SeaORM` Entity for the debts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::DebtStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    /// The invoice this debt was converted from; one debt per invoice.
    #[sea_orm(unique)]
    pub invoice_id: Uuid,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub due_date: Date,
    pub status: DebtStatus,
    /// Optimistic concurrency version; bumped on every balance mutation.
    pub version: i64,
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
    #[sea_orm(has_many = "super::settlement_transactions::Entity")]
    SettlementTransactions,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::settlement_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SettlementTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
