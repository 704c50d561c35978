//! `SeaORM` Entity for the invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{InvoiceStatus, TicketStage};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_ticket_id: Uuid,
    pub customer_id: Uuid,
    pub estimate_amount: Decimal,
    pub discount_percent: Option<Decimal>,
    pub deposit_received: Decimal,
    pub paid_amount: Decimal,
    pub status: InvoiceStatus,
    pub ticket_stage: TicketStage,
    /// Optimistic concurrency version; bumped on every balance mutation.
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::settlement_transactions::Entity")]
    SettlementTransactions,
    #[sea_orm(has_one = "super::debts::Entity")]
    Debts,
}

impl Related<super::settlement_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SettlementTransactions.def()
    }
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
