//! `SeaORM` entity definitions.

pub mod debts;
pub mod invoices;
pub mod ledger_vouchers;
pub mod sea_orm_active_enums;
pub mod settlement_transactions;
