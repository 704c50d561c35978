//! Integration tests for the debt repository.
//!
//! Requires a Postgres database; each test is skipped when DATABASE_URL
//! is not set.

use chrono::{Days, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use std::env;
use uuid::Uuid;

use gearbox_core::debt::DebtError;
use gearbox_core::invoice::TicketStage;
use gearbox_core::settlement::{SettlementError, SettlementTarget, TenderPurpose};
use gearbox_db::entities::sea_orm_active_enums;
use gearbox_db::migration::{Migrator, MigratorTrait};
use gearbox_db::repositories::debt::DebtRepoError;
use gearbox_db::repositories::invoice::CreateInvoiceInput;
use gearbox_db::repositories::settlement::{SettlementRepoError, TenderInput};
use gearbox_db::{DebtRepository, InvoiceRepository, SettlementRepository};
use gearbox_shared::types::{DebtId, InvoiceId};

async fn test_db() -> Option<DatabaseConnection> {
    let url = env::var("DATABASE_URL").ok()?;
    let db = gearbox_db::connect(&url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    Some(db)
}

fn days_out(n: u64) -> chrono::NaiveDate {
    Utc::now()
        .date_naive()
        .checked_add_days(Days::new(n))
        .unwrap()
}

/// Creates a handed-over invoice with 3,000,000 still outstanding.
async fn handed_over_invoice_with_remainder(db: &DatabaseConnection) -> Uuid {
    let invoices = InvoiceRepository::new(db.clone());
    let created = invoices
        .create_invoice(CreateInvoiceInput {
            service_ticket_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            estimate_amount: dec!(10_000_000),
            discount_percent: None,
        })
        .await
        .expect("Failed to create invoice");
    let invoice_id = created.invoice.id;

    SettlementRepository::new(db.clone())
        .settle_cash(TenderInput {
            target: SettlementTarget::Invoice(InvoiceId::from_uuid(invoice_id)),
            purpose: TenderPurpose::Payment,
            amount: dec!(7_000_000),
            created_by: Uuid::new_v4(),
        })
        .await
        .expect("Failed to settle cash");

    invoices
        .update_ticket_stage(invoice_id, TicketStage::HandedOver)
        .await
        .expect("Failed to update stage");

    invoice_id
}

fn repayment(debt_id: Uuid, amount: Decimal) -> TenderInput {
    TenderInput {
        target: SettlementTarget::Debt(DebtId::from_uuid(debt_id)),
        purpose: TenderPurpose::Payment,
        amount,
        created_by: Uuid::new_v4(),
    }
}

// ============================================================================
// Test: Converting a handed-over remainder opens an outstanding debt
// ============================================================================
#[tokio::test]
async fn test_convert_remainder_to_debt() {
    let Some(db) = test_db().await else { return };
    let invoice_id = handed_over_invoice_with_remainder(&db).await;

    let debt = DebtRepository::new(db.clone())
        .convert_invoice(invoice_id, days_out(7))
        .await
        .expect("Failed to convert");

    assert_eq!(debt.total_amount, dec!(3_000_000));
    assert_eq!(debt.paid_amount, dec!(0));
    assert_eq!(debt.status, sea_orm_active_enums::DebtStatus::Outstanding);

    let invoice = InvoiceRepository::new(db)
        .find_invoice(invoice_id)
        .await
        .expect("Failed to load invoice");
    assert_eq!(
        invoice.invoice.status,
        sea_orm_active_enums::InvoiceStatus::ConvertedToDebt
    );
}

// ============================================================================
// Test: A converted invoice stops accepting tenders
// ============================================================================
#[tokio::test]
async fn test_converted_invoice_rejects_tenders() {
    let Some(db) = test_db().await else { return };
    let invoice_id = handed_over_invoice_with_remainder(&db).await;

    DebtRepository::new(db.clone())
        .convert_invoice(invoice_id, days_out(7))
        .await
        .expect("Failed to convert");

    let result = SettlementRepository::new(db)
        .settle_cash(TenderInput {
            target: SettlementTarget::Invoice(InvoiceId::from_uuid(invoice_id)),
            purpose: TenderPurpose::Payment,
            amount: dec!(100),
            created_by: Uuid::new_v4(),
        })
        .await;
    assert!(matches!(
        result,
        Err(SettlementRepoError::Settlement(SettlementError::NotPayable))
    ));
}

// ============================================================================
// Test: Debt repayments accumulate and settle exactly at the total
// ============================================================================
#[tokio::test]
async fn test_repayments_settle_debt() {
    let Some(db) = test_db().await else { return };
    let invoice_id = handed_over_invoice_with_remainder(&db).await;

    let debts = DebtRepository::new(db.clone());
    let debt = debts
        .convert_invoice(invoice_id, days_out(7))
        .await
        .expect("Failed to convert");

    let settlements = SettlementRepository::new(db.clone());
    settlements
        .settle_cash(repayment(debt.id, dec!(1_000_000)))
        .await
        .expect("Failed to repay");

    let debt_row = debts.find_debt(debt.id).await.expect("Failed to load debt");
    assert_eq!(debt_row.paid_amount, dec!(1_000_000));
    assert_eq!(
        debt_row.status,
        sea_orm_active_enums::DebtStatus::Outstanding
    );

    settlements
        .settle_cash(repayment(debt.id, dec!(2_000_000)))
        .await
        .expect("Failed to repay");

    let debt_row = debts.find_debt(debt.id).await.expect("Failed to load debt");
    assert_eq!(debt_row.paid_amount, dec!(3_000_000));
    assert_eq!(debt_row.status, sea_orm_active_enums::DebtStatus::Settled);

    // Settled debt accepts nothing further
    let result = settlements.settle_cash(repayment(debt.id, dec!(1))).await;
    assert!(matches!(
        result,
        Err(SettlementRepoError::Settlement(SettlementError::NotPayable))
    ));
}

// ============================================================================
// Test: Conversion preconditions
// ============================================================================
#[tokio::test]
async fn test_convert_before_handover_rejected() {
    let Some(db) = test_db().await else { return };
    let invoices = InvoiceRepository::new(db.clone());
    let created = invoices
        .create_invoice(CreateInvoiceInput {
            service_ticket_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            estimate_amount: dec!(1_000_000),
            discount_percent: None,
        })
        .await
        .expect("Failed to create invoice");

    let result = DebtRepository::new(db)
        .convert_invoice(created.invoice.id, days_out(7))
        .await;
    assert!(matches!(
        result,
        Err(DebtRepoError::Debt(DebtError::TicketNotHandedOver(_)))
    ));
}

#[tokio::test]
async fn test_convert_twice_rejected() {
    let Some(db) = test_db().await else { return };
    let invoice_id = handed_over_invoice_with_remainder(&db).await;

    let debts = DebtRepository::new(db);
    debts
        .convert_invoice(invoice_id, days_out(7))
        .await
        .expect("Failed to convert");

    let result = debts.convert_invoice(invoice_id, days_out(7)).await;
    assert!(matches!(
        result,
        Err(DebtRepoError::Debt(DebtError::AlreadyConverted))
    ));
}

#[tokio::test]
async fn test_convert_with_due_date_today_rejected() {
    let Some(db) = test_db().await else { return };
    let invoice_id = handed_over_invoice_with_remainder(&db).await;

    let result = DebtRepository::new(db)
        .convert_invoice(invoice_id, Utc::now().date_naive())
        .await;
    assert!(matches!(
        result,
        Err(DebtRepoError::Debt(DebtError::DueDateNotInFuture(_)))
    ));
}

// ============================================================================
// Test: Due date maintenance
// ============================================================================
#[tokio::test]
async fn test_update_due_date() {
    let Some(db) = test_db().await else { return };
    let invoice_id = handed_over_invoice_with_remainder(&db).await;

    let debts = DebtRepository::new(db);
    let debt = debts
        .convert_invoice(invoice_id, days_out(7))
        .await
        .expect("Failed to convert");

    let updated = debts
        .update_due_date(debt.id, days_out(30))
        .await
        .expect("Failed to update due date");
    assert_eq!(updated.due_date, days_out(30));

    let result = debts
        .update_due_date(debt.id, Utc::now().date_naive())
        .await;
    assert!(matches!(
        result,
        Err(DebtRepoError::Debt(DebtError::DueDateNotInFuture(_)))
    ));
}
