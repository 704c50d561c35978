//! Concurrency test: two settlement requests racing on one invoice must
//! never jointly overdraw the balance.
//!
//! Requires a Postgres database; skipped when DATABASE_URL is not set.

use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use std::env;
use uuid::Uuid;

use gearbox_core::gateway::{CallbackOutcome, GatewayCallback};
use gearbox_core::settlement::{SettlementStatus, SettlementTarget, TenderPurpose};
use gearbox_db::migration::{Migrator, MigratorTrait};
use gearbox_db::repositories::invoice::CreateInvoiceInput;
use gearbox_db::repositories::settlement::TenderInput;
use gearbox_db::{InvoiceRepository, SettlementRepository};
use gearbox_shared::types::InvoiceId;

async fn test_db() -> Option<DatabaseConnection> {
    let url = env::var("DATABASE_URL").ok()?;
    let db = gearbox_db::connect(&url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    Some(db)
}

// ============================================================================
// Test: Racing full-balance settlements credit the balance exactly once
// ============================================================================
#[tokio::test]
async fn test_concurrent_settlements_never_overdraw() {
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
    let invoice_id = created.invoice.id;

    let tender = || TenderInput {
        target: SettlementTarget::Invoice(InvoiceId::from_uuid(invoice_id)),
        purpose: TenderPurpose::Payment,
        amount: dec!(1_000_000),
        created_by: Uuid::new_v4(),
    };

    let repo_a = SettlementRepository::new(db.clone());
    let repo_b = SettlementRepository::new(db.clone());
    let (a, b) = tokio::join!(repo_a.settle_cash(tender()), repo_b.settle_cash(tender()));

    // Exactly one request wins; the loser either saw the fresh zero
    // balance or lost the version race and rolled back.
    let successes = usize::from(a.is_ok()) + usize::from(b.is_ok());
    assert_eq!(successes, 1, "exactly one settlement must win");

    let invoice = invoices
        .find_invoice(invoice_id)
        .await
        .expect("Failed to load invoice");
    assert_eq!(
        invoice.invoice.paid_amount,
        dec!(1_000_000),
        "combined credit must equal the balance exactly once"
    );
    assert_eq!(invoice.balances.remaining_amount, dec!(0));
}

// ============================================================================
// Test: Cancellation racing a success callback never drops the payment
// ============================================================================
#[tokio::test]
async fn test_cancel_racing_callback_keeps_confirmed_payment() {
    let Some(db) = test_db().await else { return };

    let invoices = InvoiceRepository::new(db.clone());
    let repo = SettlementRepository::new(db.clone());

    // A single pass rarely hits the window; repeat with fresh invoices.
    for _ in 0..10 {
        let created = invoices
            .create_invoice(CreateInvoiceInput {
                service_ticket_id: Uuid::new_v4(),
                customer_id: Uuid::new_v4(),
                estimate_amount: dec!(1_000),
                discount_percent: None,
            })
            .await
            .expect("Failed to create invoice");
        let invoice_id = created.invoice.id;

        let reference = Uuid::new_v4().to_string();
        let pending = repo
            .create_pending_transfer(
                TenderInput {
                    target: SettlementTarget::Invoice(InvoiceId::from_uuid(invoice_id)),
                    purpose: TenderPurpose::Payment,
                    amount: dec!(1_000),
                    created_by: Uuid::new_v4(),
                },
                reference.clone(),
            )
            .await
            .expect("Failed to create pending transfer");

        let callback = GatewayCallback {
            gateway_reference: reference,
            amount: dec!(1_000),
            outcome: CallbackOutcome::Succeeded,
        };
        let cancel_repo = SettlementRepository::new(db.clone());
        let (cancelled, confirmed) = tokio::join!(
            cancel_repo.cancel_transaction(pending.id),
            repo.confirm_gateway_callback(&callback)
        );

        // The callback always lands: either on the still-pending row or,
        // after a successful cancel, as a honored late confirmation.
        confirmed.expect("Success callback must be honored");

        let transaction = repo
            .find_transaction(pending.id)
            .await
            .expect("Failed to load transaction");
        let invoice = invoices
            .find_invoice(invoice_id)
            .await
            .expect("Failed to load invoice");

        assert_eq!(
            SettlementStatus::from(transaction.status),
            SettlementStatus::Success,
            "confirmed payment must never end up Cancelled (cancel result: {cancelled:?})"
        );
        assert_eq!(
            invoice.invoice.paid_amount,
            dec!(1_000),
            "credited balance and transaction status must agree"
        );
    }
}

// ============================================================================
// Test: Sequential over-tendering is stopped by the fresh balance read
// ============================================================================
#[tokio::test]
async fn test_sequential_overdraw_blocked() {
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
    let invoice_id = created.invoice.id;

    let repo = SettlementRepository::new(db);
    let first = repo
        .settle_cash(TenderInput {
            target: SettlementTarget::Invoice(InvoiceId::from_uuid(invoice_id)),
            purpose: TenderPurpose::Payment,
            amount: dec!(1_000_000),
            created_by: Uuid::new_v4(),
        })
        .await
        .expect("Failed to settle");
    assert!(!first.clamped);

    let second = repo
        .settle_cash(TenderInput {
            target: SettlementTarget::Invoice(InvoiceId::from_uuid(invoice_id)),
            purpose: TenderPurpose::Payment,
            amount: dec!(1_000_000),
            created_by: Uuid::new_v4(),
        })
        .await;
    assert!(second.is_err(), "second full tender must be refused");

    let invoice = invoices
        .find_invoice(invoice_id)
        .await
        .expect("Failed to load invoice");
    assert_eq!(invoice.invoice.paid_amount, dec!(1_000_000));
}
