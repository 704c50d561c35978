//! Integration tests for the voucher repository.
//!
//! Requires a Postgres database; each test is skipped when DATABASE_URL
//! is not set.

use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use std::env;
use uuid::Uuid;

use gearbox_core::voucher::{VoucherError, VoucherKind, VoucherStatus};
use gearbox_db::VoucherRepository;
use gearbox_db::entities::sea_orm_active_enums;
use gearbox_db::migration::{Migrator, MigratorTrait};
use gearbox_db::repositories::voucher::{CreateVoucherInput, VoucherRepoError};

async fn test_db() -> Option<DatabaseConnection> {
    let url = env::var("DATABASE_URL").ok()?;
    let db = gearbox_db::connect(&url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    Some(db)
}

fn expense(created_by: Uuid) -> CreateVoucherInput {
    CreateVoucherInput {
        kind: VoucherKind::Expense,
        amount: dec!(150_000),
        target_name: "Parts supplier".to_string(),
        created_by,
    }
}

// ============================================================================
// Test: Approve then disburse
// ============================================================================
#[tokio::test]
async fn test_voucher_approval_and_disbursement() {
    let Some(db) = test_db().await else { return };
    let repo = VoucherRepository::new(db);

    let creator = Uuid::new_v4();
    let manager = Uuid::new_v4();

    let voucher = repo
        .create_voucher(expense(creator))
        .await
        .expect("Failed to create voucher");
    assert_eq!(
        voucher.status,
        sea_orm_active_enums::VoucherStatus::Pending
    );

    let approved = repo
        .approve_voucher(voucher.id, manager)
        .await
        .expect("Failed to approve");
    assert_eq!(
        approved.status,
        sea_orm_active_enums::VoucherStatus::Approved
    );
    assert_eq!(approved.approver_id, Some(manager));

    let finished = repo
        .disburse_voucher(voucher.id)
        .await
        .expect("Failed to disburse");
    assert_eq!(
        finished.status,
        sea_orm_active_enums::VoucherStatus::Finished
    );
}

// ============================================================================
// Test: Nobody approves their own voucher
// ============================================================================
#[tokio::test]
async fn test_self_approval_rejected() {
    let Some(db) = test_db().await else { return };
    let repo = VoucherRepository::new(db);

    let creator = Uuid::new_v4();
    let voucher = repo
        .create_voucher(expense(creator))
        .await
        .expect("Failed to create voucher");

    let result = repo.approve_voucher(voucher.id, creator).await;
    assert!(matches!(
        result,
        Err(VoucherRepoError::Voucher(
            VoucherError::SelfApprovalForbidden
        ))
    ));
}

// ============================================================================
// Test: Rejection requires a reason and is terminal
// ============================================================================
#[tokio::test]
async fn test_rejection_with_reason_is_terminal() {
    let Some(db) = test_db().await else { return };
    let repo = VoucherRepository::new(db);

    let creator = Uuid::new_v4();
    let manager = Uuid::new_v4();
    let voucher = repo
        .create_voucher(expense(creator))
        .await
        .expect("Failed to create voucher");

    let result = repo
        .reject_voucher(voucher.id, manager, String::new())
        .await;
    assert!(matches!(
        result,
        Err(VoucherRepoError::Voucher(
            VoucherError::RejectionReasonRequired
        ))
    ));

    let rejected = repo
        .reject_voucher(voucher.id, manager, "Missing receipt".to_string())
        .await
        .expect("Failed to reject");
    assert_eq!(
        rejected.status,
        sea_orm_active_enums::VoucherStatus::Rejected
    );
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Missing receipt"));

    // No transitions out of Rejected
    let result = repo.approve_voucher(voucher.id, manager).await;
    assert!(matches!(
        result,
        Err(VoucherRepoError::Voucher(
            VoucherError::InvalidTransition { .. }
        ))
    ));
    let result = repo.disburse_voucher(voucher.id).await;
    assert!(matches!(
        result,
        Err(VoucherRepoError::Voucher(
            VoucherError::InvalidTransition { .. }
        ))
    ));
}

// ============================================================================
// Test: Disbursement requires prior approval
// ============================================================================
#[tokio::test]
async fn test_disburse_pending_rejected() {
    let Some(db) = test_db().await else { return };
    let repo = VoucherRepository::new(db);

    let voucher = repo
        .create_voucher(expense(Uuid::new_v4()))
        .await
        .expect("Failed to create voucher");

    let result = repo.disburse_voucher(voucher.id).await;
    assert!(matches!(
        result,
        Err(VoucherRepoError::Voucher(
            VoucherError::InvalidTransition { .. }
        ))
    ));
}

// ============================================================================
// Test: Status filter on listing
// ============================================================================
#[tokio::test]
async fn test_list_by_status() {
    let Some(db) = test_db().await else { return };
    let repo = VoucherRepository::new(db);

    let voucher = repo
        .create_voucher(expense(Uuid::new_v4()))
        .await
        .expect("Failed to create voucher");

    let pending = repo
        .list_vouchers(Some(VoucherStatus::Pending))
        .await
        .expect("Failed to list");
    assert!(pending.iter().any(|v| v.id == voucher.id));

    let finished = repo
        .list_vouchers(Some(VoucherStatus::Finished))
        .await
        .expect("Failed to list");
    assert!(finished.iter().all(|v| v.id != voucher.id));
}
