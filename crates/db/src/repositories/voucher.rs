//! Voucher repository for the manual approval workflow.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use gearbox_core::voucher::{VoucherError, VoucherKind, VoucherService, VoucherStatus};
use gearbox_shared::types::{StaffId, VoucherId};

use crate::entities::{ledger_vouchers, sea_orm_active_enums};

/// Error types for voucher operations.
#[derive(Debug, thiserror::Error)]
pub enum VoucherRepoError {
    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    NotFound(Uuid),

    /// Workflow rule violation.
    #[error(transparent)]
    Voucher(#[from] VoucherError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl VoucherRepoError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Voucher(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "VOUCHER_NOT_FOUND",
            Self::Voucher(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Input for creating a voucher.
#[derive(Debug, Clone)]
pub struct CreateVoucherInput {
    /// Income or expense.
    pub kind: VoucherKind,
    /// Amount to be received or disbursed.
    pub amount: Decimal,
    /// Who the money comes from or goes to.
    pub target_name: String,
    /// Staff member creating the voucher.
    pub created_by: Uuid,
}

/// Voucher repository.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    db: DatabaseConnection,
}

impl VoucherRepository {
    /// Creates a new voucher repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a pending voucher.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or the insert
    /// fails.
    pub async fn create_voucher(
        &self,
        input: CreateVoucherInput,
    ) -> Result<ledger_vouchers::Model, VoucherRepoError> {
        VoucherService::validate_amount(input.amount)?;

        let now = Utc::now().into();
        let voucher = ledger_vouchers::ActiveModel {
            id: Set(VoucherId::new().into_inner()),
            kind: Set(input.kind.into()),
            amount: Set(input.amount),
            target_name: Set(input.target_name),
            status: Set(sea_orm_active_enums::VoucherStatus::Pending),
            created_by: Set(input.created_by),
            approver_id: Set(None),
            rejection_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = voucher.insert(&self.db).await?;
        tracing::info!(voucher_id = %model.id, amount = %model.amount, "voucher created");

        Ok(model)
    }

    /// Approves a pending voucher.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher does not exist, is not pending,
    /// or the approver is its creator.
    pub async fn approve_voucher(
        &self,
        id: Uuid,
        approved_by: Uuid,
    ) -> Result<ledger_vouchers::Model, VoucherRepoError> {
        let voucher = self.find_voucher(id).await?;

        let action = VoucherService::approve(
            voucher.status.into(),
            StaffId::from_uuid(voucher.created_by),
            StaffId::from_uuid(approved_by),
        )?;

        let mut active: ledger_vouchers::ActiveModel = voucher.into();
        active.status = Set(action.new_status().into());
        active.approver_id = Set(Some(approved_by));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(voucher_id = %id, approver = %approved_by, "voucher approved");

        Ok(updated)
    }

    /// Rejects a pending voucher with a reason.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher does not exist, is not pending,
    /// the rejecter is its creator, or the reason is empty.
    pub async fn reject_voucher(
        &self,
        id: Uuid,
        rejected_by: Uuid,
        reason: String,
    ) -> Result<ledger_vouchers::Model, VoucherRepoError> {
        let voucher = self.find_voucher(id).await?;

        let action = VoucherService::reject(
            voucher.status.into(),
            StaffId::from_uuid(voucher.created_by),
            StaffId::from_uuid(rejected_by),
            reason.clone(),
        )?;

        let mut active: ledger_vouchers::ActiveModel = voucher.into();
        active.status = Set(action.new_status().into());
        active.approver_id = Set(Some(rejected_by));
        active.rejection_reason = Set(Some(reason));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(voucher_id = %id, "voucher rejected");

        Ok(updated)
    }

    /// Records disbursement of an approved voucher.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher does not exist or is not
    /// approved.
    pub async fn disburse_voucher(
        &self,
        id: Uuid,
    ) -> Result<ledger_vouchers::Model, VoucherRepoError> {
        let voucher = self.find_voucher(id).await?;

        let action = VoucherService::disburse(voucher.status.into())?;

        let mut active: ledger_vouchers::ActiveModel = voucher.into();
        active.status = Set(action.new_status().into());
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(voucher_id = %id, "voucher disbursed");

        Ok(updated)
    }

    /// Finds a voucher by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher does not exist or the query
    /// fails.
    pub async fn find_voucher(&self, id: Uuid) -> Result<ledger_vouchers::Model, VoucherRepoError> {
        ledger_vouchers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(VoucherRepoError::NotFound(id))
    }

    /// Lists vouchers, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_vouchers(
        &self,
        status: Option<VoucherStatus>,
    ) -> Result<Vec<ledger_vouchers::Model>, VoucherRepoError> {
        let mut query = ledger_vouchers::Entity::find();

        if let Some(status) = status {
            let status: sea_orm_active_enums::VoucherStatus = status.into();
            query = query.filter(ledger_vouchers::Column::Status.eq(status));
        }

        let vouchers = query
            .order_by_desc(ledger_vouchers::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(vouchers)
    }
}
