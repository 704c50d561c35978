//! Settlement repository for tender recording and gateway callbacks.
//!
//! All balance mutations run inside a database transaction with an
//! optimistic version check on the target row: the update carries
//! `WHERE version = <loaded>` and zero affected rows means another
//! request settled in between, so the whole operation rolls back with
//! `ConcurrentModification` and the caller retries against fresh
//! balances.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use gearbox_core::debt::{DebtError, DebtService};
use gearbox_core::gateway::GatewayCallback;
use gearbox_core::invoice::{InvoiceError, apply_transaction};
use gearbox_core::settlement::{
    CallbackAction, PaymentMethod, SettlementError, SettlementPlan, SettlementService,
    SettlementTarget, TenderPurpose,
};
use gearbox_shared::types::{DebtId, InvoiceId, SettlementId};

use crate::entities::{
    debts, invoices,
    sea_orm_active_enums::{self, SettlementStatus, SettlementTargetKind},
    settlement_transactions,
};
use crate::repositories::invoice::to_domain;

/// Error types for settlement operations.
#[derive(Debug, thiserror::Error)]
pub enum SettlementRepoError {
    /// Settlement transaction not found.
    #[error("Settlement transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// No transaction carries the callback's gateway reference.
    #[error("No settlement transaction for gateway reference {0}")]
    ReferenceNotFound(String),

    /// Target invoice or debt not found.
    #[error("Settlement target not found: {0}")]
    TargetNotFound(Uuid),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected for {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Settlement rule violation.
    #[error(transparent)]
    Settlement(#[from] SettlementError),

    /// Invoice rule violation.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Debt rule violation.
    #[error(transparent)]
    Debt(#[from] DebtError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl SettlementRepoError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::TransactionNotFound(_) | Self::ReferenceNotFound(_) | Self::TargetNotFound(_) => {
                404
            }
            Self::ConcurrentModification(_) => 409,
            Self::Settlement(e) => e.http_status_code(),
            Self::Invoice(e) => e.http_status_code(),
            Self::Debt(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TransactionNotFound(_) => "SETTLEMENT_TRANSACTION_NOT_FOUND",
            Self::ReferenceNotFound(_) => "GATEWAY_REFERENCE_NOT_FOUND",
            Self::TargetNotFound(_) => "SETTLEMENT_TARGET_NOT_FOUND",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Settlement(e) => e.error_code(),
            Self::Invoice(e) => e.error_code(),
            Self::Debt(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if retrying the request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_))
    }
}

/// Input for recording a tender.
#[derive(Debug, Clone)]
pub struct TenderInput {
    /// The invoice or debt being settled.
    pub target: SettlementTarget,
    /// What the tender is for. Ignored for debt targets, which are
    /// always repayments.
    pub purpose: TenderPurpose,
    /// Requested amount.
    pub amount: Decimal,
    /// Staff member recording the tender.
    pub created_by: Uuid,
}

/// Result of a synchronous cash settlement.
#[derive(Debug, Clone)]
pub struct CashSettlement {
    /// The recorded transaction, already `Success`.
    pub transaction: settlement_transactions::Model,
    /// Whether the tendered amount was clamped to the remaining balance.
    pub clamped: bool,
}

/// Result of resolving a gateway callback.
#[derive(Debug, Clone)]
pub struct CallbackResolution {
    /// What the callback did.
    pub action: CallbackAction,
    /// The transaction after resolution.
    pub transaction: settlement_transactions::Model,
}

/// The target row loaded inside a settlement transaction.
enum TargetRow {
    Invoice(invoices::Model),
    Debt(debts::Model),
}

impl TargetRow {
    fn remaining(&self) -> Decimal {
        match self {
            Self::Invoice(model) => to_domain(model).balances().remaining_amount,
            Self::Debt(model) => {
                gearbox_shared::types::money::clamped_sub(model.total_amount, model.paid_amount)
            }
        }
    }

    fn payable(&self) -> bool {
        match self {
            Self::Invoice(model) => to_domain(model).accepts_tenders(),
            Self::Debt(model) => model.status == sea_orm_active_enums::DebtStatus::Outstanding,
        }
    }
}

/// Settlement repository.
#[derive(Debug, Clone)]
pub struct SettlementRepository {
    db: DatabaseConnection,
}

impl SettlementRepository {
    /// Creates a new settlement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a cash tender and applies it synchronously.
    ///
    /// Cash overshoot is clamped to the remaining balance; the recorded
    /// transaction carries the clamped amount.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The target does not exist or does not accept tenders
    /// - The amount is not positive or nothing is outstanding
    /// - Another request mutated the balance concurrently
    /// - Database operation fails
    pub async fn settle_cash(
        &self,
        input: TenderInput,
    ) -> Result<CashSettlement, SettlementRepoError> {
        let txn = self.db.begin().await?;

        let target = load_target(&txn, input.target).await?;
        let plan = SettlementService::request(
            PaymentMethod::Cash,
            input.amount,
            target.remaining(),
            target.payable(),
        )?;
        let SettlementPlan::CashSettled { amount, clamped } = plan else {
            // request() maps Cash to CashSettled in every accepting branch.
            return Err(SettlementError::NotPayable.into());
        };

        let transaction = insert_transaction(
            &txn,
            &input,
            PaymentMethod::Cash,
            amount,
            SettlementStatus::Success,
            None,
        )
        .await?;

        apply_success(&txn, target, input.purpose, amount).await?;

        txn.commit().await?;
        tracing::info!(
            transaction_id = %transaction.id,
            amount = %amount,
            clamped,
            "cash tender settled"
        );

        Ok(CashSettlement {
            transaction,
            clamped,
        })
    }

    /// Validates a bank-transfer tender before a checkout is created.
    ///
    /// Callers run this before paying for a gateway round trip;
    /// `create_pending_transfer` re-validates under a transaction, so a
    /// balance moving between the two calls is still caught.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not exist, does not accept
    /// tenders, or the amount exceeds the remaining balance.
    pub async fn validate_transfer(&self, input: &TenderInput) -> Result<(), SettlementRepoError> {
        let txn = self.db.begin().await?;
        let target = load_target(&txn, input.target).await?;
        SettlementService::request(
            PaymentMethod::BankTransfer,
            input.amount,
            target.remaining(),
            target.payable(),
        )?;
        txn.rollback().await?;

        Ok(())
    }

    /// Records a pending bank-transfer tender for a created checkout.
    ///
    /// The caller validates the request, asks the gateway for a hosted
    /// checkout, then records the pending transaction here. The request
    /// is re-validated under the transaction because the balance may have
    /// moved since the pre-check.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not accept the tender, the
    /// amount exceeds the remaining balance, or the insert fails.
    pub async fn create_pending_transfer(
        &self,
        input: TenderInput,
        gateway_reference: String,
    ) -> Result<settlement_transactions::Model, SettlementRepoError> {
        let txn = self.db.begin().await?;

        let target = load_target(&txn, input.target).await?;
        let plan = SettlementService::request(
            PaymentMethod::BankTransfer,
            input.amount,
            target.remaining(),
            target.payable(),
        )?;
        let SettlementPlan::GatewayPending { amount } = plan else {
            return Err(SettlementError::NotPayable.into());
        };

        let transaction = insert_transaction(
            &txn,
            &input,
            PaymentMethod::BankTransfer,
            amount,
            SettlementStatus::Pending,
            Some(gateway_reference),
        )
        .await?;

        txn.commit().await?;
        tracing::info!(
            transaction_id = %transaction.id,
            amount = %amount,
            "bank transfer pending gateway confirmation"
        );

        Ok(transaction)
    }

    /// Resolves an asynchronous gateway callback.
    ///
    /// Idempotent: replaying a callback for an already-successful
    /// transaction changes nothing. A success callback arriving after a
    /// user cancellation is honored and the row flagged for review.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction carries the reference, the
    /// payload contradicts the stored transaction, or the update fails.
    pub async fn confirm_gateway_callback(
        &self,
        callback: &GatewayCallback,
    ) -> Result<CallbackResolution, SettlementRepoError> {
        let txn = self.db.begin().await?;

        let transaction = settlement_transactions::Entity::find()
            .filter(
                settlement_transactions::Column::GatewayReference
                    .eq(callback.gateway_reference.as_str()),
            )
            .one(&txn)
            .await?
            .ok_or_else(|| {
                SettlementRepoError::ReferenceNotFound(callback.gateway_reference.clone())
            })?;

        let action = SettlementService::confirm_callback(
            transaction.status.into(),
            transaction.amount,
            transaction.gateway_reference.as_deref(),
            callback,
        )?;

        let resolved = match action {
            CallbackAction::Confirm | CallbackAction::ConfirmAfterCancellation => {
                let target_ref = target_of(&transaction)?;
                let target = load_target(&txn, target_ref).await?;

                let amount = transaction.amount;
                let purpose: TenderPurpose = transaction.purpose.into();
                let overridden = action == CallbackAction::ConfirmAfterCancellation;

                let mut active: settlement_transactions::ActiveModel = transaction.into();
                active.status = Set(SettlementStatus::Success);
                active.cancellation_overridden = Set(overridden);
                active.updated_at = Set(Utc::now().into());
                let updated = active.update(&txn).await?;

                apply_success(&txn, target, purpose, amount).await?;

                if overridden {
                    tracing::warn!(
                        transaction_id = %updated.id,
                        "success callback overrode an earlier cancellation; flagged for review"
                    );
                }
                updated
            }
            CallbackAction::MarkFailed => {
                let mut active: settlement_transactions::ActiveModel = transaction.into();
                active.status = Set(SettlementStatus::Failed);
                active.updated_at = Set(Utc::now().into());
                active.update(&txn).await?
            }
            CallbackAction::AlreadySettled | CallbackAction::NoEffect => transaction,
        };

        txn.commit().await?;
        tracing::info!(
            transaction_id = %resolved.id,
            action = ?action,
            "gateway callback resolved"
        );

        Ok(CallbackResolution {
            action,
            transaction: resolved,
        })
    }

    /// Cancels a pending bank transfer before its callback arrives.
    ///
    /// A late success callback can still override the cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction does not exist or is not
    /// pending.
    pub async fn cancel_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<settlement_transactions::Model, SettlementRepoError> {
        let transaction = settlement_transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await?
            .ok_or(SettlementRepoError::TransactionNotFound(transaction_id))?;

        SettlementService::cancel(transaction.status.into())?;

        let mut active: settlement_transactions::ActiveModel = transaction.into();
        active.status = Set(SettlementStatus::Cancelled);
        active.updated_at = Set(Utc::now().into());

        // Conditional on the row still being Pending: a success callback
        // committing between the read above and this write must not be
        // overwritten with Cancelled while the balance stays credited.
        let result = settlement_transactions::Entity::update_many()
            .set(active)
            .filter(settlement_transactions::Column::Id.eq(transaction_id))
            .filter(settlement_transactions::Column::Status.eq(SettlementStatus::Pending))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            let current = self.find_transaction(transaction_id).await?;
            tracing::warn!(
                transaction_id = %transaction_id,
                status = %gearbox_core::settlement::SettlementStatus::from(current.status),
                "cancellation lost to a concurrent resolution"
            );
            return Err(SettlementError::NotCancellable(current.status.into()).into());
        }

        let updated = self.find_transaction(transaction_id).await?;
        tracing::info!(transaction_id = %transaction_id, "pending transfer cancelled");

        Ok(updated)
    }

    /// Finds a settlement transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction does not exist.
    pub async fn find_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<settlement_transactions::Model, SettlementRepoError> {
        settlement_transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await?
            .ok_or(SettlementRepoError::TransactionNotFound(transaction_id))
    }

    /// Lists the audit trail of tenders against a target, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_target(
        &self,
        target: SettlementTarget,
    ) -> Result<Vec<settlement_transactions::Model>, SettlementRepoError> {
        let query = match target {
            SettlementTarget::Invoice(id) => settlement_transactions::Entity::find()
                .filter(settlement_transactions::Column::InvoiceId.eq(id.into_inner())),
            SettlementTarget::Debt(id) => settlement_transactions::Entity::find()
                .filter(settlement_transactions::Column::DebtId.eq(id.into_inner())),
        };

        let transactions = query
            .order_by_asc(settlement_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(transactions)
    }
}

/// Reconstructs the target reference from a stored transaction row.
///
/// The table's CHECK constraint guarantees exactly one target column is
/// set per kind; a row violating it can only come from manual edits.
fn target_of(
    model: &settlement_transactions::Model,
) -> Result<SettlementTarget, SettlementRepoError> {
    let target = match model.target_kind {
        SettlementTargetKind::Invoice => model
            .invoice_id
            .map(|id| SettlementTarget::Invoice(InvoiceId::from_uuid(id))),
        SettlementTargetKind::Debt => model
            .debt_id
            .map(|id| SettlementTarget::Debt(DebtId::from_uuid(id))),
    };
    target.ok_or(SettlementRepoError::TargetNotFound(model.id))
}

async fn load_target(
    txn: &DatabaseTransaction,
    target: SettlementTarget,
) -> Result<TargetRow, SettlementRepoError> {
    match target {
        SettlementTarget::Invoice(id) => {
            let model = invoices::Entity::find_by_id(id.into_inner())
                .one(txn)
                .await?
                .ok_or(SettlementRepoError::TargetNotFound(id.into_inner()))?;
            Ok(TargetRow::Invoice(model))
        }
        SettlementTarget::Debt(id) => {
            let model = debts::Entity::find_by_id(id.into_inner())
                .one(txn)
                .await?
                .ok_or(SettlementRepoError::TargetNotFound(id.into_inner()))?;
            Ok(TargetRow::Debt(model))
        }
    }
}

async fn insert_transaction(
    txn: &DatabaseTransaction,
    input: &TenderInput,
    method: PaymentMethod,
    amount: Decimal,
    status: SettlementStatus,
    gateway_reference: Option<String>,
) -> Result<settlement_transactions::Model, SettlementRepoError> {
    let now = Utc::now().into();
    let (target_kind, invoice_id, debt_id, purpose) = match input.target {
        SettlementTarget::Invoice(id) => (
            SettlementTargetKind::Invoice,
            Some(id.into_inner()),
            None,
            input.purpose,
        ),
        // Debt repayments are always payments, whatever the caller sent.
        SettlementTarget::Debt(id) => (
            SettlementTargetKind::Debt,
            None,
            Some(id.into_inner()),
            TenderPurpose::Payment,
        ),
    };

    let transaction = settlement_transactions::ActiveModel {
        id: Set(SettlementId::new().into_inner()),
        target_kind: Set(target_kind),
        invoice_id: Set(invoice_id),
        debt_id: Set(debt_id),
        method: Set(method.into()),
        purpose: Set(purpose.into()),
        amount: Set(amount),
        status: Set(status),
        gateway_reference: Set(gateway_reference),
        cancellation_overridden: Set(false),
        created_by: Set(input.created_by),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Ok(transaction.insert(txn).await?)
}

/// Applies a successful tender to the target aggregate under a version
/// check.
async fn apply_success(
    txn: &DatabaseTransaction,
    target: TargetRow,
    purpose: TenderPurpose,
    amount: Decimal,
) -> Result<(), SettlementRepoError> {
    match target {
        TargetRow::Invoice(model) => {
            let applied = apply_transaction(
                model.estimate_amount,
                model.discount_percent,
                model.deposit_received,
                model.paid_amount,
                purpose,
                amount,
            )?;

            let balances = gearbox_core::invoice::compute_balances(
                model.estimate_amount,
                model.discount_percent,
                Some(applied.deposit_received),
                Some(applied.paid_amount),
            );
            let status = if balances.remaining_amount == Decimal::ZERO {
                sea_orm_active_enums::InvoiceStatus::Settled
            } else {
                model.status
            };

            let id = model.id;
            let version = model.version;
            let mut active: invoices::ActiveModel = model.into();
            active.deposit_received = Set(applied.deposit_received);
            active.paid_amount = Set(applied.paid_amount);
            active.status = Set(status);
            active.version = Set(version + 1);
            active.updated_at = Set(Utc::now().into());

            let result = invoices::Entity::update_many()
                .set(active)
                .filter(invoices::Column::Id.eq(id))
                .filter(invoices::Column::Version.eq(version))
                .exec(txn)
                .await?;
            if result.rows_affected == 0 {
                return Err(SettlementRepoError::ConcurrentModification(id));
            }
        }
        TargetRow::Debt(model) => {
            let repayment = DebtService::apply_repayment(
                model.total_amount,
                model.paid_amount,
                model.status.into(),
                amount,
            )?;

            let id = model.id;
            let version = model.version;
            let settled = repayment.status == gearbox_core::debt::DebtStatus::Settled;
            let mut active: debts::ActiveModel = model.into();
            active.paid_amount = Set(repayment.paid_amount);
            active.status = Set(repayment.status.into());
            active.version = Set(version + 1);
            active.updated_at = Set(Utc::now().into());

            let result = debts::Entity::update_many()
                .set(active)
                .filter(debts::Column::Id.eq(id))
                .filter(debts::Column::Version.eq(version))
                .exec(txn)
                .await?;
            if result.rows_affected == 0 {
                return Err(SettlementRepoError::ConcurrentModification(id));
            }
            if settled {
                tracing::info!(debt_id = %id, "debt fully repaid");
            }
        }
    }

    Ok(())
}
