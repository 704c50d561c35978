//! Debt repository for the debt ledger.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use gearbox_core::debt::{DebtError, DebtService};
use gearbox_shared::types::DebtId;

use crate::entities::{debts, invoices, sea_orm_active_enums};
use crate::repositories::invoice::to_domain;

/// Error types for debt operations.
#[derive(Debug, thiserror::Error)]
pub enum DebtRepoError {
    /// Debt not found.
    #[error("Debt not found: {0}")]
    NotFound(Uuid),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected for {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Domain rule violation.
    #[error(transparent)]
    Debt(#[from] DebtError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl DebtRepoError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::InvoiceNotFound(_) => 404,
            Self::ConcurrentModification(_) => 409,
            Self::Debt(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "DEBT_NOT_FOUND",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
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

/// Debt repository.
#[derive(Debug, Clone)]
pub struct DebtRepository {
    db: DatabaseConnection,
}

impl DebtRepository {
    /// Creates a new debt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Converts an invoice's outstanding remainder into a tracked debt.
    ///
    /// The invoice is marked `converted_to_debt` and stops accepting
    /// tenders; further payments go through the new debt. Both writes
    /// happen in one database transaction under the invoice's version
    /// check.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The invoice does not exist
    /// - The remainder is zero, the ticket has not been handed over,
    ///   the invoice was already converted, or the due date is not in
    ///   the future
    /// - Another request mutated the invoice concurrently
    pub async fn convert_invoice(
        &self,
        invoice_id: Uuid,
        due_date: NaiveDate,
    ) -> Result<debts::Model, DebtRepoError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(invoice_id)
            .one(&txn)
            .await?
            .ok_or(DebtRepoError::InvoiceNotFound(invoice_id))?;

        let domain = to_domain(&invoice);
        let today = Utc::now().date_naive();
        let conversion = DebtService::plan_conversion(
            domain.balances().remaining_amount,
            domain.status,
            domain.ticket_stage,
            due_date,
            today,
        )?;

        let now = Utc::now().into();
        let debt = debts::ActiveModel {
            id: Set(DebtId::new().into_inner()),
            customer_id: Set(invoice.customer_id),
            invoice_id: Set(invoice.id),
            total_amount: Set(conversion.total_amount),
            paid_amount: Set(rust_decimal::Decimal::ZERO),
            due_date: Set(conversion.due_date),
            status: Set(sea_orm_active_enums::DebtStatus::Outstanding),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let debt = debt.insert(&txn).await?;

        let version = invoice.version;
        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(sea_orm_active_enums::InvoiceStatus::ConvertedToDebt);
        active.version = Set(version + 1);
        active.updated_at = Set(now);

        let result = invoices::Entity::update_many()
            .set(active)
            .filter(invoices::Column::Id.eq(invoice_id))
            .filter(invoices::Column::Version.eq(version))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(DebtRepoError::ConcurrentModification(invoice_id));
        }

        txn.commit().await?;
        tracing::info!(
            debt_id = %debt.id,
            invoice_id = %invoice_id,
            total = %debt.total_amount,
            due = %debt.due_date,
            "invoice remainder converted to debt"
        );

        Ok(debt)
    }

    /// Finds a debt by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the debt does not exist or the query fails.
    pub async fn find_debt(&self, id: Uuid) -> Result<debts::Model, DebtRepoError> {
        debts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DebtRepoError::NotFound(id))
    }

    /// Lists outstanding debts, optionally for one customer, soonest
    /// due date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_outstanding(
        &self,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<debts::Model>, DebtRepoError> {
        let mut query = debts::Entity::find()
            .filter(debts::Column::Status.eq(sea_orm_active_enums::DebtStatus::Outstanding));

        if let Some(customer_id) = customer_id {
            query = query.filter(debts::Column::CustomerId.eq(customer_id));
        }

        let debts = query
            .order_by_asc(debts::Column::DueDate)
            .all(&self.db)
            .await?;

        Ok(debts)
    }

    /// Moves a debt's due date.
    ///
    /// # Errors
    ///
    /// Returns an error if the debt does not exist, is settled, or the
    /// new date is not strictly in the future.
    pub async fn update_due_date(
        &self,
        id: Uuid,
        new_due_date: NaiveDate,
    ) -> Result<debts::Model, DebtRepoError> {
        let debt = debts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DebtRepoError::NotFound(id))?;

        let today = Utc::now().date_naive();
        DebtService::validate_due_date_change(debt.status.into(), new_due_date, today)?;

        let mut active: debts::ActiveModel = debt.into();
        active.due_date = Set(new_due_date);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(debt_id = %id, due = %new_due_date, "debt due date updated");

        Ok(updated)
    }
}
