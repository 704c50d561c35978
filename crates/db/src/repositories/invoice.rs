//! Invoice repository for billing database operations.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use gearbox_core::invoice::{self, InvoiceBalances, InvoiceError};
use gearbox_shared::types::money::is_valid_discount_percent;
use gearbox_shared::types::{CustomerId, InvoiceId, ServiceTicketId};

use crate::entities::{invoices, sea_orm_active_enums};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceRepoError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// A service ticket already has an invoice.
    #[error("Service ticket {0} already has an invoice")]
    DuplicateServiceTicket(Uuid),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected for invoice {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Domain rule violation.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl InvoiceRepoError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::DuplicateServiceTicket(_) | Self::ConcurrentModification(_) => 409,
            Self::Invoice(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "INVOICE_NOT_FOUND",
            Self::DuplicateServiceTicket(_) => "INVOICE_DUPLICATE_SERVICE_TICKET",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Invoice(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if retrying the request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_))
    }
}

/// Input for creating an invoice from an accepted quotation.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// The service ticket being billed.
    pub service_ticket_id: Uuid,
    /// The customer being billed.
    pub customer_id: Uuid,
    /// Sum of quotation line items.
    pub estimate_amount: Decimal,
    /// Percentage discount, if any.
    pub discount_percent: Option<Decimal>,
}

/// An invoice row together with its derived balances.
#[derive(Debug, Clone)]
pub struct InvoiceWithBalances {
    /// The stored invoice.
    pub invoice: invoices::Model,
    /// Balances recomputed from the stored amounts.
    pub balances: InvoiceBalances,
}

/// Invoice repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice for a service ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The estimate is negative or the discount outside 0..=100
    /// - The service ticket already has an invoice
    /// - Database operation fails
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<InvoiceWithBalances, InvoiceRepoError> {
        if input.estimate_amount < Decimal::ZERO {
            return Err(InvoiceError::InvalidEstimateAmount(input.estimate_amount).into());
        }
        if let Some(discount) = input.discount_percent {
            if !is_valid_discount_percent(discount) {
                return Err(InvoiceError::InvalidDiscountPercent(discount).into());
            }
        }

        let existing = invoices::Entity::find()
            .filter(invoices::Column::ServiceTicketId.eq(input.service_ticket_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(InvoiceRepoError::DuplicateServiceTicket(
                input.service_ticket_id,
            ));
        }

        let now = Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: Set(InvoiceId::new().into_inner()),
            service_ticket_id: Set(input.service_ticket_id),
            customer_id: Set(input.customer_id),
            estimate_amount: Set(input.estimate_amount),
            discount_percent: Set(input.discount_percent),
            deposit_received: Set(Decimal::ZERO),
            paid_amount: Set(Decimal::ZERO),
            status: Set(sea_orm_active_enums::InvoiceStatus::Open),
            ticket_stage: Set(sea_orm_active_enums::TicketStage::Quoted),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = invoice.insert(&self.db).await?;
        tracing::info!(invoice_id = %model.id, estimate = %model.estimate_amount, "invoice created");

        Ok(with_balances(model))
    }

    /// Finds an invoice by ID with its derived balances.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice does not exist or the query fails.
    pub async fn find_invoice(&self, id: Uuid) -> Result<InvoiceWithBalances, InvoiceRepoError> {
        let model = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceRepoError::NotFound(id))?;

        Ok(with_balances(model))
    }

    /// Lists invoices, optionally filtered by customer and status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_invoices(
        &self,
        customer_id: Option<Uuid>,
        status: Option<invoice::InvoiceStatus>,
    ) -> Result<Vec<InvoiceWithBalances>, InvoiceRepoError> {
        let mut query = invoices::Entity::find();

        if let Some(customer_id) = customer_id {
            query = query.filter(invoices::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = status {
            let status: sea_orm_active_enums::InvoiceStatus = status.into();
            query = query.filter(invoices::Column::Status.eq(status));
        }

        let models = query
            .order_by_desc(invoices::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(with_balances).collect())
    }

    /// Updates the snapshot of the owning ticket's stage.
    ///
    /// Stage changes never touch balances, so no version bump is needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice does not exist or the update fails.
    pub async fn update_ticket_stage(
        &self,
        id: Uuid,
        stage: invoice::TicketStage,
    ) -> Result<invoices::Model, InvoiceRepoError> {
        let model = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceRepoError::NotFound(id))?;

        let mut active: invoices::ActiveModel = model.into();
        active.ticket_stage = Set(stage.into());
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        tracing::info!(invoice_id = %id, stage = %stage, "ticket stage updated");

        Ok(updated)
    }
}

/// Converts a stored row into the core invoice aggregate.
#[must_use]
pub fn to_domain(model: &invoices::Model) -> invoice::Invoice {
    invoice::Invoice {
        id: InvoiceId::from_uuid(model.id),
        service_ticket_id: ServiceTicketId::from_uuid(model.service_ticket_id),
        customer_id: CustomerId::from_uuid(model.customer_id),
        estimate_amount: model.estimate_amount,
        discount_percent: model.discount_percent,
        deposit_received: model.deposit_received,
        paid_amount: model.paid_amount,
        status: model.status.into(),
        ticket_stage: model.ticket_stage.into(),
    }
}

fn with_balances(model: invoices::Model) -> InvoiceWithBalances {
    let balances = to_domain(&model).balances();
    InvoiceWithBalances {
        invoice: model,
        balances,
    }
}
