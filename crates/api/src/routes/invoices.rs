//! Invoice management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use crate::routes::{bad_request, error_response};
use gearbox_core::invoice::{InvoiceStatus, TicketStage};
use gearbox_db::repositories::invoice::{
    CreateInvoiceInput, InvoiceRepoError, InvoiceRepository, InvoiceWithBalances,
};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}/stage", patch(update_stage))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by customer ID.
    pub customer_id: Option<Uuid>,
    /// Filter by invoice status.
    pub status: Option<String>,
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Service ticket the invoice bills for.
    pub service_ticket_id: Uuid,
    /// Customer being billed.
    pub customer_id: Uuid,
    /// Estimate amount (decimal string).
    pub estimate_amount: String,
    /// Optional discount percent (decimal string, 0-100).
    pub discount_percent: Option<String>,
}

/// Request body for updating the ticket stage snapshot.
#[derive(Debug, Deserialize)]
pub struct UpdateStageRequest {
    /// New ticket stage.
    pub stage: String,
}

/// Response for an invoice with its derived balances.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// Service ticket ID.
    pub service_ticket_id: Uuid,
    /// Customer ID.
    pub customer_id: Uuid,
    /// Estimate amount.
    pub estimate_amount: String,
    /// Discount percent.
    pub discount_percent: Option<String>,
    /// Cumulative deposit received.
    pub deposit_received: String,
    /// Cumulative amount paid.
    pub paid_amount: String,
    /// Invoice status.
    pub status: String,
    /// Snapshot of the owning ticket's stage.
    pub ticket_stage: String,
    /// Estimate net of discount.
    pub net_total: String,
    /// Amount still owed.
    pub final_amount: String,
    /// Amount a new tender may claim.
    pub remaining_amount: String,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<InvoiceWithBalances> for InvoiceResponse {
    fn from(value: InvoiceWithBalances) -> Self {
        let m = value.invoice;
        Self {
            id: m.id,
            service_ticket_id: m.service_ticket_id,
            customer_id: m.customer_id,
            estimate_amount: m.estimate_amount.to_string(),
            discount_percent: m.discount_percent.map(|d| d.to_string()),
            deposit_received: m.deposit_received.to_string(),
            paid_amount: m.paid_amount.to_string(),
            status: InvoiceStatus::from(m.status).as_str().to_string(),
            ticket_stage: TicketStage::from(m.ticket_stage).as_str().to_string(),
            net_total: value.balances.net_total.to_string(),
            final_amount: value.balances.final_amount.to_string(),
            remaining_amount: value.balances.remaining_amount.to_string(),
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

/// Maps a repository error onto an HTTP response.
fn repo_error(e: InvoiceRepoError) -> Response {
    if let InvoiceRepoError::Database(ref db_err) = e {
        error!(error = %db_err, "invoice database operation failed");
        return error_response(500, e.error_code(), "An error occurred".to_string());
    }
    error_response(e.http_status_code(), e.error_code(), e.to_string())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/invoices` - Create an invoice for a service ticket.
async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    let Ok(estimate_amount) = Decimal::from_str(&payload.estimate_amount) else {
        return bad_request("INVALID_AMOUNT", "estimate_amount is not a valid decimal");
    };

    let discount_percent = match payload.discount_percent.as_deref() {
        None => None,
        Some(raw) => match Decimal::from_str(raw) {
            Ok(d) => Some(d),
            Err(_) => {
                return bad_request("INVALID_AMOUNT", "discount_percent is not a valid decimal");
            }
        },
    };

    let repo = InvoiceRepository::new((*state.db).clone());
    match repo
        .create_invoice(CreateInvoiceInput {
            service_ticket_id: payload.service_ticket_id,
            customer_id: payload.customer_id,
            estimate_amount,
            discount_percent,
        })
        .await
    {
        Ok(invoice) => (
            StatusCode::CREATED,
            Json(json!({ "invoice": InvoiceResponse::from(invoice) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// GET `/invoices` - List invoices, optionally filtered by customer.
async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match InvoiceStatus::parse(raw) {
            Some(status) => Some(status),
            None => return bad_request("INVALID_INVOICE_STATUS", "unknown invoice status"),
        },
    };

    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.list_invoices(query.customer_id, status).await {
        Ok(invoices) => {
            let items: Vec<InvoiceResponse> =
                invoices.into_iter().map(InvoiceResponse::from).collect();
            (StatusCode::OK, Json(json!({ "invoices": items }))).into_response()
        }
        Err(e) => repo_error(e),
    }
}

/// GET `/invoices/{invoice_id}` - Fetch an invoice with derived balances.
async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.find_invoice(invoice_id).await {
        Ok(invoice) => (
            StatusCode::OK,
            Json(json!({ "invoice": InvoiceResponse::from(invoice) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// PATCH `/invoices/{invoice_id}/stage` - Update the ticket stage snapshot.
async fn update_stage(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<UpdateStageRequest>,
) -> impl IntoResponse {
    let Some(stage) = TicketStage::parse(&payload.stage) else {
        return bad_request("INVALID_TICKET_STAGE", "unknown ticket stage");
    };

    let repo = InvoiceRepository::new((*state.db).clone());
    match repo.update_ticket_stage(invoice_id, stage).await {
        Ok(model) => (
            StatusCode::OK,
            Json(json!({
                "id": model.id,
                "ticket_stage": TicketStage::from(model.ticket_stage).as_str()
            })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("quoted", Some(TicketStage::Quoted))]
    #[case("in_progress", Some(TicketStage::InProgress))]
    #[case("handed_over", Some(TicketStage::HandedOver))]
    #[case("completed", Some(TicketStage::Completed))]
    #[case("delivered", None)]
    fn test_stage_parse(#[case] input: &str, #[case] expected: Option<TicketStage>) {
        assert_eq!(TicketStage::parse(input), expected);
    }
}
