//! Debt ledger routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use crate::routes::{bad_request, error_response};
use crate::routes::settlements::TransactionResponse;
use gearbox_core::debt::DebtStatus;
use gearbox_core::settlement::{SettlementTarget, TenderPurpose};
use gearbox_db::entities::debts;
use gearbox_db::repositories::debt::{DebtRepoError, DebtRepository};
use gearbox_db::repositories::settlement::{SettlementRepository, TenderInput};
use gearbox_shared::types::DebtId;

/// Creates the debt ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/debts", get(list_debts))
        .route("/debts", post(convert_invoice))
        .route("/debts/{debt_id}", get(get_debt))
        .route("/debts/{debt_id}/due-date", patch(update_due_date))
        .route("/debts/{debt_id}/repayments", post(record_repayment))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for converting an invoice remainder into a debt.
#[derive(Debug, Deserialize)]
pub struct ConvertInvoiceRequest {
    /// Invoice whose remainder becomes the debt.
    pub invoice_id: Uuid,
    /// Agreed repayment date (YYYY-MM-DD), strictly in the future.
    pub due_date: NaiveDate,
}

/// Request body for changing a debt's due date.
#[derive(Debug, Deserialize)]
pub struct UpdateDueDateRequest {
    /// New repayment date (YYYY-MM-DD), strictly in the future.
    pub due_date: NaiveDate,
}

/// Request body for a cash repayment against a debt.
#[derive(Debug, Deserialize)]
pub struct RepaymentRequest {
    /// Repayment amount (decimal string).
    pub amount: String,
    /// Staff member recording the repayment.
    pub created_by: Uuid,
}

/// Query parameters for listing debts.
#[derive(Debug, Deserialize)]
pub struct ListDebtsQuery {
    /// Filter by customer ID.
    pub customer_id: Option<Uuid>,
}

/// Response for a tracked debt.
#[derive(Debug, Serialize)]
pub struct DebtResponse {
    /// Debt ID.
    pub id: Uuid,
    /// Customer who owes the debt.
    pub customer_id: Uuid,
    /// Invoice the debt was converted from.
    pub invoice_id: Uuid,
    /// Total amount owed.
    pub total_amount: String,
    /// Amount repaid so far.
    pub paid_amount: String,
    /// Agreed repayment date.
    pub due_date: String,
    /// Debt status.
    pub status: String,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<debts::Model> for DebtResponse {
    fn from(m: debts::Model) -> Self {
        Self {
            id: m.id,
            customer_id: m.customer_id,
            invoice_id: m.invoice_id,
            total_amount: m.total_amount.to_string(),
            paid_amount: m.paid_amount.to_string(),
            due_date: m.due_date.to_string(),
            status: DebtStatus::from(m.status).as_str().to_string(),
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

/// Maps a repository error onto an HTTP response.
fn repo_error(e: DebtRepoError) -> Response {
    if let DebtRepoError::Database(ref db_err) = e {
        error!(error = %db_err, "debt database operation failed");
        return error_response(500, e.error_code(), "An error occurred".to_string());
    }
    error_response(e.http_status_code(), e.error_code(), e.to_string())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/debts` - Convert an unpaid invoice remainder into a debt.
async fn convert_invoice(
    State(state): State<AppState>,
    Json(payload): Json<ConvertInvoiceRequest>,
) -> impl IntoResponse {
    let repo = DebtRepository::new((*state.db).clone());

    match repo.convert_invoice(payload.invoice_id, payload.due_date).await {
        Ok(debt) => (
            StatusCode::CREATED,
            Json(json!({ "debt": DebtResponse::from(debt) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// GET `/debts` - List outstanding debts, optionally per customer.
async fn list_debts(
    State(state): State<AppState>,
    Query(query): Query<ListDebtsQuery>,
) -> impl IntoResponse {
    let repo = DebtRepository::new((*state.db).clone());

    match repo.list_outstanding(query.customer_id).await {
        Ok(debts) => {
            let items: Vec<DebtResponse> = debts.into_iter().map(DebtResponse::from).collect();
            (StatusCode::OK, Json(json!({ "debts": items }))).into_response()
        }
        Err(e) => repo_error(e),
    }
}

/// GET `/debts/{debt_id}` - Fetch a tracked debt.
async fn get_debt(State(state): State<AppState>, Path(debt_id): Path<Uuid>) -> impl IntoResponse {
    let repo = DebtRepository::new((*state.db).clone());

    match repo.find_debt(debt_id).await {
        Ok(debt) => (
            StatusCode::OK,
            Json(json!({ "debt": DebtResponse::from(debt) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// PATCH `/debts/{debt_id}/due-date` - Renegotiate the repayment date.
async fn update_due_date(
    State(state): State<AppState>,
    Path(debt_id): Path<Uuid>,
    Json(payload): Json<UpdateDueDateRequest>,
) -> impl IntoResponse {
    let repo = DebtRepository::new((*state.db).clone());

    match repo.update_due_date(debt_id, payload.due_date).await {
        Ok(debt) => (
            StatusCode::OK,
            Json(json!({ "debt": DebtResponse::from(debt) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// POST `/debts/{debt_id}/repayments` - Record a cash repayment.
///
/// Bank-transfer repayments go through `/settlements/bank-transfer`
/// with a debt target; this endpoint covers the cash-drawer case.
async fn record_repayment(
    State(state): State<AppState>,
    Path(debt_id): Path<Uuid>,
    Json(payload): Json<RepaymentRequest>,
) -> impl IntoResponse {
    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return bad_request("INVALID_AMOUNT", "amount is not a valid decimal");
    };

    let repo = SettlementRepository::new((*state.db).clone());
    let input = TenderInput {
        target: SettlementTarget::Debt(DebtId::from_uuid(debt_id)),
        purpose: TenderPurpose::Payment,
        amount,
        created_by: payload.created_by,
    };

    match repo.settle_cash(input).await {
        Ok(settlement) => (
            StatusCode::CREATED,
            Json(json!({
                "transaction": TransactionResponse::from(settlement.transaction),
                "clamped": settlement.clamped
            })),
        )
            .into_response(),
        Err(e) => crate::routes::settlements::repo_error(e),
    }
}
