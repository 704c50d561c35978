//! Ledger voucher routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use crate::routes::{bad_request, error_response};
use gearbox_core::voucher::{VoucherKind, VoucherStatus};
use gearbox_db::entities::ledger_vouchers;
use gearbox_db::repositories::voucher::{
    CreateVoucherInput, VoucherRepoError, VoucherRepository,
};

/// Creates the voucher routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vouchers", get(list_vouchers))
        .route("/vouchers", post(create_voucher))
        .route("/vouchers/{voucher_id}", get(get_voucher))
        .route("/vouchers/{voucher_id}/approve", post(approve_voucher))
        .route("/vouchers/{voucher_id}/reject", post(reject_voucher))
        .route("/vouchers/{voucher_id}/disburse", post(disburse_voucher))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a voucher.
#[derive(Debug, Deserialize)]
pub struct CreateVoucherRequest {
    /// Voucher kind: "income" or "expense".
    pub kind: String,
    /// Voucher amount (decimal string).
    pub amount: String,
    /// Payee or payer the voucher names.
    pub target_name: String,
    /// Staff member creating the voucher.
    pub created_by: Uuid,
}

/// Request body for approving a voucher.
#[derive(Debug, Deserialize)]
pub struct ApproveVoucherRequest {
    /// Approving staff member; must differ from the creator.
    pub approved_by: Uuid,
}

/// Request body for rejecting a voucher.
#[derive(Debug, Deserialize)]
pub struct RejectVoucherRequest {
    /// Rejecting staff member; must differ from the creator.
    pub rejected_by: Uuid,
    /// Why the voucher was rejected. Required.
    pub reason: String,
}

/// Query parameters for listing vouchers.
#[derive(Debug, Deserialize)]
pub struct ListVouchersQuery {
    /// Filter by status.
    pub status: Option<String>,
}

/// Response for a ledger voucher.
#[derive(Debug, Serialize)]
pub struct VoucherResponse {
    /// Voucher ID.
    pub id: Uuid,
    /// Voucher kind.
    pub kind: String,
    /// Voucher amount.
    pub amount: String,
    /// Payee or payer the voucher names.
    pub target_name: String,
    /// Voucher status.
    pub status: String,
    /// Staff member who created the voucher.
    pub created_by: Uuid,
    /// Staff member who approved or rejected it, if any.
    pub approver_id: Option<Uuid>,
    /// Rejection reason, present on rejected vouchers.
    pub rejection_reason: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<ledger_vouchers::Model> for VoucherResponse {
    fn from(m: ledger_vouchers::Model) -> Self {
        Self {
            id: m.id,
            kind: VoucherKind::from(m.kind).as_str().to_string(),
            amount: m.amount.to_string(),
            target_name: m.target_name,
            status: VoucherStatus::from(m.status).as_str().to_string(),
            created_by: m.created_by,
            approver_id: m.approver_id,
            rejection_reason: m.rejection_reason,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

/// Maps a repository error onto an HTTP response.
fn repo_error(e: VoucherRepoError) -> Response {
    if let VoucherRepoError::Database(ref db_err) = e {
        error!(error = %db_err, "voucher database operation failed");
        return error_response(500, e.error_code(), "An error occurred".to_string());
    }
    error_response(e.http_status_code(), e.error_code(), e.to_string())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/vouchers` - Create a pending voucher.
async fn create_voucher(
    State(state): State<AppState>,
    Json(payload): Json<CreateVoucherRequest>,
) -> impl IntoResponse {
    let Some(kind) = VoucherKind::parse(&payload.kind) else {
        return bad_request("INVALID_VOUCHER_KIND", "kind must be \"income\" or \"expense\"");
    };
    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return bad_request("INVALID_AMOUNT", "amount is not a valid decimal");
    };

    let repo = VoucherRepository::new((*state.db).clone());
    match repo
        .create_voucher(CreateVoucherInput {
            kind,
            amount,
            target_name: payload.target_name,
            created_by: payload.created_by,
        })
        .await
    {
        Ok(voucher) => (
            StatusCode::CREATED,
            Json(json!({ "voucher": VoucherResponse::from(voucher) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// POST `/vouchers/{voucher_id}/approve` - Approve a pending voucher.
async fn approve_voucher(
    State(state): State<AppState>,
    Path(voucher_id): Path<Uuid>,
    Json(payload): Json<ApproveVoucherRequest>,
) -> impl IntoResponse {
    let repo = VoucherRepository::new((*state.db).clone());

    match repo.approve_voucher(voucher_id, payload.approved_by).await {
        Ok(voucher) => (
            StatusCode::OK,
            Json(json!({ "voucher": VoucherResponse::from(voucher) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// POST `/vouchers/{voucher_id}/reject` - Reject a pending voucher.
async fn reject_voucher(
    State(state): State<AppState>,
    Path(voucher_id): Path<Uuid>,
    Json(payload): Json<RejectVoucherRequest>,
) -> impl IntoResponse {
    let repo = VoucherRepository::new((*state.db).clone());

    match repo
        .reject_voucher(voucher_id, payload.rejected_by, payload.reason)
        .await
    {
        Ok(voucher) => (
            StatusCode::OK,
            Json(json!({ "voucher": VoucherResponse::from(voucher) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// POST `/vouchers/{voucher_id}/disburse` - Finish an approved voucher.
async fn disburse_voucher(
    State(state): State<AppState>,
    Path(voucher_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = VoucherRepository::new((*state.db).clone());

    match repo.disburse_voucher(voucher_id).await {
        Ok(voucher) => (
            StatusCode::OK,
            Json(json!({ "voucher": VoucherResponse::from(voucher) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// GET `/vouchers/{voucher_id}` - Fetch a voucher.
async fn get_voucher(
    State(state): State<AppState>,
    Path(voucher_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = VoucherRepository::new((*state.db).clone());

    match repo.find_voucher(voucher_id).await {
        Ok(voucher) => (
            StatusCode::OK,
            Json(json!({ "voucher": VoucherResponse::from(voucher) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// GET `/vouchers` - List vouchers, optionally filtered by status.
async fn list_vouchers(
    State(state): State<AppState>,
    Query(query): Query<ListVouchersQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match VoucherStatus::parse(raw) {
            Some(status) => Some(status),
            None => return bad_request("INVALID_VOUCHER_STATUS", "unknown voucher status"),
        },
    };

    let repo = VoucherRepository::new((*state.db).clone());
    match repo.list_vouchers(status).await {
        Ok(vouchers) => {
            let items: Vec<VoucherResponse> =
                vouchers.into_iter().map(VoucherResponse::from).collect();
            (StatusCode::OK, Json(json!({ "vouchers": items }))).into_response()
        }
        Err(e) => repo_error(e),
    }
}
