//! Settlement routes: cash tenders, bank-transfer checkouts, gateway
//! callbacks and the per-target audit trail.

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
use gearbox_core::gateway::{CheckoutRequest, GatewayCallback};
use gearbox_core::settlement::{
    CallbackAction, PaymentMethod, SettlementStatus, SettlementTarget, TenderPurpose,
};
use gearbox_db::entities::{sea_orm_active_enums, settlement_transactions};
use gearbox_db::repositories::settlement::{
    SettlementRepoError, SettlementRepository, TenderInput,
};
use gearbox_shared::types::{DebtId, InvoiceId};

/// Creates the settlement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settlements", get(list_settlements))
        .route("/settlements/cash", post(settle_cash))
        .route("/settlements/bank-transfer", post(create_bank_transfer))
        .route("/settlements/gateway/callback", post(gateway_callback))
        .route("/settlements/{transaction_id}", get(get_settlement))
        .route("/settlements/{transaction_id}/cancel", post(cancel_settlement))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Reference to the invoice or debt a tender targets.
#[derive(Debug, Deserialize)]
pub struct TargetRef {
    /// Target kind: "invoice" or "debt".
    pub kind: String,
    /// Target ID.
    pub id: Uuid,
}

/// Request body for recording a tender.
#[derive(Debug, Deserialize)]
pub struct TenderRequest {
    /// The invoice or debt to pay down.
    pub target: TargetRef,
    /// Tender purpose: "deposit" or "payment".
    pub purpose: String,
    /// Tender amount (decimal string).
    pub amount: String,
    /// Staff member recording the tender.
    pub created_by: Uuid,
}

/// Query parameters for listing the audit trail of a target.
#[derive(Debug, Deserialize)]
pub struct ListSettlementsQuery {
    /// Target kind: "invoice" or "debt".
    pub kind: String,
    /// Target ID.
    pub id: Uuid,
}

/// Response for a settlement transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Target kind: "invoice" or "debt".
    pub target_kind: String,
    /// Target ID.
    pub target_id: Uuid,
    /// Payment method.
    pub method: String,
    /// Tender purpose.
    pub purpose: String,
    /// Tender amount.
    pub amount: String,
    /// Transaction status.
    pub status: String,
    /// Gateway reference, present for bank transfers.
    pub gateway_reference: Option<String>,
    /// True if a success callback overrode an earlier cancellation.
    pub cancellation_overridden: bool,
    /// Staff member who recorded the tender.
    pub created_by: Uuid,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<settlement_transactions::Model> for TransactionResponse {
    fn from(m: settlement_transactions::Model) -> Self {
        let (target_kind, target_id) = match m.target_kind {
            sea_orm_active_enums::SettlementTargetKind::Invoice => {
                ("invoice", m.invoice_id.unwrap_or_default())
            }
            sea_orm_active_enums::SettlementTargetKind::Debt => {
                ("debt", m.debt_id.unwrap_or_default())
            }
        };
        Self {
            id: m.id,
            target_kind: target_kind.to_string(),
            target_id,
            method: PaymentMethod::from(m.method).as_str().to_string(),
            purpose: TenderPurpose::from(m.purpose).as_str().to_string(),
            amount: m.amount.to_string(),
            status: SettlementStatus::from(m.status).as_str().to_string(),
            gateway_reference: m.gateway_reference,
            cancellation_overridden: m.cancellation_overridden,
            created_by: m.created_by,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

/// Maps a repository error onto an HTTP response.
pub(crate) fn repo_error(e: SettlementRepoError) -> Response {
    if let SettlementRepoError::Database(ref db_err) = e {
        error!(error = %db_err, "settlement database operation failed");
        return error_response(500, e.error_code(), "An error occurred".to_string());
    }
    error_response(e.http_status_code(), e.error_code(), e.to_string())
}

/// Builds a typed target from a request reference.
fn parse_target(kind: &str, id: Uuid) -> Option<SettlementTarget> {
    match kind.to_lowercase().as_str() {
        "invoice" => Some(SettlementTarget::Invoice(InvoiceId::from_uuid(id))),
        "debt" => Some(SettlementTarget::Debt(DebtId::from_uuid(id))),
        _ => None,
    }
}

/// Parses the shared fields of a tender request.
fn parse_tender(payload: &TenderRequest) -> Result<TenderInput, Response> {
    let Some(target) = parse_target(&payload.target.kind, payload.target.id) else {
        return Err(bad_request(
            "INVALID_TARGET_KIND",
            "target kind must be \"invoice\" or \"debt\"",
        ));
    };
    let Some(purpose) = TenderPurpose::parse(&payload.purpose) else {
        return Err(bad_request(
            "INVALID_PURPOSE",
            "purpose must be \"deposit\" or \"payment\"",
        ));
    };
    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return Err(bad_request("INVALID_AMOUNT", "amount is not a valid decimal"));
    };

    Ok(TenderInput {
        target,
        purpose,
        amount,
        created_by: payload.created_by,
    })
}

/// Names a callback resolution for the response body.
fn action_name(action: CallbackAction) -> &'static str {
    match action {
        CallbackAction::Confirm => "confirmed",
        CallbackAction::ConfirmAfterCancellation => "confirmed_after_cancellation",
        CallbackAction::MarkFailed => "marked_failed",
        CallbackAction::AlreadySettled => "already_settled",
        CallbackAction::NoEffect => "no_effect",
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/settlements/cash` - Settle a cash tender synchronously.
async fn settle_cash(
    State(state): State<AppState>,
    Json(payload): Json<TenderRequest>,
) -> impl IntoResponse {
    let input = match parse_tender(&payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let repo = SettlementRepository::new((*state.db).clone());
    match repo.settle_cash(input).await {
        Ok(settlement) => (
            StatusCode::CREATED,
            Json(json!({
                "transaction": TransactionResponse::from(settlement.transaction),
                "clamped": settlement.clamped
            })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// POST `/settlements/bank-transfer` - Create a hosted checkout and
/// record the pending bank-transfer tender.
async fn create_bank_transfer(
    State(state): State<AppState>,
    Json(payload): Json<TenderRequest>,
) -> impl IntoResponse {
    let input = match parse_tender(&payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let repo = SettlementRepository::new((*state.db).clone());

    // Refuse the tender before paying for a gateway round trip.
    if let Err(e) = repo.validate_transfer(&input).await {
        return repo_error(e);
    }

    let invoice_ref = match input.target {
        SettlementTarget::Invoice(id) => format!("invoice:{id}"),
        SettlementTarget::Debt(id) => format!("debt:{id}"),
    };
    let session = match state
        .gateway
        .create_checkout(CheckoutRequest {
            amount: input.amount,
            invoice_ref,
            return_url: state.return_url.to_string(),
        })
        .await
    {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "checkout creation failed");
            return error_response(e.http_status_code(), e.error_code(), e.to_string());
        }
    };

    match repo
        .create_pending_transfer(input, session.gateway_reference)
        .await
    {
        Ok(transaction) => (
            StatusCode::CREATED,
            Json(json!({
                "transaction": TransactionResponse::from(transaction),
                "checkout_url": session.checkout_url
            })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// POST `/settlements/gateway/callback` - Resolve an asynchronous
/// gateway confirmation. Safe to replay.
async fn gateway_callback(
    State(state): State<AppState>,
    Json(callback): Json<GatewayCallback>,
) -> impl IntoResponse {
    let repo = SettlementRepository::new((*state.db).clone());

    match repo.confirm_gateway_callback(&callback).await {
        Ok(resolution) => (
            StatusCode::OK,
            Json(json!({
                "action": action_name(resolution.action),
                "transaction": TransactionResponse::from(resolution.transaction)
            })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// POST `/settlements/{transaction_id}/cancel` - Cancel a pending
/// bank-transfer tender before its callback arrives.
async fn cancel_settlement(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = SettlementRepository::new((*state.db).clone());

    match repo.cancel_transaction(transaction_id).await {
        Ok(transaction) => (
            StatusCode::OK,
            Json(json!({ "transaction": TransactionResponse::from(transaction) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// GET `/settlements/{transaction_id}` - Fetch a settlement transaction.
async fn get_settlement(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = SettlementRepository::new((*state.db).clone());

    match repo.find_transaction(transaction_id).await {
        Ok(transaction) => (
            StatusCode::OK,
            Json(json!({ "transaction": TransactionResponse::from(transaction) })),
        )
            .into_response(),
        Err(e) => repo_error(e),
    }
}

/// GET `/settlements?kind=invoice&id=...` - List the audit trail of
/// tenders against a target, oldest first.
async fn list_settlements(
    State(state): State<AppState>,
    Query(query): Query<ListSettlementsQuery>,
) -> impl IntoResponse {
    let Some(target) = parse_target(&query.kind, query.id) else {
        return bad_request(
            "INVALID_TARGET_KIND",
            "target kind must be \"invoice\" or \"debt\"",
        );
    };

    let repo = SettlementRepository::new((*state.db).clone());
    match repo.list_for_target(target).await {
        Ok(transactions) => {
            let items: Vec<TransactionResponse> = transactions
                .into_iter()
                .map(TransactionResponse::from)
                .collect();
            (StatusCode::OK, Json(json!({ "transactions": items }))).into_response()
        }
        Err(e) => repo_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("invoice", true)]
    #[case("debt", true)]
    #[case("DEBT", true)]
    #[case("voucher", false)]
    fn test_parse_target(#[case] kind: &str, #[case] ok: bool) {
        assert_eq!(parse_target(kind, Uuid::nil()).is_some(), ok);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(action_name(CallbackAction::Confirm), "confirmed");
        assert_eq!(
            action_name(CallbackAction::ConfirmAfterCancellation),
            "confirmed_after_cancellation"
        );
        assert_eq!(action_name(CallbackAction::AlreadySettled), "already_settled");
    }
}
