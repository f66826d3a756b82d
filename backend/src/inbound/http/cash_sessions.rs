//! Cash session marker, expense and report handlers.
//!
//! ```text
//! GET  /api/v1/cash-session
//! POST /api/v1/cash-sessions/{sessionId}/expenses {"concept":"Taxi","amount":"12000"}
//! GET  /api/v1/cash-sessions/{sessionId}/expenses
//! GET  /api/v1/cash-sessions/{sessionId}/report
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::CashSessionId;
use crate::domain::ports::{
    AddExpenseRequest, CurrentSessionRequest, CurrentSessionResponse, ListExpensesRequest,
    SessionReportRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::ledger_dto::{
    CashSessionBody, ExpenseBody, OwnershipBody, ReconciliationReportBody,
};
use crate::inbound::http::registers::drop_marker_if_closed;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{AmountInput, FieldName, parse_id, parse_money};

/// Terminal marker resolved against the ledger.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSessionBody {
    /// `none`, `active` or `stale`. A stale marker has been cleared.
    #[schema(example = "active")]
    pub status: String,
    /// Marker that was resolved.
    pub ownership: Option<OwnershipBody>,
    /// The open session when active.
    pub session: Option<CashSessionBody>,
}

/// Request payload for recording an expense.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddExpenseBody {
    /// What the money was spent on.
    #[schema(example = "Taxi")]
    pub concept: String,
    /// Positive amount.
    #[schema(value_type = String, example = "12000")]
    pub amount: AmountInput,
}

/// Expenses of a session with their total.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListBody {
    /// Expenses in recording order.
    pub expenses: Vec<ExpenseBody>,
    /// Sum of the listed amounts.
    #[schema(example = "15000")]
    pub total: String,
}

fn session_id_from_path(path: &str) -> ApiResult<CashSessionId> {
    parse_id(path, FieldName::new("sessionId"))
}

/// Resolve this terminal's marker, clearing it when it no longer points at
/// an open session of the caller.
#[utoipa::path(
    get,
    path = "/api/v1/cash-session",
    responses(
        (status = 200, description = "Marker state", body = CurrentSessionBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["cash-sessions"],
    operation_id = "currentCashSession"
)]
#[get("/cash-session")]
pub async fn current_cash_session(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CurrentSessionBody>> {
    let user_id = session.require_user_id()?;
    let ownership = session.ownership()?;
    let response = state
        .cash_sessions
        .current_session(CurrentSessionRequest { user_id, ownership })
        .await?;

    let body = match response {
        CurrentSessionResponse::None => CurrentSessionBody {
            status: "none".to_owned(),
            ownership: None,
            session: None,
        },
        CurrentSessionResponse::Active {
            ownership,
            session: active,
        } => CurrentSessionBody {
            status: "active".to_owned(),
            ownership: Some(OwnershipBody::from(&ownership)),
            session: Some(CashSessionBody::from(&active)),
        },
        CurrentSessionResponse::Stale { ownership } => {
            debug!(session_id = %ownership.session_id, "clearing stale cash session marker");
            session.clear_ownership();
            CurrentSessionBody {
                status: "stale".to_owned(),
                ownership: Some(OwnershipBody::from(&ownership)),
                session: None,
            }
        }
    };
    Ok(web::Json(body))
}

/// Record an expense against the caller's open session.
#[utoipa::path(
    post,
    path = "/api/v1/cash-sessions/{session_id}/expenses",
    params(("session_id" = String, Path, description = "Cash session identifier")),
    request_body = AddExpenseBody,
    responses(
        (status = 201, description = "Expense recorded", body = ExpenseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Session not owned by caller", body = ErrorSchema),
        (status = 404, description = "Unknown session", body = ErrorSchema),
        (status = 409, description = "Session closed", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["cash-sessions"],
    operation_id = "addExpense"
)]
#[post("/cash-sessions/{session_id}/expenses")]
pub async fn add_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AddExpenseBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let session_id = session_id_from_path(&path)?;
    let AddExpenseBody {
        concept,
        amount: raw_amount,
    } = payload.into_inner();
    let amount = parse_money(&raw_amount, FieldName::new("amount"))?;
    let ownership = session.ownership()?;

    let result = state
        .expenses
        .add_expense(AddExpenseRequest {
            session_id,
            user_id,
            concept,
            amount,
            ownership,
        })
        .await;
    match result {
        Ok(response) => Ok(HttpResponse::Created().json(ExpenseBody::from(&response.expense))),
        Err(error) => {
            drop_marker_if_closed(&session, &error, session_id)?;
            Err(error)
        }
    }
}

/// List a session's expenses in recording order.
#[utoipa::path(
    get,
    path = "/api/v1/cash-sessions/{session_id}/expenses",
    params(("session_id" = String, Path, description = "Cash session identifier")),
    responses(
        (status = 200, description = "Expenses", body = ExpenseListBody),
        (status = 400, description = "Invalid session id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown session", body = ErrorSchema)
    ),
    tags = ["cash-sessions"],
    operation_id = "listExpenses"
)]
#[get("/cash-sessions/{session_id}/expenses")]
pub async fn list_expenses(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ExpenseListBody>> {
    session.require_user_id()?;
    let session_id = session_id_from_path(&path)?;
    let response = state
        .expenses_query
        .list_expenses(ListExpensesRequest { session_id })
        .await?;
    Ok(web::Json(ExpenseListBody {
        expenses: response.expenses.iter().map(ExpenseBody::from).collect(),
        total: response.total.to_string(),
    }))
}

/// Recompute the closing report of a closed session.
#[utoipa::path(
    get,
    path = "/api/v1/cash-sessions/{session_id}/report",
    params(("session_id" = String, Path, description = "Cash session identifier")),
    responses(
        (status = 200, description = "Reconciliation report", body = ReconciliationReportBody),
        (status = 400, description = "Invalid session id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown session", body = ErrorSchema),
        (status = 409, description = "Session still open", body = ErrorSchema)
    ),
    tags = ["cash-sessions"],
    operation_id = "sessionReport"
)]
#[get("/cash-sessions/{session_id}/report")]
pub async fn session_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReconciliationReportBody>> {
    session.require_user_id()?;
    let session_id = session_id_from_path(&path)?;
    let report = state
        .reports
        .session_report(SessionReportRequest { session_id })
        .await?;
    Ok(web::Json(ReconciliationReportBody::from(&report)))
}

#[cfg(test)]
#[path = "cash_sessions_tests.rs"]
mod tests;
