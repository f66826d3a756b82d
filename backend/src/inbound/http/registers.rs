//! Register picker and open/close handlers.
//!
//! ```text
//! GET  /api/v1/registers
//! GET  /api/v1/registers/{registerId}/sessions
//! POST /api/v1/registers/{registerId}/open  {"initialAmount":"100000"}
//! POST /api/v1/registers/{registerId}/close {"sessionId":"…","countedAmount":"135000"}
//! ```
//!
//! Open stores the returned (register, session) pair as the terminal's
//! marker; close clears it once the report has been produced.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ledger_errors::reason;
use crate::domain::ports::{
    CloseRegisterRequest, ListRegistersRequest, ListSessionsRequest, OpenRegisterRequest,
};
use crate::domain::{CashSessionId, Error, RegisterId, SessionOwnership};
use crate::inbound::http::ApiResult;
use crate::inbound::http::ledger_dto::{
    CashSessionBody, OwnershipBody, ReconciliationReportBody, RegisterSummaryBody,
    SessionSummaryBody,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{AmountInput, FieldName, parse_id, parse_money};

/// Request payload for opening a register.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenRegisterBody {
    /// Opening float; zero is allowed.
    #[schema(value_type = String, example = "100000")]
    pub initial_amount: AmountInput,
}

/// Response payload for a successful open.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenRegisterResponseBody {
    /// The open session.
    pub session: CashSessionBody,
    /// `true` when the caller's already open session was returned instead
    /// of starting a new one.
    pub reattached: bool,
    /// Marker now stored in the terminal cookie.
    pub ownership: OwnershipBody,
    /// Marker for another still open register that this terminal held
    /// before the open.
    pub previous_ownership: Option<OwnershipBody>,
}

/// Request payload for closing a register.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseRegisterBody {
    /// Session to close.
    #[schema(format = "uuid")]
    pub session_id: String,
    /// Cash counted in the drawer.
    #[schema(value_type = String, example = "135000")]
    pub counted_amount: AmountInput,
}

/// Clear the terminal's marker when the ledger reports that the marked
/// session is already closed.
pub(crate) fn drop_marker_if_closed(
    session: &SessionContext,
    error: &Error,
    session_id: CashSessionId,
) -> ApiResult<()> {
    let closed = matches!(
        error.reason(),
        Some(reason::SESSION_ALREADY_CLOSED | reason::SESSION_CLOSED)
    );
    if closed
        && session
            .ownership()?
            .is_some_and(|marker| marker.session_id == session_id)
    {
        session.clear_ownership();
    }
    Ok(())
}

/// List registers with their availability for the calling terminal.
#[utoipa::path(
    get,
    path = "/api/v1/registers",
    responses(
        (status = 200, description = "Registers", body = [RegisterSummaryBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["registers"],
    operation_id = "listRegisters"
)]
#[get("/registers")]
pub async fn list_registers(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<RegisterSummaryBody>>> {
    let user_id = session.require_user_id()?;
    let ownership = session.ownership()?;
    let response = state
        .directory
        .list_registers(ListRegistersRequest { user_id, ownership })
        .await?;
    Ok(web::Json(
        response
            .registers
            .iter()
            .map(RegisterSummaryBody::from)
            .collect(),
    ))
}

/// List a register's sessions, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/registers/{register_id}/sessions",
    params(("register_id" = String, Path, description = "Register identifier")),
    responses(
        (status = 200, description = "Session history", body = [SessionSummaryBody]),
        (status = 400, description = "Invalid register id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown register", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["registers"],
    operation_id = "listRegisterSessions"
)]
#[get("/registers/{register_id}/sessions")]
pub async fn list_register_sessions(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<SessionSummaryBody>>> {
    session.require_user_id()?;
    let register_id: RegisterId = parse_id(&path, FieldName::new("registerId"))?;
    let response = state
        .directory
        .list_sessions_for_register(ListSessionsRequest { register_id })
        .await?;
    Ok(web::Json(
        response
            .sessions
            .iter()
            .map(SessionSummaryBody::from)
            .collect(),
    ))
}

/// Open a register, or re-attach to the caller's own open session.
#[utoipa::path(
    post,
    path = "/api/v1/registers/{register_id}/open",
    params(("register_id" = String, Path, description = "Register identifier")),
    request_body = OpenRegisterBody,
    responses(
        (status = 201, description = "Session opened", body = OpenRegisterResponseBody),
        (status = 200, description = "Re-attached to the caller's open session", body = OpenRegisterResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown register", body = ErrorSchema),
        (status = 409, description = "Register already open by another operator", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["registers"],
    operation_id = "openRegister"
)]
#[post("/registers/{register_id}/open")]
pub async fn open_register(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<OpenRegisterBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let register_id: RegisterId = parse_id(&path, FieldName::new("registerId"))?;
    let initial_amount = parse_money(&payload.initial_amount, FieldName::new("initialAmount"))?;
    let ownership = session.ownership()?;

    let response = state
        .cash_sessions
        .open_register(OpenRegisterRequest {
            register_id,
            user_id,
            initial_amount,
            ownership,
        })
        .await?;
    session.set_ownership(&response.ownership)?;

    let body = OpenRegisterResponseBody {
        session: CashSessionBody::from(&response.session),
        reattached: response.reattached,
        ownership: OwnershipBody::from(&response.ownership),
        previous_ownership: response
            .previous_ownership
            .as_ref()
            .map(OwnershipBody::from),
    };
    let mut builder = if response.reattached {
        HttpResponse::Ok()
    } else {
        HttpResponse::Created()
    };
    Ok(builder.json(body))
}

/// Close the caller's session and return its reconciliation report.
#[utoipa::path(
    post,
    path = "/api/v1/registers/{register_id}/close",
    params(("register_id" = String, Path, description = "Register identifier")),
    request_body = CloseRegisterBody,
    responses(
        (status = 200, description = "Session closed", body = ReconciliationReportBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Session not owned by caller", body = ErrorSchema),
        (status = 404, description = "Unknown register or session", body = ErrorSchema),
        (status = 409, description = "Session already closed", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["registers"],
    operation_id = "closeRegister"
)]
#[post("/registers/{register_id}/close")]
pub async fn close_register(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CloseRegisterBody>,
) -> ApiResult<web::Json<ReconciliationReportBody>> {
    let user_id = session.require_user_id()?;
    let register_id: RegisterId = parse_id(&path, FieldName::new("registerId"))?;
    let body = payload.into_inner();
    let session_id: CashSessionId = parse_id(&body.session_id, FieldName::new("sessionId"))?;
    let counted_amount = parse_money(&body.counted_amount, FieldName::new("countedAmount"))?;
    let ownership = session.ownership()?;

    let result = state
        .cash_sessions
        .close_register(CloseRegisterRequest {
            register_id,
            session_id,
            user_id,
            counted_amount,
            ownership,
        })
        .await;
    let response = match result {
        Ok(response) => response,
        Err(error) => {
            drop_marker_if_closed(&session, &error, session_id)?;
            return Err(error);
        }
    };

    if session
        .ownership()?
        .is_some_and(|marker| marker == SessionOwnership::new(register_id, session_id))
    {
        session.clear_ownership();
    }
    Ok(web::Json(ReconciliationReportBody::from(&response.report)))
}

#[cfg(test)]
#[path = "registers_tests.rs"]
mod tests;
