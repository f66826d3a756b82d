//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every register, cash session, login and health
//! endpoint together with the request/response bodies. Domain types stay
//! free of utoipa derives; the inbound layer provides schema wrappers such as
//! [`ErrorSchema`].

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::cash_sessions::{AddExpenseBody, CurrentSessionBody, ExpenseListBody};
use crate::inbound::http::ledger_dto::{
    CashSessionBody, ExpenseBody, OpenSessionBody, OwnershipBody, ReconciliationReportBody,
    RegisterActionsBody, RegisterSummaryBody, SessionSummaryBody,
};
use crate::inbound::http::registers::{
    CloseRegisterBody, OpenRegisterBody, OpenRegisterResponseBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::LoginRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /api/v1/login; also carries the cash session marker.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Caja API",
        description = "Cash register sessions: open, record expenses, close and reconcile."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::registers::list_registers,
        crate::inbound::http::registers::list_register_sessions,
        crate::inbound::http::registers::open_register,
        crate::inbound::http::registers::close_register,
        crate::inbound::http::cash_sessions::current_cash_session,
        crate::inbound::http::cash_sessions::add_expense,
        crate::inbound::http::cash_sessions::list_expenses,
        crate::inbound::http::cash_sessions::session_report,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        LoginRequest,
        OwnershipBody,
        CashSessionBody,
        OpenSessionBody,
        RegisterActionsBody,
        RegisterSummaryBody,
        SessionSummaryBody,
        ExpenseBody,
        ReconciliationReportBody,
        OpenRegisterBody,
        OpenRegisterResponseBody,
        CloseRegisterBody,
        CurrentSessionBody,
        AddExpenseBody,
        ExpenseListBody,
    )),
    tags(
        (name = "users", description = "Operator login"),
        (name = "registers", description = "Register picker, open and close"),
        (name = "cash-sessions", description = "Expenses and reconciliation reports"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
/// OpenAPI document for the REST API.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/registers")]
    #[case("/api/v1/registers/{register_id}/sessions")]
    #[case("/api/v1/registers/{register_id}/open")]
    #[case("/api/v1/registers/{register_id}/close")]
    #[case("/api/v1/cash-session")]
    #[case("/api/v1/cash-sessions/{session_id}/expenses")]
    #[case("/api/v1/cash-sessions/{session_id}/report")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_endpoint_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn report_schema_exposes_reconciliation_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let report = schemas
            .get("ReconciliationReportBody")
            .expect("report schema");
        for field in ["theoreticalBalance", "discrepancy", "classification"] {
            assert_object_schema_has_field(report, field);
        }
    }

    #[rstest]
    fn register_schema_exposes_open_and_mine_flags() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let register = schemas.get("RegisterSummaryBody").expect("register schema");
        for field in ["id", "name", "isOpen", "isMine"] {
            assert_object_schema_has_field(register, field);
        }
    }
}
