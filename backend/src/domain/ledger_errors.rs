//! Mapping from ledger store failures to domain errors.
//!
//! Conflict and ownership failures carry a stable `details.reason` so
//! clients can tell them apart without parsing messages; field validation
//! failures carry `details.field` and `details.code`.

use serde_json::json;

use crate::domain::{CashSessionId, Error};
use crate::domain::ports::LedgerStoreError;

/// Stable `details.reason` values.
pub mod reason {
    /// Another operator holds the register's open session.
    pub const REGISTER_ALREADY_OPEN_BY_OTHER: &str = "register_already_open_by_other";
    /// A close targeted a session that is already closed.
    pub const SESSION_ALREADY_CLOSED: &str = "session_already_closed";
    /// A movement targeted a closed session.
    pub const SESSION_CLOSED: &str = "session_closed";
    /// The caller does not own the session or its terminal marker.
    pub const SESSION_NOT_OWNED_BY_CALLER: &str = "session_not_owned_by_caller";
    /// A report was requested for a session that is still open.
    pub const SESSION_NOT_CLOSED: &str = "session_not_closed";
}

/// Stable `details.code` values for field validation failures.
pub mod field_code {
    /// Amount is malformed, not positive or out of range.
    pub const INVALID_AMOUNT: &str = "invalid_amount";
    /// Concept is blank or too long.
    pub const INVALID_CONCEPT: &str = "invalid_concept";
    /// Identifier is not a UUID.
    pub const INVALID_UUID: &str = "invalid_uuid";
}

/// Build an `invalid_request` error naming the offending field.
///
/// # Examples
/// ```
/// use caja::domain::{ErrorCode, ledger_errors::{field_code, invalid_field}};
///
/// let err = invalid_field("amount", field_code::INVALID_AMOUNT, "amount must be positive");
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// assert_eq!(err.details().and_then(|d| d["field"].as_str()), Some("amount"));
/// ```
#[must_use]
pub fn invalid_field(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

/// Build the `forbidden` error returned when the caller does not own the
/// session it is acting on.
#[must_use]
pub fn not_owned(message: impl Into<String>) -> Error {
    Error::forbidden(message).with_details(json!({ "reason": reason::SESSION_NOT_OWNED_BY_CALLER }))
}

/// Build the conflict returned when closing a session that is already
/// closed.
#[must_use]
pub fn already_closed(session_id: CashSessionId) -> Error {
    Error::conflict_with_reason(
        format!("cash session {session_id} is already closed"),
        reason::SESSION_ALREADY_CLOSED,
    )
}

/// Build the conflict returned when recording a movement against a closed
/// session.
#[must_use]
pub fn session_closed(session_id: CashSessionId) -> Error {
    Error::conflict_with_reason(
        format!("cash session {session_id} is closed"),
        reason::SESSION_CLOSED,
    )
}

pub(crate) fn map_ledger_error(error: LedgerStoreError) -> Error {
    match error {
        LedgerStoreError::Connection { message } => {
            Error::service_unavailable(format!("ledger store unavailable: {message}"))
        }
        LedgerStoreError::Query { message } => {
            Error::internal(format!("ledger store error: {message}"))
        }
        err @ (LedgerStoreError::RegisterNotFound { .. }
        | LedgerStoreError::SessionNotFound { .. }) => Error::not_found(err.to_string()),
        err @ LedgerStoreError::RegisterAlreadyOpenByOther { .. } => {
            Error::conflict_with_reason(err.to_string(), reason::REGISTER_ALREADY_OPEN_BY_OTHER)
        }
        err @ LedgerStoreError::SessionAlreadyClosed { .. } => {
            Error::conflict_with_reason(err.to_string(), reason::SESSION_ALREADY_CLOSED)
        }
        err @ LedgerStoreError::SessionClosed { .. } => {
            Error::conflict_with_reason(err.to_string(), reason::SESSION_CLOSED)
        }
        err @ LedgerStoreError::SessionOwnedByOther { .. } => not_owned(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::{CashSessionId, ErrorCode, RegisterId};

    #[rstest]
    #[case(LedgerStoreError::connection("down"), ErrorCode::ServiceUnavailable, None)]
    #[case(LedgerStoreError::query("bad"), ErrorCode::InternalError, None)]
    #[case(
        LedgerStoreError::register_not_found(RegisterId::random()),
        ErrorCode::NotFound,
        None
    )]
    #[case(
        LedgerStoreError::register_already_open_by_other(RegisterId::random()),
        ErrorCode::Conflict,
        Some(reason::REGISTER_ALREADY_OPEN_BY_OTHER)
    )]
    #[case(
        LedgerStoreError::session_already_closed(CashSessionId::random()),
        ErrorCode::Conflict,
        Some(reason::SESSION_ALREADY_CLOSED)
    )]
    #[case(
        LedgerStoreError::session_closed(CashSessionId::random()),
        ErrorCode::Conflict,
        Some(reason::SESSION_CLOSED)
    )]
    #[case(
        LedgerStoreError::session_owned_by_other(CashSessionId::random()),
        ErrorCode::Forbidden,
        Some(reason::SESSION_NOT_OWNED_BY_CALLER)
    )]
    fn maps_store_errors(
        #[case] error: LedgerStoreError,
        #[case] code: ErrorCode,
        #[case] expected_reason: Option<&str>,
    ) {
        let mapped = map_ledger_error(error);
        assert_eq!(mapped.code(), code);
        assert_eq!(mapped.reason(), expected_reason);
    }
}
