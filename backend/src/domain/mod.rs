//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed cash register entities and the services
//! that drive the session lifecycle. Types here are transport agnostic;
//! inbound and outbound adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure envelope.
//! - Register, CashSession, Expense, Money: ledger entities.
//! - reconcile / ReconciliationReport: closing arithmetic.
//! - CashSessionService, MovementLedgerService, SessionDirectoryService:
//!   driving port implementations over a `LedgerStore`.

pub mod auth;
pub mod cash_register;
mod cash_session_service;
pub mod error;
pub mod ledger_errors;
mod movement_ledger_service;
pub mod ports;
mod session_directory_service;
pub mod trace_id;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::cash_register::{
    CashRegisterValidationError, CashSession, CashSessionDraft, CashSessionId, Classification,
    Expense, ExpenseConcept, ExpenseDraft, ExpenseId, IdentifierError, MONEY_MAX_INTEGER_DIGITS,
    MONEY_MAX_SCALE, Money, MoneyError, REGISTER_NAME_MAX_LEN, ReconciliationError,
    ReconciliationInput, ReconciliationReport, Register, RegisterActions, RegisterAvailability,
    RegisterId, RegisterName, RegisterSnapshot, RegisterSummary, SessionClosure,
    SessionOwnership, SessionStatus, reconcile,
};
pub use self::cash_session_service::CashSessionService;
pub use self::error::{DomainError, Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::movement_ledger_service::MovementLedgerService;
pub use self::session_directory_service::SessionDirectoryService;
pub use self::trace_id::TraceId;
pub use self::user::{UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use caja::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
