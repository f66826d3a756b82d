//! Driven port for cash register, session and expense persistence.
//!
//! Adapters own atomicity: `open_session`, `close_session` and
//! `add_expense` each succeed or fail as a whole, and concurrent opens on
//! the same register must leave at most one open session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CashSession, CashSessionId, Expense, Money, Register, RegisterId, RegisterSnapshot,
    SessionClosure, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger store adapters.
    pub enum LedgerStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "ledger store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "ledger store query failed: {message}",
        /// The register does not exist.
        RegisterNotFound { register_id: RegisterId } =>
            "register {register_id} not found",
        /// The session does not exist or belongs to another register.
        SessionNotFound { session_id: CashSessionId } =>
            "cash session {session_id} not found",
        /// Another operator holds the open session of this register.
        RegisterAlreadyOpenByOther { register_id: RegisterId } =>
            "register {register_id} is already open by another operator",
        /// The session was closed before this close attempt committed.
        SessionAlreadyClosed { session_id: CashSessionId } =>
            "cash session {session_id} is already closed",
        /// The session is closed and accepts no further movements.
        SessionClosed { session_id: CashSessionId } =>
            "cash session {session_id} is closed",
        /// The session is open but was opened by a different operator.
        SessionOwnedByOther { session_id: CashSessionId } =>
            "cash session {session_id} belongs to another operator",
    }
}

/// Values for a session about to be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCashSession {
    /// Identifier for the new row.
    pub session_id: CashSessionId,
    /// Register to open.
    pub register_id: RegisterId,
    /// Opening operator.
    pub opened_by: UserId,
    /// Opening timestamp.
    pub opened_at: DateTime<Utc>,
    /// Opening float.
    pub initial_amount: Money,
}

/// Result of [`LedgerStore::open_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSessionOutcome {
    /// The open session.
    pub session: CashSession,
    /// `true` when the caller already held the open session and no row was
    /// written.
    pub reattached: bool,
}

/// Conditional close of an open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseCashSession {
    /// Register the session must belong to.
    pub register_id: RegisterId,
    /// Session to close.
    pub session_id: CashSessionId,
    /// Closure facts to write.
    pub closure: SessionClosure,
}

/// Everything needed to reconcile a session, read in the closing
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedSessionRecord {
    /// Register of the session.
    pub register: Register,
    /// The session after closing.
    pub session: CashSession,
    /// Expenses in recording order.
    pub expenses: Vec<Expense>,
    /// Sales attributed to the session.
    pub sales_total: Money,
}

/// Port for reading and mutating the cash ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Every register with its open session, ordered by name.
    async fn list_registers(&self) -> Result<Vec<RegisterSnapshot>, LedgerStoreError>;

    /// Look up a register by id.
    async fn find_register(
        &self,
        register_id: &RegisterId,
    ) -> Result<Option<Register>, LedgerStoreError>;

    /// Sessions of a register, newest first.
    async fn list_sessions_for_register(
        &self,
        register_id: &RegisterId,
    ) -> Result<Vec<CashSession>, LedgerStoreError>;

    /// Look up a session by id.
    async fn find_session(
        &self,
        session_id: &CashSessionId,
    ) -> Result<Option<CashSession>, LedgerStoreError>;

    /// Open a session, or return the caller's existing open session.
    async fn open_session(
        &self,
        request: &NewCashSession,
    ) -> Result<OpenSessionOutcome, LedgerStoreError>;

    /// Close a session only if it is still open and owned by
    /// `closure.closed_by`.
    async fn close_session(
        &self,
        request: &CloseCashSession,
    ) -> Result<ClosedSessionRecord, LedgerStoreError>;

    /// Append an expense to an open session.
    async fn add_expense(&self, expense: &Expense) -> Result<(), LedgerStoreError>;

    /// Expenses of a session in recording order.
    async fn list_expenses(
        &self,
        session_id: &CashSessionId,
    ) -> Result<Vec<Expense>, LedgerStoreError>;

    /// Sum of sales attributed to a session by the sales subsystem.
    async fn sales_total(&self, session_id: &CashSessionId) -> Result<Money, LedgerStoreError>;
}
