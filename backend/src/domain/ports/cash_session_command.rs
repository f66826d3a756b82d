//! Driving ports for the register open/close lifecycle.

use async_trait::async_trait;

use crate::domain::{
    CashSession, CashSessionId, Error, Money, ReconciliationReport, RegisterId, SessionOwnership,
    UserId,
};

/// Request to open (or re-attach to) a register session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRegisterRequest {
    /// Register to open.
    pub register_id: RegisterId,
    /// Authenticated operator.
    pub user_id: UserId,
    /// Opening float.
    pub initial_amount: Money,
    /// Marker currently held by the calling terminal.
    pub ownership: Option<SessionOwnership>,
}

/// Response for a successful open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRegisterResponse {
    /// The open session.
    pub session: CashSession,
    /// `true` when the caller's existing session was returned.
    pub reattached: bool,
    /// Marker the terminal must persist.
    pub ownership: SessionOwnership,
    /// Marker for a different, still open register that this open replaces.
    pub previous_ownership: Option<SessionOwnership>,
}

/// Request to close a session and reconcile it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseRegisterRequest {
    /// Register being closed.
    pub register_id: RegisterId,
    /// Session being closed.
    pub session_id: CashSessionId,
    /// Authenticated operator.
    pub user_id: UserId,
    /// Cash counted in the drawer.
    pub counted_amount: Money,
    /// Marker currently held by the calling terminal.
    pub ownership: Option<SessionOwnership>,
}

/// Response for a successful close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseRegisterResponse {
    /// Reconciliation of the closed session.
    pub report: ReconciliationReport,
}

/// Request to resolve the terminal's marker against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSessionRequest {
    /// Authenticated operator.
    pub user_id: UserId,
    /// Marker currently held by the calling terminal.
    pub ownership: Option<SessionOwnership>,
}

/// Outcome of resolving a terminal marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentSessionResponse {
    /// The terminal holds no marker.
    None,
    /// The marked session is open and owned by the caller.
    Active {
        /// The marker that resolved.
        ownership: SessionOwnership,
        /// The open session.
        session: CashSession,
    },
    /// The marked session is closed, missing or owned by someone else; the
    /// terminal must drop the marker.
    Stale {
        /// The marker to drop.
        ownership: SessionOwnership,
    },
}

/// Domain use-case port for opening and closing registers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CashSessionCommand: Send + Sync {
    /// Open a register or re-attach to the caller's open session.
    async fn open_register(
        &self,
        request: OpenRegisterRequest,
    ) -> Result<OpenRegisterResponse, Error>;

    /// Close the terminal's session and reconcile it.
    async fn close_register(
        &self,
        request: CloseRegisterRequest,
    ) -> Result<CloseRegisterResponse, Error>;

    /// Resolve the terminal marker against the ledger.
    async fn current_session(
        &self,
        request: CurrentSessionRequest,
    ) -> Result<CurrentSessionResponse, Error>;
}

/// Request to reprint the report of a closed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReportRequest {
    /// Closed session to report on.
    pub session_id: CashSessionId,
}

/// Domain use-case port for reading closing reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionReportQuery: Send + Sync {
    /// Rebuild the reconciliation of a closed session.
    async fn session_report(
        &self,
        request: SessionReportRequest,
    ) -> Result<ReconciliationReport, Error>;
}
