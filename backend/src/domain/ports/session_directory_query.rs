//! Driving port for the register picker and session history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CashSession, CashSessionId, Error, RegisterId, RegisterSummary, SessionOwnership,
    SessionStatus, UserId,
};

/// Request for the register picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRegistersRequest {
    /// Authenticated operator.
    pub user_id: UserId,
    /// Marker currently held by the calling terminal.
    pub ownership: Option<SessionOwnership>,
}

/// Registers as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRegistersResponse {
    /// Registers ordered by name.
    pub registers: Vec<RegisterSummary>,
}

/// Request for one register's session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSessionsRequest {
    /// Register to list.
    pub register_id: RegisterId,
}

/// One row of a register's session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Session identifier.
    pub session_id: CashSessionId,
    /// Open or closed.
    pub status: SessionStatus,
    /// Operator who opened the session.
    pub opened_by: UserId,
    /// Opening timestamp.
    pub opened_at: DateTime<Utc>,
    /// Closing timestamp, if closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<&CashSession> for SessionSummary {
    fn from(value: &CashSession) -> Self {
        Self {
            session_id: value.id(),
            status: value.status(),
            opened_by: value.opened_by().clone(),
            opened_at: value.opened_at(),
            closed_at: value.closure().map(|closure| closure.closed_at),
        }
    }
}

/// Session history of a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSessionsResponse {
    /// Sessions, newest first.
    pub sessions: Vec<SessionSummary>,
}

/// Domain use-case port for read-only register and session listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionDirectoryQuery: Send + Sync {
    /// Every register with its availability for the caller.
    async fn list_registers(
        &self,
        request: ListRegistersRequest,
    ) -> Result<ListRegistersResponse, Error>;

    /// Sessions of one register.
    async fn list_sessions_for_register(
        &self,
        request: ListSessionsRequest,
    ) -> Result<ListSessionsResponse, Error>;
}
