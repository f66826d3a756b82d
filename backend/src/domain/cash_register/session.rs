//! Cash session entity and closure state.

use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::{CashRegisterValidationError, CashSessionId, Money, RegisterId};

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Accepting movements.
    Open,
    /// Closed and immutable.
    Closed,
}

impl SessionStatus {
    /// Stable lowercase label used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Closure facts frozen when a session is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClosure {
    /// When the session was closed.
    pub closed_at: DateTime<Utc>,
    /// Operator who closed it.
    pub closed_by: UserId,
    /// Cash physically counted in the drawer.
    pub counted_amount: Money,
}

/// Input payload for [`CashSession::new`].
#[derive(Debug, Clone)]
pub struct CashSessionDraft {
    /// Session identifier.
    pub id: CashSessionId,
    /// Register the session belongs to.
    pub register_id: RegisterId,
    /// Operator who opened the session.
    pub opened_by: UserId,
    /// Opening timestamp.
    pub opened_at: DateTime<Utc>,
    /// Opening float placed in the drawer.
    pub initial_amount: Money,
    /// Closure facts, `None` while open.
    pub closure: Option<SessionClosure>,
}

/// One open/close cycle of a register.
///
/// A session without a [`SessionClosure`] is open. Closure facts are set
/// exactly once through [`CashSession::close`].
///
/// # Examples
/// ```
/// use caja::domain::{CashSession, CashSessionDraft, CashSessionId, Money, RegisterId, UserId};
/// use chrono::Utc;
///
/// let session = CashSession::new(CashSessionDraft {
///     id: CashSessionId::random(),
///     register_id: RegisterId::random(),
///     opened_by: UserId::random(),
///     opened_at: Utc::now(),
///     initial_amount: "100".parse().expect("valid amount"),
///     closure: None,
/// })
/// .expect("valid session");
/// assert!(session.is_open());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashSession {
    id: CashSessionId,
    register_id: RegisterId,
    opened_by: UserId,
    opened_at: DateTime<Utc>,
    initial_amount: Money,
    closure: Option<SessionClosure>,
}

impl CashSession {
    /// Build a validated session from persisted or freshly opened values.
    pub fn new(draft: CashSessionDraft) -> Result<Self, CashRegisterValidationError> {
        if draft
            .closure
            .as_ref()
            .is_some_and(|closure| closure.closed_at < draft.opened_at)
        {
            return Err(CashRegisterValidationError::ClosedBeforeOpened);
        }
        Ok(Self {
            id: draft.id,
            register_id: draft.register_id,
            opened_by: draft.opened_by,
            opened_at: draft.opened_at,
            initial_amount: draft.initial_amount,
            closure: draft.closure,
        })
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> CashSessionId {
        self.id
    }

    /// Register the session belongs to.
    #[must_use]
    pub const fn register_id(&self) -> RegisterId {
        self.register_id
    }

    /// Operator who opened the session.
    #[must_use]
    pub const fn opened_by(&self) -> &UserId {
        &self.opened_by
    }

    /// Opening timestamp.
    #[must_use]
    pub const fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Opening float.
    #[must_use]
    pub const fn initial_amount(&self) -> Money {
        self.initial_amount
    }

    /// Closure facts, if the session is closed.
    #[must_use]
    pub const fn closure(&self) -> Option<&SessionClosure> {
        self.closure.as_ref()
    }

    /// Lifecycle status derived from the closure.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        if self.closure.is_some() {
            SessionStatus::Closed
        } else {
            SessionStatus::Open
        }
    }

    /// Whether the session still accepts movements.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.closure.is_none()
    }

    /// Whether `user` opened this session.
    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.opened_by == user
    }

    /// Freeze closure facts, returning the closed session.
    ///
    /// Fails when the session is already closed or when the closure predates
    /// the opening.
    pub fn close(&self, closure: SessionClosure) -> Result<Self, CashRegisterValidationError> {
        if self.closure.is_some() {
            return Err(CashRegisterValidationError::SessionAlreadyClosed);
        }
        if closure.closed_at < self.opened_at {
            return Err(CashRegisterValidationError::ClosedBeforeOpened);
        }
        Ok(Self {
            closure: Some(closure),
            ..self.clone()
        })
    }
}
