//! Terminal-local record of which session this client opened.

use super::{CashSessionId, RegisterId};

/// Marker persisted on the operator's terminal after a successful open.
///
/// The marker is advisory: the ledger remains the source of truth, but the
/// marker must match before the terminal is allowed to close a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionOwnership {
    /// Register the terminal opened.
    pub register_id: RegisterId,
    /// Session the terminal opened.
    pub session_id: CashSessionId,
}

impl SessionOwnership {
    /// Marker for `session_id` on `register_id`.
    #[must_use]
    pub fn new(register_id: RegisterId, session_id: CashSessionId) -> Self {
        Self {
            register_id,
            session_id,
        }
    }

    /// Whether the marker names exactly this register/session pair.
    #[must_use]
    pub fn matches(&self, register_id: RegisterId, session_id: CashSessionId) -> bool {
        self.register_id == register_id && self.session_id == session_id
    }
}
