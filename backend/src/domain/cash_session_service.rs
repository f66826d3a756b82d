//! Register open/close lifecycle service.
//!
//! Implements [`CashSessionCommand`] and [`SessionReportQuery`] over a
//! [`LedgerStore`]. Ownership is checked twice on close: the terminal marker
//! must name the session, and the ledger must record the caller as its
//! opener.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ledger_errors::{already_closed, map_ledger_error, not_owned, reason};
use crate::domain::ports::{
    CashSessionCommand, CloseCashSession, CloseRegisterRequest, CloseRegisterResponse,
    CurrentSessionRequest, CurrentSessionResponse, LedgerStore, LedgerStoreError, NewCashSession,
    OpenRegisterRequest, OpenRegisterResponse, SessionReportQuery, SessionReportRequest,
};
use crate::domain::{
    CashSession, CashSessionId, Error, ReconciliationError, ReconciliationInput,
    ReconciliationReport, SessionClosure, SessionOwnership, reconcile,
};

fn map_reconciliation_error(error: ReconciliationError) -> Error {
    match error {
        err @ ReconciliationError::SessionNotClosed { .. } => {
            Error::conflict_with_reason(err.to_string(), reason::SESSION_NOT_CLOSED)
        }
        err => Error::internal(format!("reconciliation failed: {err}")),
    }
}

/// Cash session service implementing the lifecycle driving ports.
#[derive(Clone)]
pub struct CashSessionService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> CashSessionService<S> {
    /// Create a new service over the ledger store.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> CashSessionService<S>
where
    S: LedgerStore,
{
    async fn require_session(&self, session_id: CashSessionId) -> Result<CashSession, Error> {
        self.store
            .find_session(&session_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| Error::not_found(format!("cash session {session_id} not found")))
    }

    /// Marker for a different register that is still open, if the caller
    /// holds one.
    async fn replaced_ownership(
        &self,
        request: &OpenRegisterRequest,
    ) -> Result<Option<SessionOwnership>, Error> {
        let Some(previous) = request
            .ownership
            .filter(|marker| marker.register_id != request.register_id)
        else {
            return Ok(None);
        };
        let still_open = self
            .store
            .find_session(&previous.session_id)
            .await
            .map_err(map_ledger_error)?
            .is_some_and(|session| session.is_open());
        Ok(still_open.then_some(previous))
    }
}

#[async_trait]
impl<S> CashSessionCommand for CashSessionService<S>
where
    S: LedgerStore,
{
    async fn open_register(
        &self,
        request: OpenRegisterRequest,
    ) -> Result<OpenRegisterResponse, Error> {
        let previous_ownership = self.replaced_ownership(&request).await?;
        if let Some(previous) = previous_ownership {
            warn!(
                register_id = %request.register_id,
                previous_register_id = %previous.register_id,
                previous_session_id = %previous.session_id,
                user_id = %request.user_id,
                "opening a register while still holding another open session"
            );
        }

        let outcome = self
            .store
            .open_session(&NewCashSession {
                session_id: CashSessionId::random(),
                register_id: request.register_id,
                opened_by: request.user_id.clone(),
                opened_at: self.clock.utc(),
                initial_amount: request.initial_amount,
            })
            .await
            .map_err(|err| {
                if matches!(err, LedgerStoreError::RegisterAlreadyOpenByOther { .. }) {
                    warn!(
                        register_id = %request.register_id,
                        user_id = %request.user_id,
                        "rejected open: register already open by another operator"
                    );
                }
                map_ledger_error(err)
            })?;

        let session = outcome.session;
        info!(
            register_id = %session.register_id(),
            session_id = %session.id(),
            user_id = %request.user_id,
            initial_amount = %session.initial_amount(),
            reattached = outcome.reattached,
            "register opened"
        );

        Ok(OpenRegisterResponse {
            ownership: SessionOwnership::new(session.register_id(), session.id()),
            reattached: outcome.reattached,
            previous_ownership,
            session,
        })
    }

    async fn close_register(
        &self,
        request: CloseRegisterRequest,
    ) -> Result<CloseRegisterResponse, Error> {
        let marked = request
            .ownership
            .is_some_and(|marker| marker.matches(request.register_id, request.session_id));
        if !marked {
            let stored = self
                .store
                .find_session(&request.session_id)
                .await
                .map_err(map_ledger_error)?;
            if let Some(closed) = stored.filter(|session| {
                session.register_id() == request.register_id
                    && !session.is_open()
                    && session.is_owned_by(&request.user_id)
            }) {
                return Err(already_closed(closed.id()));
            }
            warn!(
                register_id = %request.register_id,
                session_id = %request.session_id,
                user_id = %request.user_id,
                "rejected close: terminal does not hold the session marker"
            );
            return Err(not_owned(format!(
                "cash session {} was not opened on this terminal",
                request.session_id
            )));
        }

        let session = self.require_session(request.session_id).await?;
        if session.register_id() != request.register_id {
            return Err(Error::not_found(format!(
                "cash session {} not found for register {}",
                request.session_id, request.register_id
            )));
        }
        if !session.is_open() {
            return Err(already_closed(session.id()));
        }
        if !session.is_owned_by(&request.user_id) {
            return Err(not_owned(format!(
                "cash session {} belongs to another operator",
                session.id()
            )));
        }

        let record = self
            .store
            .close_session(&CloseCashSession {
                register_id: request.register_id,
                session_id: request.session_id,
                closure: SessionClosure {
                    closed_at: self.clock.utc().max(session.opened_at()),
                    closed_by: request.user_id.clone(),
                    counted_amount: request.counted_amount,
                },
            })
            .await
            .map_err(map_ledger_error)?;

        let report = reconcile(ReconciliationInput {
            register: &record.register,
            session: &record.session,
            expenses: &record.expenses,
            sales_total: record.sales_total,
        })
        .map_err(map_reconciliation_error)?;

        info!(
            register_id = %report.register_id,
            session_id = %report.session_id,
            user_id = %request.user_id,
            theoretical_balance = %report.theoretical_balance,
            counted_amount = %report.counted_amount,
            discrepancy = %report.discrepancy,
            classification = report.classification.as_str(),
            "register closed"
        );

        Ok(CloseRegisterResponse { report })
    }

    async fn current_session(
        &self,
        request: CurrentSessionRequest,
    ) -> Result<CurrentSessionResponse, Error> {
        let Some(ownership) = request.ownership else {
            return Ok(CurrentSessionResponse::None);
        };
        let stored = self
            .store
            .find_session(&ownership.session_id)
            .await
            .map_err(map_ledger_error)?;

        Ok(match stored {
            Some(session)
                if session.is_open()
                    && session.register_id() == ownership.register_id
                    && session.is_owned_by(&request.user_id) =>
            {
                CurrentSessionResponse::Active { ownership, session }
            }
            _ => CurrentSessionResponse::Stale { ownership },
        })
    }
}

#[async_trait]
impl<S> SessionReportQuery for CashSessionService<S>
where
    S: LedgerStore,
{
    async fn session_report(
        &self,
        request: SessionReportRequest,
    ) -> Result<ReconciliationReport, Error> {
        let session = self.require_session(request.session_id).await?;
        if session.is_open() {
            return Err(Error::conflict_with_reason(
                format!("cash session {} has not been closed", session.id()),
                reason::SESSION_NOT_CLOSED,
            ));
        }
        let register = self
            .store
            .find_register(&session.register_id())
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| {
                Error::internal(format!(
                    "register {} of session {} is missing",
                    session.register_id(),
                    session.id()
                ))
            })?;
        let expenses = self
            .store
            .list_expenses(&session.id())
            .await
            .map_err(map_ledger_error)?;
        let sales_total = self
            .store
            .sales_total(&session.id())
            .await
            .map_err(map_ledger_error)?;

        reconcile(ReconciliationInput {
            register: &register,
            session: &session,
            expenses: &expenses,
            sales_total,
        })
        .map_err(map_reconciliation_error)
    }
}

#[cfg(test)]
#[path = "cash_session_service_tests.rs"]
mod tests;
