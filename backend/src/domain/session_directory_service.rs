//! Read-only register picker and session history.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ledger_errors::map_ledger_error;
use crate::domain::ports::{
    LedgerStore, ListRegistersRequest, ListRegistersResponse, ListSessionsRequest,
    ListSessionsResponse, SessionDirectoryQuery, SessionSummary,
};
use crate::domain::{Error, RegisterSummary};

/// Session directory service implementing [`SessionDirectoryQuery`].
#[derive(Clone)]
pub struct SessionDirectoryService<S> {
    store: Arc<S>,
}

impl<S> SessionDirectoryService<S> {
    /// Create a new service over the ledger store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> SessionDirectoryQuery for SessionDirectoryService<S>
where
    S: LedgerStore,
{
    async fn list_registers(
        &self,
        request: ListRegistersRequest,
    ) -> Result<ListRegistersResponse, Error> {
        let snapshots = self
            .store
            .list_registers()
            .await
            .map_err(map_ledger_error)?;

        let registers = snapshots
            .into_iter()
            .map(|snapshot| {
                RegisterSummary::classify(snapshot, &request.user_id, request.ownership.as_ref())
            })
            .collect();
        Ok(ListRegistersResponse { registers })
    }

    async fn list_sessions_for_register(
        &self,
        request: ListSessionsRequest,
    ) -> Result<ListSessionsResponse, Error> {
        self.store
            .find_register(&request.register_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| {
                Error::not_found(format!("register {} not found", request.register_id))
            })?;

        let mut sessions: Vec<SessionSummary> = self
            .store
            .list_sessions_for_register(&request.register_id)
            .await
            .map_err(map_ledger_error)?
            .iter()
            .map(SessionSummary::from)
            .collect();
        sessions.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        Ok(ListSessionsResponse { sessions })
    }
}
