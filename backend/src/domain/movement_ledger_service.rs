//! Expense recording and listing for cash sessions.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ledger_errors::{
    field_code, invalid_field, map_ledger_error, not_owned, session_closed,
};
use crate::domain::ports::{
    AddExpenseRequest, AddExpenseResponse, LedgerStore, ListExpensesRequest, ListExpensesResponse,
    MovementLedgerCommand, MovementLedgerQuery,
};
use crate::domain::{
    CashSession, CashSessionId, Error, Expense, ExpenseConcept, ExpenseDraft, ExpenseId, Money,
};

/// Movement ledger service implementing the expense driving ports.
#[derive(Clone)]
pub struct MovementLedgerService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> MovementLedgerService<S> {
    /// Create a new service over the ledger store.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> MovementLedgerService<S>
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
}

#[async_trait]
impl<S> MovementLedgerCommand for MovementLedgerService<S>
where
    S: LedgerStore,
{
    async fn add_expense(&self, request: AddExpenseRequest) -> Result<AddExpenseResponse, Error> {
        let concept = ExpenseConcept::new(&request.concept).map_err(|err| {
            invalid_field("concept", field_code::INVALID_CONCEPT, err.to_string())
        })?;
        let amount = Money::positive(request.amount.amount()).map_err(|err| {
            invalid_field("amount", field_code::INVALID_AMOUNT, err.to_string())
        })?;

        if request
            .ownership
            .is_none_or(|marker| marker.session_id != request.session_id)
        {
            let stored = self
                .store
                .find_session(&request.session_id)
                .await
                .map_err(map_ledger_error)?;
            if let Some(closed) = stored
                .filter(|session| !session.is_open() && session.is_owned_by(&request.user_id))
            {
                return Err(session_closed(closed.id()));
            }
            return Err(not_owned(format!(
                "cash session {} was not opened on this terminal",
                request.session_id
            )));
        }

        let session = self.require_session(request.session_id).await?;
        if !session.is_open() {
            return Err(session_closed(session.id()));
        }
        if !session.is_owned_by(&request.user_id) {
            return Err(not_owned(format!(
                "cash session {} belongs to another operator",
                session.id()
            )));
        }

        let expense = Expense::new(ExpenseDraft {
            id: ExpenseId::random(),
            session_id: session.id(),
            concept,
            amount,
            recorded_by: request.user_id.clone(),
            recorded_at: self.clock.utc().max(session.opened_at()),
        })
        .map_err(|err| invalid_field("amount", field_code::INVALID_AMOUNT, err.to_string()))?;

        self.store
            .add_expense(&expense)
            .await
            .map_err(map_ledger_error)?;

        info!(
            session_id = %expense.session_id(),
            expense_id = %expense.id(),
            user_id = %request.user_id,
            amount = %expense.amount(),
            "expense recorded"
        );

        Ok(AddExpenseResponse { expense })
    }
}

#[async_trait]
impl<S> MovementLedgerQuery for MovementLedgerService<S>
where
    S: LedgerStore,
{
    async fn list_expenses(
        &self,
        request: ListExpensesRequest,
    ) -> Result<ListExpensesResponse, Error> {
        let session = self.require_session(request.session_id).await?;
        let expenses = self
            .store
            .list_expenses(&session.id())
            .await
            .map_err(map_ledger_error)?;
        let total = Money::checked_sum(expenses.iter().map(Expense::amount)).ok_or_else(|| {
            Error::internal(format!("expense total of session {} overflowed", session.id()))
        })?;

        Ok(ListExpensesResponse { expenses, total })
    }
}

#[cfg(test)]
#[path = "movement_ledger_service_tests.rs"]
mod tests;
