//! Process-local ledger store.
//!
//! Used when no database is configured and by integration tests. All state
//! sits behind one mutex so every port method is atomic with respect to the
//! others, which is enough to uphold the single-open-session invariant.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    CloseCashSession, ClosedSessionRecord, LedgerStore, LedgerStoreError, NewCashSession,
    OpenSessionOutcome,
};
use crate::domain::{
    CashRegisterValidationError, CashSession, CashSessionDraft, CashSessionId, Expense, Money,
    Register, RegisterId, RegisterName, RegisterSnapshot,
};

#[derive(Debug, Default)]
struct LedgerState {
    registers: Vec<Register>,
    sessions: Vec<CashSession>,
    expenses: Vec<Expense>,
    sales: HashMap<CashSessionId, Money>,
}

impl LedgerState {
    fn register(&self, register_id: RegisterId) -> Option<&Register> {
        self.registers
            .iter()
            .find(|register| register.id() == register_id)
    }

    fn open_session_of(&self, register_id: RegisterId) -> Option<&CashSession> {
        self.sessions
            .iter()
            .find(|session| session.register_id() == register_id && session.is_open())
    }

    fn session_position(&self, session_id: CashSessionId) -> Option<usize> {
        self.sessions
            .iter()
            .position(|session| session.id() == session_id)
    }

    fn expenses_of(&self, session_id: CashSessionId) -> Vec<Expense> {
        let mut expenses: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|expense| expense.session_id() == session_id)
            .cloned()
            .collect();
        expenses.sort_by_key(Expense::recorded_at);
        expenses
    }

    fn sales_of(&self, session_id: CashSessionId) -> Money {
        self.sales.get(&session_id).copied().unwrap_or(Money::ZERO)
    }
}

/// In-memory [`LedgerStore`] adapter.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store seeded with one register per name.
    pub fn with_registers<I, N>(names: I) -> Result<Self, CashRegisterValidationError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let registers = names
            .into_iter()
            .map(|name| RegisterName::new(name).map(|name| Register::new(RegisterId::random(), name)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            state: Mutex::new(LedgerState {
                registers,
                ..LedgerState::default()
            }),
        })
    }

    /// Add a register to the store.
    pub fn add_register(&self, register: Register) -> Result<(), LedgerStoreError> {
        self.lock()?.registers.push(register);
        Ok(())
    }

    /// Attribute a sale to a session, standing in for the sales subsystem.
    pub fn record_sale(
        &self,
        session_id: CashSessionId,
        amount: Money,
    ) -> Result<(), LedgerStoreError> {
        let mut state = self.lock()?;
        let current = state.sales_of(session_id);
        let total = Money::checked_sum([current, amount])
            .ok_or_else(|| LedgerStoreError::query("sales total overflowed"))?;
        state.sales.insert(session_id, total);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerStoreError> {
        self.state
            .lock()
            .map_err(|_| LedgerStoreError::query("ledger state lock poisoned"))
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn list_registers(&self) -> Result<Vec<RegisterSnapshot>, LedgerStoreError> {
        let state = self.lock()?;
        let mut snapshots: Vec<RegisterSnapshot> = state
            .registers
            .iter()
            .map(|register| RegisterSnapshot {
                register: register.clone(),
                open_session: state.open_session_of(register.id()).cloned(),
            })
            .collect();
        snapshots.sort_by(|a, b| a.register.name().as_ref().cmp(b.register.name().as_ref()));
        Ok(snapshots)
    }

    async fn find_register(
        &self,
        register_id: &RegisterId,
    ) -> Result<Option<Register>, LedgerStoreError> {
        Ok(self.lock()?.register(*register_id).cloned())
    }

    async fn list_sessions_for_register(
        &self,
        register_id: &RegisterId,
    ) -> Result<Vec<CashSession>, LedgerStoreError> {
        let state = self.lock()?;
        let mut sessions: Vec<CashSession> = state
            .sessions
            .iter()
            .filter(|session| session.register_id() == *register_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.opened_at().cmp(&a.opened_at()));
        Ok(sessions)
    }

    async fn find_session(
        &self,
        session_id: &CashSessionId,
    ) -> Result<Option<CashSession>, LedgerStoreError> {
        let state = self.lock()?;
        Ok(state
            .session_position(*session_id)
            .and_then(|index| state.sessions.get(index))
            .cloned())
    }

    async fn open_session(
        &self,
        request: &NewCashSession,
    ) -> Result<OpenSessionOutcome, LedgerStoreError> {
        let mut state = self.lock()?;
        if state.register(request.register_id).is_none() {
            return Err(LedgerStoreError::register_not_found(request.register_id));
        }
        if let Some(open) = state.open_session_of(request.register_id) {
            if open.is_owned_by(&request.opened_by) {
                return Ok(OpenSessionOutcome {
                    session: open.clone(),
                    reattached: true,
                });
            }
            return Err(LedgerStoreError::register_already_open_by_other(
                request.register_id,
            ));
        }

        let session = CashSession::new(CashSessionDraft {
            id: request.session_id,
            register_id: request.register_id,
            opened_by: request.opened_by.clone(),
            opened_at: request.opened_at,
            initial_amount: request.initial_amount,
            closure: None,
        })
        .map_err(|err| LedgerStoreError::query(err.to_string()))?;
        state.sessions.push(session.clone());
        Ok(OpenSessionOutcome {
            session,
            reattached: false,
        })
    }

    async fn close_session(
        &self,
        request: &CloseCashSession,
    ) -> Result<ClosedSessionRecord, LedgerStoreError> {
        let mut state = self.lock()?;
        let not_found = || LedgerStoreError::session_not_found(request.session_id);
        let index = state
            .session_position(request.session_id)
            .ok_or_else(not_found)?;
        let current = state.sessions.get(index).ok_or_else(not_found)?;
        if current.register_id() != request.register_id {
            return Err(not_found());
        }
        if !current.is_open() {
            return Err(LedgerStoreError::session_already_closed(request.session_id));
        }
        if !current.is_owned_by(&request.closure.closed_by) {
            return Err(LedgerStoreError::session_owned_by_other(request.session_id));
        }

        let closed = current
            .close(request.closure.clone())
            .map_err(|err| LedgerStoreError::query(err.to_string()))?;
        let register = state
            .register(request.register_id)
            .cloned()
            .ok_or_else(|| LedgerStoreError::register_not_found(request.register_id))?;
        if let Some(slot) = state.sessions.get_mut(index) {
            *slot = closed.clone();
        }

        Ok(ClosedSessionRecord {
            register,
            expenses: state.expenses_of(request.session_id),
            sales_total: state.sales_of(request.session_id),
            session: closed,
        })
    }

    async fn add_expense(&self, expense: &Expense) -> Result<(), LedgerStoreError> {
        let mut state = self.lock()?;
        let session = state
            .session_position(expense.session_id())
            .and_then(|index| state.sessions.get(index))
            .ok_or_else(|| LedgerStoreError::session_not_found(expense.session_id()))?;
        if !session.is_open() {
            return Err(LedgerStoreError::session_closed(expense.session_id()));
        }
        state.expenses.push(expense.clone());
        Ok(())
    }

    async fn list_expenses(
        &self,
        session_id: &CashSessionId,
    ) -> Result<Vec<Expense>, LedgerStoreError> {
        Ok(self.lock()?.expenses_of(*session_id))
    }

    async fn sales_total(&self, session_id: &CashSessionId) -> Result<Money, LedgerStoreError> {
        Ok(self.lock()?.sales_of(*session_id))
    }
}
