//! Driving ports for expenses recorded against a session.

use async_trait::async_trait;

use crate::domain::{CashSessionId, Error, Expense, Money, SessionOwnership, UserId};

/// Request to record an expense.
///
/// The concept arrives raw so the service can report concept validation
/// failures with the same envelope as other field errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddExpenseRequest {
    /// Session the expense is charged to.
    pub session_id: CashSessionId,
    /// Authenticated operator.
    pub user_id: UserId,
    /// Raw concept text.
    pub concept: String,
    /// Amount paid out of the drawer.
    pub amount: Money,
    /// Marker currently held by the calling terminal.
    pub ownership: Option<SessionOwnership>,
}

/// The recorded expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddExpenseResponse {
    /// Expense as persisted.
    pub expense: Expense,
}

/// Request for the expenses of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListExpensesRequest {
    /// Session to list.
    pub session_id: CashSessionId,
}

/// Expenses of a session with their total, computed on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListExpensesResponse {
    /// Expenses in recording order.
    pub expenses: Vec<Expense>,
    /// Sum of the listed amounts.
    pub total: Money,
}

/// Domain use-case port for recording expenses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovementLedgerCommand: Send + Sync {
    /// Record an expense against the caller's open session.
    async fn add_expense(&self, request: AddExpenseRequest) -> Result<AddExpenseResponse, Error>;
}

/// Domain use-case port for reading expenses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovementLedgerQuery: Send + Sync {
    /// List a session's expenses.
    async fn list_expenses(
        &self,
        request: ListExpensesRequest,
    ) -> Result<ListExpensesResponse, Error>;
}
