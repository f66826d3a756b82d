//! Pure reconciliation of a closed session.
//!
//! The theoretical balance is `initial + sales - expenses`; the discrepancy
//! is `counted - theoretical`. All arithmetic is exact and checked.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::UserId;

use super::{CashSession, CashSessionId, Expense, ExpenseId, Money, Register, RegisterId, RegisterName};

/// Sign of the discrepancy between counted and expected cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Counted cash matches the theoretical balance.
    Balanced,
    /// More cash than expected.
    Surplus,
    /// Less cash than expected.
    Shortfall,
}

impl Classification {
    /// Classify a signed discrepancy.
    #[must_use]
    pub fn from_discrepancy(discrepancy: Decimal) -> Self {
        if discrepancy.is_zero() {
            Self::Balanced
        } else if discrepancy.is_sign_positive() {
            Self::Surplus
        } else {
            Self::Shortfall
        }
    }

    /// Wire name of the classification.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Surplus => "surplus",
            Self::Shortfall => "shortfall",
        }
    }
}

/// Errors raised while reconciling a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconciliationError {
    /// Reports exist only for closed sessions.
    #[error("session {session_id} has not been closed")]
    SessionNotClosed {
        /// The open session.
        session_id: CashSessionId,
    },
    /// The session was opened on a different register.
    #[error("session {session_id} does not belong to register {register_id}")]
    RegisterMismatch {
        /// The session being reconciled.
        session_id: CashSessionId,
        /// The register it was paired with.
        register_id: RegisterId,
    },
    /// An expense of another session was passed in.
    #[error("expense {expense_id} belongs to session {found}, not {expected}")]
    ForeignExpense {
        /// The offending expense.
        expense_id: ExpenseId,
        /// Session being reconciled.
        expected: CashSessionId,
        /// Session the expense belongs to.
        found: CashSessionId,
    },
    /// A sum or difference left the decimal range.
    #[error("reconciliation arithmetic overflowed")]
    Overflow,
}

/// Everything [`reconcile`] needs, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationInput<'a> {
    /// Register the session was opened on.
    pub register: &'a Register,
    /// The closed session.
    pub session: &'a CashSession,
    /// Every expense recorded against the session.
    pub expenses: &'a [Expense],
    /// Sales taken during the session.
    pub sales_total: Money,
}

/// Printable closing report for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// Register identifier.
    pub register_id: RegisterId,
    /// Register display name.
    pub register_name: RegisterName,
    /// Session identifier.
    pub session_id: CashSessionId,
    /// Opening float.
    pub initial_amount: Money,
    /// Sales taken during the session.
    pub sales_total: Money,
    /// Sum of all expenses.
    pub expenses_total: Money,
    /// Number of expenses.
    pub expense_count: usize,
    /// `initial + sales - expenses`; may be negative.
    pub theoretical_balance: Decimal,
    /// Cash counted at close.
    pub counted_amount: Money,
    /// `counted - theoretical`.
    pub discrepancy: Decimal,
    /// Sign of the discrepancy.
    pub classification: Classification,
    /// Operator who opened the session.
    pub opened_by: UserId,
    /// Opening timestamp.
    pub opened_at: DateTime<Utc>,
    /// Operator who closed the session.
    pub closed_by: UserId,
    /// Closing timestamp.
    pub closed_at: DateTime<Utc>,
}

/// Compute the reconciliation report for a closed session.
///
/// # Examples
/// ```
/// use caja::domain::{
///     CashSession, CashSessionDraft, CashSessionId, Classification, Money, Register,
///     RegisterId, RegisterName, ReconciliationInput, SessionClosure, UserId, reconcile,
/// };
/// use chrono::Utc;
///
/// let register = Register::new(RegisterId::random(), RegisterName::new("Caja 1").expect("name"));
/// let operator = UserId::random();
/// let now = Utc::now();
/// let session = CashSession::new(CashSessionDraft {
///     id: CashSessionId::random(),
///     register_id: register.id(),
///     opened_by: operator.clone(),
///     opened_at: now,
///     initial_amount: "100".parse().expect("amount"),
///     closure: Some(SessionClosure {
///         closed_at: now,
///         closed_by: operator,
///         counted_amount: "150".parse().expect("amount"),
///     }),
/// })
/// .expect("session");
///
/// let report = reconcile(ReconciliationInput {
///     register: &register,
///     session: &session,
///     expenses: &[],
///     sales_total: "50".parse::<Money>().expect("amount"),
/// })
/// .expect("reconciles");
/// assert_eq!(report.classification, Classification::Balanced);
/// ```
pub fn reconcile(input: ReconciliationInput<'_>) -> Result<ReconciliationReport, ReconciliationError> {
    let ReconciliationInput {
        register,
        session,
        expenses,
        sales_total,
    } = input;

    let closure = session
        .closure()
        .ok_or(ReconciliationError::SessionNotClosed {
            session_id: session.id(),
        })?;
    if session.register_id() != register.id() {
        return Err(ReconciliationError::RegisterMismatch {
            session_id: session.id(),
            register_id: register.id(),
        });
    }
    if let Some(foreign) = expenses
        .iter()
        .find(|expense| expense.session_id() != session.id())
    {
        return Err(ReconciliationError::ForeignExpense {
            expense_id: foreign.id(),
            expected: session.id(),
            found: foreign.session_id(),
        });
    }

    let expenses_total = Money::checked_sum(expenses.iter().map(Expense::amount))
        .ok_or(ReconciliationError::Overflow)?;
    let theoretical_balance = session
        .initial_amount()
        .amount()
        .checked_add(sales_total.amount())
        .and_then(|gross| gross.checked_sub(expenses_total.amount()))
        .ok_or(ReconciliationError::Overflow)?;
    let discrepancy = closure
        .counted_amount
        .amount()
        .checked_sub(theoretical_balance)
        .ok_or(ReconciliationError::Overflow)?;

    Ok(ReconciliationReport {
        register_id: register.id(),
        register_name: register.name().clone(),
        session_id: session.id(),
        initial_amount: session.initial_amount(),
        sales_total,
        expenses_total,
        expense_count: expenses.len(),
        theoretical_balance,
        counted_amount: closure.counted_amount,
        discrepancy,
        classification: Classification::from_discrepancy(discrepancy),
        opened_by: session.opened_by().clone(),
        opened_at: session.opened_at(),
        closed_by: closure.closed_by.clone(),
        closed_at: closure.closed_at,
    })
}
