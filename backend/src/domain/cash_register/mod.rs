//! Cash register session lifecycle and reconciliation domain types.
//!
//! A register is a physical till. Opening it starts a [`CashSession`] owned
//! by one operator; expenses are recorded against the open session and
//! closing it freezes the counted cash so a [`ReconciliationReport`] can be
//! derived. At most one session per register is open at any time.

use std::fmt;

mod directory;
mod expense;
mod ids;
mod money;
mod ownership;
mod reconciliation;
mod register;
mod session;
#[cfg(test)]
mod tests;

pub use directory::{RegisterActions, RegisterAvailability, RegisterSnapshot, RegisterSummary};
pub use expense::{Expense, ExpenseConcept, ExpenseDraft};
pub use ids::{CashSessionId, ExpenseId, IdentifierError, RegisterId};
pub use money::{MONEY_MAX_INTEGER_DIGITS, MONEY_MAX_SCALE, Money, MoneyError};
pub use ownership::SessionOwnership;
pub use reconciliation::{
    Classification, ReconciliationError, ReconciliationInput, ReconciliationReport, reconcile,
};
pub use register::{REGISTER_NAME_MAX_LEN, Register, RegisterName};
pub use session::{CashSession, CashSessionDraft, SessionClosure, SessionStatus};

/// Validation errors raised by cash register constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CashRegisterValidationError {
    /// Register name is blank.
    EmptyRegisterName,
    /// Register name exceeds the maximum length.
    RegisterNameTooLong {
        /// Allowed characters.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },
    /// Expense concept is blank.
    EmptyConcept,
    /// Expense concept exceeds the maximum length.
    ConceptTooLong {
        /// Allowed characters.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },
    /// Amount failed money validation.
    InvalidAmount(MoneyError),
    /// Closure timestamp precedes the opening.
    ClosedBeforeOpened,
    /// Expense timestamp precedes the opening.
    RecordedBeforeOpened,
    /// The session already carries closure facts.
    SessionAlreadyClosed,
}

impl fmt::Display for CashRegisterValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRegisterName => write!(f, "register name must not be empty"),
            Self::RegisterNameTooLong { max, actual } => write!(
                f,
                "register name must be at most {max} characters (got {actual})"
            ),
            Self::EmptyConcept => write!(f, "expense concept must not be empty"),
            Self::ConceptTooLong { max, actual } => write!(
                f,
                "expense concept must be at most {max} characters (got {actual})"
            ),
            Self::InvalidAmount(err) => write!(f, "{err}"),
            Self::ClosedBeforeOpened => {
                write!(f, "session cannot be closed before it was opened")
            }
            Self::RecordedBeforeOpened => {
                write!(f, "expense cannot be recorded before the session opened")
            }
            Self::SessionAlreadyClosed => write!(f, "session is already closed"),
        }
    }
}

impl std::error::Error for CashRegisterValidationError {}

impl From<MoneyError> for CashRegisterValidationError {
    fn from(value: MoneyError) -> Self {
        Self::InvalidAmount(value)
    }
}
