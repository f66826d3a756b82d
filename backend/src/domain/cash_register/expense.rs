//! Expenses recorded against an open session.

use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::{CashRegisterValidationError, CashSessionId, ExpenseId, Money, MoneyError};

/// Trimmed, non-empty free-text description of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpenseConcept(String);

impl ExpenseConcept {
    /// Maximum length, in characters, of a concept.
    pub const MAX_LEN: usize = 200;

    /// Validate and normalise a concept.
    ///
    /// # Examples
    /// ```
    /// use caja::domain::ExpenseConcept;
    ///
    /// assert_eq!(ExpenseConcept::new(" Taxi ").expect("valid").as_ref(), "Taxi");
    /// assert!(ExpenseConcept::new("   ").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CashRegisterValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CashRegisterValidationError::EmptyConcept);
        }
        let actual = trimmed.chars().count();
        if actual > Self::MAX_LEN {
            return Err(CashRegisterValidationError::ConceptTooLong {
                max: Self::MAX_LEN,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ExpenseConcept {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Input payload for [`Expense::new`].
#[derive(Debug, Clone)]
pub struct ExpenseDraft {
    /// Identifier of the new expense.
    pub id: ExpenseId,
    /// Session the expense is charged to.
    pub session_id: CashSessionId,
    /// What the cash was spent on.
    pub concept: ExpenseConcept,
    /// Amount taken from the drawer; must be positive.
    pub amount: Money,
    /// Operator who recorded the expense.
    pub recorded_by: UserId,
    /// When the expense was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// A cash outflow taken from the drawer during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    id: ExpenseId,
    session_id: CashSessionId,
    concept: ExpenseConcept,
    amount: Money,
    recorded_by: UserId,
    recorded_at: DateTime<Utc>,
}

impl Expense {
    /// Build an expense, rejecting zero amounts.
    pub fn new(draft: ExpenseDraft) -> Result<Self, CashRegisterValidationError> {
        if draft.amount.is_zero() {
            return Err(CashRegisterValidationError::InvalidAmount(
                MoneyError::NotPositive {
                    value: draft.amount.amount(),
                },
            ));
        }
        Ok(Self {
            id: draft.id,
            session_id: draft.session_id,
            concept: draft.concept,
            amount: draft.amount,
            recorded_by: draft.recorded_by,
            recorded_at: draft.recorded_at,
        })
    }

    /// Expense identifier.
    #[must_use]
    pub const fn id(&self) -> ExpenseId {
        self.id
    }

    /// Session the expense belongs to.
    #[must_use]
    pub const fn session_id(&self) -> CashSessionId {
        self.session_id
    }

    /// Normalised description.
    #[must_use]
    pub const fn concept(&self) -> &ExpenseConcept {
        &self.concept
    }

    /// Amount taken from the drawer.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Operator who recorded it.
    #[must_use]
    pub const fn recorded_by(&self) -> &UserId {
        &self.recorded_by
    }

    /// Recording timestamp, never earlier than the session opening.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
