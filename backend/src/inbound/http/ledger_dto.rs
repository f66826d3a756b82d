//! Response payloads shared by the register and cash session handlers.
//!
//! Amounts are rendered as decimal strings so clients never round-trip them
//! through binary floating point.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SessionSummary;
use crate::domain::{
    CashSession, Expense, ReconciliationReport, RegisterAvailability, RegisterSummary,
    SessionOwnership,
};

fn decimal_text(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Terminal marker of the session it opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipBody {
    /// Register the session was opened on.
    #[schema(format = "uuid")]
    pub register_id: String,
    /// Session opened from this terminal.
    #[schema(format = "uuid")]
    pub session_id: String,
}

impl From<&SessionOwnership> for OwnershipBody {
    fn from(value: &SessionOwnership) -> Self {
        Self {
            register_id: value.register_id.to_string(),
            session_id: value.session_id.to_string(),
        }
    }
}

/// Full view of a cash session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashSessionBody {
    /// Session identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Register identifier.
    #[schema(format = "uuid")]
    pub register_id: String,
    /// `open` or `closed`.
    #[schema(example = "open")]
    pub status: String,
    /// Operator who opened the session.
    #[schema(format = "uuid")]
    pub opened_by: String,
    /// RFC 3339 opening timestamp.
    #[schema(format = "date-time")]
    pub opened_at: String,
    /// Opening float.
    #[schema(example = "100000")]
    pub initial_amount: String,
    /// Operator who closed the session.
    #[schema(format = "uuid")]
    pub closed_by: Option<String>,
    /// RFC 3339 closing timestamp.
    #[schema(format = "date-time")]
    pub closed_at: Option<String>,
    /// Cash counted at close.
    pub counted_amount: Option<String>,
}

impl From<&CashSession> for CashSessionBody {
    fn from(value: &CashSession) -> Self {
        let closure = value.closure();
        Self {
            id: value.id().to_string(),
            register_id: value.register_id().to_string(),
            status: value.status().as_str().to_owned(),
            opened_by: value.opened_by().to_string(),
            opened_at: value.opened_at().to_rfc3339(),
            initial_amount: value.initial_amount().to_string(),
            closed_by: closure.map(|c| c.closed_by.to_string()),
            closed_at: closure.map(|c| c.closed_at.to_rfc3339()),
            counted_amount: closure.map(|c| c.counted_amount.to_string()),
        }
    }
}

/// Open session summary nested in a register row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionBody {
    /// Open session identifier.
    #[schema(format = "uuid")]
    pub session_id: String,
    /// Operator holding the session.
    #[schema(format = "uuid")]
    pub opened_by: String,
    /// RFC 3339 opening timestamp.
    #[schema(format = "date-time")]
    pub opened_at: String,
}

/// Actions the caller may take on a register.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterActionsBody {
    /// The caller may open the register.
    pub open: bool,
    /// The caller may record expenses.
    pub add_expense: bool,
    /// The caller may close the register.
    pub close: bool,
}

/// Register row of the register picker.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSummaryBody {
    /// Register identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Display name.
    #[schema(example = "Caja 1")]
    pub name: String,
    /// Whether the register has an open session.
    pub is_open: bool,
    /// Whether this terminal holds the marker of the open session.
    pub is_mine: bool,
    /// `mine_and_open`, `open_by_other` or `closed_available`.
    #[schema(example = "closed_available")]
    pub availability: String,
    /// Open session, if any.
    pub open_session: Option<OpenSessionBody>,
    /// Actions available to the caller.
    pub actions: RegisterActionsBody,
}

impl From<&RegisterSummary> for RegisterSummaryBody {
    fn from(value: &RegisterSummary) -> Self {
        Self {
            id: value.register.id().to_string(),
            name: value.register.name().to_string(),
            is_open: value.open_session.is_some(),
            is_mine: value.availability == RegisterAvailability::MineAndOpen,
            availability: value.availability.as_str().to_owned(),
            open_session: value.open_session.as_ref().map(|session| OpenSessionBody {
                session_id: session.id().to_string(),
                opened_by: session.opened_by().to_string(),
                opened_at: session.opened_at().to_rfc3339(),
            }),
            actions: RegisterActionsBody {
                open: value.actions.open,
                add_expense: value.actions.add_expense,
                close: value.actions.close,
            },
        }
    }
}

/// Row of a register's session history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryBody {
    /// Session identifier.
    #[schema(format = "uuid")]
    pub session_id: String,
    /// `open` or `closed`.
    #[schema(example = "closed")]
    pub status: String,
    /// Operator who opened the session.
    #[schema(format = "uuid")]
    pub opened_by: String,
    /// RFC 3339 opening timestamp.
    #[schema(format = "date-time")]
    pub opened_at: String,
    /// RFC 3339 closing timestamp.
    #[schema(format = "date-time")]
    pub closed_at: Option<String>,
}

impl From<&SessionSummary> for SessionSummaryBody {
    fn from(value: &SessionSummary) -> Self {
        Self {
            session_id: value.session_id.to_string(),
            status: value.status.as_str().to_owned(),
            opened_by: value.opened_by.to_string(),
            opened_at: value.opened_at.to_rfc3339(),
            closed_at: value.closed_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// A recorded expense.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBody {
    /// Expense identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Session the expense is charged to.
    #[schema(format = "uuid")]
    pub session_id: String,
    /// What the money was spent on.
    #[schema(example = "Taxi")]
    pub concept: String,
    /// Amount paid out.
    #[schema(example = "12000")]
    pub amount: String,
    /// Operator who recorded it.
    #[schema(format = "uuid")]
    pub recorded_by: String,
    /// RFC 3339 recording timestamp.
    #[schema(format = "date-time")]
    pub recorded_at: String,
}

impl From<&Expense> for ExpenseBody {
    fn from(value: &Expense) -> Self {
        Self {
            id: value.id().to_string(),
            session_id: value.session_id().to_string(),
            concept: value.concept().as_ref().to_owned(),
            amount: value.amount().to_string(),
            recorded_by: value.recorded_by().to_string(),
            recorded_at: value.recorded_at().to_rfc3339(),
        }
    }
}

/// Closing reconciliation of a session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReportBody {
    /// Register identifier.
    #[schema(format = "uuid")]
    pub register_id: String,
    /// Register display name.
    pub register_name: String,
    /// Session identifier.
    #[schema(format = "uuid")]
    pub session_id: String,
    /// Opening float.
    #[schema(example = "100000")]
    pub initial_amount: String,
    /// Sales taken during the session.
    #[schema(example = "50000")]
    pub sales_total: String,
    /// Sum of expenses.
    #[schema(example = "15000")]
    pub expenses_total: String,
    /// Number of expenses.
    pub expense_count: usize,
    /// `initial + sales - expenses`.
    #[schema(example = "135000")]
    pub theoretical_balance: String,
    /// Cash counted at close.
    #[schema(example = "130000")]
    pub counted_amount: String,
    /// `counted - theoretical`; negative means missing cash.
    #[schema(example = "-5000")]
    pub discrepancy: String,
    /// `balanced`, `surplus` or `shortfall`.
    #[schema(example = "shortfall")]
    pub classification: String,
    /// Operator who opened the session.
    #[schema(format = "uuid")]
    pub opened_by: String,
    /// RFC 3339 opening timestamp.
    #[schema(format = "date-time")]
    pub opened_at: String,
    /// Operator who closed the session.
    #[schema(format = "uuid")]
    pub closed_by: String,
    /// RFC 3339 closing timestamp.
    #[schema(format = "date-time")]
    pub closed_at: String,
}

impl From<&ReconciliationReport> for ReconciliationReportBody {
    fn from(value: &ReconciliationReport) -> Self {
        Self {
            register_id: value.register_id.to_string(),
            register_name: value.register_name.to_string(),
            session_id: value.session_id.to_string(),
            initial_amount: value.initial_amount.to_string(),
            sales_total: value.sales_total.to_string(),
            expenses_total: value.expenses_total.to_string(),
            expense_count: value.expense_count,
            theoretical_balance: decimal_text(value.theoretical_balance),
            counted_amount: value.counted_amount.to_string(),
            discrepancy: decimal_text(value.discrepancy),
            classification: value.classification.as_str().to_owned(),
            opened_by: value.opened_by.to_string(),
            opened_at: value.opened_at.to_rfc3339(),
            closed_by: value.closed_by.to_string(),
            closed_at: value.closed_at.to_rfc3339(),
        }
    }
}
