//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{cash_expenses, cash_registers, cash_sessions};

/// Row struct for reading from the cash_registers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cash_registers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegisterRow {
    pub id: Uuid,
    pub name: String,
}

/// Insertable struct for seeding registers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cash_registers)]
pub(crate) struct NewRegisterRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
}

/// Row struct for reading from the cash_sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cash_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub id: Uuid,
    pub register_id: Uuid,
    pub opened_by: Uuid,
    pub opened_at: DateTime<Utc>,
    pub initial_amount: Decimal,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<Uuid>,
    pub counted_amount: Option<Decimal>,
}

/// Insertable struct for opening a session.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cash_sessions)]
pub(crate) struct NewSessionRow {
    pub id: Uuid,
    pub register_id: Uuid,
    pub opened_by: Uuid,
    pub opened_at: DateTime<Utc>,
    pub initial_amount: Decimal,
}

/// Changeset applied when a session is closed.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cash_sessions)]
pub(crate) struct SessionClosureUpdate {
    pub closed_at: DateTime<Utc>,
    pub closed_by: Uuid,
    pub counted_amount: Decimal,
}

/// Row struct for reading from the cash_expenses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cash_expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExpenseRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub concept: String,
    pub amount: Decimal,
    pub recorded_by: Uuid,
    pub recorded_at: DateTime<Utc>,
}

/// Insertable struct for recording an expense. `seq` is assigned by the
/// database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cash_expenses)]
pub(crate) struct NewExpenseRow<'a> {
    pub id: Uuid,
    pub session_id: Uuid,
    pub concept: &'a str,
    pub amount: Decimal,
    pub recorded_by: Uuid,
    pub recorded_at: DateTime<Utc>,
}
