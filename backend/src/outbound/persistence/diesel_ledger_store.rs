//! PostgreSQL-backed `LedgerStore` implementation using Diesel ORM.
//!
//! Mutations run in one transaction each. Opens lock the register row with
//! `SELECT ... FOR UPDATE` so concurrent opens on the same register are
//! serialised; the partial unique index on open sessions backs this up and
//! a unique violation is reported as `RegisterAlreadyOpenByOther`. Closes and
//! expense inserts lock the session row so an expense can never land after
//! the closing reads.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    CloseCashSession, ClosedSessionRecord, LedgerStore, LedgerStoreError, NewCashSession,
    OpenSessionOutcome,
};
use crate::domain::{
    CashSession, CashSessionDraft, CashSessionId, Expense, ExpenseConcept, ExpenseDraft,
    ExpenseId, Money, Register, RegisterId, RegisterName, RegisterSnapshot, SessionClosure,
    UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    ExpenseRow, NewExpenseRow, NewRegisterRow, NewSessionRow, RegisterRow, SessionClosureUpdate,
    SessionRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{cash_expenses, cash_registers, cash_session_sales, cash_sessions};

/// Diesel-backed implementation of the ledger store port.
#[derive(Clone)]
pub struct DieselLedgerStore {
    pool: DbPool,
}

impl DieselLedgerStore {
    /// Create a new store with the given connection pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert registers by name, leaving existing names untouched.
    pub async fn seed_registers(&self, names: &[String]) -> Result<usize, LedgerStoreError> {
        let validated = names
            .iter()
            .map(RegisterName::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| LedgerStoreError::query(err.to_string()))?;
        let rows: Vec<NewRegisterRow<'_>> = validated
            .iter()
            .map(|name| NewRegisterRow {
                id: Uuid::new_v4(),
                name: name.as_ref(),
            })
            .collect();
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(cash_registers::table)
            .values(&rows)
            .on_conflict(cash_registers::name)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}

/// Failure inside a ledger transaction: either a database error or a
/// domain conflict that must roll the transaction back.
#[derive(Debug)]
enum LedgerTxError {
    Diesel(DieselError),
    Ledger(LedgerStoreError),
}

impl From<DieselError> for LedgerTxError {
    fn from(value: DieselError) -> Self {
        Self::Diesel(value)
    }
}

impl From<LedgerStoreError> for LedgerTxError {
    fn from(value: LedgerStoreError) -> Self {
        Self::Ledger(value)
    }
}

fn map_pool_error(error: PoolError) -> LedgerStoreError {
    map_basic_pool_error(error, LedgerStoreError::connection)
}

fn map_diesel_error(error: DieselError) -> LedgerStoreError {
    map_basic_diesel_error(error, LedgerStoreError::query, LedgerStoreError::connection)
}

fn map_tx_error(error: LedgerTxError) -> LedgerStoreError {
    match error {
        LedgerTxError::Diesel(err) => map_diesel_error(err),
        LedgerTxError::Ledger(err) => err,
    }
}

fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

fn decode_money(value: Decimal, column: &str) -> Result<Money, LedgerStoreError> {
    Money::new(value).map_err(|err| LedgerStoreError::query(format!("invalid {column}: {err}")))
}

fn decode_total(value: Decimal) -> Result<Money, LedgerStoreError> {
    Money::total(value).map_err(|err| LedgerStoreError::query(format!("invalid sales total: {err}")))
}

fn row_to_register(row: RegisterRow) -> Result<Register, LedgerStoreError> {
    let name = RegisterName::new(&row.name).map_err(|err| LedgerStoreError::query(err.to_string()))?;
    Ok(Register::new(RegisterId::from_uuid(row.id), name))
}

fn row_to_session(row: SessionRow) -> Result<CashSession, LedgerStoreError> {
    let SessionRow {
        id,
        register_id,
        opened_by,
        opened_at,
        initial_amount,
        closed_at,
        closed_by,
        counted_amount,
    } = row;

    let closure = match (closed_at, closed_by, counted_amount) {
        (None, None, None) => None,
        (Some(at), Some(by), Some(counted)) => Some(SessionClosure {
            closed_at: at,
            closed_by: UserId::from_uuid(by),
            counted_amount: decode_money(counted, "counted_amount")?,
        }),
        _ => {
            return Err(LedgerStoreError::query(format!(
                "cash session {id} has a partial closure"
            )));
        }
    };

    CashSession::new(CashSessionDraft {
        id: CashSessionId::from_uuid(id),
        register_id: RegisterId::from_uuid(register_id),
        opened_by: UserId::from_uuid(opened_by),
        opened_at,
        initial_amount: decode_money(initial_amount, "initial_amount")?,
        closure,
    })
    .map_err(|err| LedgerStoreError::query(err.to_string()))
}

fn row_to_expense(row: ExpenseRow) -> Result<Expense, LedgerStoreError> {
    let concept =
        ExpenseConcept::new(&row.concept).map_err(|err| LedgerStoreError::query(err.to_string()))?;
    Expense::new(ExpenseDraft {
        id: ExpenseId::from_uuid(row.id),
        session_id: CashSessionId::from_uuid(row.session_id),
        concept,
        amount: decode_money(row.amount, "expense amount")?,
        recorded_by: UserId::from_uuid(row.recorded_by),
        recorded_at: row.recorded_at,
    })
    .map_err(|err| LedgerStoreError::query(err.to_string()))
}

fn collect_rows<R, T>(
    rows: Vec<R>,
    convert: fn(R) -> Result<T, LedgerStoreError>,
) -> Result<Vec<T>, LedgerStoreError> {
    rows.into_iter().map(convert).collect()
}

async fn load_expenses(
    conn: &mut AsyncPgConnection,
    session_id: Uuid,
) -> Result<Vec<ExpenseRow>, DieselError> {
    cash_expenses::table
        .filter(cash_expenses::session_id.eq(session_id))
        .order((cash_expenses::recorded_at.asc(), cash_expenses::seq.asc()))
        .select(ExpenseRow::as_select())
        .load(conn)
        .await
}

async fn load_sales_total(
    conn: &mut AsyncPgConnection,
    session_id: Uuid,
) -> Result<Decimal, DieselError> {
    let total: Option<Decimal> = cash_session_sales::table
        .filter(cash_session_sales::session_id.eq(session_id))
        .select(diesel::dsl::sum(cash_session_sales::amount))
        .first(conn)
        .await?;
    Ok(total.unwrap_or(Decimal::ZERO))
}

async fn lock_session(
    conn: &mut AsyncPgConnection,
    session_id: Uuid,
) -> Result<Option<SessionRow>, DieselError> {
    cash_sessions::table
        .filter(cash_sessions::id.eq(session_id))
        .select(SessionRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()
}

#[async_trait]
impl LedgerStore for DieselLedgerStore {
    async fn list_registers(&self) -> Result<Vec<RegisterSnapshot>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (register_rows, open_rows) = conn
            .transaction(|tx| {
                async move {
                    let registers: Vec<RegisterRow> = cash_registers::table
                        .order(cash_registers::name.asc())
                        .select(RegisterRow::as_select())
                        .load(tx)
                        .await?;
                    let open: Vec<SessionRow> = cash_sessions::table
                        .filter(cash_sessions::closed_at.is_null())
                        .select(SessionRow::as_select())
                        .load(tx)
                        .await?;
                    Ok::<_, DieselError>((registers, open))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let mut open_by_register: HashMap<RegisterId, CashSession> =
            collect_rows(open_rows, row_to_session)?
                .into_iter()
                .map(|session| (session.register_id(), session))
                .collect();

        collect_rows(register_rows, row_to_register).map(|registers| {
            registers
                .into_iter()
                .map(|register| RegisterSnapshot {
                    open_session: open_by_register.remove(&register.id()),
                    register,
                })
                .collect()
        })
    }

    async fn find_register(
        &self,
        register_id: &RegisterId,
    ) -> Result<Option<Register>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = cash_registers::table
            .filter(cash_registers::id.eq(register_id.as_uuid()))
            .select(RegisterRow::as_select())
            .first::<RegisterRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_register).transpose()
    }

    async fn list_sessions_for_register(
        &self,
        register_id: &RegisterId,
    ) -> Result<Vec<CashSession>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SessionRow> = cash_sessions::table
            .filter(cash_sessions::register_id.eq(register_id.as_uuid()))
            .order((cash_sessions::opened_at.desc(), cash_sessions::id.desc()))
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows, row_to_session)
    }

    async fn find_session(
        &self,
        session_id: &CashSessionId,
    ) -> Result<Option<CashSession>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = cash_sessions::table
            .filter(cash_sessions::id.eq(session_id.as_uuid()))
            .select(SessionRow::as_select())
            .first::<SessionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_session).transpose()
    }

    async fn open_session(
        &self,
        request: &NewCashSession,
    ) -> Result<OpenSessionOutcome, LedgerStoreError> {
        let register_id = request.register_id;
        let new_row = NewSessionRow {
            id: *request.session_id.as_uuid(),
            register_id: *register_id.as_uuid(),
            opened_by: *request.opened_by.as_uuid(),
            opened_at: request.opened_at,
            initial_amount: request.initial_amount.amount(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (row, reattached) = conn
            .transaction(|tx| {
                async move {
                    let locked = cash_registers::table
                        .filter(cash_registers::id.eq(new_row.register_id))
                        .select(cash_registers::id)
                        .for_update()
                        .first::<Uuid>(tx)
                        .await
                        .optional()?;
                    if locked.is_none() {
                        return Err(LedgerStoreError::register_not_found(register_id).into());
                    }

                    let open_row = cash_sessions::table
                        .filter(cash_sessions::register_id.eq(new_row.register_id))
                        .filter(cash_sessions::closed_at.is_null())
                        .select(SessionRow::as_select())
                        .first::<SessionRow>(tx)
                        .await
                        .optional()?;
                    if let Some(existing) = open_row {
                        if existing.opened_by == new_row.opened_by {
                            return Ok((existing, true));
                        }
                        return Err(
                            LedgerStoreError::register_already_open_by_other(register_id).into(),
                        );
                    }

                    let inserted = diesel::insert_into(cash_sessions::table)
                        .values(&new_row)
                        .returning(SessionRow::as_returning())
                        .get_result::<SessionRow>(tx)
                        .await
                        .map_err(|err| {
                            if is_unique_violation(&err) {
                                LedgerTxError::Ledger(
                                    LedgerStoreError::register_already_open_by_other(register_id),
                                )
                            } else {
                                LedgerTxError::Diesel(err)
                            }
                        })?;
                    Ok::<_, LedgerTxError>((inserted, false))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        debug!(%register_id, reattached, "open session transaction committed");
        Ok(OpenSessionOutcome {
            session: row_to_session(row)?,
            reattached,
        })
    }

    async fn close_session(
        &self,
        request: &CloseCashSession,
    ) -> Result<ClosedSessionRecord, LedgerStoreError> {
        let session_id = request.session_id;
        let register_id = *request.register_id.as_uuid();
        let closer = *request.closure.closed_by.as_uuid();
        let update = SessionClosureUpdate {
            closed_at: request.closure.closed_at,
            closed_by: closer,
            counted_amount: request.closure.counted_amount.amount(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (register_row, session_row, expense_rows, sales_total) = conn
            .transaction(|tx| {
                async move {
                    let current = lock_session(tx, *session_id.as_uuid())
                        .await?
                        .filter(|row| row.register_id == register_id)
                        .ok_or_else(|| LedgerStoreError::session_not_found(session_id))?;
                    if current.closed_at.is_some() {
                        return Err(LedgerStoreError::session_already_closed(session_id).into());
                    }
                    if current.opened_by != closer {
                        return Err(LedgerStoreError::session_owned_by_other(session_id).into());
                    }

                    let closed = diesel::update(
                        cash_sessions::table
                            .filter(cash_sessions::id.eq(current.id))
                            .filter(cash_sessions::closed_at.is_null()),
                    )
                    .set(&update)
                    .returning(SessionRow::as_returning())
                    .get_result::<SessionRow>(tx)
                    .await
                    .optional()?
                    .ok_or_else(|| LedgerStoreError::session_already_closed(session_id))?;

                    let register = cash_registers::table
                        .filter(cash_registers::id.eq(register_id))
                        .select(RegisterRow::as_select())
                        .first::<RegisterRow>(tx)
                        .await?;
                    let expenses = load_expenses(tx, current.id).await?;
                    let sales = load_sales_total(tx, current.id).await?;
                    Ok::<_, LedgerTxError>((register, closed, expenses, sales))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        Ok(ClosedSessionRecord {
            register: row_to_register(register_row)?,
            session: row_to_session(session_row)?,
            expenses: collect_rows(expense_rows, row_to_expense)?,
            sales_total: decode_total(sales_total)?,
        })
    }

    async fn add_expense(&self, expense: &Expense) -> Result<(), LedgerStoreError> {
        let session_id = expense.session_id();
        let new_row = NewExpenseRow {
            id: *expense.id().as_uuid(),
            session_id: *session_id.as_uuid(),
            concept: expense.concept().as_ref(),
            amount: expense.amount().amount(),
            recorded_by: *expense.recorded_by().as_uuid(),
            recorded_at: expense.recorded_at(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|tx| {
            async move {
                let current = lock_session(tx, new_row.session_id)
                    .await?
                    .ok_or_else(|| LedgerStoreError::session_not_found(session_id))?;
                if current.closed_at.is_some() {
                    return Err(LedgerStoreError::session_closed(session_id).into());
                }
                diesel::insert_into(cash_expenses::table)
                    .values(&new_row)
                    .execute(tx)
                    .await?;
                Ok::<_, LedgerTxError>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn list_expenses(
        &self,
        session_id: &CashSessionId,
    ) -> Result<Vec<Expense>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = load_expenses(&mut conn, *session_id.as_uuid())
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows, row_to_expense)
    }

    async fn sales_total(&self, session_id: &CashSessionId) -> Result<Money, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total = load_sales_total(&mut conn, *session_id.as_uuid())
            .await
            .map_err(map_diesel_error)?;
        decode_total(total)
    }
}
