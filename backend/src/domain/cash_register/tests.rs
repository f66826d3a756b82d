//! Tests for cash register domain types and reconciliation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

use super::*;
use crate::domain::UserId;

fn money(raw: &str) -> Money {
    raw.parse().expect("fixture amount is valid")
}

fn decimal(raw: &str) -> Decimal {
    Decimal::from_str_exact(raw).expect("fixture decimal is valid")
}

#[fixture]
fn opened_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("fixture timestamp is valid")
}

#[fixture]
fn operator() -> UserId {
    UserId::new("11111111-1111-4111-8111-111111111111").expect("fixture user id is valid")
}

#[fixture]
fn register() -> Register {
    Register::new(
        RegisterId::random(),
        RegisterName::new("Caja 1").expect("fixture name is valid"),
    )
}

fn open_session(register: &Register, operator: &UserId, opened_at: DateTime<Utc>) -> CashSession {
    CashSession::new(CashSessionDraft {
        id: CashSessionId::random(),
        register_id: register.id(),
        opened_by: operator.clone(),
        opened_at,
        initial_amount: money("100000"),
        closure: None,
    })
    .expect("open session is valid")
}

fn close_with(session: &CashSession, operator: &UserId, counted: &str) -> CashSession {
    session
        .close(SessionClosure {
            closed_at: session.opened_at() + Duration::hours(8),
            closed_by: operator.clone(),
            counted_amount: money(counted),
        })
        .expect("close succeeds")
}

fn expense(session: &CashSession, operator: &UserId, concept: &str, amount: &str) -> Expense {
    Expense::new(ExpenseDraft {
        id: ExpenseId::random(),
        session_id: session.id(),
        concept: ExpenseConcept::new(concept).expect("fixture concept is valid"),
        amount: money(amount),
        recorded_by: operator.clone(),
        recorded_at: session.opened_at() + Duration::minutes(30),
    })
    .expect("fixture expense is valid")
}

#[rstest]
#[case("135000", "0", Classification::Balanced)]
#[case("130000", "-5000", Classification::Shortfall)]
#[case("136000.50", "1000.50", Classification::Surplus)]
fn reconcile_classifies_discrepancy(
    register: Register,
    operator: UserId,
    opened_at: DateTime<Utc>,
    #[case] counted: &str,
    #[case] expected_discrepancy: &str,
    #[case] expected: Classification,
) {
    let open = open_session(&register, &operator, opened_at);
    let expenses = vec![
        expense(&open, &operator, "Proveedor", "12000"),
        expense(&open, &operator, "Taxi", "3000"),
    ];
    let closed = close_with(&open, &operator, counted);

    let report = reconcile(ReconciliationInput {
        register: &register,
        session: &closed,
        expenses: &expenses,
        sales_total: money("50000"),
    })
    .expect("reconciliation succeeds");

    assert_eq!(report.expenses_total, money("15000"));
    assert_eq!(report.expense_count, 2);
    assert_eq!(report.theoretical_balance, decimal("135000"));
    assert_eq!(report.discrepancy, decimal(expected_discrepancy));
    assert_eq!(report.classification, expected);
    assert_eq!(report.closed_by, operator);
    assert_eq!(report.register_name.as_ref(), "Caja 1");
}

#[rstest]
fn reconcile_allows_negative_theoretical_balance(
    register: Register,
    operator: UserId,
    opened_at: DateTime<Utc>,
) {
    let open = open_session(&register, &operator, opened_at);
    let expenses = vec![expense(&open, &operator, "Reparación", "150000")];
    let closed = close_with(&open, &operator, "0");

    let report = reconcile(ReconciliationInput {
        register: &register,
        session: &closed,
        expenses: &expenses,
        sales_total: Money::ZERO,
    })
    .expect("reconciliation succeeds");

    assert_eq!(report.theoretical_balance, decimal("-50000"));
    assert_eq!(report.discrepancy, decimal("50000"));
    assert_eq!(report.classification, Classification::Surplus);
}

#[rstest]
fn reconcile_rejects_open_session(
    register: Register,
    operator: UserId,
    opened_at: DateTime<Utc>,
) {
    let open = open_session(&register, &operator, opened_at);
    let err = reconcile(ReconciliationInput {
        register: &register,
        session: &open,
        expenses: &[],
        sales_total: Money::ZERO,
    })
    .expect_err("open sessions cannot be reconciled");
    assert!(matches!(err, ReconciliationError::SessionNotClosed { .. }));
}

#[rstest]
fn reconcile_rejects_expenses_from_other_sessions(
    register: Register,
    operator: UserId,
    opened_at: DateTime<Utc>,
) {
    let open = open_session(&register, &operator, opened_at);
    let other = open_session(&register, &operator, opened_at);
    let expenses = vec![expense(&other, &operator, "Taxi", "10")];
    let closed = close_with(&open, &operator, "100000");

    let err = reconcile(ReconciliationInput {
        register: &register,
        session: &closed,
        expenses: &expenses,
        sales_total: Money::ZERO,
    })
    .expect_err("foreign expense must be rejected");
    assert!(matches!(err, ReconciliationError::ForeignExpense { .. }));
}

#[rstest]
fn reconcile_reports_overflow(register: Register, operator: UserId, opened_at: DateTime<Utc>) {
    let huge = Money::total(Decimal::MAX).expect("max is integral");
    let session = open_session(&register, &operator, opened_at);
    let closed = close_with(&session, &operator, "0");

    let err = reconcile(ReconciliationInput {
        register: &register,
        session: &closed,
        expenses: &[],
        sales_total: huge,
    })
    .expect_err("sum overflows");
    assert_eq!(err, ReconciliationError::Overflow);
}

#[rstest]
fn close_twice_is_rejected(register: Register, operator: UserId, opened_at: DateTime<Utc>) {
    let open = open_session(&register, &operator, opened_at);
    let closed = close_with(&open, &operator, "1");
    let err = closed
        .close(SessionClosure {
            closed_at: opened_at + Duration::hours(9),
            closed_by: operator,
            counted_amount: Money::ZERO,
        })
        .expect_err("already closed");
    assert_eq!(err, CashRegisterValidationError::SessionAlreadyClosed);
}

#[rstest]
fn close_before_open_is_rejected(register: Register, operator: UserId, opened_at: DateTime<Utc>) {
    let open = open_session(&register, &operator, opened_at);
    let err = open
        .close(SessionClosure {
            closed_at: opened_at - Duration::seconds(1),
            closed_by: operator,
            counted_amount: Money::ZERO,
        })
        .expect_err("closure predates opening");
    assert_eq!(err, CashRegisterValidationError::ClosedBeforeOpened);
}

#[rstest]
fn expenses_must_be_positive(register: Register, operator: UserId, opened_at: DateTime<Utc>) {
    let open = open_session(&register, &operator, opened_at);
    let err = Expense::new(ExpenseDraft {
        id: ExpenseId::random(),
        session_id: open.id(),
        concept: ExpenseConcept::new("Nada").expect("valid concept"),
        amount: Money::ZERO,
        recorded_by: operator,
        recorded_at: opened_at,
    })
    .expect_err("zero expense rejected");
    assert!(matches!(
        err,
        CashRegisterValidationError::InvalidAmount(MoneyError::NotPositive { .. })
    ));
}

#[rstest]
#[case("", CashRegisterValidationError::EmptyConcept)]
#[case("   ", CashRegisterValidationError::EmptyConcept)]
fn concept_rejects_blank(#[case] raw: &str, #[case] expected: CashRegisterValidationError) {
    assert_eq!(ExpenseConcept::new(raw), Err(expected));
}

#[rstest]
fn concept_rejects_overlong_text() {
    let raw = "x".repeat(ExpenseConcept::MAX_LEN + 1);
    assert!(matches!(
        ExpenseConcept::new(raw),
        Err(CashRegisterValidationError::ConceptTooLong { .. })
    ));
}

#[rstest]
fn register_name_rejects_overlong_text() {
    let raw = "c".repeat(REGISTER_NAME_MAX_LEN + 1);
    assert!(matches!(
        RegisterName::new(raw),
        Err(CashRegisterValidationError::RegisterNameTooLong { .. })
    ));
}

mod directory {
    use super::*;

    fn snapshot(register: &Register, open: Option<CashSession>) -> RegisterSnapshot {
        RegisterSnapshot {
            register: register.clone(),
            open_session: open,
        }
    }

    #[rstest]
    fn closed_register_is_available(register: Register, operator: UserId) {
        let summary = RegisterSummary::classify(snapshot(&register, None), &operator, None);
        assert_eq!(summary.availability, RegisterAvailability::ClosedAvailable);
        assert_eq!(
            summary.actions,
            RegisterActions {
                open: true,
                add_expense: false,
                close: false
            }
        );
    }

    #[rstest]
    fn marked_session_of_caller_is_mine(
        register: Register,
        operator: UserId,
        opened_at: DateTime<Utc>,
    ) {
        let open = open_session(&register, &operator, opened_at);
        let marker = SessionOwnership::new(register.id(), open.id());
        let summary =
            RegisterSummary::classify(snapshot(&register, Some(open)), &operator, Some(&marker));
        assert_eq!(summary.availability, RegisterAvailability::MineAndOpen);
        assert!(summary.actions.add_expense);
        assert!(summary.actions.close);
        assert!(!summary.actions.open);
    }

    #[rstest]
    fn session_of_another_operator_is_blocked(
        register: Register,
        operator: UserId,
        opened_at: DateTime<Utc>,
    ) {
        let open = open_session(&register, &operator, opened_at);
        let marker = SessionOwnership::new(register.id(), open.id());
        let summary = RegisterSummary::classify(
            snapshot(&register, Some(open)),
            &UserId::random(),
            Some(&marker),
        );
        assert_eq!(summary.availability, RegisterAvailability::OpenByOther);
        assert_eq!(summary.actions, RegisterActions::default());
    }

    #[rstest]
    fn unmarked_session_of_caller_can_be_reattached(
        register: Register,
        operator: UserId,
        opened_at: DateTime<Utc>,
    ) {
        let open = open_session(&register, &operator, opened_at);
        let summary = RegisterSummary::classify(snapshot(&register, Some(open)), &operator, None);
        assert_eq!(summary.availability, RegisterAvailability::OpenByOther);
        assert!(summary.actions.open);
        assert!(!summary.actions.close);
    }
}
