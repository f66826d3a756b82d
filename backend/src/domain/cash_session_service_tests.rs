//! Tests for the cash session lifecycle service.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

use super::*;
use crate::domain::ports::{ClosedSessionRecord, MockLedgerStore, OpenSessionOutcome};
use crate::domain::{
    CashSessionDraft, Classification, ErrorCode, Expense, ExpenseConcept, ExpenseDraft, ExpenseId,
    Money, Register, RegisterId, RegisterName, UserId,
};

struct FixtureClock(DateTime<Utc>);

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0)
        .single()
        .expect("fixture timestamp is valid")
}

fn money(raw: &str) -> Money {
    raw.parse().expect("fixture amount is valid")
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

fn open_session(register: &Register, owner: &UserId) -> CashSession {
    CashSession::new(CashSessionDraft {
        id: CashSessionId::random(),
        register_id: register.id(),
        opened_by: owner.clone(),
        opened_at: now() - Duration::hours(8),
        initial_amount: money("100000"),
        closure: None,
    })
    .expect("fixture session is valid")
}

fn closed(session: &CashSession, owner: &UserId, counted: &str) -> CashSession {
    session
        .close(SessionClosure {
            closed_at: now(),
            closed_by: owner.clone(),
            counted_amount: money(counted),
        })
        .expect("fixture close is valid")
}

fn expense(session: &CashSession, owner: &UserId, amount: &str) -> Expense {
    Expense::new(ExpenseDraft {
        id: ExpenseId::random(),
        session_id: session.id(),
        concept: ExpenseConcept::new("Proveedor").expect("valid concept"),
        amount: money(amount),
        recorded_by: owner.clone(),
        recorded_at: session.opened_at(),
    })
    .expect("fixture expense is valid")
}

fn service(store: MockLedgerStore) -> CashSessionService<MockLedgerStore> {
    CashSessionService::new(Arc::new(store), Arc::new(FixtureClock(now())))
}

fn marker(session: &CashSession) -> Option<SessionOwnership> {
    Some(SessionOwnership::new(session.register_id(), session.id()))
}

fn close_request(
    session: &CashSession,
    user: &UserId,
    ownership: Option<SessionOwnership>,
) -> CloseRegisterRequest {
    CloseRegisterRequest {
        register_id: session.register_id(),
        session_id: session.id(),
        user_id: user.clone(),
        counted_amount: money("135000"),
        ownership,
    }
}

#[rstest]
#[tokio::test]
async fn open_register_stamps_clock_and_returns_marker(register: Register, operator: UserId) {
    let mut store = MockLedgerStore::new();
    store.expect_find_session().times(0);
    store.expect_open_session().times(1).returning(|request| {
        let session = CashSession::new(CashSessionDraft {
            id: request.session_id,
            register_id: request.register_id,
            opened_by: request.opened_by.clone(),
            opened_at: request.opened_at,
            initial_amount: request.initial_amount,
            closure: None,
        })
        .expect("valid session");
        Ok(OpenSessionOutcome {
            session,
            reattached: false,
        })
    });

    let response = service(store)
        .open_register(OpenRegisterRequest {
            register_id: register.id(),
            user_id: operator.clone(),
            initial_amount: money("100000"),
            ownership: None,
        })
        .await
        .expect("open succeeds");

    assert_eq!(response.session.opened_at(), now());
    assert_eq!(response.session.opened_by(), &operator);
    assert_eq!(
        response.ownership,
        SessionOwnership::new(register.id(), response.session.id())
    );
    assert!(!response.reattached);
    assert!(response.previous_ownership.is_none());
}

#[rstest]
#[tokio::test]
async fn open_register_maps_exclusivity_conflict(register: Register, operator: UserId) {
    let register_id = register.id();
    let mut store = MockLedgerStore::new();
    store
        .expect_open_session()
        .times(1)
        .return_once(move |_| Err(LedgerStoreError::register_already_open_by_other(register_id)));

    let err = service(store)
        .open_register(OpenRegisterRequest {
            register_id,
            user_id: operator,
            initial_amount: Money::ZERO,
            ownership: None,
        })
        .await
        .expect_err("conflict");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.reason(), Some(reason::REGISTER_ALREADY_OPEN_BY_OTHER));
}

#[rstest]
#[tokio::test]
async fn open_register_echoes_replaced_marker(register: Register, operator: UserId) {
    let other_register = Register::new(
        RegisterId::random(),
        RegisterName::new("Caja 2").expect("valid name"),
    );
    let held = open_session(&other_register, &operator);
    let held_marker = marker(&held);
    let fresh = open_session(&register, &operator);

    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .times(1)
        .return_once(move |_| Ok(Some(held)));
    store.expect_open_session().times(1).return_once(move |_| {
        Ok(OpenSessionOutcome {
            session: fresh,
            reattached: false,
        })
    });

    let response = service(store)
        .open_register(OpenRegisterRequest {
            register_id: register.id(),
            user_id: operator,
            initial_amount: Money::ZERO,
            ownership: held_marker,
        })
        .await
        .expect("open succeeds");

    assert_eq!(response.previous_ownership, held_marker);
}

#[rstest]
#[tokio::test]
async fn close_without_marker_is_forbidden(register: Register, operator: UserId) {
    let session = open_session(&register, &operator);
    let stored = session.clone();
    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    store.expect_close_session().times(0);

    let err = service(store)
        .close_register(close_request(&session, &operator, None))
        .await
        .expect_err("missing marker");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.reason(), Some(reason::SESSION_NOT_OWNED_BY_CALLER));
}

#[rstest]
#[case::own_session(true, ErrorCode::Conflict, reason::SESSION_ALREADY_CLOSED)]
#[case::foreign_session(false, ErrorCode::Forbidden, reason::SESSION_NOT_OWNED_BY_CALLER)]
#[tokio::test]
async fn close_after_marker_cleared_reports_closed_session_to_its_owner(
    register: Register,
    operator: UserId,
    #[case] caller_is_owner: bool,
    #[case] expected_code: ErrorCode,
    #[case] expected_reason: &str,
) {
    let session = open_session(&register, &operator);
    let stored = closed(&session, &operator, "100000");
    let caller = if caller_is_owner {
        operator.clone()
    } else {
        UserId::random()
    };
    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    store.expect_close_session().times(0);

    let err = service(store)
        .close_register(close_request(&session, &caller, None))
        .await
        .expect_err("closed session cannot be closed again");

    assert_eq!(err.code(), expected_code);
    assert_eq!(err.reason(), Some(expected_reason));
}

#[rstest]
#[tokio::test]
async fn close_without_marker_of_unknown_session_is_forbidden(
    register: Register,
    operator: UserId,
) {
    let session = open_session(&register, &operator);
    let mut store = MockLedgerStore::new();
    store.expect_find_session().times(1).return_once(|_| Ok(None));
    store.expect_close_session().times(0);

    let err = service(store)
        .close_register(close_request(&session, &operator, None))
        .await
        .expect_err("unknown session");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn close_by_another_operator_is_forbidden(register: Register, operator: UserId) {
    let session = open_session(&register, &operator);
    let ownership = marker(&session);
    let stored = session.clone();
    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    store.expect_close_session().times(0);

    let err = service(store)
        .close_register(close_request(&session, &UserId::random(), ownership))
        .await
        .expect_err("foreign session");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn close_of_closed_session_conflicts(register: Register, operator: UserId) {
    let session = open_session(&register, &operator);
    let ownership = marker(&session);
    let stored = closed(&session, &operator, "1");
    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    store.expect_close_session().times(0);

    let err = service(store)
        .close_register(close_request(&session, &operator, ownership))
        .await
        .expect_err("already closed");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.reason(), Some(reason::SESSION_ALREADY_CLOSED));
}

#[rstest]
#[tokio::test]
async fn close_reconciles_the_closed_record(register: Register, operator: UserId) {
    let session = open_session(&register, &operator);
    let ownership = marker(&session);
    let stored = session.clone();
    let record = ClosedSessionRecord {
        register: register.clone(),
        session: closed(&session, &operator, "135000"),
        expenses: vec![
            expense(&session, &operator, "12000"),
            expense(&session, &operator, "3000"),
        ],
        sales_total: money("50000"),
    };

    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    let expected_closer = operator.clone();
    store
        .expect_close_session()
        .times(1)
        .withf(move |request| {
            request.closure.closed_by == expected_closer
                && request.closure.counted_amount == money("135000")
        })
        .return_once(move |_| Ok(record));

    let response = service(store)
        .close_register(close_request(&session, &operator, ownership))
        .await
        .expect("close succeeds");

    assert_eq!(response.report.discrepancy, Decimal::ZERO);
    assert_eq!(response.report.classification, Classification::Balanced);
    assert_eq!(response.report.expense_count, 2);
}

#[rstest]
#[tokio::test]
async fn close_maps_lost_race_to_conflict(register: Register, operator: UserId) {
    let session = open_session(&register, &operator);
    let ownership = marker(&session);
    let stored = session.clone();
    let session_id = session.id();
    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .return_once(move |_| Ok(Some(stored)));
    store
        .expect_close_session()
        .return_once(move |_| Err(LedgerStoreError::session_already_closed(session_id)));

    let err = service(store)
        .close_register(close_request(&session, &operator, ownership))
        .await
        .expect_err("lost race");

    assert_eq!(err.reason(), Some(reason::SESSION_ALREADY_CLOSED));
}

#[rstest]
#[tokio::test]
async fn current_session_without_marker_is_none(operator: UserId) {
    let mut store = MockLedgerStore::new();
    store.expect_find_session().times(0);

    let response = service(store)
        .current_session(CurrentSessionRequest {
            user_id: operator,
            ownership: None,
        })
        .await
        .expect("lookup succeeds");

    assert_eq!(response, CurrentSessionResponse::None);
}

#[rstest]
#[case::closed(true)]
#[case::missing(false)]
#[tokio::test]
async fn current_session_reports_stale_marker(
    register: Register,
    operator: UserId,
    #[case] exists: bool,
) {
    let session = open_session(&register, &operator);
    let ownership = marker(&session);
    let stored = exists.then(|| closed(&session, &operator, "0"));
    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .return_once(move |_| Ok(stored));

    let response = service(store)
        .current_session(CurrentSessionRequest {
            user_id: operator,
            ownership,
        })
        .await
        .expect("lookup succeeds");

    assert!(matches!(response, CurrentSessionResponse::Stale { .. }));
}

#[rstest]
#[tokio::test]
async fn current_session_returns_active_session(register: Register, operator: UserId) {
    let session = open_session(&register, &operator);
    let ownership = marker(&session);
    let stored = session.clone();
    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .return_once(move |_| Ok(Some(stored)));

    let response = service(store)
        .current_session(CurrentSessionRequest {
            user_id: operator,
            ownership,
        })
        .await
        .expect("lookup succeeds");

    assert!(
        matches!(response, CurrentSessionResponse::Active { session: active, .. } if active == session)
    );
}

#[rstest]
#[tokio::test]
async fn session_report_rejects_open_session(register: Register, operator: UserId) {
    let session = open_session(&register, &operator);
    let session_id = session.id();
    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .return_once(move |_| Ok(Some(session)));
    store.expect_list_expenses().times(0);

    let err = service(store)
        .session_report(SessionReportRequest { session_id })
        .await
        .expect_err("open session has no report");

    assert_eq!(err.reason(), Some(reason::SESSION_NOT_CLOSED));
}

#[rstest]
#[tokio::test]
async fn session_report_recomputes_closed_session(register: Register, operator: UserId) {
    let session = open_session(&register, &operator);
    let expenses = vec![
        expense(&session, &operator, "12000"),
        expense(&session, &operator, "3000"),
    ];
    let stored = closed(&session, &operator, "130000");
    let session_id = stored.id();
    let mut store = MockLedgerStore::new();
    store
        .expect_find_session()
        .return_once(move |_| Ok(Some(stored)));
    store
        .expect_find_register()
        .return_once(move |_| Ok(Some(register)));
    store
        .expect_list_expenses()
        .return_once(move |_| Ok(expenses));
    store
        .expect_sales_total()
        .return_once(|_| Ok(money("50000")));

    let report = service(store)
        .session_report(SessionReportRequest { session_id })
        .await
        .expect("report succeeds");

    assert_eq!(report.discrepancy, Decimal::from(-5000));
    assert_eq!(report.classification, Classification::Shortfall);
}
