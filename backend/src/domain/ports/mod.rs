//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cash_session_command;
mod ledger_store;
mod login_service;
mod movement_ledger;
mod session_directory_query;

#[cfg(test)]
pub use cash_session_command::{MockCashSessionCommand, MockSessionReportQuery};
pub use cash_session_command::{
    CashSessionCommand, CloseRegisterRequest, CloseRegisterResponse, CurrentSessionRequest,
    CurrentSessionResponse, OpenRegisterRequest, OpenRegisterResponse, SessionReportQuery,
    SessionReportRequest,
};
#[cfg(test)]
pub use ledger_store::MockLedgerStore;
pub use ledger_store::{
    ClosedSessionRecord, CloseCashSession, LedgerStore, LedgerStoreError, NewCashSession,
    OpenSessionOutcome,
};
pub use login_service::{FIXTURE_OPERATORS, FixtureLoginService, LoginService};
#[cfg(test)]
pub use movement_ledger::{MockMovementLedgerCommand, MockMovementLedgerQuery};
pub use movement_ledger::{
    AddExpenseRequest, AddExpenseResponse, ListExpensesRequest, ListExpensesResponse,
    MovementLedgerCommand, MovementLedgerQuery,
};
#[cfg(test)]
pub use session_directory_query::MockSessionDirectoryQuery;
pub use session_directory_query::{
    ListRegistersRequest, ListRegistersResponse, ListSessionsRequest, ListSessionsResponse,
    SessionDirectoryQuery, SessionSummary,
};
