//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CashSessionCommand, LoginService, MovementLedgerCommand, MovementLedgerQuery,
    SessionDirectoryQuery, SessionReportQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Operator authentication.
    pub login: Arc<dyn LoginService>,
    /// Register open and close.
    pub cash_sessions: Arc<dyn CashSessionCommand>,
    /// Closing report reprints.
    pub reports: Arc<dyn SessionReportQuery>,
    /// Expense recording.
    pub expenses: Arc<dyn MovementLedgerCommand>,
    /// Expense listing.
    pub expenses_query: Arc<dyn MovementLedgerQuery>,
    /// Register picker and session history.
    pub directory: Arc<dyn SessionDirectoryQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Operator authentication.
    pub login: Arc<dyn LoginService>,
    /// Register open and close.
    pub cash_sessions: Arc<dyn CashSessionCommand>,
    /// Closing report reprints.
    pub reports: Arc<dyn SessionReportQuery>,
    /// Expense recording.
    pub expenses: Arc<dyn MovementLedgerCommand>,
    /// Expense listing.
    pub expenses_query: Arc<dyn MovementLedgerQuery>,
    /// Register picker and session history.
    pub directory: Arc<dyn SessionDirectoryQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use caja::domain::ports::FixtureLoginService;
    /// use caja::domain::{CashSessionService, MovementLedgerService, SessionDirectoryService};
    /// use caja::inbound::http::state::{HttpState, HttpStatePorts};
    /// use caja::outbound::memory::InMemoryLedgerStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryLedgerStore::new());
    /// let clock = Arc::new(DefaultClock);
    /// let sessions = Arc::new(CashSessionService::new(store.clone(), clock.clone()));
    /// let ledger = Arc::new(MovementLedgerService::new(store.clone(), clock));
    /// let state = HttpState::new(HttpStatePorts {
    ///     login: Arc::new(FixtureLoginService),
    ///     cash_sessions: sessions.clone(),
    ///     reports: sessions,
    ///     expenses: ledger.clone(),
    ///     expenses_query: ledger,
    ///     directory: Arc::new(SessionDirectoryService::new(store)),
    /// });
    /// let _login = state.login.clone();
    /// ```
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            cash_sessions,
            reports,
            expenses,
            expenses_query,
            directory,
        } = ports;
        Self {
            login,
            cash_sessions,
            reports,
            expenses,
            expenses_query,
            directory,
        }
    }
}
