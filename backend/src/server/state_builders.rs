//! Builders wiring the ledger store into the HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use caja::domain::ports::{FixtureLoginService, LedgerStore};
use caja::domain::{CashSessionService, MovementLedgerService, SessionDirectoryService};
use caja::inbound::http::state::{HttpState, HttpStatePorts};

use super::LedgerBackend;

fn ports_for<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> HttpStatePorts
where
    S: LedgerStore + 'static,
{
    let sessions = Arc::new(CashSessionService::new(store.clone(), clock.clone()));
    let ledger = Arc::new(MovementLedgerService::new(store.clone(), clock));
    HttpStatePorts {
        login: Arc::new(FixtureLoginService),
        cash_sessions: sessions.clone(),
        reports: sessions,
        expenses: ledger.clone(),
        expenses_query: ledger,
        directory: Arc::new(SessionDirectoryService::new(store)),
    }
}

/// Build the shared HTTP state over the configured ledger backend.
pub fn build_http_state(ledger: &LedgerBackend) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let ports = match ledger {
        LedgerBackend::Memory(store) => ports_for(store.clone(), clock),
        LedgerBackend::Postgres(store) => ports_for(store.clone(), clock),
    };
    web::Data::new(HttpState::new(ports))
}
