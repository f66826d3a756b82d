//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use caja::inbound::http::session_config::SessionSettings;
use caja::outbound::memory::InMemoryLedgerStore;
use caja::outbound::persistence::DieselLedgerStore;

/// Ledger store backing the services.
#[derive(Clone)]
pub enum LedgerBackend {
    /// Process-local ledger; lost on restart.
    Memory(Arc<InMemoryLedgerStore>),
    /// PostgreSQL ledger shared by every server instance.
    Postgres(Arc<DieselLedgerStore>),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) ledger: LedgerBackend,
}

impl ServerConfig {
    /// Construct a server configuration from validated session settings.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, ledger: LedgerBackend) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            ledger,
        }
    }
}
