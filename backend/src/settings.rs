//! Application settings loaded via OrthoConfig.
//!
//! Values come from `CAJA_*` environment variables, a configuration file or
//! command-line flags. Without `database_url` the server keeps its ledger in
//! memory, seeded with [`AppSettings::seed_registers`].

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SEED_REGISTERS: [&str; 2] = ["Caja 1", "Caja 2"];

/// Errors raised when a configured value cannot be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        /// Configured value.
        value: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAJA")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. The in-memory ledger is used when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Comma-separated register names created on startup when missing.
    pub seed_registers: Option<String>,
}

impl AppSettings {
    /// Resolve the listener address, falling back to `0.0.0.0:8080`.
    ///
    /// # Examples
    /// ```
    /// use caja::settings::AppSettings;
    ///
    /// let settings = AppSettings {
    ///     bind_addr: Some("127.0.0.1:9000".to_owned()),
    ///     database_url: None,
    ///     db_max_connections: None,
    ///     seed_registers: None,
    /// };
    /// assert_eq!(settings.bind_addr().expect("valid").port(), 9000);
    /// ```
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Database URL, ignoring blank values.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size, falling back to the default when unset.
    #[must_use]
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Register names to seed, trimmed and without blanks.
    #[must_use]
    pub fn seed_registers(&self) -> Vec<String> {
        match self.seed_registers.as_deref() {
            Some(names) => names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect(),
            None => DEFAULT_SEED_REGISTERS.map(str::to_owned).to_vec(),
        }
    }
}
