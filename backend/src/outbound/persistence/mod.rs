//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! The ledger store is backed by PostgreSQL via Diesel with async support
//! through `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: `DieselLedgerStore` only translates between Diesel
//!   rows and domain types and enforces atomicity with transactions.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leak into the domain.
//! - **Strongly typed errors**: database and pool failures are mapped to
//!   `LedgerStoreError` variants.
//!
//! # Example
//!
//! ```ignore
//! use caja::outbound::persistence::{DbPool, DieselLedgerStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/caja")).await?;
//! let store = DieselLedgerStore::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_ledger_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_ledger_store::DieselLedgerStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
