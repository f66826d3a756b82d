//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: process-local ledger store used without a database and in
//!   tests
//! - **persistence**: PostgreSQL-backed ledger store using Diesel ORM
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations.

pub mod memory;
pub mod persistence;
