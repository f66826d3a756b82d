//! Cash register session lifecycle and reconciliation backend.
//!
//! Layout follows a hexagonal split: [`domain`] owns entities, services and
//! ports; [`inbound`] adapts HTTP requests; [`outbound`] implements the
//! ledger store in memory and on PostgreSQL.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
