//! HTTP inbound adapter exposing REST endpoints.

pub mod cash_sessions;
pub mod error;
pub mod health;
pub mod ledger_dto;
pub mod registers;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` handler on `cfg`.
///
/// The caller owns the scope and its session middleware.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use caja::inbound::http::configure_api;
///
/// let _app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(registers::list_registers)
        .service(registers::list_register_sessions)
        .service(registers::open_register)
        .service(registers::close_register)
        .service(cash_sessions::current_cash_session)
        .service(cash_sessions::add_expense)
        .service(cash_sessions::list_expenses)
        .service(cash_sessions::session_report);
}
