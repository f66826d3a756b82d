//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{Method, StatusCode};
use actix_web::test as actix_test;
use mockable::DefaultClock;
use serde_json::Value;

use crate::domain::ports::FixtureLoginService;
use crate::domain::{
    CashSessionService, MovementLedgerService, Register, RegisterName, SessionDirectoryService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::users::LoginRequest;
use crate::outbound::memory::InMemoryLedgerStore;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Identifier of the seeded register `Caja 1`.
pub const REGISTER_1: &str = "00000000-0000-0000-0000-0000000000a1";
/// Identifier of the seeded register `Caja 2`.
pub const REGISTER_2: &str = "00000000-0000-0000-0000-0000000000a2";

/// In-memory ledger holding `Caja 1` ([`REGISTER_1`]) and `Caja 2`
/// ([`REGISTER_2`]).
pub fn seeded_store() -> Arc<InMemoryLedgerStore> {
    let store = InMemoryLedgerStore::new();
    for (id, name) in [(REGISTER_1, "Caja 1"), (REGISTER_2, "Caja 2")] {
        let register = Register::new(
            id.parse().expect("fixture register id"),
            RegisterName::new(name).expect("fixture register name"),
        );
        store.add_register(register).expect("register added");
    }
    Arc::new(store)
}

/// Wire the real services over an in-memory ledger.
pub fn memory_state(store: Arc<InMemoryLedgerStore>) -> HttpState {
    let clock = Arc::new(DefaultClock);
    let sessions = Arc::new(CashSessionService::new(store.clone(), clock.clone()));
    let ledger = Arc::new(MovementLedgerService::new(store.clone(), clock));
    HttpState::new(HttpStatePorts {
        login: Arc::new(FixtureLoginService),
        cash_sessions: sessions.clone(),
        reports: sessions,
        expenses: ledger.clone(),
        expenses_query: ledger,
        directory: Arc::new(SessionDirectoryService::new(store)),
    })
}

/// Log in as a fixture operator and return the session cookie.
pub async fn login_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    username: &str,
) -> Cookie<'static> {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(&LoginRequest {
            username: username.to_owned(),
            password: "password".to_owned(),
        })
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "fixture login succeeds");
    session_cookie(&response).expect("session cookie")
}

/// Extract the session cookie set by a response, if any.
pub fn session_cookie(response: &ServiceResponse) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Decoded response of [`send`], carrying the cookie to use next.
pub struct Reply {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Decoded JSON body.
    pub body: Value,
    /// Session cookie to send with the next request.
    pub cookie: Cookie<'static>,
}

/// Send a request with `cookie`, keeping it when the response does not
/// replace it.
pub async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    method: Method,
    uri: &str,
    cookie: Cookie<'static>,
    payload: Option<Value>,
) -> Reply {
    let mut request = actix_test::TestRequest::default()
        .method(method)
        .uri(uri)
        .cookie(cookie.clone());
    if let Some(json) = payload {
        request = request.set_json(json);
    }
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let next_cookie = session_cookie(&response).unwrap_or(cookie);
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    Reply {
        status,
        body,
        cookie: next_cookie,
    }
}
