//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie session carries two things: the authenticated operator id and
//! the terminal's cash session marker, the (register, session) pair this
//! terminal opened. Handlers only deal with domain types.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, SessionOwnership, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const OWNERSHIP_KEY: &str = "cash_session";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredOwnership {
    register_id: String,
    session_id: String,
}

impl From<&SessionOwnership> for StoredOwnership {
    fn from(value: &SessionOwnership) -> Self {
        Self {
            register_id: value.register_id.to_string(),
            session_id: value.session_id.to_string(),
        }
    }
}

impl StoredOwnership {
    fn into_domain(self) -> Option<SessionOwnership> {
        let register_id = self.register_id.parse().ok()?;
        let session_id = self.session_id.parse().ok()?;
        Some(SessionOwnership::new(register_id, session_id))
    }
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated operator's id in the session cookie.
    ///
    /// Logging in as a different operator drops any marker left behind by
    /// the previous one.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        if self.user_id()?.as_ref() != Some(user_id) {
            self.0.remove(OWNERSHIP_KEY);
        }
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(user_id) => Ok(Some(user_id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Marker of the cash session this terminal opened, if any.
    pub fn ownership(&self) -> Result<Option<SessionOwnership>, Error> {
        let stored = self
            .0
            .get::<StoredOwnership>(OWNERSHIP_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(stored.and_then(|raw| {
            let parsed = raw.into_domain();
            if parsed.is_none() {
                tracing::warn!("invalid cash session marker in session cookie");
            }
            parsed
        }))
    }

    /// Point the terminal's marker at `ownership`.
    pub fn set_ownership(&self, ownership: &SessionOwnership) -> Result<(), Error> {
        self.0
            .insert(OWNERSHIP_KEY, StoredOwnership::from(ownership))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the terminal's marker.
    pub fn clear_ownership(&self) {
        self.0.remove(OWNERSHIP_KEY);
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(Self::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CashSessionId, RegisterId};
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    const USER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    const OTHER_USER: &str = "9b2d4c1e-6f3a-4d8b-9c7e-2a1f5e8d3b60";
    const REGISTER: &str = "00000000-0000-0000-0000-0000000000a1";
    const SESSION: &str = "00000000-0000-0000-0000-0000000000b1";

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .route(
                "/login/{user}",
                web::get().to(|session: SessionContext, user: web::Path<String>| async move {
                    let id = UserId::new(user.into_inner())
                        .map_err(|err| Error::invalid_request(err.to_string()))?;
                    session.persist_user(&id)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/mark",
                web::get().to(|session: SessionContext| async move {
                    let register_id: RegisterId = REGISTER.parse().expect("fixture register");
                    let session_id: CashSessionId = SESSION.parse().expect("fixture session");
                    session.set_ownership(&SessionOwnership::new(register_id, session_id))?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/unmark",
                web::get().to(|session: SessionContext| async move {
                    session.clear_ownership();
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/whoami",
                web::get().to(|session: SessionContext| async move {
                    let id = session.require_user_id()?;
                    let marker = session
                        .ownership()?
                        .map(|m| m.session_id.to_string())
                        .unwrap_or_default();
                    Ok::<_, Error>(HttpResponse::Ok().body(format!("{id}|{marker}")))
                }),
            )
    }

    async fn call(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        uri: &str,
        cookie: Option<Cookie<'static>>,
    ) -> (StatusCode, Option<Cookie<'static>>, String) {
        let mut request = test::TestRequest::get().uri(uri);
        if let Some(current) = cookie.clone() {
            request = request.cookie(current);
        }
        let response = test::call_service(app, request.to_request()).await;
        let status = response.status();
        let next = response
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .map(Cookie::into_owned)
            .or(cookie);
        let body = test::read_body(response).await;
        (
            status,
            next,
            String::from_utf8(body.to_vec()).expect("utf8 body"),
        )
    }

    #[actix_web::test]
    async fn round_trips_user_and_marker() {
        let app = test::init_service(session_test_app()).await;
        let (_, logged_in, _) = call(&app, &format!("/login/{USER}"), None).await;
        let (_, marked, _) = call(&app, "/mark", logged_in).await;
        let (status, _, body) = call(&app, "/whoami", marked).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{USER}|{SESSION}"));
    }

    #[actix_web::test]
    async fn clearing_marker_keeps_login() {
        let app = test::init_service(session_test_app()).await;
        let (_, logged_in, _) = call(&app, &format!("/login/{USER}"), None).await;
        let (_, marked, _) = call(&app, "/mark", logged_in).await;
        let (_, unmarked, _) = call(&app, "/unmark", marked).await;
        let (status, _, body) = call(&app, "/whoami", unmarked).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{USER}|"));
    }

    #[actix_web::test]
    async fn switching_operator_drops_marker() {
        let app = test::init_service(session_test_app()).await;
        let (_, logged_in, _) = call(&app, &format!("/login/{USER}"), None).await;
        let (_, marked, _) = call(&app, "/mark", logged_in).await;
        let (_, switched, _) = call(&app, &format!("/login/{OTHER_USER}"), marked).await;
        let (_, _, body) = call(&app, "/whoami", switched).await;

        assert_eq!(body, format!("{OTHER_USER}|"));
    }

    #[actix_web::test]
    async fn missing_user_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let (status, _, _) = call(&app, "/whoami", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tampered_marker_is_ignored() {
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(
                                OWNERSHIP_KEY,
                                serde_json::json!({"registerId": "x", "sessionId": "y"}),
                            )
                            .expect("set invalid marker");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/marker",
                    web::get().to(|session: SessionContext| async move {
                        let marker = session.ownership()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(marker.is_some().to_string()))
                    }),
                ),
        )
        .await;

        let (_, cookie, _) = call(&app, "/set-invalid", None).await;
        let (status, _, body) = call(&app, "/marker", cookie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "false");
    }
}
