//! Driving port for operator login.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing directory of operators.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated operator id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// Well-known operators accepted by [`FixtureLoginService`].
pub const FIXTURE_OPERATORS: [(&str, &str); 2] = [
    ("admin", "123e4567-e89b-12d3-a456-426614174000"),
    ("cashier", "9b2d4c1e-6f3a-4d8b-9c7e-2a1f5e8d3b60"),
];

const FIXTURE_PASSWORD: &str = "password";

/// In-memory authenticator for development and tests.
///
/// Each operator in [`FIXTURE_OPERATORS`] logs in with the password
/// `password` and receives a fixed id, so two terminals can act as two
/// distinct operators.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.password() != FIXTURE_PASSWORD {
            return Err(Error::unauthorized("invalid credentials"));
        }
        let (_, id) = FIXTURE_OPERATORS
            .iter()
            .find(|(username, _)| *username == credentials.username())
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;
        UserId::new(id).map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
    }
}
