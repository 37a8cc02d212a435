//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials without knowing the backing infrastructure, then
//! store the returned [`SessionClaims`] in the session cookie.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Role, SessionClaims, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the claims to store in the session.
    ///
    /// # Errors
    /// `unauthorized` with a generic message for unknown emails and wrong
    /// passwords alike.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SessionClaims, Error>;
}

/// Email accepted by [`FixtureLoginService`].
pub const FIXTURE_ADMIN_EMAIL: &str = "admin@pazanimal.org";
/// Password accepted by [`FixtureLoginService`].
pub const FIXTURE_ADMIN_PASSWORD: &str = "password";
const FIXTURE_ADMIN_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// In-memory authenticator used when no database is configured.
///
/// Accepts [`FIXTURE_ADMIN_EMAIL`] / [`FIXTURE_ADMIN_PASSWORD`] and grants
/// the admin role.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SessionClaims, Error> {
        if credentials.email().as_ref() == FIXTURE_ADMIN_EMAIL
            && credentials.password() == FIXTURE_ADMIN_PASSWORD
        {
            let id = UserId::new(FIXTURE_ADMIN_ID)
                .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))?;
            Ok(SessionClaims::new(id, [Role::Admin, Role::Usuario]))
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}
