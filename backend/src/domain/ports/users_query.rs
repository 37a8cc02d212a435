//! Driving ports for account management.
//!
//! [`UsersCommand`] covers self-service registration and administrator
//! account creation; [`UsersQuery`] backs the administrator user listing.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use zeroize::Zeroizing;

use crate::domain::{Error, Role, SessionClaims, User};

/// Raw account input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password, zeroed on drop.
    pub password: Zeroizing<String>,
    /// Requested roles; ignored for self-service registration.
    pub roles: Vec<Role>,
}

/// Domain use-case port for creating accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Self-service registration granting [`Role::Usuario`].
    ///
    /// # Errors
    /// `invalid_request` on validation failure, `conflict` when the email
    /// is registered.
    async fn register(&self, draft: UserDraft) -> Result<User, Error>;

    /// Administrator account creation with explicit roles.
    async fn create_user(&self, actor: &SessionClaims, draft: UserDraft) -> Result<User, Error>;
}

/// Domain use-case port for listing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Paginated listing, optionally filtered by name or email substring.
    async fn list_users(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<User>, Error>;
}

/// Fixture command used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUsersCommand;

#[async_trait]
impl UsersCommand for FixtureUsersCommand {
    async fn register(&self, _draft: UserDraft) -> Result<User, Error> {
        Err(Error::service_unavailable("user store is not configured"))
    }

    async fn create_user(&self, _actor: &SessionClaims, _draft: UserDraft) -> Result<User, Error> {
        Err(Error::service_unavailable("user store is not configured"))
    }
}

/// Fixture query over an empty user table.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUsersQuery;

#[async_trait]
impl UsersQuery for FixtureUsersQuery {
    async fn list_users(
        &self,
        _search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<User>, Error> {
        Ok(Page::new(Vec::new(), page.info(0)))
    }
}
