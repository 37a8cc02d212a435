//! Account service: registration, administrator user management, and login.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::{debug, info};

use crate::domain::audit::record_audit;
use crate::domain::ports::{
    AuditLogRepository, LoginService, PasswordHashError, PasswordHasher, UserDraft,
    UserPersistenceError, UserRepository, UsersCommand, UsersQuery,
};
use crate::domain::{
    AuditAction, AuditEntry, Error, LoginCredentials, NewUser, Role, SessionClaims, User, UserId,
    UserValidationError, filter_value,
};

const AUDIT_ENTITY: &str = "usuario";
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// User service implementing the account driving ports.
#[derive(Clone)]
pub struct UserService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
    audit: Arc<dyn AuditLogRepository>,
    clock: Arc<dyn Clock>,
}

impl<R, H> UserService<R, H> {
    /// Create a new service.
    pub fn new(
        users: Arc<R>,
        hasher: Arc<H>,
        audit: Arc<dyn AuditLogRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            audit,
            clock,
        }
    }
}

fn map_validation_error(error: UserValidationError) -> Error {
    let details = match &error {
        UserValidationError::EmptyName => json!({ "field": "name", "code": "missing_field" }),
        UserValidationError::NameTooShort { min } => {
            json!({ "field": "name", "code": "too_short", "min": min })
        }
        UserValidationError::NameTooLong { max } => {
            json!({ "field": "name", "code": "too_long", "max": max })
        }
        UserValidationError::InvalidEmail => json!({ "field": "email", "code": "invalid_email" }),
        UserValidationError::PasswordTooShort { min } => {
            json!({ "field": "password", "code": "too_short", "min": min })
        }
    };
    Error::invalid_request(error.to_string()).with_details(details)
}

fn email_taken() -> Error {
    Error::conflict("a user with this email already exists")
        .with_details(json!({ "field": "email", "code": "duplicate" }))
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { .. } => email_taken(),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

impl<R, H> UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn create_account(
        &self,
        draft: UserDraft,
        roles: Vec<Role>,
        actor: Option<UserId>,
    ) -> Result<User, Error> {
        let new_user = NewUser::try_from_parts(&draft.name, &draft.email, &draft.password, roles)
            .map_err(map_validation_error)?;
        let existing = self
            .users
            .find_credentials(new_user.email())
            .await
            .map_err(map_persistence_error)?;
        if existing.is_some() {
            return Err(email_taken());
        }

        let password_hash = self
            .hasher
            .hash(new_user.password())
            .map_err(map_hash_error)?;
        let now = self.clock.utc();
        let user = User::new(
            UserId::random(),
            new_user.name().clone(),
            new_user.email().clone(),
            new_user.roles().iter().copied(),
            now,
        );
        self.users
            .insert(&user, &password_hash)
            .await
            .map_err(map_persistence_error)?;

        let roles: Vec<_> = user.roles().iter().map(|role| role.as_str()).collect();
        record_audit(
            &self.audit,
            AuditEntry::new(
                actor.or(Some(*user.id())),
                AuditAction::CreateUser,
                AUDIT_ENTITY,
                user.id().to_string(),
                json!({ "email": user.email(), "roles": roles }),
                now,
            ),
        )
        .await;
        info!(user_id = %user.id(), "user account created");
        Ok(user)
    }
}

#[async_trait]
impl<R, H> UsersCommand for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, draft: UserDraft) -> Result<User, Error> {
        self.create_account(draft, vec![Role::Usuario], None).await
    }

    async fn create_user(&self, actor: &SessionClaims, draft: UserDraft) -> Result<User, Error> {
        actor.require_role(Role::Admin)?;
        let roles = draft.roles.clone();
        self.create_account(draft, roles, Some(*actor.user_id()))
            .await
    }
}

#[async_trait]
impl<R, H> UsersQuery for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn list_users(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<User>, Error> {
        self.users
            .list(filter_value(search.as_deref()), &page)
            .await
            .map_err(map_persistence_error)
    }
}

#[async_trait]
impl<R, H> LoginService for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SessionClaims, Error> {
        let Some(stored) = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_persistence_error)?
        else {
            debug!("login rejected: unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hash_error)?;
        if !matches {
            debug!(user_id = %stored.user.id(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let user = stored.user;
        record_audit(
            &self.audit,
            AuditEntry::new(
                Some(*user.id()),
                AuditAction::LoginSuccess,
                AUDIT_ENTITY,
                user.id().to_string(),
                json!({ "email": user.email() }),
                self.clock.utc(),
            ),
        )
        .await;
        Ok(SessionClaims::new(*user.id(), user.roles().iter().copied()))
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
