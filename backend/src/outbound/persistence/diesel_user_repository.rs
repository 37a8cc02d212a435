//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Roles live in a `TEXT[]` column next to the account so a login reads a
//! single row. Password hashes are only ever returned through
//! [`StoredCredentials`].

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use tracing::warn;

use crate::domain::ports::{
    PasswordHash, StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{EmailAddress, Role, User, UserId, UserName};

use super::diesel_error_mapping::{DieselErrorMapping, map_diesel_error, map_pool_error};
use super::diesel_helpers::{contains_pattern, count_to_u64, page_window};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error, email: &str) -> UserPersistenceError {
    map_diesel_error(
        error,
        DieselErrorMapping {
            query: UserPersistenceError::query,
            connection: UserPersistenceError::connection,
            duplicate: |_: &str| UserPersistenceError::duplicate(email),
        },
    )
}

fn read_error(error: diesel::result::Error) -> UserPersistenceError {
    diesel_error(error, "")
}

/// Unknown role names are dropped with a warning so a stale role never
/// blocks login.
fn parse_roles(user_id: uuid::Uuid, raw: &[String]) -> Vec<Role> {
    raw.iter()
        .filter_map(|name| match name.parse::<Role>() {
            Ok(role) => Some(role),
            Err(err) => {
                warn!(%user_id, %err, "ignoring unrecognised stored role");
                None
            }
        })
        .collect()
}

fn row_to_user(row: UserRow) -> Result<(User, PasswordHash), UserPersistenceError> {
    let name = UserName::new(&row.name)
        .map_err(|err| UserPersistenceError::query(format!("stored user name invalid: {err}")))?;
    let email = EmailAddress::new(&row.email)
        .map_err(|_| UserPersistenceError::query("stored user email invalid"))?;
    let roles = parse_roles(row.id, &row.roles);
    let user = User::new(
        UserId::from_uuid(row.id),
        name,
        email,
        roles,
        row.created_at,
    );
    Ok((user, PasswordHash::new(row.password_hash)))
}

fn filtered(search: Option<&str>) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(term) = search {
        let pattern = contains_pattern(term);
        query = query.filter(
            users::name
                .ilike(pattern.clone())
                .or(users::email.ilike(pattern)),
        );
    }
    query
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_hash: password_hash.as_str(),
            roles: user.roles().iter().map(|role| role.as_str().to_owned()).collect(),
            created_at: user.created_at(),
            updated_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| diesel_error(err, user.email().as_ref()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(read_error)?;
        row.map(|row| row_to_user(row).map(|(user, _)| user))
            .transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(read_error)?;
        row.map(|row| {
            row_to_user(row).map(|(user, password_hash)| StoredCredentials {
                user,
                password_hash,
            })
        })
        .transpose()
    }

    async fn list(
        &self,
        search: Option<String>,
        page: &PageRequest,
    ) -> Result<Page<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = filtered(search.as_deref())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(read_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<UserRow> = filtered(search.as_deref())
            .order((users::created_at.desc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(read_error)?;

        let items = rows
            .into_iter()
            .map(|row| row_to_user(row).map(|(user, _)| user))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page.info(count_to_u64(total))))
    }
}
