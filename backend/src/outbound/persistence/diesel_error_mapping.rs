//! Shared Diesel error mapping for the repositories in this module.
//!
//! Each repository owns its own port error type; these helpers take the
//! port's constructors so the classification lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(super) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Port constructors used by [`map_diesel_error`].
pub(super) struct DieselErrorMapping<Q, C, D> {
    pub query: Q,
    pub connection: C,
    /// Receives the violated constraint name, or `"unknown"`.
    pub duplicate: D,
}

/// Classify a Diesel error.
///
/// Unique violations become duplicates, closed connections become
/// connection errors, and everything else is a query failure. Database
/// messages are logged at debug level and never forwarded to callers.
pub(super) fn map_diesel_error<E, Q, C, D>(
    error: DieselError,
    mapping: DieselErrorMapping<Q, C, D>,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
    D: FnOnce(&str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => (mapping.query)("record not found"),
        DieselError::QueryBuilderError(_) => (mapping.query)("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            (mapping.duplicate)(info.constraint_name().unwrap_or("unknown"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            (mapping.connection)("database connection error")
        }
        _ => (mapping.query)("database error"),
    }
}
