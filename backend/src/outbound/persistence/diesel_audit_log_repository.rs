//! PostgreSQL-backed `AuditLogRepository`: insert-only.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::AuditEntry;
use crate::domain::ports::{AuditLogRepository, AuditLogRepositoryError};

use super::diesel_error_mapping::{DieselErrorMapping, map_diesel_error, map_pool_error};
use super::models::NewAuditLogRow;
use super::pool::DbPool;
use super::schema::audit_logs;

/// Diesel-backed implementation of the `AuditLogRepository` port.
#[derive(Clone)]
pub struct DieselAuditLogRepository {
    pool: DbPool,
}

impl DieselAuditLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn audit_row(entry: &AuditEntry) -> NewAuditLogRow<'_> {
    NewAuditLogRow {
        id: entry.id,
        actor_id: entry.actor.as_ref().map(|id| *id.as_uuid()),
        action: entry.action.as_str(),
        entity: entry.entity,
        entity_id: &entry.entity_id,
        details: &entry.details,
        recorded_at: entry.recorded_at,
    }
}

#[async_trait]
impl AuditLogRepository for DieselAuditLogRepository {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditLogRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AuditLogRepositoryError::connection))?;

        diesel::insert_into(audit_logs::table)
            .values(&audit_row(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                map_diesel_error(
                    err,
                    DieselErrorMapping {
                        query: AuditLogRepositoryError::query,
                        connection: AuditLogRepositoryError::connection,
                        // Audit ids are fresh v4 UUIDs; a collision is a
                        // write failure like any other.
                        duplicate: |constraint: &str| {
                            AuditLogRepositoryError::query(format!("duplicate audit id ({constraint})"))
                        },
                    },
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuditAction, UserId};
    use serde_json::json;

    #[test]
    fn rows_use_stored_action_names() {
        let actor = UserId::random();
        let entry = AuditEntry::new(
            Some(actor),
            AuditAction::DeleteVolunteer,
            "voluntario",
            "v-1",
            json!({ "nombre": "María Núñez" }),
            chrono::Utc::now(),
        );
        let row = audit_row(&entry);
        assert_eq!(row.action, "DELETE_VOLUNTEER");
        assert_eq!(row.actor_id, Some(*actor.as_uuid()));
        assert_eq!(row.details["nombre"], "María Núñez");
    }
}
