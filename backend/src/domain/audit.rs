//! Append-only audit records for sensitive actions.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use super::UserId;
use super::ports::AuditLogRepository;

/// Audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    /// Account created by registration or an administrator.
    CreateUser,
    /// Successful credential login.
    LoginSuccess,
    /// Publication created.
    CreatePublication,
    /// Volunteer registered.
    CreateVolunteer,
    /// Volunteer deleted with its activities and schedules.
    DeleteVolunteer,
}

impl AuditAction {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateUser => "CREATE_USER",
            Self::LoginSuccess => "LOGIN_SUCCESS",
            Self::CreatePublication => "CREATE_PUBLICATION",
            Self::CreateVolunteer => "CREATE_VOLUNTEER",
            Self::DeleteVolunteer => "DELETE_VOLUNTEER",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    /// Record identifier.
    pub id: Uuid,
    /// Acting user, when authenticated.
    pub actor: Option<UserId>,
    /// Action performed.
    pub action: AuditAction,
    /// Entity kind, such as `voluntario`.
    pub entity: &'static str,
    /// Entity identifier.
    pub entity_id: String,
    /// Free-form details.
    pub details: Value,
    /// When the action happened.
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Build a record with a fresh identifier.
    pub fn new(
        actor: Option<UserId>,
        action: AuditAction,
        entity: &'static str,
        entity_id: impl Into<String>,
        details: Value,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor,
            action,
            entity,
            entity_id: entity_id.into(),
            details,
            recorded_at,
        }
    }
}

/// Append `entry`, logging failures instead of returning them.
///
/// Audit writes never fail the operation that triggered them.
pub(crate) async fn record_audit(repo: &Arc<dyn AuditLogRepository>, entry: AuditEntry) {
    let action = entry.action;
    let entity_id = entry.entity_id.clone();
    if let Err(error) = repo.append(&entry).await {
        warn!(%action, %entity_id, %error, "audit log write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{AuditLogRepositoryError, MockAuditLogRepository};
    use serde_json::json;

    #[tokio::test]
    async fn failed_writes_are_swallowed() {
        let mut repo = MockAuditLogRepository::new();
        repo.expect_append()
            .times(1)
            .return_once(|_| Err(AuditLogRepositoryError::connection("down")));
        let repo: Arc<dyn AuditLogRepository> = Arc::new(repo);

        record_audit(
            &repo,
            AuditEntry::new(
                None,
                AuditAction::LoginSuccess,
                "usuario",
                "u-1",
                json!({}),
                Utc::now(),
            ),
        )
        .await;
    }

    #[test]
    fn actions_use_stored_names() {
        assert_eq!(AuditAction::DeleteVolunteer.to_string(), "DELETE_VOLUNTEER");
    }
}
