//! Volunteer directory service.
//!
//! Implements [`VolunteerCommand`] and [`VolunteerQuery`] over the volunteer
//! and agenda repositories. Registration and deletion are written to the
//! audit log; audit failures never fail the request.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveTime, Utc};
use futures_util::try_join;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::info;

use crate::domain::audit::record_audit;
use crate::domain::ports::{
    AuditLogRepository, RECENT_ACTIVITY_LIMIT, VolunteerAgendaRepository, VolunteerCommand,
    VolunteerDetail, VolunteerProfile, VolunteerQuery, VolunteerRepository,
    VolunteerRepositoryError,
};
use crate::domain::{
    Activity, ActivityDraft, ActivityId, ActivityStatus, AgendaValidationError, AuditAction,
    AuditEntry, Error, NewVolunteer, Schedule, ScheduleDraft, ScheduleId, SessionClaims, UserId,
    Volunteer, VolunteerDraft, VolunteerFilter, VolunteerId, VolunteerPatch, VolunteerPatchDraft,
    VolunteerStats, VolunteerValidationError,
};

const AUDIT_ENTITY: &str = "voluntario";

/// Volunteer service implementing the volunteer driving ports.
#[derive(Clone)]
pub struct VolunteerService<R, A> {
    volunteers: Arc<R>,
    agenda: Arc<A>,
    audit: Arc<dyn AuditLogRepository>,
    clock: Arc<dyn Clock>,
    public_base_url: String,
}

impl<R, A> VolunteerService<R, A> {
    /// Create a new service. `public_base_url` prefixes profile URLs.
    pub fn new(
        volunteers: Arc<R>,
        agenda: Arc<A>,
        audit: Arc<dyn AuditLogRepository>,
        clock: Arc<dyn Clock>,
        public_base_url: &str,
    ) -> Self {
        Self {
            volunteers,
            agenda,
            audit,
            clock,
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        }
    }
}

fn map_validation_error(error: VolunteerValidationError) -> Error {
    let mut details = json!({ "field": error.field(), "code": error.code() });
    if let VolunteerValidationError::NameTooShort { min, .. } = &error {
        details["min"] = json!(min);
    }
    Error::invalid_request(error.to_string()).with_details(details)
}

fn map_agenda_error(error: AgendaValidationError) -> Error {
    let details = json!({ "field": error.field(), "code": error.code() });
    Error::invalid_request(error.to_string()).with_details(details)
}

fn map_repository_error(error: VolunteerRepositoryError) -> Error {
    match error {
        VolunteerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("volunteer repository unavailable: {message}"))
        }
        VolunteerRepositoryError::Query { message } => {
            Error::internal(format!("volunteer repository error: {message}"))
        }
        VolunteerRepositoryError::Duplicate { field } => {
            Error::conflict(format!("volunteer {field} already in use"))
                .with_details(json!({ "field": field, "code": "duplicate" }))
        }
        VolunteerRepositoryError::Missing { id } => {
            Error::not_found(format!("volunteer {id} not found"))
        }
    }
}

fn volunteer_not_found(id: &VolunteerId) -> Error {
    Error::not_found(format!("volunteer {id} not found"))
}

fn email_taken() -> Error {
    Error::conflict("a volunteer with this email already exists")
        .with_details(json!({ "field": "email", "code": "duplicate" }))
}

/// First instant of the UTC month containing `now`.
fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    today
        .with_day(1)
        .unwrap_or(today)
        .and_time(NaiveTime::MIN)
        .and_utc()
}

impl<R, A> VolunteerService<R, A>
where
    R: VolunteerRepository,
    A: VolunteerAgendaRepository,
{
    async fn require_volunteer(&self, id: &VolunteerId) -> Result<Volunteer, Error> {
        self.volunteers
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| volunteer_not_found(id))
    }

    async fn ensure_email_free(
        &self,
        patch: &VolunteerPatch,
        id: &VolunteerId,
    ) -> Result<(), Error> {
        let Some(email) = patch.email.as_ref() else {
            return Ok(());
        };
        let holder = self
            .volunteers
            .find_by_email(email)
            .await
            .map_err(map_repository_error)?;
        match holder {
            Some(other) if other.id != *id => Err(email_taken()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<R, A> VolunteerCommand for VolunteerService<R, A>
where
    R: VolunteerRepository,
    A: VolunteerAgendaRepository,
{
    async fn create_volunteer(
        &self,
        draft: VolunteerDraft,
        actor: Option<UserId>,
    ) -> Result<Volunteer, Error> {
        let new_volunteer = NewVolunteer::try_new(draft).map_err(map_validation_error)?;
        let existing = self
            .volunteers
            .find_by_email(new_volunteer.email())
            .await
            .map_err(map_repository_error)?;
        if existing.is_some() {
            return Err(email_taken());
        }

        let now = self.clock.utc();
        let volunteer = new_volunteer
            .into_volunteer(VolunteerId::random(), &self.public_base_url, actor, now)
            .map_err(|err| Error::internal(format!("volunteer QR code generation failed: {err}")))?;
        self.volunteers
            .insert(&volunteer)
            .await
            .map_err(map_repository_error)?;

        record_audit(
            &self.audit,
            AuditEntry::new(
                actor,
                AuditAction::CreateVolunteer,
                AUDIT_ENTITY,
                volunteer.id.to_string(),
                json!({ "nombre": volunteer.full_name(), "email": volunteer.email }),
                now,
            ),
        )
        .await;
        info!(volunteer_id = %volunteer.id, slug = %volunteer.slug, "volunteer registered");
        Ok(volunteer)
    }

    async fn update_volunteer(
        &self,
        actor: &SessionClaims,
        id: &VolunteerId,
        patch: VolunteerPatchDraft,
    ) -> Result<Volunteer, Error> {
        let mut volunteer = self.require_volunteer(id).await?;
        let is_creator = volunteer.created_by.as_ref() == Some(actor.user_id());
        if !actor.is_admin() && !is_creator {
            return Err(Error::forbidden(
                "only administrators or the registering user may edit this volunteer",
            ));
        }

        let patch = VolunteerPatch::try_new(patch).map_err(map_validation_error)?;
        self.ensure_email_free(&patch, id).await?;
        volunteer.apply_patch(patch, self.clock.utc());
        self.volunteers
            .update(&volunteer)
            .await
            .map_err(map_repository_error)?;
        info!(volunteer_id = %volunteer.id, actor = %actor.user_id(), "volunteer updated");
        Ok(volunteer)
    }

    async fn delete_volunteer(
        &self,
        actor: &SessionClaims,
        id: &VolunteerId,
    ) -> Result<(), Error> {
        let volunteer = self.require_volunteer(id).await?;
        let deleted = self
            .volunteers
            .delete_with_agenda(id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(volunteer_not_found(id));
        }

        record_audit(
            &self.audit,
            AuditEntry::new(
                Some(*actor.user_id()),
                AuditAction::DeleteVolunteer,
                AUDIT_ENTITY,
                id.to_string(),
                json!({ "nombre": volunteer.full_name(), "email": volunteer.email }),
                self.clock.utc(),
            ),
        )
        .await;
        info!(volunteer_id = %id, actor = %actor.user_id(), "volunteer deleted");
        Ok(())
    }

    async fn add_activity(
        &self,
        volunteer_id: &VolunteerId,
        draft: ActivityDraft,
    ) -> Result<Activity, Error> {
        let activity = Activity::schedule(ActivityId::random(), *volunteer_id, draft)
            .map_err(map_agenda_error)?;
        self.require_volunteer(volunteer_id).await?;
        self.agenda
            .insert_activity(&activity)
            .await
            .map_err(map_repository_error)?;
        Ok(activity)
    }

    async fn update_activity(
        &self,
        volunteer_id: &VolunteerId,
        activity_id: &ActivityId,
        status: ActivityStatus,
        notes: Option<String>,
    ) -> Result<Activity, Error> {
        self.agenda
            .update_activity_status(volunteer_id, activity_id, status, notes)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("activity {activity_id} not found")))
    }

    async fn add_schedule(
        &self,
        volunteer_id: &VolunteerId,
        draft: ScheduleDraft,
    ) -> Result<Schedule, Error> {
        let schedule = Schedule::from_draft(ScheduleId::random(), *volunteer_id, draft)
            .map_err(map_agenda_error)?;
        self.require_volunteer(volunteer_id).await?;
        self.agenda
            .insert_schedule(&schedule)
            .await
            .map_err(map_repository_error)?;
        Ok(schedule)
    }

    async fn remove_schedule(
        &self,
        volunteer_id: &VolunteerId,
        schedule_id: &ScheduleId,
    ) -> Result<(), Error> {
        let removed = self
            .agenda
            .delete_schedule(volunteer_id, schedule_id)
            .await
            .map_err(map_repository_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("schedule {schedule_id} not found")))
        }
    }
}

#[async_trait]
impl<R, A> VolunteerQuery for VolunteerService<R, A>
where
    R: VolunteerRepository,
    A: VolunteerAgendaRepository,
{
    async fn list_volunteers(
        &self,
        filter: VolunteerFilter,
        page: PageRequest,
    ) -> Result<Page<Volunteer>, Error> {
        self.volunteers
            .list(&filter, &page)
            .await
            .map_err(map_repository_error)
    }

    async fn volunteer_stats(&self) -> Result<VolunteerStats, Error> {
        self.volunteers
            .stats(month_start(self.clock.utc()))
            .await
            .map_err(map_repository_error)
    }

    async fn find_volunteer(&self, id: &VolunteerId) -> Result<Option<VolunteerDetail>, Error> {
        let Some(volunteer) = self
            .volunteers
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
        else {
            return Ok(None);
        };
        let (recent_activities, schedules, activity_count) = try_join!(
            self.agenda.recent_activities(id, RECENT_ACTIVITY_LIMIT),
            self.agenda.schedules(id),
            self.agenda.count_activities(id),
        )
        .map_err(map_repository_error)?;
        Ok(Some(VolunteerDetail {
            volunteer,
            recent_activities,
            schedules,
            activity_count,
        }))
    }

    async fn public_profile(&self, slug: &str) -> Result<Option<VolunteerProfile>, Error> {
        let Some(volunteer) = self
            .volunteers
            .find_visible_by_slug(slug)
            .await
            .map_err(map_repository_error)?
        else {
            return Ok(None);
        };
        let (recent_activities, activity_count) = try_join!(
            self.agenda
                .recent_activities(&volunteer.id, RECENT_ACTIVITY_LIMIT),
            self.agenda.count_activities(&volunteer.id),
        )
        .map_err(map_repository_error)?;
        Ok(Some(VolunteerProfile {
            volunteer,
            recent_activities,
            activity_count,
        }))
    }
}

#[cfg(test)]
#[path = "volunteer_service_tests.rs"]
mod tests;
