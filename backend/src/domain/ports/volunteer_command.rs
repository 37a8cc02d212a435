//! Driving ports for the volunteer directory.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Activity, ActivityDraft, ActivityId, ActivityStatus, Error, Schedule, ScheduleDraft,
    ScheduleId, SessionClaims, UserId, Volunteer, VolunteerDraft, VolunteerFilter, VolunteerId,
    VolunteerPatchDraft, VolunteerStats,
};

/// Number of recent activities included in detail and profile views.
pub const RECENT_ACTIVITY_LIMIT: u32 = 10;

/// Administrative view of one volunteer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolunteerDetail {
    /// The volunteer.
    pub volunteer: Volunteer,
    /// Latest activities, newest first.
    pub recent_activities: Vec<Activity>,
    /// Weekly schedules.
    pub schedules: Vec<Schedule>,
    /// Total logged activities.
    pub activity_count: u64,
}

/// Public profile of a visible volunteer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolunteerProfile {
    /// The volunteer.
    pub volunteer: Volunteer,
    /// Latest activities, newest first.
    pub recent_activities: Vec<Activity>,
    /// Total logged activities.
    pub activity_count: u64,
}

/// Driving port for volunteer mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VolunteerCommand: Send + Sync {
    /// Register a volunteer. `actor` is recorded as the creator when present.
    ///
    /// # Errors
    /// `invalid_request` on validation failure, `conflict` when the email is
    /// taken.
    async fn create_volunteer(
        &self,
        draft: VolunteerDraft,
        actor: Option<UserId>,
    ) -> Result<Volunteer, Error>;

    /// Apply a sparse update. Allowed for admins and for the volunteer's
    /// creator.
    async fn update_volunteer(
        &self,
        actor: &SessionClaims,
        id: &VolunteerId,
        patch: VolunteerPatchDraft,
    ) -> Result<Volunteer, Error>;

    /// Delete a volunteer together with its activities and schedules.
    async fn delete_volunteer(&self, actor: &SessionClaims, id: &VolunteerId)
    -> Result<(), Error>;

    /// Log an activity for a volunteer.
    async fn add_activity(
        &self,
        volunteer_id: &VolunteerId,
        draft: ActivityDraft,
    ) -> Result<Activity, Error>;

    /// Change an activity's status, optionally replacing its notes.
    async fn update_activity(
        &self,
        volunteer_id: &VolunteerId,
        activity_id: &ActivityId,
        status: ActivityStatus,
        notes: Option<String>,
    ) -> Result<Activity, Error>;

    /// Add a weekly schedule block.
    async fn add_schedule(
        &self,
        volunteer_id: &VolunteerId,
        draft: ScheduleDraft,
    ) -> Result<Schedule, Error>;

    /// Remove a weekly schedule block.
    async fn remove_schedule(
        &self,
        volunteer_id: &VolunteerId,
        schedule_id: &ScheduleId,
    ) -> Result<(), Error>;
}

/// Driving port for volunteer reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VolunteerQuery: Send + Sync {
    /// Filtered, paginated listing.
    async fn list_volunteers(
        &self,
        filter: VolunteerFilter,
        page: PageRequest,
    ) -> Result<Page<Volunteer>, Error>;

    /// Dashboard counts for the current UTC month.
    async fn volunteer_stats(&self) -> Result<VolunteerStats, Error>;

    /// Administrative detail view; `Ok(None)` when absent.
    async fn find_volunteer(&self, id: &VolunteerId) -> Result<Option<VolunteerDetail>, Error>;

    /// Public profile by slug; hidden volunteers yield `Ok(None)`.
    async fn public_profile(&self, slug: &str) -> Result<Option<VolunteerProfile>, Error>;
}

/// Fixture query over an empty directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVolunteerQuery;

#[async_trait]
impl VolunteerQuery for FixtureVolunteerQuery {
    async fn list_volunteers(
        &self,
        _filter: VolunteerFilter,
        page: PageRequest,
    ) -> Result<Page<Volunteer>, Error> {
        Ok(Page::new(Vec::new(), page.info(0)))
    }

    async fn volunteer_stats(&self) -> Result<VolunteerStats, Error> {
        Ok(VolunteerStats::default())
    }

    async fn find_volunteer(&self, _id: &VolunteerId) -> Result<Option<VolunteerDetail>, Error> {
        Ok(None)
    }

    async fn public_profile(&self, _slug: &str) -> Result<Option<VolunteerProfile>, Error> {
        Ok(None)
    }
}

/// Fixture command over an empty directory. Creation validates and echoes
/// the volunteer without storing it; every other mutation reports
/// `not_found`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVolunteerCommand;

fn fixture_missing(id: &VolunteerId) -> Error {
    Error::not_found(format!("volunteer {id} not found"))
}

#[async_trait]
impl VolunteerCommand for FixtureVolunteerCommand {
    async fn create_volunteer(
        &self,
        draft: VolunteerDraft,
        actor: Option<UserId>,
    ) -> Result<Volunteer, Error> {
        let new_volunteer = crate::domain::NewVolunteer::try_new(draft)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        new_volunteer
            .into_volunteer(
                VolunteerId::random(),
                "http://localhost:3000",
                actor,
                chrono::Utc::now(),
            )
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn update_volunteer(
        &self,
        _actor: &SessionClaims,
        id: &VolunteerId,
        _patch: VolunteerPatchDraft,
    ) -> Result<Volunteer, Error> {
        Err(fixture_missing(id))
    }

    async fn delete_volunteer(
        &self,
        _actor: &SessionClaims,
        id: &VolunteerId,
    ) -> Result<(), Error> {
        Err(fixture_missing(id))
    }

    async fn add_activity(
        &self,
        volunteer_id: &VolunteerId,
        _draft: ActivityDraft,
    ) -> Result<Activity, Error> {
        Err(fixture_missing(volunteer_id))
    }

    async fn update_activity(
        &self,
        volunteer_id: &VolunteerId,
        _activity_id: &ActivityId,
        _status: ActivityStatus,
        _notes: Option<String>,
    ) -> Result<Activity, Error> {
        Err(fixture_missing(volunteer_id))
    }

    async fn add_schedule(
        &self,
        volunteer_id: &VolunteerId,
        _draft: ScheduleDraft,
    ) -> Result<Schedule, Error> {
        Err(fixture_missing(volunteer_id))
    }

    async fn remove_schedule(
        &self,
        volunteer_id: &VolunteerId,
        _schedule_id: &ScheduleId,
    ) -> Result<(), Error> {
        Err(fixture_missing(volunteer_id))
    }
}
