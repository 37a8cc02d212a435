//! Ports for volunteer persistence.
//!
//! [`VolunteerRepository`] owns the volunteer rows; [`VolunteerAgendaRepository`]
//! owns the activities and schedules hanging off them. A single adapter
//! usually implements both against the same pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{
    Activity, ActivityId, ActivityStatus, EmailAddress, Schedule, ScheduleId, Volunteer,
    VolunteerFilter, VolunteerId, VolunteerStats,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by volunteer repository adapters.
    pub enum VolunteerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "volunteer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "volunteer repository query failed: {message}",
        /// A unique column already holds the value.
        Duplicate { field: String } =>
            "volunteer {field} already in use",
        /// The targeted volunteer row does not exist.
        Missing { id: String } =>
            "volunteer {id} not found",
    }
}

/// Port for volunteer storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VolunteerRepository: Send + Sync {
    /// Insert a volunteer. Unique email or slug collisions fail with
    /// [`VolunteerRepositoryError::Duplicate`].
    async fn insert(&self, volunteer: &Volunteer) -> Result<(), VolunteerRepositoryError>;

    /// Fetch by identifier regardless of visibility.
    async fn find_by_id(
        &self,
        id: &VolunteerId,
    ) -> Result<Option<Volunteer>, VolunteerRepositoryError>;

    /// Fetch by contact email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Volunteer>, VolunteerRepositoryError>;

    /// Fetch a visible volunteer by slug; hidden rows yield `None`.
    async fn find_visible_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Volunteer>, VolunteerRepositoryError>;

    /// List volunteers matching `filter`, newest join date first.
    async fn list(
        &self,
        filter: &VolunteerFilter,
        page: &PageRequest,
    ) -> Result<Page<Volunteer>, VolunteerRepositoryError>;

    /// Overwrite the mutable columns of an existing volunteer.
    async fn update(&self, volunteer: &Volunteer) -> Result<(), VolunteerRepositoryError>;

    /// Delete the volunteer, its activities, and its schedules atomically.
    ///
    /// Returns `false` when no volunteer had `id`.
    async fn delete_with_agenda(&self, id: &VolunteerId) -> Result<bool, VolunteerRepositoryError>;

    /// Dashboard counts; activities are counted from `month_start` onward.
    async fn stats(
        &self,
        month_start: DateTime<Utc>,
    ) -> Result<VolunteerStats, VolunteerRepositoryError>;
}

/// Port for volunteer activities and schedules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VolunteerAgendaRepository: Send + Sync {
    /// Most recent activities by date, at most `limit`.
    async fn recent_activities(
        &self,
        volunteer_id: &VolunteerId,
        limit: u32,
    ) -> Result<Vec<Activity>, VolunteerRepositoryError>;

    /// Total activities logged for a volunteer.
    async fn count_activities(
        &self,
        volunteer_id: &VolunteerId,
    ) -> Result<u64, VolunteerRepositoryError>;

    /// Schedules ordered by weekday then start time.
    async fn schedules(
        &self,
        volunteer_id: &VolunteerId,
    ) -> Result<Vec<Schedule>, VolunteerRepositoryError>;

    /// Insert an activity.
    async fn insert_activity(&self, activity: &Activity) -> Result<(), VolunteerRepositoryError>;

    /// Update an activity's status and, when given, its notes.
    ///
    /// Returns `None` when the activity does not belong to the volunteer.
    async fn update_activity_status(
        &self,
        volunteer_id: &VolunteerId,
        activity_id: &ActivityId,
        status: ActivityStatus,
        notes: Option<String>,
    ) -> Result<Option<Activity>, VolunteerRepositoryError>;

    /// Insert a schedule.
    async fn insert_schedule(&self, schedule: &Schedule) -> Result<(), VolunteerRepositoryError>;

    /// Delete a schedule owned by the volunteer; `false` when absent.
    async fn delete_schedule(
        &self,
        volunteer_id: &VolunteerId,
        schedule_id: &ScheduleId,
    ) -> Result<bool, VolunteerRepositoryError>;
}

/// Fixture repository with no volunteers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVolunteerRepository;

#[async_trait]
impl VolunteerRepository for FixtureVolunteerRepository {
    async fn insert(&self, _volunteer: &Volunteer) -> Result<(), VolunteerRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &VolunteerId,
    ) -> Result<Option<Volunteer>, VolunteerRepositoryError> {
        Ok(None)
    }

    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<Volunteer>, VolunteerRepositoryError> {
        Ok(None)
    }

    async fn find_visible_by_slug(
        &self,
        _slug: &str,
    ) -> Result<Option<Volunteer>, VolunteerRepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: &VolunteerFilter,
        page: &PageRequest,
    ) -> Result<Page<Volunteer>, VolunteerRepositoryError> {
        Ok(Page::new(Vec::new(), page.info(0)))
    }

    async fn update(&self, volunteer: &Volunteer) -> Result<(), VolunteerRepositoryError> {
        Err(VolunteerRepositoryError::missing(volunteer.id.to_string()))
    }

    async fn delete_with_agenda(
        &self,
        _id: &VolunteerId,
    ) -> Result<bool, VolunteerRepositoryError> {
        Ok(false)
    }

    async fn stats(
        &self,
        _month_start: DateTime<Utc>,
    ) -> Result<VolunteerStats, VolunteerRepositoryError> {
        Ok(VolunteerStats::default())
    }
}

#[async_trait]
impl VolunteerAgendaRepository for FixtureVolunteerRepository {
    async fn recent_activities(
        &self,
        _volunteer_id: &VolunteerId,
        _limit: u32,
    ) -> Result<Vec<Activity>, VolunteerRepositoryError> {
        Ok(Vec::new())
    }

    async fn count_activities(
        &self,
        _volunteer_id: &VolunteerId,
    ) -> Result<u64, VolunteerRepositoryError> {
        Ok(0)
    }

    async fn schedules(
        &self,
        _volunteer_id: &VolunteerId,
    ) -> Result<Vec<Schedule>, VolunteerRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert_activity(&self, _activity: &Activity) -> Result<(), VolunteerRepositoryError> {
        Ok(())
    }

    async fn update_activity_status(
        &self,
        _volunteer_id: &VolunteerId,
        _activity_id: &ActivityId,
        _status: ActivityStatus,
        _notes: Option<String>,
    ) -> Result<Option<Activity>, VolunteerRepositoryError> {
        Ok(None)
    }

    async fn insert_schedule(&self, _schedule: &Schedule) -> Result<(), VolunteerRepositoryError> {
        Ok(())
    }

    async fn delete_schedule(
        &self,
        _volunteer_id: &VolunteerId,
        _schedule_id: &ScheduleId,
    ) -> Result<bool, VolunteerRepositoryError> {
        Ok(false)
    }
}
