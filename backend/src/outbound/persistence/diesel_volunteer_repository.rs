//! PostgreSQL-backed volunteer adapters using Diesel ORM.
//!
//! [`DieselVolunteerRepository`] implements both [`VolunteerRepository`] and
//! [`VolunteerAgendaRepository`] against one pool. Volunteer deletion removes
//! activities and schedules in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    VolunteerAgendaRepository, VolunteerRepository, VolunteerRepositoryError,
};
use crate::domain::{
    Activity, ActivityId, ActivityStatus, EmailAddress, Schedule, ScheduleId, UserId, Volunteer,
    VolunteerArea, VolunteerFilter, VolunteerId, VolunteerProfileFields, VolunteerStats,
    VolunteerStatus, Weekday,
};

use super::diesel_error_mapping::{DieselErrorMapping, map_diesel_error, map_pool_error};
use super::diesel_helpers::{contains_pattern, count_to_u64, page_window};
use super::models::{ActivityRow, NewVolunteerRow, ScheduleRow, VolunteerRow, VolunteerUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{volunteer_activities, volunteer_schedules, volunteers};

/// Diesel-backed volunteer and agenda repository.
#[derive(Clone)]
pub struct DieselVolunteerRepository {
    pool: DbPool,
}

impl DieselVolunteerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> VolunteerRepositoryError {
    map_pool_error(error, VolunteerRepositoryError::connection)
}

/// Unique violations name the column through the constraint,
/// `volunteers_email_key` or `volunteers_slug_key`.
fn diesel_error(error: diesel::result::Error) -> VolunteerRepositoryError {
    map_diesel_error(
        error,
        DieselErrorMapping {
            query: VolunteerRepositoryError::query,
            connection: VolunteerRepositoryError::connection,
            duplicate: |constraint: &str| {
                let field = if constraint.contains("slug") {
                    "slug"
                } else {
                    "email"
                };
                VolunteerRepositoryError::duplicate(field)
            },
        },
    )
}

fn corrupt(what: &str, value: &str) -> VolunteerRepositoryError {
    VolunteerRepositoryError::query(format!("stored {what} is invalid: {value}"))
}

fn area_codes(volunteer: &Volunteer) -> Vec<String> {
    volunteer
        .areas
        .iter()
        .map(|area| area.code().to_owned())
        .collect()
}

fn new_volunteer_row(volunteer: &Volunteer) -> NewVolunteerRow<'_> {
    let profile = &volunteer.profile;
    NewVolunteerRow {
        id: *volunteer.id.as_uuid(),
        first_name: &volunteer.first_name,
        last_name: &volunteer.last_name,
        email: volunteer.email.as_ref(),
        areas: area_codes(volunteer),
        phone: profile.phone.as_deref(),
        birth_date: profile.birth_date,
        city: profile.city.as_deref(),
        province: profile.province.as_deref(),
        country: &profile.country,
        address: profile.address.as_deref(),
        motivation: profile.motivation.as_deref(),
        experience: profile.experience.as_deref(),
        availability: profile.availability.as_deref(),
        emergency_contact: profile.emergency_contact.as_deref(),
        emergency_phone: profile.emergency_phone.as_deref(),
        notes: profile.notes.as_deref(),
        photo_url: profile.photo_url.as_deref(),
        visible: volunteer.visible,
        status: volunteer.status.as_str(),
        slug: &volunteer.slug,
        qr_code: &volunteer.qr_code,
        joined_at: volunteer.joined_at,
        created_at: volunteer.created_at,
        updated_at: volunteer.updated_at,
        created_by: volunteer.created_by.as_ref().map(|id| *id.as_uuid()),
    }
}

fn volunteer_update(volunteer: &Volunteer) -> VolunteerUpdate<'_> {
    let profile = &volunteer.profile;
    VolunteerUpdate {
        first_name: &volunteer.first_name,
        last_name: &volunteer.last_name,
        email: volunteer.email.as_ref(),
        areas: area_codes(volunteer),
        phone: profile.phone.as_deref(),
        birth_date: profile.birth_date,
        city: profile.city.as_deref(),
        province: profile.province.as_deref(),
        country: &profile.country,
        address: profile.address.as_deref(),
        motivation: profile.motivation.as_deref(),
        experience: profile.experience.as_deref(),
        availability: profile.availability.as_deref(),
        emergency_contact: profile.emergency_contact.as_deref(),
        emergency_phone: profile.emergency_phone.as_deref(),
        notes: profile.notes.as_deref(),
        photo_url: profile.photo_url.as_deref(),
        visible: volunteer.visible,
        status: volunteer.status.as_str(),
        qr_code: &volunteer.qr_code,
        updated_at: volunteer.updated_at,
    }
}

fn row_to_volunteer(row: VolunteerRow) -> Result<Volunteer, VolunteerRepositoryError> {
    let email = EmailAddress::new(&row.email).map_err(|_| corrupt("volunteer email", &row.email))?;
    let status =
        VolunteerStatus::parse(&row.status).ok_or_else(|| corrupt("volunteer status", &row.status))?;
    let areas = row
        .areas
        .iter()
        .map(|code| code.parse::<VolunteerArea>())
        .collect::<Result<_, _>>()
        .map_err(|err| corrupt("volunteer area", &err.0))?;

    Ok(Volunteer {
        id: VolunteerId::from_uuid(row.id),
        first_name: row.first_name,
        last_name: row.last_name,
        email,
        areas,
        profile: VolunteerProfileFields {
            phone: row.phone,
            birth_date: row.birth_date,
            city: row.city,
            province: row.province,
            country: row.country,
            address: row.address,
            motivation: row.motivation,
            experience: row.experience,
            availability: row.availability,
            emergency_contact: row.emergency_contact,
            emergency_phone: row.emergency_phone,
            notes: row.notes,
            photo_url: row.photo_url,
        },
        visible: row.visible,
        status,
        slug: row.slug,
        qr_code: row.qr_code,
        joined_at: row.joined_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
        created_by: row.created_by.map(UserId::from_uuid),
    })
}

fn activity_to_row(activity: &Activity) -> Result<ActivityRow, VolunteerRepositoryError> {
    let duration_minutes = activity
        .duration_minutes
        .map(i32::try_from)
        .transpose()
        .map_err(|_| VolunteerRepositoryError::query("activity duration out of range"))?;
    Ok(ActivityRow {
        id: *activity.id.as_uuid(),
        volunteer_id: *activity.volunteer_id.as_uuid(),
        title: activity.title.clone(),
        kind: activity.kind.clone(),
        description: activity.description.clone(),
        occurred_at: activity.date,
        duration_minutes,
        notes: activity.notes.clone(),
        status: activity.status.as_str().to_owned(),
    })
}

fn row_to_activity(row: ActivityRow) -> Result<Activity, VolunteerRepositoryError> {
    let status =
        ActivityStatus::parse(&row.status).ok_or_else(|| corrupt("activity status", &row.status))?;
    Ok(Activity {
        id: ActivityId::from_uuid(row.id),
        volunteer_id: VolunteerId::from_uuid(row.volunteer_id),
        title: row.title,
        kind: row.kind,
        description: row.description,
        date: row.occurred_at,
        duration_minutes: row.duration_minutes.and_then(|minutes| u32::try_from(minutes).ok()),
        notes: row.notes,
        status,
    })
}

fn schedule_to_row(schedule: &Schedule) -> ScheduleRow {
    ScheduleRow {
        id: *schedule.id.as_uuid(),
        volunteer_id: *schedule.volunteer_id.as_uuid(),
        weekday: schedule.weekday.as_str().to_owned(),
        starts_at: schedule.starts_at,
        ends_at: schedule.ends_at,
        notes: schedule.notes.clone(),
    }
}

fn row_to_schedule(row: ScheduleRow) -> Result<Schedule, VolunteerRepositoryError> {
    let weekday = Weekday::parse(&row.weekday).ok_or_else(|| corrupt("weekday", &row.weekday))?;
    Ok(Schedule {
        id: ScheduleId::from_uuid(row.id),
        volunteer_id: VolunteerId::from_uuid(row.volunteer_id),
        weekday,
        starts_at: row.starts_at,
        ends_at: row.ends_at,
        notes: row.notes,
    })
}

/// Boxed volunteers query with every filter constraint applied.
fn filtered(filter: &VolunteerFilter) -> volunteers::BoxedQuery<'static, Pg> {
    let mut query = volunteers::table.into_boxed();
    if let Some(search) = filter.search.as_deref() {
        let pattern = contains_pattern(search);
        query = query.filter(
            volunteers::first_name
                .ilike(pattern.clone())
                .or(volunteers::last_name.ilike(pattern.clone()))
                .or(volunteers::email.ilike(pattern.clone()))
                .or(volunteers::city.ilike(pattern).assume_not_null()),
        );
    }
    if let Some(area) = filter.area {
        query = query.filter(volunteers::areas.contains(vec![area.code().to_owned()]));
    }
    if let Some(city) = filter.city.as_deref() {
        query = query.filter(volunteers::city.ilike(contains_pattern(city)));
    }
    if let Some(status) = filter.status {
        query = query.filter(volunteers::status.eq(status.as_str()));
    }
    if let Some(visible) = filter.visible {
        query = query.filter(volunteers::visible.eq(visible));
    }
    query
}

#[async_trait]
impl VolunteerRepository for DieselVolunteerRepository {
    async fn insert(&self, volunteer: &Volunteer) -> Result<(), VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(volunteers::table)
            .values(&new_volunteer_row(volunteer))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &VolunteerId,
    ) -> Result<Option<Volunteer>, VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<VolunteerRow> = volunteers::table
            .find(*id.as_uuid())
            .select(VolunteerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_volunteer).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Volunteer>, VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<VolunteerRow> = volunteers::table
            .filter(volunteers::email.eq(email.as_ref()))
            .select(VolunteerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_volunteer).transpose()
    }

    async fn find_visible_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Volunteer>, VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<VolunteerRow> = volunteers::table
            .filter(volunteers::slug.eq(slug))
            .filter(volunteers::visible.eq(true))
            .select(VolunteerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_volunteer).transpose()
    }

    async fn list(
        &self,
        filter: &VolunteerFilter,
        page: &PageRequest,
    ) -> Result<Page<Volunteer>, VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<VolunteerRow> = filtered(filter)
            .order((volunteers::joined_at.desc(), volunteers::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(VolunteerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_volunteer)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page.info(count_to_u64(total))))
    }

    async fn update(&self, volunteer: &Volunteer) -> Result<(), VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(volunteers::table.find(*volunteer.id.as_uuid()))
            .set(&volunteer_update(volunteer))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if updated == 0 {
            return Err(VolunteerRepositoryError::missing(volunteer.id.to_string()));
        }
        Ok(())
    }

    async fn delete_with_agenda(&self, id: &VolunteerId) -> Result<bool, VolunteerRepositoryError> {
        let volunteer_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let deleted = conn
            .transaction(|conn| {
                async move {
                    diesel::delete(
                        volunteer_activities::table
                            .filter(volunteer_activities::volunteer_id.eq(volunteer_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(
                        volunteer_schedules::table
                            .filter(volunteer_schedules::volunteer_id.eq(volunteer_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(volunteers::table.find(volunteer_id))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        Ok(deleted > 0)
    }

    async fn stats(
        &self,
        month_start: DateTime<Utc>,
    ) -> Result<VolunteerStats, VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = volunteers::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let active: i64 = volunteers::table
            .filter(volunteers::status.eq(VolunteerStatus::Active.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let inactive: i64 = volunteers::table
            .filter(volunteers::status.eq(VolunteerStatus::Inactive.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let activities: i64 = volunteer_activities::table
            .filter(volunteer_activities::occurred_at.ge(month_start))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(VolunteerStats {
            total: count_to_u64(total),
            active: count_to_u64(active),
            inactive: count_to_u64(inactive),
            activities_this_month: count_to_u64(activities),
        })
    }
}

#[async_trait]
impl VolunteerAgendaRepository for DieselVolunteerRepository {
    async fn recent_activities(
        &self,
        volunteer_id: &VolunteerId,
        limit: u32,
    ) -> Result<Vec<Activity>, VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<ActivityRow> = volunteer_activities::table
            .filter(volunteer_activities::volunteer_id.eq(volunteer_id.as_uuid()))
            .order((
                volunteer_activities::occurred_at.desc(),
                volunteer_activities::id.asc(),
            ))
            .limit(i64::from(limit))
            .select(ActivityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_activity).collect()
    }

    async fn count_activities(
        &self,
        volunteer_id: &VolunteerId,
    ) -> Result<u64, VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = volunteer_activities::table
            .filter(volunteer_activities::volunteer_id.eq(volunteer_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(count_to_u64(total))
    }

    async fn schedules(
        &self,
        volunteer_id: &VolunteerId,
    ) -> Result<Vec<Schedule>, VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<ScheduleRow> = volunteer_schedules::table
            .filter(volunteer_schedules::volunteer_id.eq(volunteer_id.as_uuid()))
            .select(ScheduleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        let mut schedules = rows
            .into_iter()
            .map(row_to_schedule)
            .collect::<Result<Vec<_>, _>>()?;
        // Weekdays are stored as names; order in Rust so Monday comes first.
        schedules.sort_by_key(|schedule| (schedule.weekday, schedule.starts_at));
        Ok(schedules)
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<(), VolunteerRepositoryError> {
        let row = activity_to_row(activity)?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(volunteer_activities::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn update_activity_status(
        &self,
        volunteer_id: &VolunteerId,
        activity_id: &ActivityId,
        status: ActivityStatus,
        notes: Option<String>,
    ) -> Result<Option<Activity>, VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let target = volunteer_activities::table
            .filter(volunteer_activities::id.eq(*activity_id.as_uuid()))
            .filter(volunteer_activities::volunteer_id.eq(*volunteer_id.as_uuid()));

        let row: Option<ActivityRow> = match notes {
            Some(notes) => {
                diesel::update(target)
                    .set((
                        volunteer_activities::status.eq(status.as_str()),
                        volunteer_activities::notes.eq(notes),
                    ))
                    .returning(ActivityRow::as_returning())
                    .get_result(&mut conn)
                    .await
            }
            None => {
                diesel::update(target)
                    .set(volunteer_activities::status.eq(status.as_str()))
                    .returning(ActivityRow::as_returning())
                    .get_result(&mut conn)
                    .await
            }
        }
        .optional()
        .map_err(diesel_error)?;

        row.map(row_to_activity).transpose()
    }

    async fn insert_schedule(&self, schedule: &Schedule) -> Result<(), VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(volunteer_schedules::table)
            .values(&schedule_to_row(schedule))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn delete_schedule(
        &self,
        volunteer_id: &VolunteerId,
        schedule_id: &ScheduleId,
    ) -> Result<bool, VolunteerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            volunteer_schedules::table
                .filter(volunteer_schedules::id.eq(*schedule_id.as_uuid()))
                .filter(volunteer_schedules::volunteer_id.eq(*volunteer_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}
