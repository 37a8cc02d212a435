//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions to domain types live in the
//! repository that owns the table.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    audit_logs, donations, publications, users, volunteer_activities, volunteer_schedules,
    volunteers,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Volunteers
// ---------------------------------------------------------------------------

/// Row struct for reading from the volunteers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = volunteers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VolunteerRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub areas: Vec<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: String,
    pub address: Option<String>,
    pub motivation: Option<String>,
    pub experience: Option<String>,
    pub availability: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub visible: bool,
    pub status: String,
    pub slug: String,
    pub qr_code: String,
    pub joined_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// Insertable struct for new volunteers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = volunteers)]
pub(crate) struct NewVolunteerRow<'a> {
    pub id: Uuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub areas: Vec<String>,
    pub phone: Option<&'a str>,
    pub birth_date: Option<NaiveDate>,
    pub city: Option<&'a str>,
    pub province: Option<&'a str>,
    pub country: &'a str,
    pub address: Option<&'a str>,
    pub motivation: Option<&'a str>,
    pub experience: Option<&'a str>,
    pub availability: Option<&'a str>,
    pub emergency_contact: Option<&'a str>,
    pub emergency_phone: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub visible: bool,
    pub status: &'a str,
    pub slug: &'a str,
    pub qr_code: &'a str,
    pub joined_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// Changeset for the mutable volunteer columns.
///
/// `id`, `slug`, `joined_at`, `created_at`, and `created_by` never change
/// after insert. `treat_none_as_null` lets a patch clear optional fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = volunteers)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct VolunteerUpdate<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub areas: Vec<String>,
    pub phone: Option<&'a str>,
    pub birth_date: Option<NaiveDate>,
    pub city: Option<&'a str>,
    pub province: Option<&'a str>,
    pub country: &'a str,
    pub address: Option<&'a str>,
    pub motivation: Option<&'a str>,
    pub experience: Option<&'a str>,
    pub availability: Option<&'a str>,
    pub emergency_contact: Option<&'a str>,
    pub emergency_phone: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub visible: bool,
    pub status: &'a str,
    pub qr_code: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = volunteer_activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ActivityRow {
    pub id: Uuid,
    pub volunteer_id: Uuid,
    pub title: String,
    pub kind: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = volunteer_schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScheduleRow {
    pub id: Uuid,
    pub volunteer_id: Uuid,
    pub weekday: String,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Donations
// ---------------------------------------------------------------------------

/// Row struct for reading and inserting donations.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = donations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DonationRow {
    pub id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub state: String,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub donor_phone: Option<String>,
    pub anonymous: bool,
    pub message: Option<String>,
    pub external_reference: String,
    pub payment_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied when the gateway reports a payment outcome.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = donations)]
pub(crate) struct DonationPaymentUpdate<'a> {
    pub state: &'a str,
    pub payment_id: &'a str,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Publications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = publications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PublicationRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub featured: bool,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<String>,
    pub featured_image: Option<String>,
    pub image_alt: Option<String>,
    pub category_id: Option<String>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_logs)]
pub(crate) struct NewAuditLogRow<'a> {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: &'a str,
    pub entity: &'a str,
    pub entity_id: &'a str,
    pub details: &'a serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}
