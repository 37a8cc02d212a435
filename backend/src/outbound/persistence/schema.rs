//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the deployed database exactly; the schema is
//! managed outside this service. Enumerations (roles, states, areas,
//! weekdays) are stored as their upper-case wire strings.

diesel::table! {
    /// Login accounts.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        /// Unique, stored lower-cased.
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        roles -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Volunteer directory.
    volunteers (id) {
        id -> Uuid,
        first_name -> Varchar,
        last_name -> Varchar,
        /// Unique contact email.
        email -> Varchar,
        /// Area codes such as `PASEOS`.
        areas -> Array<Text>,
        phone -> Nullable<Varchar>,
        birth_date -> Nullable<Date>,
        city -> Nullable<Varchar>,
        province -> Nullable<Varchar>,
        country -> Varchar,
        address -> Nullable<Varchar>,
        motivation -> Nullable<Text>,
        experience -> Nullable<Text>,
        availability -> Nullable<Text>,
        emergency_contact -> Nullable<Varchar>,
        emergency_phone -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        photo_url -> Nullable<Text>,
        visible -> Bool,
        status -> Varchar,
        /// Unique public profile slug.
        slug -> Varchar,
        qr_code -> Text,
        joined_at -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        created_by -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Activities logged against a volunteer.
    volunteer_activities (id) {
        id -> Uuid,
        volunteer_id -> Uuid,
        title -> Varchar,
        kind -> Varchar,
        description -> Nullable<Text>,
        occurred_at -> Timestamptz,
        duration_minutes -> Nullable<Int4>,
        notes -> Nullable<Text>,
        status -> Varchar,
    }
}

diesel::table! {
    /// Weekly availability blocks.
    volunteer_schedules (id) {
        id -> Uuid,
        volunteer_id -> Uuid,
        weekday -> Varchar,
        starts_at -> Time,
        ends_at -> Time,
        notes -> Nullable<Text>,
    }
}

diesel::table! {
    /// Donation records; never deleted.
    donations (id) {
        id -> Uuid,
        /// Amount in centavos.
        amount_minor -> Int8,
        currency -> Varchar,
        state -> Varchar,
        donor_name -> Nullable<Varchar>,
        donor_email -> Nullable<Varchar>,
        donor_phone -> Nullable<Varchar>,
        anonymous -> Bool,
        message -> Nullable<Text>,
        /// Unique gateway correlation key.
        external_reference -> Varchar,
        /// Unique once set.
        payment_id -> Nullable<Varchar>,
        paid_at -> Nullable<Timestamptz>,
        payment_method -> Nullable<Varchar>,
        user_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Blog publications.
    publications (id) {
        id -> Uuid,
        title -> Varchar,
        /// Unique URL slug.
        slug -> Varchar,
        summary -> Nullable<Text>,
        content -> Text,
        featured -> Bool,
        published -> Bool,
        published_at -> Nullable<Timestamptz>,
        meta_title -> Nullable<Varchar>,
        meta_description -> Nullable<Varchar>,
        keywords -> Nullable<Text>,
        featured_image -> Nullable<Text>,
        image_alt -> Nullable<Varchar>,
        category_id -> Nullable<Varchar>,
        author_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail.
    audit_logs (id) {
        id -> Uuid,
        actor_id -> Nullable<Uuid>,
        action -> Varchar,
        entity -> Varchar,
        entity_id -> Varchar,
        details -> Jsonb,
        recorded_at -> Timestamptz,
    }
}

diesel::joinable!(volunteer_activities -> volunteers (volunteer_id));
diesel::joinable!(volunteer_schedules -> volunteers (volunteer_id));
diesel::joinable!(publications -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    volunteers,
    volunteer_activities,
    volunteer_schedules,
    donations,
    publications,
    audit_logs,
);
