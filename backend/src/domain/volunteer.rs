//! Volunteer aggregate, validation, listing filters, and slug generation.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{
    EmailAddress, QrCodeError, UserId, VolunteerArea, VolunteerId, render_qr_svg, slugify,
};

/// Minimum length of `nombre` and `apellido` once trimmed.
pub const VOLUNTEER_NAME_MIN: usize = 2;
/// Country stored when none is supplied.
pub const DEFAULT_COUNTRY: &str = "Argentina";
/// Literal some clients send for an unset query parameter.
const UNDEFINED_SENTINEL: &str = "undefined";

/// Field-level validation failure for volunteer input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VolunteerValidationError {
    /// A name field was shorter than [`VOLUNTEER_NAME_MIN`].
    #[error("{field} must be at least {min} characters")]
    NameTooShort {
        /// Offending wire field.
        field: &'static str,
        /// Minimum length.
        min: usize,
    },
    /// The email did not validate.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// No area was selected.
    #[error("at least one area must be selected")]
    EmptyAreas,
    /// The photo URL was not absolute.
    #[error("fotoUrl must be an absolute URL")]
    InvalidPhotoUrl,
}

impl VolunteerValidationError {
    /// Wire name of the offending field.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NameTooShort { field, .. } => *field,
            Self::InvalidEmail => "email",
            Self::EmptyAreas => "areas",
            Self::InvalidPhotoUrl => "fotoUrl",
        }
    }

    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NameTooShort { .. } => "too_short",
            Self::InvalidEmail => "invalid_email",
            Self::EmptyAreas => "empty_areas",
            Self::InvalidPhotoUrl => "invalid_url",
        }
    }
}

/// Volunteer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VolunteerStatus {
    /// Currently volunteering.
    #[default]
    #[serde(rename = "ACTIVO")]
    Active,
    /// Temporarily inactive.
    #[serde(rename = "INACTIVO")]
    Inactive,
    /// Suspended by the foundation.
    #[serde(rename = "SUSPENDIDO")]
    Suspended,
    /// No longer volunteering.
    #[serde(rename = "RETIRADO")]
    Retired,
}

impl VolunteerStatus {
    /// Every status.
    pub const ALL: [Self; 4] = [Self::Active, Self::Inactive, Self::Suspended, Self::Retired];

    /// Stored and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVO",
            Self::Inactive => "INACTIVO",
            Self::Suspended => "SUSPENDIDO",
            Self::Retired => "RETIRADO",
        }
    }

    /// Parse the stored representation.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }
}

impl fmt::Display for VolunteerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact, location, and free-text profile fields shared by create and read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolunteerProfileFields {
    /// Phone number.
    pub phone: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// City.
    pub city: Option<String>,
    /// Province.
    pub province: Option<String>,
    /// Country.
    pub country: String,
    /// Street address.
    pub address: Option<String>,
    /// Why the volunteer wants to help.
    pub motivation: Option<String>,
    /// Prior experience.
    pub experience: Option<String>,
    /// Availability notes.
    pub availability: Option<String>,
    /// Emergency contact name.
    pub emergency_contact: Option<String>,
    /// Emergency contact phone.
    pub emergency_phone: Option<String>,
    /// Internal notes.
    pub notes: Option<String>,
    /// Profile photo.
    pub photo_url: Option<String>,
}

/// Persisted volunteer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volunteer {
    /// Identifier.
    pub id: VolunteerId,
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Unique contact email.
    pub email: EmailAddress,
    /// Non-empty area set.
    pub areas: BTreeSet<VolunteerArea>,
    /// Profile fields.
    pub profile: VolunteerProfileFields,
    /// Listed publicly when true.
    pub visible: bool,
    /// Lifecycle state.
    pub status: VolunteerStatus,
    /// Unique, immutable public slug.
    pub slug: String,
    /// Immutable QR code for the public profile URL, as an SVG document.
    pub qr_code: String,
    /// Join date.
    pub joined_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// User who registered the volunteer, when authenticated.
    pub created_by: Option<UserId>,
}

impl Volunteer {
    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Apply a validated patch. Slug, QR payload, and join date never change.
    pub fn apply_patch(&mut self, patch: VolunteerPatch, now: DateTime<Utc>) {
        let VolunteerPatch {
            first_name,
            last_name,
            email,
            areas,
            phone,
            birth_date,
            city,
            province,
            country,
            address,
            motivation,
            experience,
            availability,
            emergency_contact,
            emergency_phone,
            notes,
            photo_url,
            visible,
            status,
        } = patch;
        let profile = &mut self.profile;
        if let Some(value) = first_name {
            self.first_name = value;
        }
        if let Some(value) = last_name {
            self.last_name = value;
        }
        if let Some(value) = email {
            self.email = value;
        }
        if let Some(value) = areas {
            self.areas = value;
        }
        if let Some(value) = country {
            profile.country = value;
        }
        if let Some(value) = birth_date {
            profile.birth_date = Some(value);
        }
        for (slot, value) in [
            (&mut profile.phone, phone),
            (&mut profile.city, city),
            (&mut profile.province, province),
            (&mut profile.address, address),
            (&mut profile.motivation, motivation),
            (&mut profile.experience, experience),
            (&mut profile.availability, availability),
            (&mut profile.emergency_contact, emergency_contact),
            (&mut profile.emergency_phone, emergency_phone),
            (&mut profile.notes, notes),
            (&mut profile.photo_url, photo_url),
        ] {
            if let Some(value) = value {
                *slot = Some(value);
            }
        }
        if let Some(value) = visible {
            self.visible = value;
        }
        if let Some(value) = status {
            self.status = value;
        }
        self.updated_at = now;
    }
}

/// Unvalidated creation input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolunteerDraft {
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Selected areas.
    pub areas: Vec<VolunteerArea>,
    /// Profile fields; a blank country falls back to [`DEFAULT_COUNTRY`].
    pub profile: VolunteerProfileFields,
}

fn validated_name(field: &'static str, raw: &str) -> Result<String, VolunteerValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < VOLUNTEER_NAME_MIN {
        return Err(VolunteerValidationError::NameTooShort {
            field,
            min: VOLUNTEER_NAME_MIN,
        });
    }
    Ok(trimmed.to_owned())
}

fn validated_email(raw: &str) -> Result<EmailAddress, VolunteerValidationError> {
    EmailAddress::new(raw).map_err(|_| VolunteerValidationError::InvalidEmail)
}

fn validated_areas(
    areas: Vec<VolunteerArea>,
) -> Result<BTreeSet<VolunteerArea>, VolunteerValidationError> {
    let set: BTreeSet<_> = areas.into_iter().collect();
    if set.is_empty() {
        return Err(VolunteerValidationError::EmptyAreas);
    }
    Ok(set)
}

fn validated_photo(raw: &str) -> Result<String, VolunteerValidationError> {
    Url::parse(raw.trim())
        .map(String::from)
        .map_err(|_| VolunteerValidationError::InvalidPhotoUrl)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Validated creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVolunteer {
    first_name: String,
    last_name: String,
    email: EmailAddress,
    areas: BTreeSet<VolunteerArea>,
    profile: VolunteerProfileFields,
}

impl NewVolunteer {
    /// Validate a draft.
    ///
    /// # Errors
    /// Returns the first [`VolunteerValidationError`] encountered.
    pub fn try_new(draft: VolunteerDraft) -> Result<Self, VolunteerValidationError> {
        let first_name = validated_name("nombre", &draft.first_name)?;
        let last_name = validated_name("apellido", &draft.last_name)?;
        let email = validated_email(&draft.email)?;
        let areas = validated_areas(draft.areas)?;
        let mut profile = draft.profile;
        profile.photo_url = blank_to_none(profile.photo_url)
            .map(|url| validated_photo(&url))
            .transpose()?;
        if profile.country.trim().is_empty() {
            profile.country = DEFAULT_COUNTRY.to_owned();
        }
        Ok(Self {
            first_name,
            last_name,
            email,
            areas,
            profile,
        })
    }

    /// Contact email, checked for uniqueness before insert.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Build the stored volunteer with generated slug and QR code.
    ///
    /// # Errors
    /// Returns [`QrCodeError`] when the profile URL cannot be encoded.
    pub fn into_volunteer(
        self,
        id: VolunteerId,
        public_base_url: &str,
        created_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Volunteer, QrCodeError> {
        let slug = volunteer_slug(&self.first_name, &self.last_name, now);
        let qr_code = render_qr_svg(&profile_url(public_base_url, &slug))?;
        Ok(Volunteer {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            areas: self.areas,
            profile: self.profile,
            visible: true,
            status: VolunteerStatus::Active,
            slug,
            qr_code,
            joined_at: now,
            created_at: now,
            updated_at: now,
            created_by,
        })
    }
}

/// Sparse update; `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolunteerPatch {
    /// Given name.
    pub first_name: Option<String>,
    /// Surname.
    pub last_name: Option<String>,
    /// Contact email.
    pub email: Option<EmailAddress>,
    /// Replacement area set.
    pub areas: Option<BTreeSet<VolunteerArea>>,
    /// Phone.
    pub phone: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// City.
    pub city: Option<String>,
    /// Province.
    pub province: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Address.
    pub address: Option<String>,
    /// Motivation.
    pub motivation: Option<String>,
    /// Experience.
    pub experience: Option<String>,
    /// Availability.
    pub availability: Option<String>,
    /// Emergency contact name.
    pub emergency_contact: Option<String>,
    /// Emergency contact phone.
    pub emergency_phone: Option<String>,
    /// Internal notes.
    pub notes: Option<String>,
    /// Photo URL.
    pub photo_url: Option<String>,
    /// Visibility.
    pub visible: Option<bool>,
    /// Lifecycle state.
    pub status: Option<VolunteerStatus>,
}

/// Unvalidated patch input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolunteerPatchDraft {
    /// Given name.
    pub first_name: Option<String>,
    /// Surname.
    pub last_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Replacement areas.
    pub areas: Option<Vec<VolunteerArea>>,
    /// Remaining fields, already typed.
    pub rest: VolunteerPatch,
}

impl VolunteerPatch {
    /// Validate a patch draft; `areas`, when present, must be non-empty.
    ///
    /// # Errors
    /// Returns the first [`VolunteerValidationError`] encountered.
    pub fn try_new(draft: VolunteerPatchDraft) -> Result<Self, VolunteerValidationError> {
        let mut patch = draft.rest;
        patch.first_name = draft
            .first_name
            .map(|v| validated_name("nombre", &v))
            .transpose()?;
        patch.last_name = draft
            .last_name
            .map(|v| validated_name("apellido", &v))
            .transpose()?;
        patch.email = draft.email.map(|v| validated_email(&v)).transpose()?;
        patch.areas = draft.areas.map(validated_areas).transpose()?;
        patch.photo_url = blank_to_none(patch.photo_url)
            .map(|url| validated_photo(&url))
            .transpose()?;
        Ok(patch)
    }
}

/// Listing filter. Every `None` means "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolunteerFilter {
    /// Case-insensitive substring over name, surname, email, and city.
    pub search: Option<String>,
    /// Area membership.
    pub area: Option<VolunteerArea>,
    /// Case-insensitive city substring.
    pub city: Option<String>,
    /// Exact lifecycle state.
    pub status: Option<VolunteerStatus>,
    /// Exact visibility.
    pub visible: Option<bool>,
}

/// Treat blank values and the literal `undefined` as absent.
///
/// # Examples
/// ```
/// use pazanimal::domain::filter_value;
///
/// assert_eq!(filter_value(Some("  Rosario ")), Some("Rosario".to_owned()));
/// assert_eq!(filter_value(Some("undefined")), None);
/// assert_eq!(filter_value(Some("   ")), None);
/// ```
pub fn filter_value(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty() && *v != UNDEFINED_SENTINEL)
        .map(str::to_owned)
}

/// Aggregate counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VolunteerStats {
    /// All volunteers.
    #[serde(rename = "totalVoluntarios")]
    pub total: u64,
    /// `ACTIVO` volunteers.
    #[serde(rename = "voluntariosActivos")]
    pub active: u64,
    /// `INACTIVO` volunteers.
    #[serde(rename = "voluntariosInactivos")]
    pub inactive: u64,
    /// Activities dated in the current UTC month.
    #[serde(rename = "actividadesMes")]
    pub activities_this_month: u64,
}

/// Build `slugify(nombre-apellido)-{last six digits of unix millis}`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use pazanimal::domain::volunteer_slug;
///
/// let at = Utc.timestamp_millis_opt(1_700_000_123_456).single().expect("instant");
/// assert_eq!(volunteer_slug("María José", "Núñez", at), "maria-jose-nunez-123456");
/// ```
pub fn volunteer_slug(first_name: &str, last_name: &str, at: DateTime<Utc>) -> String {
    let base = slugify(&format!("{first_name}-{last_name}"));
    let millis = at.timestamp_millis().unsigned_abs();
    let suffix = format!("{:06}", millis % 1_000_000);
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

/// Public profile URL encoded in the QR payload.
pub fn profile_url(public_base_url: &str, slug: &str) -> String {
    format!("{}/voluntarios/{slug}", public_base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests;
