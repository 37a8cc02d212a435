//! Volunteer activities and recurring schedules.
//!
//! Both are owned by a volunteer and removed with it.

use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivityId, ScheduleId, VolunteerId};

/// Validation failures for activity and schedule input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgendaValidationError {
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Offending wire field.
        field: &'static str,
    },
    /// The duration was zero.
    #[error("duracion must be a positive number of minutes")]
    NonPositiveDuration,
    /// A time was not `HH:MM`.
    #[error("{field} must use the HH:MM format")]
    InvalidTime {
        /// Offending wire field.
        field: &'static str,
    },
    /// The start time was not before the end time.
    #[error("horaInicio must be earlier than horaFin")]
    StartNotBeforeEnd,
}

impl AgendaValidationError {
    /// Wire name of the offending field.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } | Self::InvalidTime { field } => *field,
            Self::NonPositiveDuration => "duracion",
            Self::StartNotBeforeEnd => "horaFin",
        }
    }

    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyField { .. } => "missing_field",
            Self::NonPositiveDuration => "out_of_range",
            Self::InvalidTime { .. } => "invalid_time",
            Self::StartNotBeforeEnd => "invalid_range",
        }
    }
}

/// Activity progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActivityStatus {
    /// Planned.
    #[default]
    #[serde(rename = "PROGRAMADA")]
    Scheduled,
    /// In progress.
    #[serde(rename = "EN_CURSO")]
    InProgress,
    /// Done.
    #[serde(rename = "COMPLETADA")]
    Completed,
    /// Called off.
    #[serde(rename = "CANCELADA")]
    Cancelled,
}

impl ActivityStatus {
    /// Every status.
    pub const ALL: [Self; 4] = [
        Self::Scheduled,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "PROGRAMADA",
            Self::InProgress => "EN_CURSO",
            Self::Completed => "COMPLETADA",
            Self::Cancelled => "CANCELADA",
        }
    }

    /// Parse the stored representation.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }
}

/// Logged volunteer engagement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    /// Identifier.
    pub id: ActivityId,
    /// Owning volunteer.
    pub volunteer_id: VolunteerId,
    /// Short title.
    pub title: String,
    /// Free-text kind, such as `PASEO`.
    pub kind: String,
    /// Longer description.
    pub description: Option<String>,
    /// When it happens.
    pub date: DateTime<Utc>,
    /// Duration in minutes.
    pub duration_minutes: Option<u32>,
    /// Notes.
    pub notes: Option<String>,
    /// Progress.
    pub status: ActivityStatus,
}

/// Unvalidated activity input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    /// Short title.
    pub title: String,
    /// Free-text kind.
    pub kind: String,
    /// Longer description.
    pub description: Option<String>,
    /// When it happens.
    pub date: DateTime<Utc>,
    /// Duration in minutes.
    pub duration_minutes: Option<u32>,
    /// Notes.
    pub notes: Option<String>,
}

fn required(field: &'static str, raw: &str) -> Result<String, AgendaValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AgendaValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

impl Activity {
    /// Validate a draft into a new `PROGRAMADA` activity.
    ///
    /// # Errors
    /// Returns [`AgendaValidationError`] for blank titles or kinds and zero
    /// durations.
    pub fn schedule(
        id: ActivityId,
        volunteer_id: VolunteerId,
        draft: ActivityDraft,
    ) -> Result<Self, AgendaValidationError> {
        let title = required("titulo", &draft.title)?;
        let kind = required("tipo", &draft.kind)?;
        if draft.duration_minutes == Some(0) {
            return Err(AgendaValidationError::NonPositiveDuration);
        }
        Ok(Self {
            id,
            volunteer_id,
            title,
            kind,
            description: draft.description,
            date: draft.date,
            duration_minutes: draft.duration_minutes,
            notes: draft.notes,
            status: ActivityStatus::Scheduled,
        })
    }
}

/// Day of the week for recurring schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    /// Monday.
    Lunes,
    /// Tuesday.
    Martes,
    /// Wednesday.
    Miercoles,
    /// Thursday.
    Jueves,
    /// Friday.
    Viernes,
    /// Saturday.
    Sabado,
    /// Sunday.
    Domingo,
}

impl Weekday {
    /// Every day, Monday first.
    pub const ALL: [Self; 7] = [
        Self::Lunes,
        Self::Martes,
        Self::Miercoles,
        Self::Jueves,
        Self::Viernes,
        Self::Sabado,
        Self::Domingo,
    ];

    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lunes => "LUNES",
            Self::Martes => "MARTES",
            Self::Miercoles => "MIERCOLES",
            Self::Jueves => "JUEVES",
            Self::Viernes => "VIERNES",
            Self::Sabado => "SABADO",
            Self::Domingo => "DOMINGO",
        }
    }

    /// Parse the stored representation.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.as_str() == raw)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurring availability block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Identifier.
    pub id: ScheduleId,
    /// Owning volunteer.
    pub volunteer_id: VolunteerId,
    /// Day of the week.
    pub weekday: Weekday,
    /// Start time.
    pub starts_at: NaiveTime,
    /// End time, strictly after the start.
    pub ends_at: NaiveTime,
    /// Notes.
    pub notes: Option<String>,
}

/// Unvalidated schedule input; times are `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    /// Day of the week.
    pub weekday: Weekday,
    /// Start time.
    pub starts_at: String,
    /// End time.
    pub ends_at: String,
    /// Notes.
    pub notes: Option<String>,
}

/// Parse an `HH:MM` wall-clock time.
///
/// # Errors
/// Returns [`AgendaValidationError::InvalidTime`] naming `field`.
pub fn parse_clock_time(field: &'static str, raw: &str) -> Result<NaiveTime, AgendaValidationError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| AgendaValidationError::InvalidTime { field })
}

impl Schedule {
    /// Validate a schedule block.
    ///
    /// # Errors
    /// Returns [`AgendaValidationError`] for malformed times or an empty range.
    pub fn try_new(
        id: ScheduleId,
        volunteer_id: VolunteerId,
        weekday: Weekday,
        starts_at: &str,
        ends_at: &str,
        notes: Option<String>,
    ) -> Result<Self, AgendaValidationError> {
        let starts_at = parse_clock_time("horaInicio", starts_at)?;
        let ends_at = parse_clock_time("horaFin", ends_at)?;
        if starts_at >= ends_at {
            return Err(AgendaValidationError::StartNotBeforeEnd);
        }
        Ok(Self {
            id,
            volunteer_id,
            weekday,
            starts_at,
            ends_at,
            notes,
        })
    }

    /// Validate a [`ScheduleDraft`].
    ///
    /// # Errors
    /// See [`Schedule::try_new`].
    pub fn from_draft(
        id: ScheduleId,
        volunteer_id: VolunteerId,
        draft: ScheduleDraft,
    ) -> Result<Self, AgendaValidationError> {
        Self::try_new(
            id,
            volunteer_id,
            draft.weekday,
            &draft.starts_at,
            &draft.ends_at,
            draft.notes,
        )
    }
}
