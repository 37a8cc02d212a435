//! Wire DTOs for the volunteer endpoints.
//!
//! Field names follow the Spanish wire contract (`nombre`, `fechaIngreso`,
//! `experienciaPrevia`, ...). Conversions into domain drafts parse dates,
//! areas and enum values here so handlers stay thin and every failure
//! carries `{field, code}` details.

use chrono::{DateTime, NaiveDate, Utc};
use pagination::PageInfo;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{VolunteerDetail, VolunteerProfile};
use crate::domain::{
    Activity, ActivityDraft, Error, Schedule, ScheduleDraft, Volunteer, VolunteerArea,
    VolunteerDraft, VolunteerPatch, VolunteerPatchDraft, VolunteerProfileFields, VolunteerStats,
    VolunteerStatus, Weekday,
};
use crate::inbound::http::validation::{FieldName, invalid_value_error, parse_enum};

const CLOCK_FORMAT: &str = "%H:%M";

fn parse_areas(raw: Vec<String>) -> Result<Vec<VolunteerArea>, Error> {
    raw.into_iter()
        .enumerate()
        .map(|(index, code)| {
            code.trim().parse::<VolunteerArea>().map_err(|err| {
                Error::invalid_request(err.to_string()).with_details(json!({
                    "field": "areas",
                    "index": index,
                    "value": code,
                    "code": "invalid_value",
                }))
            })
        })
        .collect()
}

/// Accept `YYYY-MM-DD` or a full RFC 3339 timestamp; blank means absent.
fn parse_birth_date(raw: Option<String>) -> Result<Option<NaiveDate>, Error> {
    let Some(raw) = raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|ts| ts.date_naive()))
        .map(Some)
        .map_err(|_| {
            invalid_value_error(
                FieldName::new("fechaNacimiento"),
                &raw,
                "fechaNacimiento must be a date (YYYY-MM-DD)",
            )
        })
}

/// Request body for `POST /api/v1/voluntarios`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateVolunteerRequest {
    #[schema(example = "María")]
    pub nombre: String,
    #[schema(example = "González")]
    pub apellido: String,
    #[schema(example = "maria@example.org")]
    pub email: String,
    pub telefono: Option<String>,
    #[schema(example = "1990-04-12")]
    pub fecha_nacimiento: Option<String>,
    pub ciudad: Option<String>,
    pub provincia: Option<String>,
    /// Defaults to `Argentina`.
    pub pais: Option<String>,
    pub direccion: Option<String>,
    /// Area codes such as `PASEOS`; at least one.
    #[schema(example = json!(["PASEOS", "EVENTOS"]))]
    pub areas: Vec<String>,
    pub motivacion: Option<String>,
    pub experiencia_previa: Option<String>,
    pub disponibilidad: Option<String>,
    pub emergencia_contacto: Option<String>,
    pub emergencia_telefono: Option<String>,
    pub observaciones: Option<String>,
    pub foto_url: Option<String>,
}

impl TryFrom<CreateVolunteerRequest> for VolunteerDraft {
    type Error = Error;

    fn try_from(value: CreateVolunteerRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            areas: parse_areas(value.areas)?,
            profile: VolunteerProfileFields {
                phone: value.telefono,
                birth_date: parse_birth_date(value.fecha_nacimiento)?,
                city: value.ciudad,
                province: value.provincia,
                country: value.pais.unwrap_or_default(),
                address: value.direccion,
                motivation: value.motivacion,
                experience: value.experiencia_previa,
                availability: value.disponibilidad,
                emergency_contact: value.emergencia_contacto,
                emergency_phone: value.emergencia_telefono,
                notes: value.observaciones,
                photo_url: value.foto_url,
            },
            first_name: value.nombre,
            last_name: value.apellido,
            email: value.email,
        })
    }
}

/// Sparse update body shared by `PUT` and `PATCH`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateVolunteerRequest {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<String>,
    pub ciudad: Option<String>,
    pub provincia: Option<String>,
    pub pais: Option<String>,
    pub direccion: Option<String>,
    /// Replaces the whole set when present; must not be empty.
    pub areas: Option<Vec<String>>,
    pub motivacion: Option<String>,
    pub experiencia_previa: Option<String>,
    pub disponibilidad: Option<String>,
    pub emergencia_contacto: Option<String>,
    pub emergencia_telefono: Option<String>,
    pub observaciones: Option<String>,
    pub foto_url: Option<String>,
    pub visible: Option<bool>,
    /// `ACTIVO`, `INACTIVO`, `SUSPENDIDO` or `RETIRADO`.
    pub estado: Option<String>,
}

impl TryFrom<UpdateVolunteerRequest> for VolunteerPatchDraft {
    type Error = Error;

    fn try_from(value: UpdateVolunteerRequest) -> Result<Self, Self::Error> {
        let status = value
            .estado
            .as_deref()
            .map(|raw| parse_enum(raw, FieldName::new("estado"), VolunteerStatus::parse))
            .transpose()?;
        Ok(Self {
            first_name: value.nombre,
            last_name: value.apellido,
            email: value.email,
            areas: value.areas.map(parse_areas).transpose()?,
            rest: VolunteerPatch {
                phone: value.telefono,
                birth_date: parse_birth_date(value.fecha_nacimiento)?,
                city: value.ciudad,
                province: value.provincia,
                country: value.pais.filter(|v| !v.trim().is_empty()),
                address: value.direccion,
                motivation: value.motivacion,
                experience: value.experiencia_previa,
                availability: value.disponibilidad,
                emergency_contact: value.emergencia_contacto,
                emergency_phone: value.emergencia_telefono,
                notes: value.observaciones,
                photo_url: value.foto_url,
                visible: value.visible,
                status,
                ..VolunteerPatch::default()
            },
        })
    }
}

/// Administrative volunteer representation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerResponse {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub ciudad: Option<String>,
    pub provincia: Option<String>,
    pub pais: String,
    pub direccion: Option<String>,
    pub areas: Vec<String>,
    pub motivacion: Option<String>,
    pub experiencia_previa: Option<String>,
    pub disponibilidad: Option<String>,
    pub emergencia_contacto: Option<String>,
    pub emergencia_telefono: Option<String>,
    pub observaciones: Option<String>,
    pub foto_url: Option<String>,
    pub visible: bool,
    #[schema(example = "ACTIVO")]
    pub estado: String,
    #[schema(example = "maria-gonzalez-123456")]
    pub slug: String,
    /// Public profile URL encoded in the volunteer's QR badge.
    pub qr_code: String,
    pub fecha_ingreso: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

fn area_codes(volunteer: &Volunteer) -> Vec<String> {
    volunteer
        .areas
        .iter()
        .map(|area| area.code().to_owned())
        .collect()
}

impl From<Volunteer> for VolunteerResponse {
    fn from(volunteer: Volunteer) -> Self {
        let areas = area_codes(&volunteer);
        let profile = volunteer.profile;
        Self {
            id: volunteer.id.to_string(),
            nombre: volunteer.first_name,
            apellido: volunteer.last_name,
            email: volunteer.email.as_ref().to_owned(),
            telefono: profile.phone,
            fecha_nacimiento: profile.birth_date,
            ciudad: profile.city,
            provincia: profile.province,
            pais: profile.country,
            direccion: profile.address,
            areas,
            motivacion: profile.motivation,
            experiencia_previa: profile.experience,
            disponibilidad: profile.availability,
            emergencia_contacto: profile.emergency_contact,
            emergencia_telefono: profile.emergency_phone,
            observaciones: profile.notes,
            foto_url: profile.photo_url,
            visible: volunteer.visible,
            estado: volunteer.status.as_str().to_owned(),
            slug: volunteer.slug,
            qr_code: volunteer.qr_code,
            fecha_ingreso: volunteer.joined_at,
            created_at: volunteer.created_at,
            updated_at: volunteer.updated_at,
            created_by: volunteer.created_by.map(|id| id.to_string()),
        }
    }
}

/// Logged activity.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: String,
    pub voluntario_id: String,
    pub titulo: String,
    pub tipo: String,
    pub descripcion: Option<String>,
    pub fecha: DateTime<Utc>,
    /// Minutes.
    pub duracion: Option<u32>,
    pub observaciones: Option<String>,
    #[schema(example = "PROGRAMADA")]
    pub estado: String,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id.to_string(),
            voluntario_id: activity.volunteer_id.to_string(),
            titulo: activity.title,
            tipo: activity.kind,
            descripcion: activity.description,
            fecha: activity.date,
            duracion: activity.duration_minutes,
            observaciones: activity.notes,
            estado: activity.status.as_str().to_owned(),
        }
    }
}

/// Weekly schedule block.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub id: String,
    pub voluntario_id: String,
    #[schema(example = "LUNES")]
    pub dia_semana: String,
    #[schema(example = "09:00")]
    pub hora_inicio: String,
    #[schema(example = "12:30")]
    pub hora_fin: String,
    pub observaciones: Option<String>,
}

impl From<Schedule> for ScheduleResponse {
    fn from(schedule: Schedule) -> Self {
        Self {
            id: schedule.id.to_string(),
            voluntario_id: schedule.volunteer_id.to_string(),
            dia_semana: schedule.weekday.as_str().to_owned(),
            hora_inicio: schedule.starts_at.format(CLOCK_FORMAT).to_string(),
            hora_fin: schedule.ends_at.format(CLOCK_FORMAT).to_string(),
            observaciones: schedule.notes,
        }
    }
}

/// Administrative detail view.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerDetailResponse {
    #[serde(flatten)]
    pub voluntario: VolunteerResponse,
    /// Most recent activities, newest first.
    pub actividades: Vec<ActivityResponse>,
    pub horarios: Vec<ScheduleResponse>,
    pub total_actividades: u64,
}

impl From<VolunteerDetail> for VolunteerDetailResponse {
    fn from(detail: VolunteerDetail) -> Self {
        Self {
            voluntario: detail.volunteer.into(),
            actividades: detail
                .recent_activities
                .into_iter()
                .map(Into::into)
                .collect(),
            horarios: detail.schedules.into_iter().map(Into::into).collect(),
            total_actividades: detail.activity_count,
        }
    }
}

/// Public profile; contact and internal fields are withheld.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfileResponse {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    pub ciudad: Option<String>,
    pub provincia: Option<String>,
    pub pais: String,
    pub areas: Vec<String>,
    pub motivacion: Option<String>,
    pub experiencia_previa: Option<String>,
    pub disponibilidad: Option<String>,
    pub foto_url: Option<String>,
    pub estado: String,
    pub slug: String,
    pub qr_code: String,
    pub fecha_ingreso: DateTime<Utc>,
    pub actividades: Vec<ActivityResponse>,
    pub total_actividades: u64,
}

impl From<VolunteerProfile> for PublicProfileResponse {
    fn from(profile: VolunteerProfile) -> Self {
        let VolunteerProfile {
            volunteer,
            recent_activities,
            activity_count,
        } = profile;
        let areas = area_codes(&volunteer);
        let fields = volunteer.profile;
        Self {
            id: volunteer.id.to_string(),
            nombre: volunteer.first_name,
            apellido: volunteer.last_name,
            ciudad: fields.city,
            provincia: fields.province,
            pais: fields.country,
            areas,
            motivacion: fields.motivation,
            experiencia_previa: fields.experience,
            disponibilidad: fields.availability,
            foto_url: fields.photo_url,
            estado: volunteer.status.as_str().to_owned(),
            slug: volunteer.slug,
            qr_code: volunteer.qr_code,
            fecha_ingreso: volunteer.joined_at,
            actividades: recent_activities.into_iter().map(Into::into).collect(),
            total_actividades: activity_count,
        }
    }
}

/// Pagination envelope.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PaginationResponse {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl From<PageInfo> for PaginationResponse {
    fn from(info: PageInfo) -> Self {
        Self {
            page: info.page,
            limit: info.limit,
            total: info.total,
            pages: info.pages,
        }
    }
}

/// Listing response.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VolunteerListResponse {
    pub voluntarios: Vec<VolunteerResponse>,
    pub pagination: PaginationResponse,
}

/// Dashboard counts.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerStatsResponse {
    pub total_voluntarios: u64,
    pub voluntarios_activos: u64,
    pub voluntarios_inactivos: u64,
    /// Activities dated in the current UTC month.
    pub actividades_mes: u64,
}

impl From<VolunteerStats> for VolunteerStatsResponse {
    fn from(stats: VolunteerStats) -> Self {
        Self {
            total_voluntarios: stats.total,
            voluntarios_activos: stats.active,
            voluntarios_inactivos: stats.inactive,
            actividades_mes: stats.activities_this_month,
        }
    }
}

/// One entry of `GET /api/v1/voluntarios/areas`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AreaResponse {
    #[schema(example = "CUIDADO_ANIMALES")]
    pub codigo: String,
    #[schema(example = "Cuidado de Animales")]
    pub nombre: String,
}

impl From<VolunteerArea> for AreaResponse {
    fn from(area: VolunteerArea) -> Self {
        Self {
            codigo: area.code().to_owned(),
            nombre: area.label().to_owned(),
        }
    }
}

/// Request body for logging an activity.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    #[schema(example = "Paseo matutino")]
    pub titulo: String,
    #[schema(example = "PASEO")]
    pub tipo: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub fecha: DateTime<Utc>,
    /// Minutes; must be positive when present.
    #[serde(default)]
    pub duracion: Option<u32>,
    #[serde(default)]
    pub observaciones: Option<String>,
}

impl From<CreateActivityRequest> for ActivityDraft {
    fn from(value: CreateActivityRequest) -> Self {
        Self {
            title: value.titulo,
            kind: value.tipo,
            description: value.descripcion,
            date: value.fecha,
            duration_minutes: value.duracion,
            notes: value.observaciones,
        }
    }
}

/// Request body for changing an activity's status.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityRequest {
    /// `PROGRAMADA`, `EN_CURSO`, `COMPLETADA` or `CANCELADA`.
    #[schema(example = "COMPLETADA")]
    pub estado: String,
    #[serde(default)]
    pub observaciones: Option<String>,
}

/// Request body for adding a schedule block.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    #[schema(example = "SABADO")]
    pub dia_semana: String,
    #[schema(example = "09:00")]
    pub hora_inicio: String,
    #[schema(example = "12:00")]
    pub hora_fin: String,
    #[serde(default)]
    pub observaciones: Option<String>,
}

impl TryFrom<CreateScheduleRequest> for ScheduleDraft {
    type Error = Error;

    fn try_from(value: CreateScheduleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            weekday: parse_enum(
                value.dia_semana.trim(),
                FieldName::new("diaSemana"),
                Weekday::parse,
            )?,
            starts_at: value.hora_inicio,
            ends_at: value.hora_fin,
            notes: value.observaciones,
        })
    }
}
