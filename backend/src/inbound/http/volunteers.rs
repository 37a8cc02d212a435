//! Volunteer directory HTTP handlers.
//!
//! ```text
//! GET    /api/v1/voluntarios?page=1&limit=10&busqueda=ana&area=PASEOS&stats=false
//! POST   /api/v1/voluntarios
//! GET    /api/v1/voluntarios/areas
//! GET    /api/v1/voluntarios/perfil/{slug}
//! GET    /api/v1/voluntarios/{id}
//! PUT    /api/v1/voluntarios/{id}
//! PATCH  /api/v1/voluntarios/{id}
//! DELETE /api/v1/voluntarios/{id}
//! POST   /api/v1/voluntarios/{id}/actividades
//! PATCH  /api/v1/voluntarios/{id}/actividades/{actividadId}
//! POST   /api/v1/voluntarios/{id}/horarios
//! DELETE /api/v1/voluntarios/{id}/horarios/{horarioId}
//! ```
//!
//! `areas` and `perfil/{slug}` must be registered ahead of `{id}` so the
//! literal segments win the route match.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{
    ActivityId, ActivityStatus, Error, Role, ScheduleId, VolunteerArea, VolunteerFilter,
    VolunteerId, VolunteerStatus, filter_value,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_request, parse_enum, parse_id, parse_optional_bool, parse_optional_enum,
};
pub use crate::inbound::http::volunteers_dto::{
    ActivityResponse, AreaResponse, CreateActivityRequest, CreateScheduleRequest,
    CreateVolunteerRequest, PaginationResponse, PublicProfileResponse, ScheduleResponse,
    UpdateActivityRequest, UpdateVolunteerRequest, VolunteerDetailResponse,
    VolunteerListResponse, VolunteerResponse, VolunteerStatsResponse,
};

/// Query parameters accepted by the volunteer listing.
///
/// Blank values and the literal `undefined` are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VolunteerListQuery {
    /// One-based page, default 1.
    pub page: Option<String>,
    /// Page size, default 10, clamped to 1..=100.
    pub limit: Option<String>,
    /// Substring over nombre, apellido, email and ciudad.
    pub busqueda: Option<String>,
    /// Area code.
    pub area: Option<String>,
    /// City substring.
    pub ciudad: Option<String>,
    /// Lifecycle state.
    pub estado: Option<String>,
    /// `true` or `false`.
    pub visible: Option<String>,
    /// Return dashboard counts instead of a page.
    pub stats: Option<String>,
}

impl VolunteerListQuery {
    fn filter(&self) -> Result<VolunteerFilter, Error> {
        let area = filter_value(self.area.as_deref());
        let status = filter_value(self.estado.as_deref());
        let visible = filter_value(self.visible.as_deref());
        Ok(VolunteerFilter {
            search: filter_value(self.busqueda.as_deref()),
            area: parse_optional_enum(area.as_deref(), FieldName::new("area"), |raw| {
                raw.parse::<VolunteerArea>().ok()
            })?,
            city: filter_value(self.ciudad.as_deref()),
            status: parse_optional_enum(
                status.as_deref(),
                FieldName::new("estado"),
                VolunteerStatus::parse,
            )?,
            visible: parse_optional_bool(visible.as_deref(), FieldName::new("visible"))?,
        })
    }
}

fn volunteer_id(raw: &str) -> Result<VolunteerId, Error> {
    parse_id(raw, FieldName::new("id"))
}

/// List volunteers, or return dashboard counts when `stats=true`.
#[utoipa::path(
    get,
    path = "/api/v1/voluntarios",
    params(VolunteerListQuery),
    responses(
        (status = 200, description = "Page of volunteers, or stats when requested", body = VolunteerListResponse),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "ADMIN role required", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "listVolunteers"
)]
#[get("/voluntarios")]
pub async fn list_volunteers(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<VolunteerListQuery>,
) -> ApiResult<HttpResponse> {
    session.require_role(Role::Admin)?;
    let stats = filter_value(query.stats.as_deref());
    if parse_optional_bool(stats.as_deref(), FieldName::new("stats"))? == Some(true) {
        let stats = state.volunteers_query.volunteer_stats().await?;
        return Ok(HttpResponse::Ok().json(VolunteerStatsResponse::from(stats)));
    }

    let filter = query.filter()?;
    let page = page_request(query.page.as_deref(), query.limit.as_deref());
    let result = state.volunteers_query.list_volunteers(filter, page).await?;
    Ok(HttpResponse::Ok().json(VolunteerListResponse {
        voluntarios: result.items.into_iter().map(Into::into).collect(),
        pagination: result.info.into(),
    }))
}

/// Register a volunteer. Open to the public; a logged-in caller is
/// recorded as the creator.
#[utoipa::path(
    post,
    path = "/api/v1/voluntarios",
    request_body = CreateVolunteerRequest,
    responses(
        (status = 201, description = "Volunteer registered", body = VolunteerResponse),
        (status = 400, description = "Invalid volunteer", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "createVolunteer",
    security([])
)]
#[post("/voluntarios")]
pub async fn create_volunteer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateVolunteerRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.claims()?.map(|claims| *claims.user_id());
    let draft = payload.into_inner().try_into()?;
    let volunteer = state.volunteers.create_volunteer(draft, actor).await?;
    Ok(HttpResponse::Created().json(VolunteerResponse::from(volunteer)))
}

/// List every volunteer area with its display label.
#[utoipa::path(
    get,
    path = "/api/v1/voluntarios/areas",
    responses((status = 200, description = "Area catalogue", body = [AreaResponse])),
    tags = ["voluntarios"],
    operation_id = "listVolunteerAreas",
    security([])
)]
#[get("/voluntarios/areas")]
pub async fn list_areas() -> web::Json<Vec<AreaResponse>> {
    web::Json(VolunteerArea::ALL.into_iter().map(Into::into).collect())
}

/// Public profile of a visible volunteer.
#[utoipa::path(
    get,
    path = "/api/v1/voluntarios/perfil/{slug}",
    params(("slug" = String, Path, description = "Volunteer slug")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfileResponse),
        (status = 404, description = "Unknown or hidden volunteer", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "getVolunteerProfile",
    security([])
)]
#[get("/voluntarios/perfil/{slug}")]
pub async fn public_profile(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PublicProfileResponse>> {
    let slug = path.into_inner();
    let profile = state
        .volunteers_query
        .public_profile(slug.trim())
        .await?
        .ok_or_else(|| Error::not_found("volunteer profile not available"))?;
    Ok(web::Json(profile.into()))
}

/// Administrative detail view with recent activities and schedules.
#[utoipa::path(
    get,
    path = "/api/v1/voluntarios/{id}",
    params(("id" = String, Path, description = "Volunteer identifier")),
    responses(
        (status = 200, description = "Volunteer detail", body = VolunteerDetailResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "ADMIN role required", body = ErrorSchema),
        (status = 404, description = "Unknown volunteer", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "getVolunteer"
)]
#[get("/voluntarios/{id}")]
pub async fn get_volunteer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<VolunteerDetailResponse>> {
    session.require_role(Role::Admin)?;
    let id = volunteer_id(&path.into_inner())?;
    let detail = state
        .volunteers_query
        .find_volunteer(&id)
        .await?
        .ok_or_else(|| Error::not_found(format!("volunteer {id} not found")))?;
    Ok(web::Json(detail.into()))
}

async fn apply_update(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateVolunteerRequest>,
) -> ApiResult<web::Json<VolunteerResponse>> {
    let claims = session.require_claims()?;
    let id = volunteer_id(&path.into_inner())?;
    let patch = payload.into_inner().try_into()?;
    let volunteer = state.volunteers.update_volunteer(&claims, &id, patch).await?;
    Ok(web::Json(volunteer.into()))
}

/// Update a volunteer. Allowed for admins and for the volunteer's creator.
#[utoipa::path(
    put,
    path = "/api/v1/voluntarios/{id}",
    params(("id" = String, Path, description = "Volunteer identifier")),
    request_body = UpdateVolunteerRequest,
    responses(
        (status = 200, description = "Updated volunteer", body = VolunteerResponse),
        (status = 400, description = "Invalid update", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not an admin or the creator", body = ErrorSchema),
        (status = 404, description = "Unknown volunteer", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "replaceVolunteer"
)]
#[put("/voluntarios/{id}")]
pub async fn replace_volunteer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateVolunteerRequest>,
) -> ApiResult<web::Json<VolunteerResponse>> {
    apply_update(state, session, path, payload).await
}

/// Sparse update; identical semantics to `PUT`.
#[utoipa::path(
    patch,
    path = "/api/v1/voluntarios/{id}",
    params(("id" = String, Path, description = "Volunteer identifier")),
    request_body = UpdateVolunteerRequest,
    responses(
        (status = 200, description = "Updated volunteer", body = VolunteerResponse),
        (status = 400, description = "Invalid update", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not an admin or the creator", body = ErrorSchema),
        (status = 404, description = "Unknown volunteer", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "patchVolunteer"
)]
#[patch("/voluntarios/{id}")]
pub async fn patch_volunteer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateVolunteerRequest>,
) -> ApiResult<web::Json<VolunteerResponse>> {
    apply_update(state, session, path, payload).await
}

/// Delete a volunteer with its activities and schedules.
#[utoipa::path(
    delete,
    path = "/api/v1/voluntarios/{id}",
    params(("id" = String, Path, description = "Volunteer identifier")),
    responses(
        (status = 204, description = "Volunteer deleted"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "ADMIN role required", body = ErrorSchema),
        (status = 404, description = "Unknown volunteer", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "deleteVolunteer"
)]
#[delete("/voluntarios/{id}")]
pub async fn delete_volunteer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let claims = session.require_role(Role::Admin)?;
    let id = volunteer_id(&path.into_inner())?;
    state.volunteers.delete_volunteer(&claims, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Log an activity for a volunteer.
#[utoipa::path(
    post,
    path = "/api/v1/voluntarios/{id}/actividades",
    params(("id" = String, Path, description = "Volunteer identifier")),
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Activity logged", body = ActivityResponse),
        (status = 400, description = "Invalid activity", body = ErrorSchema),
        (status = 403, description = "ADMIN role required", body = ErrorSchema),
        (status = 404, description = "Unknown volunteer", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "createVolunteerActivity"
)]
#[post("/voluntarios/{id}/actividades")]
pub async fn create_activity(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CreateActivityRequest>,
) -> ApiResult<HttpResponse> {
    session.require_role(Role::Admin)?;
    let id = volunteer_id(&path.into_inner())?;
    let activity = state
        .volunteers
        .add_activity(&id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(ActivityResponse::from(activity)))
}

/// Change an activity's status.
#[utoipa::path(
    patch,
    path = "/api/v1/voluntarios/{id}/actividades/{actividadId}",
    params(
        ("id" = String, Path, description = "Volunteer identifier"),
        ("actividadId" = String, Path, description = "Activity identifier")
    ),
    request_body = UpdateActivityRequest,
    responses(
        (status = 200, description = "Activity updated", body = ActivityResponse),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "ADMIN role required", body = ErrorSchema),
        (status = 404, description = "Unknown volunteer or activity", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "updateVolunteerActivity"
)]
#[patch("/voluntarios/{id}/actividades/{activity_id}")]
pub async fn update_activity(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<UpdateActivityRequest>,
) -> ApiResult<web::Json<ActivityResponse>> {
    session.require_role(Role::Admin)?;
    let (raw_volunteer, raw_activity) = path.into_inner();
    let id = volunteer_id(&raw_volunteer)?;
    let activity_id: ActivityId = parse_id(&raw_activity, FieldName::new("actividadId"))?;
    let UpdateActivityRequest {
        estado,
        observaciones,
    } = payload.into_inner();
    let status = parse_enum(estado.trim(), FieldName::new("estado"), ActivityStatus::parse)?;
    let activity = state
        .volunteers
        .update_activity(&id, &activity_id, status, observaciones)
        .await?;
    Ok(web::Json(activity.into()))
}

/// Add a weekly schedule block.
#[utoipa::path(
    post,
    path = "/api/v1/voluntarios/{id}/horarios",
    params(("id" = String, Path, description = "Volunteer identifier")),
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Schedule added", body = ScheduleResponse),
        (status = 400, description = "Invalid schedule", body = ErrorSchema),
        (status = 403, description = "ADMIN role required", body = ErrorSchema),
        (status = 404, description = "Unknown volunteer", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "createVolunteerSchedule"
)]
#[post("/voluntarios/{id}/horarios")]
pub async fn create_schedule(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CreateScheduleRequest>,
) -> ApiResult<HttpResponse> {
    session.require_role(Role::Admin)?;
    let id = volunteer_id(&path.into_inner())?;
    let draft = payload.into_inner().try_into()?;
    let schedule = state.volunteers.add_schedule(&id, draft).await?;
    Ok(HttpResponse::Created().json(ScheduleResponse::from(schedule)))
}

/// Remove a weekly schedule block.
#[utoipa::path(
    delete,
    path = "/api/v1/voluntarios/{id}/horarios/{horarioId}",
    params(
        ("id" = String, Path, description = "Volunteer identifier"),
        ("horarioId" = String, Path, description = "Schedule identifier")
    ),
    responses(
        (status = 204, description = "Schedule removed"),
        (status = 403, description = "ADMIN role required", body = ErrorSchema),
        (status = 404, description = "Unknown volunteer or schedule", body = ErrorSchema)
    ),
    tags = ["voluntarios"],
    operation_id = "deleteVolunteerSchedule"
)]
#[delete("/voluntarios/{id}/horarios/{schedule_id}")]
pub async fn delete_schedule(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    session.require_role(Role::Admin)?;
    let (raw_volunteer, raw_schedule) = path.into_inner();
    let id = volunteer_id(&raw_volunteer)?;
    let schedule_id: ScheduleId = parse_id(&raw_schedule, FieldName::new("horarioId"))?;
    state.volunteers.remove_schedule(&id, &schedule_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register every volunteer route in match order.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_volunteers)
        .service(create_volunteer)
        .service(list_areas)
        .service(public_profile)
        .service(get_volunteer)
        .service(replace_volunteer)
        .service(patch_volunteer)
        .service(delete_volunteer)
        .service(create_activity)
        .service(update_activity)
        .service(create_schedule)
        .service(delete_schedule);
}

#[cfg(test)]
#[path = "volunteers_tests.rs"]
mod tests;
